// Copyright (C) 2024-present The Routebench Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Control-plane view of the BGP speaker's neighbor.
//!
//! The benchmark never speaks BGP itself; it asks the local speaker's
//! management interface about the session and tells it to enable, disable,
//! or reset the neighbor. [`NeighborControl`] is that seam. The shipped
//! implementation serves a static snapshot from configuration; a client of
//! a real speaker's management API plugs into the same trait.

use crate::config::NeighborConfig;
use std::{net::IpAddr, time::Duration};
use tracing::{debug, info};

/// BGP finite state machine states, as a speaker's management interface
/// reports them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, serde::Serialize, serde::Deserialize,
)]
pub enum SessionState {
    Idle,
    Connect,
    Active,
    OpenSent,
    OpenConfirm,
    Established,
}

/// Administrative commands understood by the speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionCommand {
    Enable,
    Disable,
    Reset,
    SoftReset,
}

#[derive(Debug, thiserror::Error)]
pub enum NeighborError {
    #[error("the speaker has not bound a local address for the session yet")]
    LocalAddressUnset,
    #[error("neighbor state wait timed out after {timeout:?} (target {target}, inverse {inverse})")]
    StateTimeout {
        target: SessionState,
        inverse: bool,
        timeout: Duration,
    },
    #[error("neighbor control transport failed: {0}")]
    TransportError(String),
}

/// Point-in-time view of the neighbor. Owned by the caller; refresh it
/// through [`NeighborControl::neighbor`] when staleness matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborSnapshot {
    pub peer_address: IpAddr,
    pub local_address: Option<IpAddr>,
    pub router_id: IpAddr,
    pub state: SessionState,
}

impl NeighborSnapshot {
    /// The local side of the session's TCP connection. Not known until the
    /// connection exists, and required for capture filtering, so an unset
    /// or unspecified address is an error the caller treats as fatal.
    pub fn local_address(&self) -> Result<IpAddr, NeighborError> {
        match self.local_address {
            Some(addr) if !addr.is_unspecified() => Ok(addr),
            _ => Err(NeighborError::LocalAddressUnset),
        }
    }
}

/// Client of the speaker's management interface.
#[allow(async_fn_in_trait)]
pub trait NeighborControl {
    /// Current view of the neighbor. `refresh` forces a round trip to the
    /// speaker instead of serving a cached snapshot.
    async fn neighbor(&mut self, refresh: bool) -> Result<NeighborSnapshot, NeighborError>;

    async fn session_command(&mut self, command: SessionCommand) -> Result<(), NeighborError>;
}

/// Poll the neighbor once per second until its state matches `target`
/// (or stops matching it, with `inverse`). Times out with an error rather
/// than proceeding on a session in the wrong state.
pub async fn wait_for_state<C: NeighborControl>(
    control: &mut C,
    target: SessionState,
    inverse: bool,
    timeout: Duration,
) -> Result<NeighborSnapshot, NeighborError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let snapshot = control.neighbor(true).await?;
        if (snapshot.state == target) != inverse {
            return Ok(snapshot);
        }
        debug!(state = %snapshot.state, target = %target, inverse, "neighbor state not ready");
        if tokio::time::Instant::now() >= deadline {
            return Err(NeighborError::StateTimeout {
                target,
                inverse,
                timeout,
            });
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// [`NeighborControl`] backed by configuration. Commands are acknowledged
/// and logged but reach no actual speaker.
#[derive(Debug, Clone)]
pub struct StaticNeighborControl {
    snapshot: NeighborSnapshot,
}

impl StaticNeighborControl {
    pub fn new(config: &NeighborConfig, local: IpAddr, peer: IpAddr) -> Self {
        Self {
            snapshot: NeighborSnapshot {
                peer_address: peer,
                local_address: Some(local),
                router_id: config.router_id,
                state: config.state,
            },
        }
    }
}

impl NeighborControl for StaticNeighborControl {
    async fn neighbor(&mut self, _refresh: bool) -> Result<NeighborSnapshot, NeighborError> {
        Ok(self.snapshot.clone())
    }

    async fn session_command(&mut self, command: SessionCommand) -> Result<(), NeighborError> {
        info!(%command, peer = %self.snapshot.peer_address, "session command acknowledged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCAL: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    fn snapshot(local_address: Option<IpAddr>, state: SessionState) -> NeighborSnapshot {
        NeighborSnapshot {
            peer_address: PEER,
            local_address,
            router_id: LOCAL,
            state,
        }
    }

    #[test]
    fn test_local_address_required() {
        let established = snapshot(Some(LOCAL), SessionState::Established);
        assert_eq!(established.local_address().unwrap(), LOCAL);

        let unset = snapshot(None, SessionState::Idle);
        assert!(matches!(
            unset.local_address(),
            Err(NeighborError::LocalAddressUnset)
        ));

        let unspecified = snapshot(
            Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            SessionState::Active,
        );
        assert!(matches!(
            unspecified.local_address(),
            Err(NeighborError::LocalAddressUnset)
        ));
    }

    struct ScriptedControl {
        states: Vec<SessionState>,
        polls: usize,
    }

    impl NeighborControl for ScriptedControl {
        async fn neighbor(&mut self, _refresh: bool) -> Result<NeighborSnapshot, NeighborError> {
            let state = self.states[self.polls.min(self.states.len() - 1)];
            self.polls += 1;
            Ok(snapshot(Some(LOCAL), state))
        }

        async fn session_command(&mut self, _: SessionCommand) -> Result<(), NeighborError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_state_polls_until_reached() {
        let mut control = ScriptedControl {
            states: vec![
                SessionState::Active,
                SessionState::OpenSent,
                SessionState::Established,
            ],
            polls: 0,
        };
        let snapshot = wait_for_state(
            &mut control,
            SessionState::Established,
            false,
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(snapshot.state, SessionState::Established);
        assert_eq!(control.polls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_state_inverse() {
        let mut control = ScriptedControl {
            states: vec![SessionState::Established, SessionState::Idle],
            polls: 0,
        };
        let snapshot = wait_for_state(
            &mut control,
            SessionState::Established,
            true,
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(snapshot.state, SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_state_times_out() {
        let mut control = ScriptedControl {
            states: vec![SessionState::Idle],
            polls: 0,
        };
        let err = wait_for_state(
            &mut control,
            SessionState::Established,
            false,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            NeighborError::StateTimeout {
                target: SessionState::Established,
                inverse: false,
                ..
            }
        ));
    }
}
