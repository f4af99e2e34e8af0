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

//! Live packet capture off a network interface.

use crate::SessionEndpoints;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default capture snapshot length, enough for jumbo frames.
pub const DEFAULT_SNAPLEN: i32 = 9174;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Capture handle configuration. The defaults mirror a passive observer:
/// no promiscuous mode (we only watch our own session) and a bounded read
/// timeout so the capture loop can observe shutdown between packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub interface: String,
    #[serde(default = "default_snaplen")]
    pub snaplen: i32,
    #[serde(default)]
    pub promiscuous: bool,
    #[serde(default = "default_read_timeout")]
    pub read_timeout: Duration,
}

const fn default_snaplen() -> i32 {
    DEFAULT_SNAPLEN
}

const fn default_read_timeout() -> Duration {
    DEFAULT_READ_TIMEOUT
}

impl CaptureConfig {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            snaplen: DEFAULT_SNAPLEN,
            promiscuous: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// BPF filter expression matching both directions of the session's TCP
/// connection and nothing else.
pub fn session_filter(endpoints: &SessionEndpoints) -> String {
    format!(
        "tcp and port {} and host {} and host {}",
        endpoints.port, endpoints.peer, endpoints.local
    )
}

/// A captured link-layer frame with its capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub timestamp: DateTime<Utc>,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureSourceError {
    #[error("failed to open capture handle: {0}")]
    OpenError(pcap::Error),
    #[error("failed to install capture filter: {0}")]
    FilterError(pcap::Error),
    #[error("capture read failed: {0}")]
    ReadError(pcap::Error),
}

/// Source of captured packets.
///
/// `Ok(None)` is a read-timeout tick: no packet arrived within the
/// configured read timeout, giving the capture loop a chance to check its
/// shutdown flag. `Err` terminates the capture loop.
pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, CaptureSourceError>;
}

/// Live capture handle on a network interface.
pub struct LiveSource {
    handle: pcap::Capture<pcap::Active>,
}

impl LiveSource {
    /// Open the interface and install the session filter. Failures here are
    /// configuration errors and fatal to the caller.
    pub fn open(config: &CaptureConfig, filter: &str) -> Result<Self, CaptureSourceError> {
        let inactive = pcap::Capture::from_device(config.interface.as_str())
            .map_err(CaptureSourceError::OpenError)?
            .promisc(config.promiscuous)
            .snaplen(config.snaplen)
            .timeout(config.read_timeout.as_millis() as i32);
        let mut handle = inactive.open().map_err(CaptureSourceError::OpenError)?;
        handle
            .filter(filter, true)
            .map_err(CaptureSourceError::FilterError)?;
        Ok(Self { handle })
    }
}

impl PacketSource for LiveSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, CaptureSourceError> {
        match self.handle.next_packet() {
            Ok(packet) => {
                let ts = &packet.header.ts;
                let timestamp =
                    DateTime::from_timestamp(ts.tv_sec as i64, (ts.tv_usec as u32) * 1000)
                        .unwrap_or_else(Utc::now);
                Ok(Some(RawPacket {
                    timestamp,
                    data: packet.data.to_vec(),
                }))
            }
            Err(pcap::Error::TimeoutExpired) => Ok(None),
            Err(err) => Err(CaptureSourceError::ReadError(err)),
        }
    }
}
