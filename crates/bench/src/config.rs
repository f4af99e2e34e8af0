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

use crate::neighbor::SessionState;
use routebench_capture::{source::CaptureConfig, SessionEndpoints};
use std::{net::IpAddr, path::PathBuf, time::Duration};

const BGP_PORT_DEFAULT: u16 = 179;

pub(crate) const fn default_bgp_port() -> u16 {
    BGP_PORT_DEFAULT
}

pub(crate) const fn default_idle_timeout() -> u64 {
    5
}

pub(crate) const fn default_update_buffer() -> usize {
    1_000
}

pub(crate) fn default_report_path() -> PathBuf {
    PathBuf::from("report.json")
}

pub(crate) const fn default_session_state() -> SessionState {
    SessionState::Established
}

pub(crate) const fn default_establish_timeout() -> Duration {
    Duration::from_secs(90)
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchConfig {
    pub session: SessionConfig,
    pub capture: CaptureConfig,
    pub neighbor: NeighborConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The two endpoints of the observed BGP session.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    pub local: IpAddr,
    pub peer: IpAddr,
    #[serde(default = "default_bgp_port")]
    pub port: u16,
}

impl SessionConfig {
    pub const fn endpoints(&self) -> SessionEndpoints {
        SessionEndpoints::new(self.local, self.peer, self.port)
    }
}

/// Static view of the peer's control plane, served by
/// [`crate::neighbor::StaticNeighborControl`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NeighborConfig {
    /// Router id the local speaker stamps on its own advertisements
    pub router_id: IpAddr,
    #[serde(default = "default_session_state")]
    pub state: SessionState,
    #[serde(default = "default_establish_timeout")]
    pub establish_timeout: Duration,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkConfig {
    /// Number of consecutive quiet ticks (one per second) after which the
    /// run is considered converged. Ticks before the first update never
    /// count as quiet.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    /// Where the JSON report is written
    #[serde(default = "default_report_path")]
    pub report: PathBuf,
    /// Capacity of each direction's update channel
    #[serde(default = "default_update_buffer")]
    pub update_buffer: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            idle_timeout: default_idle_timeout(),
            report: default_report_path(),
            update_buffer: default_update_buffer(),
        }
    }
}

#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    #[serde(skip_serializing_if = "::std::option::Option::is_none")]
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{
        providers::{Format, Yaml},
        Figment,
    };
    use std::net::Ipv4Addr;

    const MINIMAL_YAML: &str = r#"
session:
  local: 10.0.0.1
  peer: 10.0.0.2
capture:
  interface: eth0
neighbor:
  router_id: 10.0.0.1
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config: BenchConfig = Figment::new()
            .merge(Yaml::string(MINIMAL_YAML))
            .extract()
            .unwrap();
        assert_eq!(config.session.port, 179);
        assert_eq!(config.neighbor.state, SessionState::Established);
        assert_eq!(config.benchmark.idle_timeout, 5);
        assert_eq!(config.benchmark.report, PathBuf::from("report.json"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.runtime.threads, None);

        let endpoints = config.session.endpoints();
        assert_eq!(endpoints.local, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(endpoints.peer, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
    }
}
