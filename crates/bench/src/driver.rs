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

//! The benchmark loop: count route propagation until the session goes
//! quiet.

use crate::{config::BenchmarkConfig, report::ReportEntry};
use chrono::Utc;
use routebench_capture::UpdateReceiver;
use std::{net::IpAddr, time::Duration};
use tracing::{info, trace};

/// Count prefixes until the exchange converges.
///
/// Once per second both update channels are drained without blocking.
/// Outbound updates whose next-hop is the local `router_id` count as
/// advertised prefixes; inbound updates whose next-hop is anything else
/// count as received. Withdrawals accumulate alongside. Each tick appends
/// a [`ReportEntry`] with the running totals. The run ends after
/// `idle_timeout` consecutive ticks with no update once counting has
/// started, or when both channels are closed and drained.
pub async fn run_benchmark(
    outbound: UpdateReceiver,
    inbound: UpdateReceiver,
    router_id: IpAddr,
    config: &BenchmarkConfig,
    entries: &mut Vec<ReportEntry>,
) {
    let mut advertised: u64 = 0;
    let mut received: u64 = 0;
    let mut withdrawn_out: u64 = 0;
    let mut withdrawn_in: u64 = 0;
    let mut quiet_ticks: u64 = 0;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // the first tick fires immediately
    ticker.tick().await;

    info!(%router_id, "benchmark started");
    loop {
        ticker.tick().await;
        let mut drained = false;

        while let Ok(event) = outbound.try_recv() {
            drained = true;
            if event.next_hop == Some(router_id) {
                advertised += event.announced_count() as u64;
            } else {
                trace!(next_hop = ?event.next_hop, "outbound update with foreign next-hop");
            }
            withdrawn_out += event.withdrawn_count() as u64;
        }
        while let Ok(event) = inbound.try_recv() {
            drained = true;
            if event.next_hop != Some(router_id) {
                received += event.announced_count() as u64;
            }
            withdrawn_in += event.withdrawn_count() as u64;
        }

        let entry = ReportEntry::new(Utc::now(), advertised, received);
        info!(
            time = %entry.time,
            advertised,
            received,
            withdrawn_out,
            withdrawn_in,
            "benchmark tick"
        );
        entries.push(entry);

        if drained || (advertised == 0 && received == 0) {
            quiet_ticks = 0;
        } else {
            quiet_ticks += 1;
            if quiet_ticks >= config.idle_timeout {
                info!(quiet_ticks, "no updates observed, benchmark converged");
                break;
            }
        }
        if outbound.is_closed()
            && outbound.is_empty()
            && inbound.is_closed()
            && inbound.is_empty()
        {
            info!("update channels closed, benchmark done");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnet::Ipv4Net;
    use routebench_bgp_pkt::{nlri::Ipv4Unicast, update::BgpUpdateMessage};
    use routebench_capture::{
        create_update_channel, BgpUpdateEvent, FlowDirection, FlowKey, UpdateSender,
    };
    use std::{
        net::Ipv4Addr,
        sync::Arc,
    };

    const ROUTER_ID: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
    const PEER_HOP: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    fn prefixes(count: u8) -> Vec<Ipv4Unicast> {
        (0..count)
            .map(|i| {
                Ipv4Unicast::from_net(
                    Ipv4Net::new(Ipv4Addr::new(10, 100, i, 0), 24).unwrap(),
                )
                .unwrap()
            })
            .collect()
    }

    async fn send(
        sink: &UpdateSender,
        sequence: u64,
        direction: FlowDirection,
        next_hop: Option<IpAddr>,
        announced: u8,
        withdrawn: u8,
    ) {
        let flow = FlowKey {
            src_ip: ROUTER_ID,
            src_port: 33000,
            dst_ip: PEER_HOP,
            dst_port: 179,
        };
        let event = BgpUpdateEvent {
            sequence,
            flow,
            direction,
            timestamp: Utc::now(),
            next_hop,
            message: BgpUpdateMessage::new(prefixes(withdrawn), vec![], prefixes(announced)),
        };
        sink.send(Arc::new(event)).await.unwrap();
    }

    fn config(idle_timeout: u64) -> BenchmarkConfig {
        BenchmarkConfig {
            idle_timeout,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_and_idle_convergence() {
        let (out_tx, out_rx) = create_update_channel(16);
        let (in_tx, in_rx) = create_update_channel(16);

        send(&out_tx, 0, FlowDirection::Outbound, Some(ROUTER_ID), 3, 0).await;
        send(&out_tx, 1, FlowDirection::Outbound, Some(PEER_HOP), 5, 0).await;
        send(&in_tx, 0, FlowDirection::Inbound, Some(PEER_HOP), 2, 1).await;

        let mut entries = Vec::new();
        run_benchmark(out_rx, in_rx, ROUTER_ID, &config(2), &mut entries).await;

        // one counting tick plus two quiet ticks
        assert_eq!(entries.len(), 3);
        let last = entries.last().unwrap();
        // the foreign-next-hop outbound update does not count
        assert_eq!(last.advertised, 3);
        assert_eq!(last.received, 2);
        // totals are cumulative, the quiet ticks repeat them
        assert_eq!(entries[0].advertised, 3);
        assert_eq!(entries[1].advertised, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_before_first_update_does_not_converge() {
        let (out_tx, out_rx) = create_update_channel(16);
        let (in_tx, in_rx) = create_update_channel(16);

        let feeder = tokio::spawn({
            let in_tx = in_tx.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                send(&in_tx, 0, FlowDirection::Inbound, Some(PEER_HOP), 1, 0).await;
            }
        });

        let mut entries = Vec::new();
        run_benchmark(out_rx, in_rx, ROUTER_ID, &config(2), &mut entries).await;
        feeder.await.unwrap();

        // ten empty warm-up ticks never counted as quiet
        assert!(entries.len() > 10);
        assert_eq!(entries.last().unwrap().received, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channels_end_the_run() {
        let (out_tx, out_rx) = create_update_channel(16);
        let (in_tx, in_rx) = create_update_channel(16);
        drop(out_tx);
        drop(in_tx);

        let mut entries = Vec::new();
        run_benchmark(out_rx, in_rx, ROUTER_ID, &config(100), &mut entries).await;
        assert_eq!(entries.len(), 1);
    }
}
