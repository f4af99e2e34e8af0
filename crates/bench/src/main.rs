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

use anyhow::Context;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use routebench_bench::{
    config::BenchConfig,
    driver::run_benchmark,
    neighbor::{
        wait_for_state, NeighborControl, SessionCommand, SessionState, StaticNeighborControl,
    },
    report::write_report,
};
use routebench_capture::{
    source::{session_filter, LiveSource},
    supervisor::BgpCaptureActorHandle,
    SessionEndpoints,
};
use std::{env, path::PathBuf, str::FromStr};
use tracing::{info, Level};

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::from_str(level).context("invalid logging level")?)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        anyhow::bail!("Usage: {} <config-file>", args[0]);
    }
    let config_file = PathBuf::from(&args[1]);
    let config: BenchConfig = Figment::new()
        .merge(Yaml::file(config_file))
        .merge(Env::prefixed("RB_"))
        .extract()
        .context("parsing config file failed")?;
    init_tracing(&config.logging.level)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(num_threads) = config.runtime.threads {
        runtime_builder.worker_threads(num_threads);
    }
    runtime_builder.enable_all();
    let runtime = runtime_builder.build()?;
    runtime.block_on(run(config))
}

async fn run(config: BenchConfig) -> anyhow::Result<()> {
    let mut control = StaticNeighborControl::new(
        &config.neighbor,
        config.session.local,
        config.session.peer,
    );

    control.session_command(SessionCommand::Enable).await?;
    let snapshot = wait_for_state(
        &mut control,
        SessionState::Established,
        false,
        config.neighbor.establish_timeout,
    )
    .await
    .context("neighbor session never established")?;
    let local_address = snapshot
        .local_address()
        .context("cannot build a capture filter without the session's local address")?;
    info!(
        peer = %snapshot.peer_address,
        local = %local_address,
        router_id = %snapshot.router_id,
        "observing established session"
    );

    // filter on the addresses the speaker actually bound, not the
    // configured ones
    let endpoints =
        SessionEndpoints::new(local_address, snapshot.peer_address, config.session.port);
    let filter = session_filter(&endpoints);
    let source = LiveSource::open(&config.capture, &filter)
        .with_context(|| format!("opening capture on {} failed", config.capture.interface))?;
    let (actor_handle, capture) =
        BgpCaptureActorHandle::new(source, endpoints, config.benchmark.update_buffer)?;

    let mut entries = Vec::new();
    tokio::select! {
        _ = run_benchmark(
            capture.outbound_updates(),
            capture.inbound_updates(),
            snapshot.router_id,
            &config.benchmark,
            &mut entries,
        ) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("termination signal received, writing report and shutting down");
        }
    }

    write_report(&config.benchmark.report, &entries)
        .with_context(|| format!("writing report to {} failed", config.benchmark.report.display()))?;
    info!(report = %config.benchmark.report.display(), ticks = entries.len(), "report written");

    capture.shutdown().await?;
    actor_handle.await??;
    Ok(())
}
