mod config;

use std::{fs, sync::Arc};

use anyhow::{Context, anyhow};
use taskvisor::{Config as SupervisorConfig, Subscribe, Supervisor};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use reclaim_core::{
    Driver, MetricsHandle, SystemClock,
    cloud::{CloudSnapshot, InMemoryCloud},
    cycle_spec, noop_metrics,
};
use reclaim_observe::{LoggerTimeZone, init_local_offset, init_logger};
use reclaim_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

use crate::config::AgentConfig;

fn main() -> anyhow::Result<()> {
    let cfg = AgentConfig::load()?;

    // Offset detection must happen before the runtime spawns its workers.
    if cfg.logger.tz == LoggerTimeZone::Local {
        init_local_offset();
    }
    init_logger(&cfg.logger)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?
        .block_on(run(cfg))
}

async fn run(cfg: AgentConfig) -> anyhow::Result<()> {
    let cloud = Arc::new(load_cloud(&cfg)?);

    let prometheus = if cfg.print_metrics {
        Some(PrometheusMetrics::new().context("registering metrics")?)
    } else {
        None
    };
    let metrics: MetricsHandle = match &prometheus {
        Some(p) => Arc::new(p.clone()),
        None => noop_metrics(),
    };

    let driver = Driver::from_config(&cfg.reclaim, cloud.clone(), Arc::new(SystemClock), metrics)?;

    info!(
        recorder = %cfg.reclaim.recorder_name,
        capacity = cfg.reclaim.registry_capacity,
        interval_secs = cfg.reclaim.interval_secs,
        once = cfg.once,
        "reclaimer starting"
    );

    if cfg.once {
        run_single(&driver).await;
    } else {
        // The supervisor stops its tasks on SIGINT/SIGTERM and returns.
        let subscribers: Vec<Arc<dyn Subscribe>> = Vec::new();
        let sup = Supervisor::builder(SupervisorConfig::default())
            .with_subscribers(subscribers)
            .build();
        let spec = cycle_spec(
            Arc::new(driver).into_task(),
            cfg.reclaim.interval(),
            cfg.reclaim.cycle_timeout(),
        );
        sup.run(vec![spec])
            .await
            .map_err(|e| anyhow!("supervisor exited with error: {e}"))?;
        info!("supervisor stopped");
    }

    if let Some(path) = &cfg.snapshot_out {
        let json = serde_json::to_string_pretty(&cloud.snapshot())?;
        fs::write(path, json).with_context(|| format!("writing snapshot to {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
    }
    if let Some(p) = prometheus {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&p.gather(), &mut buffer)?;
        print!("{}", String::from_utf8_lossy(&buffer));
    }
    Ok(())
}

async fn run_single(driver: &Driver) {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let watcher = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, stopping"),
            Err(e) => warn!(error = %e, "cannot listen for interrupts"),
        }
        on_signal.cancel();
    });

    let report = driver.run_once(&cancel).await;
    watcher.abort();
    info!(clean = report.is_clean(), "single cycle finished");
}

fn load_cloud(cfg: &AgentConfig) -> anyhow::Result<InMemoryCloud> {
    let Some(path) = &cfg.snapshot else {
        warn!("no snapshot configured; rehearsing against an empty cloud");
        return Ok(InMemoryCloud::new());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: CloudSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    info!(
        path = %path.display(),
        groups = snapshot.resource_groups.len(),
        pools = snapshot.pools.len(),
        "snapshot loaded"
    );
    Ok(InMemoryCloud::from_snapshot(snapshot))
}
