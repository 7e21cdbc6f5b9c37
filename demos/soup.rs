//! # Example: Random soup
//!
//! Seeds a random board for one user, streams its generations to a watcher
//! and stops on convergence, the runtime ceiling or Ctrl-C.
//!
//! ```bash
//! RUST_LOG=lifevisor=debug,soup=info cargo run --example soup
//! ```

use std::{sync::Arc, time::Duration};

use rand::Rng;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lifevisor::{Cell, Config, JobEvent, JobStatus, Orchestrator, TopicBus, UserId};

const ROWS: usize = 24;
const COLS: usize = 48;

/// Random board where each cell is alive with probability `density`.
fn soup(density: f64) -> Vec<Vec<Cell>> {
    let mut rng = rand::rng();
    (0..ROWS)
        .map(|_| {
            (0..COLS)
                .map(|_| {
                    if rng.random_bool(density) {
                        Cell::BORN
                    } else {
                        Cell::DEAD
                    }
                })
                .collect()
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = Config {
        max_runtime: Duration::from_secs(10),
        generation_interval: Duration::from_millis(50),
        grace: Duration::from_secs(5),
        ..Config::default()
    };
    let bus = Arc::new(TopicBus::new(cfg.bus_capacity));
    let orch = Orchestrator::builder(cfg)
        .with_broadcaster(bus.clone())
        .build();

    let user = UserId::from("demo");
    let mut rx = bus.subscribe(&orch.topic(&user)).await;
    let job = orch.submit_rows(soup(0.3), user.clone()).await?;
    info!(%job, %user, "soup submitted");

    let watcher = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => match ev.as_ref() {
                    JobEvent::GridUpdate { grid, .. } => {
                        info!(alive = grid.alive_count(), "generation");
                    }
                    JobEvent::JobStatus {
                        status, message, ..
                    } => {
                        info!(status = status.as_str(), detail = %message, "job status");
                        if *status != JobStatus::Running {
                            break;
                        }
                    }
                },
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "watcher lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        res = orch.join(&job) => match res {
            Some(Ok(report)) => info!(
                state = %report.state,
                generations = report.generations,
                elapsed = ?report.elapsed,
                "job finished"
            ),
            Some(Err(e)) => warn!(error = %e, "job failed"),
            None => {}
        },
        res = orch.run_until_signal() => res?,
    }

    let _ = watcher.await;
    Ok(())
}
