use chrono::{DateTime, Utc};
use clap::Parser;
use dotenvy::dotenv;
use gm_common::db::{PgStore, create_pool_from_url_checked, run_migrations};
use gm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use gm_common::reliability::{
    SweepReport, SweepSchedule, next_run_after, run_reliability_sweep,
};
use gm_common::run_id;
use gm_common::store::MatchStore;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

const APP_NAME: &str = "gm-reliability-worker";

#[derive(Debug, Parser)]
#[command(
    name = "gm-reliability-worker",
    about = "Recompute every worker's reliability score once a day"
)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    /// Run a single sweep immediately and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// UTC hour of the daily sweep (default: GM_RELIABILITY_SWEEP_HOUR or 2)
    #[arg(long)]
    hour: Option<u32>,

    /// UTC minute of the daily sweep (default: GM_RELIABILITY_SWEEP_MINUTE or 0)
    #[arg(long)]
    minute: Option<u32>,

    /// Skip schema migrations on startup
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

impl Cli {
    fn schedule(&self) -> Result<SweepSchedule, gm_common::reliability::ScheduleError> {
        let base = SweepSchedule::from_env()?;
        SweepSchedule::new(
            self.hour.unwrap_or(base.hour),
            self.minute.unwrap_or(base.minute),
        )
    }
}

fn wait_until(now: DateTime<Utc>, next: DateTime<Utc>) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// One sweep with metrics. Errors are logged, never returned, so a bad night
/// does not stop the schedule.
async fn sweep_once<S: MatchStore>(store: &S) -> Option<SweepReport> {
    match run_reliability_sweep(store).await {
        Ok(report) => {
            gm_metrics::record_reliability_sweep(
                report.updated,
                report.failed,
                report.duration_secs(),
                report.finished_at.timestamp(),
            );
            Some(report)
        }
        Err(err) => {
            gm_metrics::record_reliability_sweep_aborted();
            error!(error = %err, "reliability sweep failed");
            None
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber(APP_NAME);
    install_tracing_panic_hook(APP_NAME);

    let args = Cli::parse();
    let schedule = args.schedule()?;
    let pool = create_pool_from_url_checked(&args.db_url).await?;
    if !args.skip_migrations {
        run_migrations(&pool).await?;
    }
    let store = PgStore::new(pool);
    gm_metrics::init_metrics();

    info!(
        process_id = run_id::process(),
        hour = schedule.hour,
        minute = schedule.minute,
        once = args.once,
        "reliability worker started"
    );

    if args.once {
        return match sweep_once(&store).await {
            Some(_) => Ok(()),
            None => Err("reliability sweep failed".into()),
        };
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let now = Utc::now();
        let next = next_run_after(now, schedule);
        info!(next_run = %next, "waiting for next reliability sweep");

        tokio::select! {
            _ = sleep(wait_until(now, next)) => {}
            _ = &mut shutdown => {
                info!("shutdown requested; exiting");
                break;
            }
        }

        // Awaited in-line: the next wait only starts once this sweep is done.
        sweep_once(&store).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!(error = %err, "{APP_NAME} failed");
        eprintln!("{APP_NAME} failed: {err}");
        std::process::exit(1);
    }
}
