use std::env;
use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

pub const METRICS_PORT_ENV: &str = "GM_METRICS_PORT";
pub const DEFAULT_METRICS_PORT: u16 = 9464;

static EXPORTER_PORT: OnceLock<u16> = OnceLock::new();

fn resolve_port(raw: Option<&str>, default_port: u16) -> u16 {
    raw.and_then(|raw| raw.trim().parse::<u16>().ok())
        .unwrap_or(default_port)
}

/// Start the Prometheus exporter on `0.0.0.0:<GM_METRICS_PORT>` (default 9464).
///
/// Must be called from inside a Tokio runtime. Returns the bound port, or
/// `None` when the exporter could not be installed; metrics calls are then
/// no-ops.
pub fn init_metrics() -> Option<u16> {
    if let Some(port) = EXPORTER_PORT.get() {
        return Some(*port);
    }

    let port = resolve_port(env::var(METRICS_PORT_ENV).ok().as_deref(), DEFAULT_METRICS_PORT);
    match PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
    {
        Ok(()) => {
            describe_sweep_metrics();
            let _ = EXPORTER_PORT.set(port);
            info!(metrics_port = port, "started prometheus exporter");
            Some(port)
        }
        Err(err) => {
            warn!(error = %err, metrics_port = port, "failed to start prometheus exporter");
            None
        }
    }
}

fn describe_sweep_metrics() {
    describe_counter!("gm_reliability_sweep_runs_total", "Reliability sweeps by outcome");
    describe_counter!(
        "gm_reliability_sweep_workers_total",
        "Workers visited by the reliability sweep, by result"
    );
    describe_histogram!(
        "gm_reliability_sweep_duration_seconds",
        "Wall time of one reliability sweep"
    );
    describe_gauge!(
        "gm_reliability_sweep_last_success_timestamp",
        "Unix time of the last sweep that finished"
    );
}

/// Outcome of a finished sweep.
pub fn record_reliability_sweep(
    updated: usize,
    failed: usize,
    duration_secs: f64,
    finished_at_unix: i64,
) {
    counter!("gm_reliability_sweep_runs_total", "outcome" => "finished").increment(1);
    counter!("gm_reliability_sweep_workers_total", "result" => "updated").increment(updated as u64);
    counter!("gm_reliability_sweep_workers_total", "result" => "failed").increment(failed as u64);
    histogram!("gm_reliability_sweep_duration_seconds").record(duration_secs);
    gauge!("gm_reliability_sweep_last_success_timestamp").set(finished_at_unix as f64);
}

/// A sweep that could not list workers.
pub fn record_reliability_sweep_aborted() {
    counter!("gm_reliability_sweep_runs_total", "outcome" => "aborted").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(resolve_port(None, DEFAULT_METRICS_PORT), 9464);
        assert_eq!(resolve_port(Some("9100"), DEFAULT_METRICS_PORT), 9100);
        assert_eq!(resolve_port(Some(" 9100\n"), DEFAULT_METRICS_PORT), 9100);
        assert_eq!(resolve_port(Some("70000"), DEFAULT_METRICS_PORT), 9464);
        assert_eq!(resolve_port(Some("metrics"), DEFAULT_METRICS_PORT), 9464);
    }

    #[test]
    fn recording_without_exporter_is_a_noop() {
        record_reliability_sweep(3, 1, 0.25, 1_717_200_000);
        record_reliability_sweep_aborted();
    }
}
