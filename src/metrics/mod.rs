//! Metrics for the valuation pipeline
//!
//! Each pipeline phase defines its own metrics in a dedicated submodule.
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

pub mod extraction;
pub mod scoring;

pub use extraction::ExtractionMetrics;
pub use scoring::ScoringMetrics;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install a Prometheus recorder, with an HTTP listener when `addr` is given.
///
/// Idempotent; later calls return without touching the installed recorder.
/// The listener is served on the current tokio runtime.
pub fn init_metrics(addr: Option<&str>) {
    if HANDLE.get().is_some() {
        return;
    }

    let listen = addr.and_then(|addr_str| match addr_str.parse::<SocketAddr>() {
        Ok(addr) => Some(addr),
        Err(e) => {
            warn!("Invalid metrics addr '{}': {}", addr_str, e);
            None
        }
    });

    let installed = match listen {
        Some(addr) => install_with_listener(addr),
        None => PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| e.to_string()),
    };

    match installed {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("METRICS: handle already set");
            }
            register_all_metrics();
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

fn install_with_listener(addr: SocketAddr) -> Result<PrometheusHandle, String> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|e| e.to_string())?;
    let (recorder, exporter) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .build()
        .map_err(|e| e.to_string())?;
    let handle = recorder.handle();
    ::metrics::set_global_recorder(recorder)
        .map_err(|_| "a global metrics recorder is already installed".to_string())?;

    runtime.spawn(async move {
        if exporter.await.is_err() {
            warn!("Prometheus exporter stopped with an error");
        }
    });
    info!("Prometheus HTTP exporter at http://{}/metrics", addr);
    Ok(handle)
}

/// Render the current metrics snapshot in Prometheus text format
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

/// Metric names follow `plot_{phase}_{metric_name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("plot_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("plot_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<ExtractionMetrics>(&mut all_metrics);
    register_phase_metrics::<ScoringMetrics>(&mut all_metrics);

    info!("Registered {} total metrics across all phases", all_metrics.len());
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();

    for doc in T::metrics_documentation() {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' in phase '{}'",
                doc.name,
                T::phase_name()
            );
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}
