//! Extraction phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ExtractionMetrics;

impl ExtractionMetrics {
    pub fn record_batch(total: usize, extracted: usize, skipped: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "extraction", "listings_scanned"))
            .increment(total as u64);
        ::metrics::counter!(phase_metric!(counter, "extraction", "listings_extracted"))
            .increment(extracted as u64);
        ::metrics::counter!(phase_metric!(counter, "extraction", "listings_skipped"))
            .increment(skipped as u64);
        ::metrics::histogram!(phase_metric!(histogram, "extraction", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_unparsable_values(count: usize) {
        if count > 0 {
            ::metrics::counter!(phase_metric!(counter, "extraction", "unparsable_values"))
                .increment(count as u64);
        }
    }
}

impl PhaseMetrics for ExtractionMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "extraction", "listings_scanned"));
        let _ = counter!(phase_metric!(counter, "extraction", "listings_extracted"));
        let _ = counter!(phase_metric!(counter, "extraction", "listings_skipped"));
        let _ = counter!(phase_metric!(counter, "extraction", "unparsable_values"));
        let _ = histogram!(phase_metric!(histogram, "extraction", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "extraction"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "extraction", "listings_scanned"),
                metric_type: MetricType::Counter,
                help: "Listings found in loaded documents",
            },
            MetricDoc {
                name: phase_metric!(counter, "extraction", "listings_extracted"),
                metric_type: MetricType::Counter,
                help: "Listings extracted into records",
            },
            MetricDoc {
                name: phase_metric!(counter, "extraction", "listings_skipped"),
                metric_type: MetricType::Counter,
                help: "Listings skipped because extraction failed",
            },
            MetricDoc {
                name: phase_metric!(counter, "extraction", "unparsable_values"),
                metric_type: MetricType::Counter,
                help: "Numeric values that could not be parsed",
            },
            MetricDoc {
                name: phase_metric!(histogram, "extraction", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of a batch extraction",
            },
        ]
    }
}
