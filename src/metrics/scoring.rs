//! Scoring and valuation phase metrics

use crate::domain::ValuedRecord;
use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ScoringMetrics;

impl ScoringMetrics {
    pub fn record_valued(record: &ValuedRecord) {
        ::metrics::histogram!(phase_metric!(histogram, "scoring", "quality_score"))
            .record(record.quality.quality_score);
        ::metrics::counter!(
            phase_metric!(counter, "scoring", "value_ratings"),
            "rating" => record.valuation.value_rating.to_string()
        )
        .increment(1);
    }

    pub fn record_run(duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "scoring", "runs")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "scoring", "pipeline_duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for ScoringMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "scoring", "runs"));
        let _ = counter!(phase_metric!(counter, "scoring", "value_ratings"));
        let _ = histogram!(phase_metric!(histogram, "scoring", "quality_score"));
        let _ = histogram!(phase_metric!(histogram, "scoring", "pipeline_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "scoring"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "scoring", "runs"),
                metric_type: MetricType::Counter,
                help: "Completed pipeline runs",
            },
            MetricDoc {
                name: phase_metric!(counter, "scoring", "value_ratings"),
                metric_type: MetricType::Counter,
                help: "Valued records by value rating",
            },
            MetricDoc {
                name: phase_metric!(histogram, "scoring", "quality_score"),
                metric_type: MetricType::Histogram,
                help: "Distribution of aggregate quality scores",
            },
            MetricDoc {
                name: phase_metric!(histogram, "scoring", "pipeline_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of a full pipeline run",
            },
        ]
    }
}
