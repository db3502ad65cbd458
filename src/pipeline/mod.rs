// Listing pipeline: load once, extract, score, value, report

pub mod analysis;
pub mod batch;
pub mod ingestion;
pub mod processing;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{FlatRecord, PropertyRecord, ValuedRecord};
use crate::error::Result;
use crate::metrics::ScoringMetrics;
use batch::{BatchExtractor, BatchReport, RunStatus, SkippedListing};
use ingestion::DocumentSource;
use processing::normalize::RecordExtractor;
use processing::quality_gate::{QualityGate, QualityScorer};
use processing::valuation::ValuationEngine;

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_listings: usize,
    pub skipped: Vec<SkippedListing>,
    pub records: Vec<ValuedRecord>,
    pub status: RunStatus,
}

impl PipelineResult {
    pub fn extracted_count(&self) -> usize {
        self.records.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn flat_records(&self) -> Vec<FlatRecord> {
        self.records.iter().map(FlatRecord::from).collect()
    }
}

/// One configured run over one document source
pub struct Pipeline {
    source: Box<dyn DocumentSource>,
    config: Config,
    extractor: BatchExtractor,
    scorer: Arc<dyn QualityGate>,
    valuation: ValuationEngine,
}

impl Pipeline {
    pub fn new(source: Box<dyn DocumentSource>, config: Config) -> Self {
        let extractor = BatchExtractor::new(Arc::new(RecordExtractor::new(
            config.extraction.clone(),
        )));

        Self {
            source,
            config,
            extractor,
            scorer: Arc::new(QualityScorer::new()),
            valuation: ValuationEngine::new(),
        }
    }

    /// Load and extract only
    #[instrument(skip(self), fields(source = %self.source.source_name()))]
    pub async fn extract(&self) -> Result<BatchReport> {
        let document = self.source.load().await?;
        info!("📡 Loaded {} listings", document.len());
        Ok(self
            .extractor
            .extract_parallel(&document, self.config.pipeline.workers)
            .await)
    }

    /// Score then value one extracted record
    pub fn evaluate(&self, record: &PropertyRecord) -> ValuedRecord {
        let scored = self.scorer.assess(record);
        self.valuation.value(&scored)
    }

    /// Run the complete pipeline
    #[instrument(skip(self), fields(source = %self.source.source_name()))]
    pub async fn run(&self) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let t_pipeline = Instant::now();
        info!(%run_id, "🚀 Starting pipeline");

        let report = self.extract().await?;
        let status = report.status();

        let records: Vec<ValuedRecord> = report
            .records
            .iter()
            .map(|record| {
                let valued = self.evaluate(record);
                ScoringMetrics::record_valued(&valued);
                valued
            })
            .collect();

        ScoringMetrics::record_run(t_pipeline.elapsed().as_secs_f64());

        match status {
            RunStatus::NothingExtracted => warn!(
                "Pipeline produced no records from {} listings",
                report.total_listings
            ),
            _ => info!(
                "✅ Valued {} records ({} skipped)",
                records.len(),
                report.skipped.len()
            ),
        }

        Ok(PipelineResult {
            run_id,
            source: self.source.source_name(),
            started_at,
            finished_at: Utc::now(),
            total_listings: report.total_listings,
            skipped: report.skipped,
            records,
            status,
        })
    }

    /// Persist a run result as pretty JSON, returning the file path
    pub fn persist_to_json(result: &PipelineResult, output_dir: &str) -> Result<String> {
        fs::create_dir_all(output_dir)?;

        let timestamp = result.finished_at.format("%Y%m%d_%H%M%S");
        let filename = format!("valued_listings_{timestamp}.json");
        let filepath = Path::new(output_dir).join(&filename);

        let json_content = serde_json::to_string_pretty(result)?;
        fs::write(&filepath, json_content)?;

        Ok(filepath.to_string_lossy().to_string())
    }
}
