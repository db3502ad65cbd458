use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::PROGRESS_INTERVAL;
use crate::domain::PropertyRecord;
use crate::metrics::ExtractionMetrics;
use crate::pipeline::processing::normalize::Normalizer;
use crate::pipeline::processing::parser::{ListingDocument, ParsedListing};

/// A listing left out of the output, with the reason it was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedListing {
    pub index: usize,
    pub record_path: String,
    pub reason: String,
}

/// Per-listing result of extraction
#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    Extracted(PropertyRecord),
    Skipped(SkippedListing),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every listing was extracted
    Complete,
    /// Some listings were skipped
    Partial,
    /// Not a single record came out of the batch
    NothingExtracted,
}

/// Result of extracting one document set.
///
/// `records.len() + skipped.len() == total_listings` always holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub records: Vec<PropertyRecord>,
    pub skipped: Vec<SkippedListing>,
    pub total_listings: usize,
}

impl BatchReport {
    fn from_outcomes(outcomes: impl IntoIterator<Item = ListingOutcome>) -> Self {
        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.total_listings += 1;
            match outcome {
                ListingOutcome::Extracted(record) => report.records.push(record),
                ListingOutcome::Skipped(skipped) => report.skipped.push(skipped),
            }
        }
        report
    }

    pub fn status(&self) -> RunStatus {
        if self.records.is_empty() {
            RunStatus::NothingExtracted
        } else if self.skipped.is_empty() {
            RunStatus::Complete
        } else {
            RunStatus::Partial
        }
    }
}

/// Drives a [`Normalizer`] over every listing of a document, isolating failures
#[derive(Clone)]
pub struct BatchExtractor {
    normalizer: Arc<dyn Normalizer>,
}

impl BatchExtractor {
    pub fn new(normalizer: Arc<dyn Normalizer>) -> Self {
        Self { normalizer }
    }

    /// Extract one listing; errors and panics become a skip
    pub fn extract_listing(&self, listing: &ParsedListing) -> ListingOutcome {
        extract_one(self.normalizer.as_ref(), listing)
    }

    #[instrument(skip(self, document), fields(listings = document.len()))]
    pub fn extract(&self, document: &ListingDocument) -> BatchReport {
        let started = Instant::now();
        let total = document.len();

        let outcomes = document.listings().iter().enumerate().map(|(i, listing)| {
            let outcome = self.extract_listing(listing);
            if (i + 1) % PROGRESS_INTERVAL == 0 {
                info!("Processed {}/{} listings", i + 1, total);
            }
            outcome
        });

        let report = BatchReport::from_outcomes(outcomes);
        finish(&report, started);
        report
    }

    /// Extract on up to `workers` blocking tasks; output keeps source order.
    #[instrument(skip(self, document), fields(listings = document.len()))]
    pub async fn extract_parallel(
        &self,
        document: &ListingDocument,
        workers: usize,
    ) -> BatchReport {
        if workers <= 1 || document.len() <= 1 {
            return self.extract(document);
        }

        let started = Instant::now();
        let listings = document.listings();
        let chunk_size = listings.len().div_ceil(workers);
        let mut set = JoinSet::new();

        for (chunk_no, chunk) in listings.chunks(chunk_size).enumerate() {
            let offset = chunk_no * chunk_size;
            let chunk = chunk.to_vec();
            let normalizer = Arc::clone(&self.normalizer);

            set.spawn_blocking(move || {
                let outcomes: Vec<(usize, ListingOutcome)> = chunk
                    .iter()
                    .enumerate()
                    .map(|(i, listing)| (offset + i, extract_one(normalizer.as_ref(), listing)))
                    .collect();
                debug!("Worker {} finished {} listings", chunk_no, outcomes.len());
                outcomes
            });
        }

        let mut slots: Vec<Option<ListingOutcome>> = vec![None; listings.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcomes) => {
                    for (position, outcome) in outcomes {
                        slots[position] = Some(outcome);
                    }
                }
                Err(e) => error!("Extraction worker failed: {}", e),
            }
        }

        // Listings of a worker that never reported back count as skipped
        let outcomes = slots.into_iter().zip(listings).map(|(slot, listing)| {
            slot.unwrap_or_else(|| {
                ListingOutcome::Skipped(skipped(listing, "extraction worker failed".to_string()))
            })
        });

        let report = BatchReport::from_outcomes(outcomes);
        finish(&report, started);
        report
    }
}

fn extract_one(normalizer: &dyn Normalizer, listing: &ParsedListing) -> ListingOutcome {
    match catch_unwind(AssertUnwindSafe(|| normalizer.normalize(listing))) {
        Ok(Ok(record)) => ListingOutcome::Extracted(record),
        Ok(Err(e)) => {
            warn!("Skipping listing {}: {}", listing.record_path, e);
            ListingOutcome::Skipped(skipped(listing, e.to_string()))
        }
        Err(_) => {
            error!("Extraction panicked for listing {}", listing.record_path);
            ListingOutcome::Skipped(skipped(listing, "extraction panicked".to_string()))
        }
    }
}

fn skipped(listing: &ParsedListing, reason: String) -> SkippedListing {
    SkippedListing {
        index: listing.index,
        record_path: listing.record_path.clone(),
        reason,
    }
}

fn finish(report: &BatchReport, started: Instant) {
    let unparsable: usize = report.records.iter().map(|r| r.warnings.len()).sum();
    ExtractionMetrics::record_batch(
        report.total_listings,
        report.records.len(),
        report.skipped.len(),
        started.elapsed().as_secs_f64(),
    );
    ExtractionMetrics::record_unparsable_values(unparsable);

    info!(
        "✅ Extracted {} of {} listings ({} skipped)",
        report.records.len(),
        report.total_listings,
        report.skipped.len()
    );
    if report.status() == RunStatus::NothingExtracted {
        warn!("No listings could be extracted");
    }
}
