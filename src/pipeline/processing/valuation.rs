//! Price fairness relative to build quality.
//!
//! A quality score of [`REFERENCE_QUALITY_SCORE`] is a fair price with no
//! adjustment. The resulting `price_quality_ratio` reduces to
//! `quality_score / 70`; it re-expresses quality against the reference point
//! and does not compare prices across listings.

use tracing::debug;

use crate::constants::REFERENCE_QUALITY_SCORE;
use crate::domain::{ScoredRecord, Valuation, ValueRating, ValuedRecord};
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValuationEngine;

impl ValuationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn value(&self, scored: &ScoredRecord) -> ValuedRecord {
        let price_per_area = scored.record.price_per_area;
        let valuation = match self.valuate(price_per_area, scored.quality.quality_score) {
            Ok(valuation) => valuation,
            Err(reason) => {
                debug!(id = ?scored.record.id, "{}", reason);
                Valuation {
                    expected_price_per_area: None,
                    price_quality_ratio: None,
                    value_rating: ValueRating::NoData,
                }
            }
        };

        ValuedRecord {
            record: scored.record.clone(),
            quality: scored.quality.clone(),
            valuation,
        }
    }

    pub fn valuate(
        &self,
        price_per_area: Option<f64>,
        quality_score: f64,
    ) -> Result<Valuation, PipelineError> {
        let observed = price_per_area.ok_or_else(|| {
            PipelineError::DivisionUndefined("no observed price per area".to_string())
        })?;

        let quality_factor = quality_score / REFERENCE_QUALITY_SCORE;
        if quality_factor == 0.0 || !quality_factor.is_finite() {
            return Err(PipelineError::DivisionUndefined(format!(
                "quality factor {} is not usable",
                quality_factor
            )));
        }

        let expected = observed / quality_factor;
        let ratio = if expected == 0.0 || !expected.is_finite() {
            None
        } else {
            Some(observed / expected)
        };

        Ok(Valuation {
            expected_price_per_area: Some(expected).filter(|v| v.is_finite()),
            price_quality_ratio: ratio,
            value_rating: ValueRating::from_ratio(ratio),
        })
    }
}

impl ValueRating {
    pub fn from_ratio(ratio: Option<f64>) -> Self {
        match ratio {
            None => ValueRating::NoData,
            Some(r) if r.is_nan() => ValueRating::NoData,
            Some(r) if r < 0.85 => ValueRating::VeryCheap,
            Some(r) if r < 0.95 => ValueRating::Cheap,
            Some(r) if r <= 1.05 => ValueRating::Fair,
            Some(r) if r <= 1.15 => ValueRating::Expensive,
            Some(_) => ValueRating::VeryExpensive,
        }
    }
}

/// Ranking score combining quality (60%) and price attractiveness (40%)
pub fn deal_score(quality_score: f64, price_quality_ratio: f64) -> f64 {
    quality_score * 0.6 + (100.0 - price_quality_ratio * 50.0) * 0.4
}
