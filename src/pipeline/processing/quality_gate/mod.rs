use serde::{Deserialize, Serialize};

use crate::domain::{PropertyRecord, QualityCategory, QualityScore, ScoredRecord};

pub mod signals;

use signals::{DemolitionSignal, DevelopmentSignal, PermissionSignal, ReadinessSignal, Signal};

/// Sub-score weights in percent; they sum to 100
pub const PERMISSION_WEIGHT: u32 = 40;
pub const DEVELOPMENT_WEIGHT: u32 = 25;
pub const READINESS_WEIGHT: u32 = 20;
pub const DEMOLITION_WEIGHT: u32 = 15;

/// Keywords in free text hinting at a permit or binding plan
const PERMIT_KEYWORDS: &[&str] = &[
    "building permit",
    "construction plan",
    "preliminary building",
    "development plan",
];

/// The four classified build-status signals of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSignals {
    pub permission: PermissionSignal,
    pub development: DevelopmentSignal,
    pub readiness: ReadinessSignal,
    pub demolition: DemolitionSignal,
}

impl BuildSignals {
    pub fn from_record(record: &PropertyRecord) -> Self {
        Self {
            permission: PermissionSignal::classify(record.constructible_type.as_deref()),
            development: DevelopmentSignal::classify(record.development.as_deref()),
            readiness: ReadinessSignal::classify(record.short_term_constructible.as_deref()),
            demolition: DemolitionSignal::classify(record.demolition.as_deref()),
        }
    }
}

/// Trait for assigning a quality assessment to an extracted record
pub trait QualityGate: Send + Sync {
    /// Score a record, returning a new scored record
    fn assess(&self, record: &PropertyRecord) -> ScoredRecord;
}

/// Weighted build-readiness scorer with fixed policy weights
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_record(&self, record: &PropertyRecord) -> QualityScore {
        let signals = BuildSignals::from_record(record);
        let permission = signals.permission.score();
        let development = signals.development.score();
        let readiness = signals.readiness.score();
        let demolition = signals.demolition.score();

        let quality_score = aggregate(permission, development, readiness, demolition);

        QualityScore {
            permission,
            development,
            readiness,
            demolition,
            quality_score,
            quality_category: QualityCategory::from_score(quality_score),
            permit_mentions: detect_permit_mentions(record),
        }
    }
}

impl QualityGate for QualityScorer {
    fn assess(&self, record: &PropertyRecord) -> ScoredRecord {
        ScoredRecord {
            record: record.clone(),
            quality: self.score_record(record),
        }
    }
}

/// Weighted sum of the sub-scores, computed in whole weight-percent units
pub fn aggregate(permission: u8, development: u8, readiness: u8, demolition: u8) -> f64 {
    let weighted = u32::from(permission) * PERMISSION_WEIGHT
        + u32::from(development) * DEVELOPMENT_WEIGHT
        + u32::from(readiness) * READINESS_WEIGHT
        + u32::from(demolition) * DEMOLITION_WEIGHT;
    f64::from(weighted) / 100.0
}

impl QualityCategory {
    /// Bins `[0,40) [40,60) [60,80) [80,100]`
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            QualityCategory::VeryGood
        } else if score >= 60.0 {
            QualityCategory::Good
        } else if score >= 40.0 {
            QualityCategory::Medium
        } else {
            QualityCategory::Low
        }
    }
}

/// Distinct permit keywords mentioned in the record's text blocks
pub fn detect_permit_mentions(record: &PropertyRecord) -> Vec<String> {
    let texts: Vec<String> = record.text_blocks().map(str::to_lowercase).collect();

    PERMIT_KEYWORDS
        .iter()
        .filter(|keyword| texts.iter().any(|text| text.contains(*keyword)))
        .map(|keyword| keyword.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        constructible_type: Option<&str>,
        development: Option<&str>,
        short_term: Option<&str>,
        demolition: Option<&str>,
    ) -> PropertyRecord {
        PropertyRecord {
            constructible_type: constructible_type.map(str::to_string),
            development: development.map(str::to_string),
            short_term_constructible: short_term.map(str::to_string),
            demolition: demolition.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_weights_sum_to_one_hundred() {
        assert_eq!(
            PERMISSION_WEIGHT + DEVELOPMENT_WEIGHT + READINESS_WEIGHT + DEMOLITION_WEIGHT,
            100
        );
    }

    #[test]
    fn test_best_case_listing() {
        let scorer = QualityScorer::new();
        let score = scorer.score_record(&record(
            Some("Construction plan"),
            Some("Developed"),
            Some("Yes"),
            Some("No"),
        ));

        assert_eq!(
            (score.permission, score.development, score.readiness, score.demolition),
            (50, 100, 100, 100)
        );
        assert_eq!(score.quality_score, 80.0);
        assert_eq!(score.quality_category, QualityCategory::VeryGood);
    }

    #[test]
    fn test_exactly_forty_is_medium() {
        let scorer = QualityScorer::new();
        let score = scorer.score_record(&record(
            Some("Outer zone"),
            Some("Not developed"),
            Some("No"),
            Some("No"),
        ));

        assert_eq!(score.quality_score, 40.0);
        assert_eq!(score.quality_category, QualityCategory::Medium);
    }

    #[test]
    fn test_category_bins() {
        assert_eq!(QualityCategory::from_score(0.0), QualityCategory::Low);
        assert_eq!(QualityCategory::from_score(39.9), QualityCategory::Low);
        assert_eq!(QualityCategory::from_score(59.9), QualityCategory::Medium);
        assert_eq!(QualityCategory::from_score(60.0), QualityCategory::Good);
        assert_eq!(QualityCategory::from_score(80.0), QualityCategory::VeryGood);
        assert_eq!(QualityCategory::from_score(100.0), QualityCategory::VeryGood);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let vocab = [
            None,
            Some("yes"),
            Some("no"),
            Some("Developed"),
            Some("partially"),
            Some("??"),
        ];
        let scorer = QualityScorer::new();

        for a in vocab {
            for b in vocab {
                for c in vocab {
                    for d in vocab {
                        let r = record(a, b, c, d);
                        let score = scorer.score_record(&r);
                        assert!((0.0..=100.0).contains(&score.quality_score));
                        assert_eq!(score, scorer.score_record(&r));
                    }
                }
            }
        }
    }

    #[test]
    fn test_assess_leaves_input_untouched() {
        let input = record(None, None, None, None);
        let scored = QualityScorer::new().assess(&input);

        assert_eq!(scored.record, input);
        // 20*0.40 + 50*0.25 + 40*0.20 + 70*0.15
        assert_eq!(scored.quality.quality_score, 39.0);
        assert_eq!(scored.quality.quality_category, QualityCategory::Low);
    }

    #[test]
    fn test_permit_mentions_do_not_change_score() {
        let mut with_text = record(None, None, None, None);
        with_text.description = Some("A Building Permit was granted in 2023.".to_string());
        with_text.further_notes = Some("Development plan No. 12 applies.".to_string());

        let scorer = QualityScorer::new();
        let score = scorer.score_record(&with_text);

        assert_eq!(
            score.permit_mentions,
            vec!["building permit".to_string(), "development plan".to_string()]
        );
        assert_eq!(
            score.quality_score,
            scorer.score_record(&record(None, None, None, None)).quality_score
        );
    }
}
