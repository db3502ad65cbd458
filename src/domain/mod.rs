//! Record shapes produced by each pipeline stage.
//!
//! A listing is extracted once into a [`PropertyRecord`], then wrapped (never
//! mutated) by the scoring stage into a [`ScoredRecord`] and by the valuation
//! stage into a [`ValuedRecord`]. [`FlatRecord`] is the one-row-per-listing
//! view of the final stage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One extracted listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: Option<String>,
    pub title: Option<String>,

    pub purchase_price: Option<f64>,
    pub plot_area: Option<f64>,
    pub price_per_area: Option<f64>,

    pub street: Option<String>,
    pub full_address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub commercialisation_type: Option<String>,
    pub short_term_constructible: Option<String>,
    pub development: Option<String>,
    pub constructible_type: Option<String>,
    pub recommended_use: Option<String>,
    pub demolition: Option<String>,
    pub free_from: Option<String>,
    pub commission: Option<String>,

    pub description: Option<String>,
    pub location_description: Option<String>,
    pub further_notes: Option<String>,

    pub agent_company: Option<String>,
    pub agent_name: Option<String>,
    pub agent_rating: Option<String>,

    /// Every label/text pair found in the listing, recognized or not
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Values that could not be converted during extraction
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PropertyRecord {
    /// Free-text blocks in document order
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        [
            self.description.as_deref(),
            self.location_description.as_deref(),
            self.further_notes.as_deref(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityCategory {
    Low,
    Medium,
    Good,
    VeryGood,
}

impl QualityCategory {
    pub const ALL: [QualityCategory; 4] = [
        QualityCategory::Low,
        QualityCategory::Medium,
        QualityCategory::Good,
        QualityCategory::VeryGood,
    ];
}

impl fmt::Display for QualityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityCategory::Low => "Low",
            QualityCategory::Medium => "Medium",
            QualityCategory::Good => "Good",
            QualityCategory::VeryGood => "VeryGood",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueRating {
    VeryCheap,
    Cheap,
    Fair,
    Expensive,
    VeryExpensive,
    NoData,
}

impl fmt::Display for ValueRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueRating::VeryCheap => "VeryCheap",
            ValueRating::Cheap => "Cheap",
            ValueRating::Fair => "Fair",
            ValueRating::Expensive => "Expensive",
            ValueRating::VeryExpensive => "VeryExpensive",
            ValueRating::NoData => "NoData",
        };
        f.write_str(label)
    }
}

/// Weighted build-readiness assessment of one listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub permission: u8,
    pub development: u8,
    pub readiness: u8,
    pub demolition: u8,
    pub quality_score: f64,
    pub quality_category: QualityCategory,
    /// Permit keywords found in the text blocks; informational only
    #[serde(default)]
    pub permit_mentions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub expected_price_per_area: Option<f64>,
    pub price_quality_ratio: Option<f64>,
    pub value_rating: ValueRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: PropertyRecord,
    pub quality: QualityScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedRecord {
    pub record: PropertyRecord,
    pub quality: QualityScore,
    pub valuation: Valuation,
}

/// Tabular view of a [`ValuedRecord`], one row per listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub purchase_price: Option<f64>,
    pub plot_area: Option<f64>,
    pub price_per_area: Option<f64>,
    pub street: Option<String>,
    pub full_address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub commercialisation_type: Option<String>,
    pub short_term_constructible: Option<String>,
    pub development: Option<String>,
    pub constructible_type: Option<String>,
    pub recommended_use: Option<String>,
    pub demolition: Option<String>,
    pub free_from: Option<String>,
    pub commission: Option<String>,
    pub description: Option<String>,
    pub location_description: Option<String>,
    pub further_notes: Option<String>,
    pub agent_company: Option<String>,
    pub agent_name: Option<String>,
    pub agent_rating: Option<String>,
    pub score_permission: u8,
    pub score_development: u8,
    pub score_readiness: u8,
    pub score_demolition: u8,
    pub quality_score: f64,
    pub quality_category: QualityCategory,
    pub permit_mentions: String,
    pub expected_price_per_area: Option<f64>,
    pub price_quality_ratio: Option<f64>,
    pub value_rating: ValueRating,
}

impl From<&ValuedRecord> for FlatRecord {
    fn from(valued: &ValuedRecord) -> Self {
        let r = &valued.record;
        Self {
            id: r.id.clone(),
            title: r.title.clone(),
            purchase_price: r.purchase_price,
            plot_area: r.plot_area,
            price_per_area: r.price_per_area,
            street: r.street.clone(),
            full_address: r.full_address.clone(),
            district: r.district.clone(),
            latitude: r.latitude,
            longitude: r.longitude,
            commercialisation_type: r.commercialisation_type.clone(),
            short_term_constructible: r.short_term_constructible.clone(),
            development: r.development.clone(),
            constructible_type: r.constructible_type.clone(),
            recommended_use: r.recommended_use.clone(),
            demolition: r.demolition.clone(),
            free_from: r.free_from.clone(),
            commission: r.commission.clone(),
            description: r.description.clone(),
            location_description: r.location_description.clone(),
            further_notes: r.further_notes.clone(),
            agent_company: r.agent_company.clone(),
            agent_name: r.agent_name.clone(),
            agent_rating: r.agent_rating.clone(),
            score_permission: valued.quality.permission,
            score_development: valued.quality.development,
            score_readiness: valued.quality.readiness,
            score_demolition: valued.quality.demolition,
            quality_score: valued.quality.quality_score,
            quality_category: valued.quality.quality_category,
            permit_mentions: valued.quality.permit_mentions.join("; "),
            expected_price_per_area: valued.valuation.expected_price_per_area,
            price_quality_ratio: valued.valuation.price_quality_ratio,
            value_rating: valued.valuation.value_rating,
        }
    }
}
