//! Market views over valued records: district ranking, price segments, size
//! categories and district-relative value.
//!
//! Bins are right-inclusive with an open lower edge at zero, so a price or
//! area of exactly 0 falls into no bin.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{mean, median};
use crate::domain::ValuedRecord;

/// Districts need at least this many priced listings to be ranked
pub const MIN_DISTRICT_LISTINGS: usize = 3;

const PRICE_SEGMENT_EDGES: [f64; 3] = [500_000.0, 1_000_000.0, 1_500_000.0];
const SIZE_CATEGORY_EDGES: [f64; 3] = [500.0, 1_000.0, 2_000.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictRanking {
    pub district: String,
    /// Listings with a purchase price
    pub count: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub mean_area: Option<f64>,
    pub mean_price_per_area: Option<f64>,
    pub mean_agent_rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceSegment {
    UpTo500k,
    UpTo1M,
    UpTo1500k,
    Above1500k,
}

impl PriceSegment {
    pub const ALL: [PriceSegment; 4] = [
        PriceSegment::UpTo500k,
        PriceSegment::UpTo1M,
        PriceSegment::UpTo1500k,
        PriceSegment::Above1500k,
    ];

    pub fn from_price(price: f64) -> Option<Self> {
        bin_index(price, &PRICE_SEGMENT_EDGES).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for PriceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriceSegment::UpTo500k => "up to 500k",
            PriceSegment::UpTo1M => "500k-1M",
            PriceSegment::UpTo1500k => "1M-1.5M",
            PriceSegment::Above1500k => "over 1.5M",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStatistics {
    pub segment: PriceSegment,
    pub count: usize,
    pub mean_area: Option<f64>,
    pub mean_price_per_area: Option<f64>,
    pub most_common_district: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl SizeCategory {
    pub const ALL: [SizeCategory; 4] = [
        SizeCategory::Small,
        SizeCategory::Medium,
        SizeCategory::Large,
        SizeCategory::VeryLarge,
    ];

    pub fn from_area(area: f64) -> Option<Self> {
        bin_index(area, &SIZE_CATEGORY_EDGES).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SizeCategory::Small => "small (<500 m²)",
            SizeCategory::Medium => "medium (500-1000 m²)",
            SizeCategory::Large => "large (1000-2000 m²)",
            SizeCategory::VeryLarge => "very large (>2000 m²)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeStatistics {
    pub category: SizeCategory,
    pub count: usize,
    pub mean_price: Option<f64>,
    pub mean_price_per_area: Option<f64>,
}

/// A record priced below (positive score) or above its district's average
/// price per m², in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueOpportunity {
    pub district: String,
    pub district_avg_price_per_area: f64,
    pub value_score: f64,
    pub record: ValuedRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub total_listings: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub district_count: usize,
    pub mean_area: Option<f64>,
    pub mean_price_per_area: Option<f64>,
}

/// Districts with enough priced listings, most expensive first.
pub fn district_ranking(records: &[ValuedRecord]) -> Vec<DistrictRanking> {
    let mut ranking: Vec<DistrictRanking> = by_district(records)
        .into_iter()
        .filter_map(|(district, members)| {
            let prices = values(&members, |r| r.record.purchase_price);
            if prices.len() < MIN_DISTRICT_LISTINGS {
                return None;
            }

            Some(DistrictRanking {
                district: district.to_string(),
                count: prices.len(),
                mean_price: rounded(mean(&prices)),
                median_price: rounded(median(&prices)),
                min_price: rounded(prices.iter().copied().reduce(f64::min)),
                max_price: rounded(prices.iter().copied().reduce(f64::max)),
                mean_area: rounded(mean(&values(&members, |r| r.record.plot_area))),
                mean_price_per_area: rounded(mean(&values(&members, |r| r.record.price_per_area))),
                mean_agent_rating: rounded(mean(&values(&members, agent_rating))),
            })
        })
        .collect();

    // Stable sort keeps district name order among equal means
    ranking.sort_by(|a, b| descending(a.mean_price, b.mean_price));
    ranking
}

/// Statistics for every price segment, low to high, empty segments included.
pub fn price_segments(records: &[ValuedRecord]) -> Vec<SegmentStatistics> {
    PriceSegment::ALL
        .iter()
        .map(|segment| {
            let members: Vec<&ValuedRecord> = records
                .iter()
                .filter(|r| {
                    r.record.purchase_price.and_then(PriceSegment::from_price) == Some(*segment)
                })
                .collect();

            SegmentStatistics {
                segment: *segment,
                count: members.len(),
                mean_area: rounded(mean(&values(&members, |r| r.record.plot_area))),
                mean_price_per_area: rounded(mean(&values(&members, |r| r.record.price_per_area))),
                most_common_district: most_common(
                    members.iter().filter_map(|r| r.record.district.as_deref()),
                ),
            }
        })
        .collect()
}

/// Statistics for every plot size category, small to very large.
pub fn size_categories(records: &[ValuedRecord]) -> Vec<SizeStatistics> {
    SizeCategory::ALL
        .iter()
        .map(|category| {
            let members: Vec<&ValuedRecord> = records
                .iter()
                .filter(|r| {
                    r.record.plot_area.and_then(SizeCategory::from_area) == Some(*category)
                })
                .collect();

            SizeStatistics {
                category: *category,
                count: members.len(),
                mean_price: rounded(mean(&values(&members, |r| r.record.purchase_price))),
                mean_price_per_area: rounded(mean(&values(&members, |r| r.record.price_per_area))),
            }
        })
        .collect()
}

/// Top `n` records by value score relative to their district average.
///
/// The district average covers every record of the district with a price per
/// m²; ranked records also need a purchase price and a plot area.
pub fn best_value_properties(records: &[ValuedRecord], n: usize) -> Vec<ValueOpportunity> {
    let district_avg: BTreeMap<&str, f64> = by_district(records)
        .into_iter()
        .filter_map(|(district, members)| {
            mean(&values(&members, |r| r.record.price_per_area)).map(|avg| (district, avg))
        })
        .collect();

    let mut opportunities: Vec<ValueOpportunity> = records
        .iter()
        .filter(|r| r.record.purchase_price.is_some() && r.record.plot_area.is_some())
        .filter_map(|r| {
            let district = district_name(r)?;
            let price_per_area = r.record.price_per_area?;
            let avg = *district_avg.get(district)?;
            if avg <= 0.0 {
                return None;
            }

            Some(ValueOpportunity {
                district: district.to_string(),
                district_avg_price_per_area: avg,
                value_score: (avg - price_per_area) / avg * 100.0,
                record: r.clone(),
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.value_score.total_cmp(&a.value_score));
    opportunities.truncate(n);
    opportunities
}

pub fn market_overview(records: &[ValuedRecord]) -> MarketOverview {
    let all: Vec<&ValuedRecord> = records.iter().collect();
    let prices = values(&all, |r| r.record.purchase_price);

    MarketOverview {
        total_listings: records.len(),
        mean_price: rounded(mean(&prices)),
        median_price: rounded(median(&prices)),
        min_price: rounded(prices.iter().copied().reduce(f64::min)),
        max_price: rounded(prices.iter().copied().reduce(f64::max)),
        district_count: by_district(records).len(),
        mean_area: rounded(mean(&values(&all, |r| r.record.plot_area))),
        mean_price_per_area: rounded(mean(&values(&all, |r| r.record.price_per_area))),
    }
}

fn district_name(record: &ValuedRecord) -> Option<&str> {
    record
        .record
        .district
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

fn by_district(records: &[ValuedRecord]) -> BTreeMap<&str, Vec<&ValuedRecord>> {
    let mut groups: BTreeMap<&str, Vec<&ValuedRecord>> = BTreeMap::new();
    for record in records {
        if let Some(district) = district_name(record) {
            groups.entry(district).or_default().push(record);
        }
    }
    groups
}

fn values(members: &[&ValuedRecord], field: impl Fn(&ValuedRecord) -> Option<f64>) -> Vec<f64> {
    members.iter().filter_map(|&r| field(r)).collect()
}

fn agent_rating(record: &ValuedRecord) -> Option<f64> {
    record
        .record
        .agent_rating
        .as_deref()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn rounded(value: Option<f64>) -> Option<f64> {
    value.map(f64::round)
}

fn descending(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    let key = |v: Option<f64>| v.unwrap_or(f64::NEG_INFINITY);
    key(b).total_cmp(&key(a))
}

/// Index of the right-inclusive bin holding `value`; the last bin is open.
fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    if value.is_nan() || value <= 0.0 {
        return None;
    }
    Some(edges.iter().position(|edge| value <= *edge).unwrap_or(edges.len()))
}

/// Most frequent value; ties go to the value seen first
fn most_common<'a>(items: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some(entry) => entry.1 += 1,
            None => counts.push((item, 1)),
        }
    }
    // max_by_key keeps the last maximum, so scan in reverse
    counts
        .iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(item, _)| item.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PropertyRecord, QualityCategory, QualityScore, Valuation, ValueRating};

    fn listing(district: Option<&str>, price: Option<f64>, area: Option<f64>) -> ValuedRecord {
        ValuedRecord {
            record: PropertyRecord {
                district: district.map(str::to_string),
                purchase_price: price,
                plot_area: area,
                price_per_area: price.zip(area).map(|(p, a)| p / a),
                ..Default::default()
            },
            quality: QualityScore {
                permission: 0,
                development: 0,
                readiness: 0,
                demolition: 0,
                quality_score: 50.0,
                quality_category: QualityCategory::Medium,
                permit_mentions: Vec::new(),
            },
            valuation: Valuation {
                expected_price_per_area: None,
                price_quality_ratio: None,
                value_rating: ValueRating::NoData,
            },
        }
    }

    fn rated(mut record: ValuedRecord, rating: &str) -> ValuedRecord {
        record.record.agent_rating = Some(rating.to_string());
        record
    }

    #[test]
    fn test_district_ranking_threshold_and_order() {
        let records = vec![
            rated(listing(Some("Altona"), Some(100_000.0), Some(500.0)), "4.5"),
            rated(listing(Some("Altona"), Some(200_000.0), Some(500.0)), "3.5"),
            rated(listing(Some("Altona"), Some(600_000.0), Some(1_000.0)), "n/a"),
            listing(Some("Altona"), None, Some(800.0)),
            listing(Some("Blankenese"), Some(500_000.0), Some(1_000.0)),
            listing(Some("Blankenese"), Some(500_000.0), Some(1_000.0)),
            listing(Some("Blankenese"), Some(500_000.0), Some(1_000.0)),
            listing(Some("Wilstorf"), Some(900_000.0), Some(1_000.0)),
            listing(Some("Wilstorf"), Some(900_000.0), Some(1_000.0)),
            listing(None, Some(2_000_000.0), Some(1_000.0)),
        ];

        let ranking = district_ranking(&records);
        let names: Vec<&str> = ranking.iter().map(|r| r.district.as_str()).collect();
        assert_eq!(names, vec!["Blankenese", "Altona"]);

        let altona = &ranking[1];
        assert_eq!(altona.count, 3);
        assert_eq!(altona.mean_price, Some(300_000.0));
        assert_eq!(altona.median_price, Some(200_000.0));
        assert_eq!(altona.min_price, Some(100_000.0));
        assert_eq!(altona.max_price, Some(600_000.0));
        assert_eq!(altona.mean_area, Some(700.0));
        assert_eq!(altona.mean_price_per_area, Some(400.0));
        assert_eq!(altona.mean_agent_rating, Some(4.0));
    }

    #[test]
    fn test_price_segment_bins_are_right_inclusive() {
        assert_eq!(PriceSegment::from_price(0.0), None);
        assert_eq!(PriceSegment::from_price(-5.0), None);
        assert_eq!(PriceSegment::from_price(1.0), Some(PriceSegment::UpTo500k));
        assert_eq!(PriceSegment::from_price(500_000.0), Some(PriceSegment::UpTo500k));
        assert_eq!(PriceSegment::from_price(500_000.5), Some(PriceSegment::UpTo1M));
        assert_eq!(PriceSegment::from_price(1_000_000.0), Some(PriceSegment::UpTo1M));
        assert_eq!(PriceSegment::from_price(1_500_000.0), Some(PriceSegment::UpTo1500k));
        assert_eq!(PriceSegment::from_price(1_500_001.0), Some(PriceSegment::Above1500k));
    }

    #[test]
    fn test_price_segments_report_every_segment() {
        let records = vec![
            listing(Some("Rissen"), Some(400_000.0), Some(800.0)),
            listing(Some("Sasel"), Some(450_000.0), Some(900.0)),
            listing(Some("Sasel"), Some(300_000.0), Some(600.0)),
            listing(Some("Rissen"), Some(2_000_000.0), Some(2_000.0)),
            listing(Some("Sasel"), Some(2_500_000.0), Some(2_500.0)),
            listing(Some("Rissen"), None, Some(700.0)),
        ];

        let segments = price_segments(&records);
        assert_eq!(segments.len(), 4);

        let low = &segments[0];
        assert_eq!(low.segment, PriceSegment::UpTo500k);
        assert_eq!(low.count, 3);
        assert_eq!(low.mean_area, Some(767.0));
        assert_eq!(low.mean_price_per_area, Some(500.0));
        assert_eq!(low.most_common_district.as_deref(), Some("Sasel"));

        assert_eq!(segments[1].count, 0);
        assert_eq!(segments[1].mean_area, None);
        assert_eq!(segments[1].most_common_district, None);

        // Tie between Rissen and Sasel goes to the first seen
        let top = &segments[3];
        assert_eq!(top.count, 2);
        assert_eq!(top.most_common_district.as_deref(), Some("Rissen"));
    }

    #[test]
    fn test_size_categories() {
        assert_eq!(SizeCategory::from_area(0.0), None);
        assert_eq!(SizeCategory::from_area(500.0), Some(SizeCategory::Small));
        assert_eq!(SizeCategory::from_area(2_000.0), Some(SizeCategory::Large));
        assert_eq!(SizeCategory::from_area(2_000.5), Some(SizeCategory::VeryLarge));

        let records = vec![
            listing(Some("Bahrenfeld"), Some(300_000.0), Some(400.0)),
            listing(Some("Bahrenfeld"), Some(500_000.0), Some(500.0)),
            listing(Some("Bahrenfeld"), Some(900_000.0), Some(1_500.0)),
            listing(Some("Bahrenfeld"), Some(900_000.0), None),
        ];

        let categories = size_categories(&records);
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[0].category, SizeCategory::Small);
        assert_eq!(categories[0].count, 2);
        assert_eq!(categories[0].mean_price, Some(400_000.0));
        assert_eq!(categories[0].mean_price_per_area, Some(875.0));
        assert_eq!(categories[1].count, 0);
        assert_eq!(categories[2].count, 1);
        assert_eq!(categories[3].count, 0);
    }

    #[test]
    fn test_best_value_relative_to_district() {
        let mut stated_only = listing(Some("Lurup"), Some(100_000.0), None);
        stated_only.record.price_per_area = Some(200.0);

        let records = vec![
            listing(Some("Lurup"), Some(100_000.0), Some(1_000.0)),
            listing(Some("Lurup"), Some(300_000.0), Some(1_000.0)),
            stated_only,
            listing(Some("Ottensen"), Some(500_000.0), Some(1_000.0)),
            listing(None, Some(10_000.0), Some(1_000.0)),
        ];

        let best = best_value_properties(&records, 10);
        assert_eq!(best.len(), 3);

        // Lurup average includes the record without an area: (100 + 300 + 200) / 3
        assert_eq!(best[0].district, "Lurup");
        assert!((best[0].district_avg_price_per_area - 200.0).abs() < 1e-9);
        assert!((best[0].value_score - 50.0).abs() < 1e-9);
        assert_eq!(best[1].district, "Ottensen");
        assert!(best[1].value_score.abs() < 1e-9);
        assert!((best[2].value_score + 50.0).abs() < 1e-9);

        assert_eq!(best_value_properties(&records, 1).len(), 1);
    }

    #[test]
    fn test_market_overview() {
        let records = vec![
            listing(Some("Eppendorf"), Some(100_000.0), Some(200.0)),
            listing(Some("Eppendorf"), Some(400_000.0), Some(400.0)),
            listing(Some("Hamm"), Some(700_000.0), Some(600.0)),
            listing(None, None, None),
        ];

        let overview = market_overview(&records);
        assert_eq!(overview.total_listings, 4);
        assert_eq!(overview.mean_price, Some(400_000.0));
        assert_eq!(overview.median_price, Some(400_000.0));
        assert_eq!(overview.min_price, Some(100_000.0));
        assert_eq!(overview.max_price, Some(700_000.0));
        assert_eq!(overview.district_count, 2);
        assert_eq!(overview.mean_area, Some(400.0));

        let empty = market_overview(&[]);
        assert_eq!(empty.total_listings, 0);
        assert_eq!(empty.mean_price, None);
    }
}
