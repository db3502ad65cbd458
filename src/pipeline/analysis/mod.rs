//! Ranking and summary views over valued records.

pub mod market;

pub use market::{
    best_value_properties, district_ranking, market_overview, price_segments, size_categories,
    DistrictRanking, MarketOverview, PriceSegment, SegmentStatistics, SizeCategory,
    SizeStatistics, ValueOpportunity,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{QualityCategory, ValueRating, ValuedRecord};
use crate::pipeline::processing::valuation::deal_score;

/// A valued record with its deal score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDeal {
    pub deal_score: f64,
    pub record: ValuedRecord,
}

/// Aggregates for one quality category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub category: QualityCategory,
    pub count: usize,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub mean_area: Option<f64>,
    pub mean_price_per_area: Option<f64>,
    pub mean_quality_score: Option<f64>,
}

/// Top `n` records by deal score, best first.
///
/// Records lacking a price-quality ratio or a purchase price are not ranked.
pub fn best_deals(records: &[ValuedRecord], n: usize) -> Vec<RankedDeal> {
    let mut deals: Vec<RankedDeal> = records
        .iter()
        .filter(|r| r.record.purchase_price.is_some())
        .filter_map(|r| {
            let ratio = r.valuation.price_quality_ratio?;
            Some(RankedDeal {
                deal_score: deal_score(r.quality.quality_score, ratio),
                record: r.clone(),
            })
        })
        .collect();

    // Stable sort keeps source order among equal scores
    deals.sort_by(|a, b| b.deal_score.total_cmp(&a.deal_score));
    deals.truncate(n);
    deals
}

/// Per-category statistics, categories without records omitted, low to high
pub fn category_statistics(records: &[ValuedRecord]) -> Vec<CategoryStatistics> {
    QualityCategory::ALL
        .iter()
        .filter_map(|category| {
            let members: Vec<&ValuedRecord> = records
                .iter()
                .filter(|r| r.quality.quality_category == *category)
                .collect();
            if members.is_empty() {
                return None;
            }

            let prices: Vec<f64> = members.iter().filter_map(|r| r.record.purchase_price).collect();
            let areas: Vec<f64> = members.iter().filter_map(|r| r.record.plot_area).collect();
            let per_area: Vec<f64> =
                members.iter().filter_map(|r| r.record.price_per_area).collect();
            let scores: Vec<f64> = members.iter().map(|r| r.quality.quality_score).collect();

            Some(CategoryStatistics {
                category: *category,
                count: members.len(),
                mean_price: mean(&prices).map(f64::round),
                median_price: median(&prices).map(f64::round),
                mean_area: mean(&areas).map(f64::round),
                mean_price_per_area: mean(&per_area).map(f64::round),
                mean_quality_score: mean(&scores).map(f64::round),
            })
        })
        .collect()
}

/// Number of records per value rating
pub fn rating_distribution(records: &[ValuedRecord]) -> BTreeMap<ValueRating, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.valuation.value_rating).or_insert(0) += 1;
    }
    counts
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PropertyRecord, QualityScore, Valuation};

    fn valued(id: &str, price: Option<f64>, area: Option<f64>, score: f64) -> ValuedRecord {
        let ratio = price.map(|_| score / 70.0);
        ValuedRecord {
            record: PropertyRecord {
                id: Some(id.to_string()),
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
                quality_score: score,
                quality_category: QualityCategory::from_score(score),
                permit_mentions: Vec::new(),
            },
            valuation: Valuation {
                expected_price_per_area: None,
                price_quality_ratio: ratio,
                value_rating: ValueRating::from_ratio(ratio),
            },
        }
    }

    #[test]
    fn test_best_deals_order_and_filter() {
        let records = vec![
            valued("low", Some(100_000.0), Some(500.0), 39.0),
            valued("no-price", None, Some(500.0), 80.0),
            valued("high", Some(300_000.0), Some(600.0), 80.0),
            valued("mid", Some(200_000.0), Some(700.0), 61.5),
        ];

        let deals = best_deals(&records, 2);
        let ids: Vec<_> = deals.iter().map(|d| d.record.record.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["high", "mid"]);
        assert!(deals[0].deal_score >= deals[1].deal_score);
    }

    #[test]
    fn test_category_statistics() {
        let records = vec![
            valued("a", Some(100.0), Some(10.0), 80.0),
            valued("b", Some(300.0), Some(30.0), 85.0),
            valued("c", None, None, 39.0),
        ];

        let stats = category_statistics(&records);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].category, QualityCategory::Low);
        assert_eq!(stats[0].count, 1);
        assert_eq!(stats[0].mean_price, None);

        let very_good = &stats[1];
        assert_eq!(very_good.category, QualityCategory::VeryGood);
        assert_eq!(very_good.count, 2);
        assert_eq!(very_good.mean_price, Some(200.0));
        assert_eq!(very_good.median_price, Some(200.0));
        assert_eq!(very_good.mean_area, Some(20.0));
        assert_eq!(very_good.mean_price_per_area, Some(10.0));
        assert_eq!(very_good.mean_quality_score, Some(83.0));
    }

    #[test]
    fn test_rating_distribution() {
        let records = vec![
            valued("a", Some(1.0), Some(1.0), 80.0),
            valued("b", None, None, 80.0),
            valued("c", Some(1.0), Some(1.0), 70.0),
        ];
        let counts = rating_distribution(&records);
        assert_eq!(counts.get(&ValueRating::Expensive), Some(&1));
        assert_eq!(counts.get(&ValueRating::NoData), Some(&1));
        assert_eq!(counts.get(&ValueRating::Fair), Some(&1));
    }
}
