use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ExtractionLabels;
use crate::constants::{
    ATTRIBUTE_CHECK, CHECKED_VALUE, SECTION_AGENTS_INFO, SECTION_ATTRIBUTE_LIST, SECTION_MAP,
    SECTION_TEXT_AREA, SECTION_TITLE, SECTION_TOP_ATTRIBUTES, TEXT_FURTHER_NOTES, TEXT_LOCATION,
    TEXT_PROPERTY_DESCRIPTION, UNSTATED_FLAG_VALUE,
};
use crate::domain::PropertyRecord;
use crate::error::{PipelineError, Result};
use crate::pipeline::processing::parser::{leaf_text, ListingNode, ParsedListing};

pub mod fields;

/// Trait for turning one listing node into one typed record
pub trait Normalizer: Send + Sync {
    /// Extract a single listing; an error affects this listing only
    fn normalize(&self, listing: &ParsedListing) -> Result<PropertyRecord>;
}

/// Extracts [`PropertyRecord`]s from listing nodes using a label vocabulary
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    labels: ExtractionLabels,
}

impl RecordExtractor {
    pub fn new(labels: ExtractionLabels) -> Self {
        Self { labels }
    }

    /// Label→text pairs from top attributes, then attribute lists.
    /// Attribute-list values overwrite top attributes sharing a label.
    fn extract_attributes(&self, node: &ListingNode<'_>) -> BTreeMap<String, String> {
        let mut attributes = BTreeMap::new();

        for section in node.sections_of(SECTION_TOP_ATTRIBUTES) {
            for attr in section.attributes() {
                let label = attr.get("label").and_then(leaf_text);
                let text = attr.get("text").and_then(leaf_text);
                if let (Some(label), Some(text)) = (label, text) {
                    attributes.insert(label, text);
                }
            }
        }

        for section in node.sections_of(SECTION_ATTRIBUTE_LIST) {
            for attr in section.attributes() {
                let Some(label) = attr.get("label").and_then(leaf_text) else {
                    continue;
                };
                if let Some(text) = attr.get("text").and_then(leaf_text) {
                    attributes.insert(label, text);
                } else if attr.get("type").and_then(|t| t.as_str()) == Some(ATTRIBUTE_CHECK) {
                    attributes.insert(label, CHECKED_VALUE.to_string());
                }
            }
        }

        attributes
    }

    /// Text area bodies keyed by their section title
    fn extract_descriptions(&self, node: &ListingNode<'_>) -> BTreeMap<String, String> {
        node.sections_of(SECTION_TEXT_AREA)
            .filter_map(|section| Some((section.text("title")?, section.text("text")?)))
            .collect()
    }

    fn parse_numeric(
        &self,
        attributes: &BTreeMap<String, String>,
        labels: &[String],
        field: &str,
        parse: fn(&str) -> Option<f64>,
        warnings: &mut Vec<String>,
    ) -> Option<f64> {
        let raw = lookup(attributes, labels)?;
        let parsed = parse(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            let issue = PipelineError::UnparsableValue {
                field: field.to_string(),
                raw: raw.to_string(),
            };
            debug!("{}", issue);
            warnings.push(issue.to_string());
        }
        parsed
    }
}

impl Normalizer for RecordExtractor {
    fn normalize(&self, listing: &ParsedListing) -> Result<PropertyRecord> {
        let node = ListingNode::parse(listing.index, &listing.node)?;
        let labels = &self.labels;
        let mut warnings = Vec::new();

        let title = node.first_section(SECTION_TITLE).and_then(|s| s.text("title"));

        if node.first_section(SECTION_MAP).is_none() {
            debug!(
                "Listing {}: {}",
                listing.record_path,
                PipelineError::MissingSection(SECTION_MAP.to_string())
            );
        }
        let coordinates = fields::extract_coordinates(&node);
        let address = fields::extract_address(&node);
        let district = fields::extract_district(address.full.as_deref());

        let attributes = self.extract_attributes(&node);
        let purchase_price = self.parse_numeric(
            &attributes,
            &labels.purchase_price,
            "purchasePrice",
            fields::parse_price,
            &mut warnings,
        );
        let plot_area = self.parse_numeric(
            &attributes,
            &labels.plot_area,
            "plotArea",
            fields::parse_area,
            &mut warnings,
        );
        let price_per_area = self
            .parse_numeric(
                &attributes,
                &labels.price_per_area,
                "pricePerArea",
                fields::parse_price,
                &mut warnings,
            )
            .or_else(|| derive_price_per_area(purchase_price, plot_area));

        let text = |labels: &[String]| lookup(&attributes, labels).map(str::to_string);
        let flag = |labels: &[String]| {
            text(labels).or_else(|| Some(UNSTATED_FLAG_VALUE.to_string()))
        };

        let descriptions = self.extract_descriptions(&node);
        let agent = node.first_section(SECTION_AGENTS_INFO);

        let record = PropertyRecord {
            id: node.header_id(),
            title,
            purchase_price,
            plot_area,
            price_per_area,
            street: address.street,
            full_address: address.full,
            district,
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lng)| lng),
            commercialisation_type: text(&labels.commercialisation_type),
            short_term_constructible: flag(&labels.short_term_constructible),
            development: text(&labels.development),
            constructible_type: text(&labels.constructible_type),
            recommended_use: text(&labels.recommended_use),
            demolition: flag(&labels.demolition),
            free_from: text(&labels.free_from),
            commission: text(&labels.commission),
            description: descriptions.get(TEXT_PROPERTY_DESCRIPTION).cloned(),
            location_description: descriptions.get(TEXT_LOCATION).cloned(),
            further_notes: descriptions.get(TEXT_FURTHER_NOTES).cloned(),
            agent_company: agent.and_then(|s| s.text("company")),
            agent_name: agent.and_then(|s| s.text("name")),
            agent_rating: agent.and_then(|s| s.text_at(&["rating", "value"])),
            attributes,
            warnings,
        };

        Ok(record)
    }
}

/// First label of `labels` present in the attribute map
fn lookup<'m>(attributes: &'m BTreeMap<String, String>, labels: &[String]) -> Option<&'m str> {
    labels
        .iter()
        .find_map(|label| attributes.get(label))
        .map(String::as_str)
}

/// Price per m² when the listing does not state it itself
pub fn derive_price_per_area(purchase_price: Option<f64>, plot_area: Option<f64>) -> Option<f64> {
    match (purchase_price, plot_area) {
        (Some(price), Some(area)) if area > 0.0 => Some(price / area),
        _ => None,
    }
}
