//! Pure conversions from raw listing text to typed values.
//!
//! None of these functions fail: unusable input yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::constants::SECTION_MAP;
use crate::pipeline::processing::parser::ListingNode;

static AREA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d,.]+)\s*m(?:²|2)").expect("valid area regex"));

static POSTAL_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+").expect("valid postal code regex"));

/// Street line and full address line of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub full: Option<String>,
}

/// `"€598,550"` → 598550.0, `"€1,897 / month"` → 1897.0
pub fn parse_price(text: &str) -> Option<f64> {
    let magnitude = text.split('/').next().unwrap_or_default();
    let cleaned: String = magnitude
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '£' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `"1,142 m²"` → 1142.0
pub fn parse_area(text: &str) -> Option<f64> {
    let caps = AREA_RE.captures(text)?;
    let cleaned = caps[1].replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn extract_coordinates(node: &ListingNode<'_>) -> Option<(f64, f64)> {
    node.sections_of(SECTION_MAP).find_map(|section| {
        let location = section.get("location")?;
        let lat = coordinate(location.get("lat")?)?;
        let lng = coordinate(location.get("lng")?)?;
        Some((lat, lng))
    })
}

pub fn extract_address(node: &ListingNode<'_>) -> Address {
    match node.first_section(SECTION_MAP) {
        Some(section) => Address {
            street: section.text("addressLine1"),
            full: section.text("addressLine2"),
        },
        None => Address::default(),
    }
}

/// `"22397 Duvenstedt, Hamburg"` → `"Duvenstedt"`
pub fn extract_district(full_address: Option<&str>) -> Option<String> {
    let first = full_address?.split(',').next()?.trim();
    let district = POSTAL_CODE_RE.replace(first, "");
    let district = district.trim();

    if district.is_empty() {
        None
    } else {
        Some(district.to_string())
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("€598,550"), Some(598550.0));
        assert_eq!(parse_price("€1,897 / month"), Some(1897.0));
        assert_eq!(parse_price("€ 1,250.50"), Some(1250.5));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("on request"), None);
        assert_eq!(parse_price("€"), None);
    }

    #[test]
    fn test_parse_area() {
        assert_eq!(parse_area("1,142 m²"), Some(1142.0));
        assert_eq!(parse_area("approx. 650.5m²"), Some(650.5));
        assert_eq!(parse_area("no data"), None);
        assert_eq!(parse_area(""), None);
    }

    #[test]
    fn test_extract_district() {
        assert_eq!(
            extract_district(Some("22397 Duvenstedt, Hamburg")),
            Some("Duvenstedt".to_string())
        );
        assert_eq!(
            extract_district(Some("Blankenese, Hamburg")),
            Some("Blankenese".to_string())
        );
        assert_eq!(extract_district(Some(", Hamburg")), None);
        assert_eq!(extract_district(None), None);
    }

    #[test]
    fn test_coordinates_and_address() {
        let value = json!({
            "sections": [
                {
                    "type": "MAP",
                    "addressLine1": "Ring 2",
                    "addressLine2": "22397 Duvenstedt, Hamburg",
                    "location": {"lat": 53.7, "lng": "10.1"}
                }
            ]
        });
        let node = ListingNode::parse(0, &value).unwrap();

        assert_eq!(extract_coordinates(&node), Some((53.7, 10.1)));
        let address = extract_address(&node);
        assert_eq!(address.street.as_deref(), Some("Ring 2"));
        assert_eq!(address.full.as_deref(), Some("22397 Duvenstedt, Hamburg"));
    }

    #[test]
    fn test_missing_map_levels_yield_none() {
        for value in [
            json!({}),
            json!({"sections": [{"type": "MAP"}]}),
            json!({"sections": [{"type": "MAP", "location": {"lat": 53.7}}]}),
            json!({"sections": [{"type": "MAP", "location": {"lat": "x", "lng": 1.0}}]}),
        ] {
            let node = ListingNode::parse(0, &value).unwrap();
            assert_eq!(extract_coordinates(&node), None);
        }

        let value = json!({"sections": []});
        let node = ListingNode::parse(0, &value).unwrap();
        assert_eq!(extract_address(&node), Address::default());
    }
}
