use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};

/// One listing node cut out of a document, with its position for provenance
#[derive(Debug, Clone)]
pub struct ParsedListing {
    pub index: usize,
    pub record_path: String,
    pub node: Value,
}

/// A loaded document set: the repeated listing nodes in source order
#[derive(Debug, Clone, Default)]
pub struct ListingDocument {
    listings: Vec<ParsedListing>,
}

impl ListingDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        debug!("ListingDocument: start bytes_len={}", bytes.len());
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(Self::from_value(value))
    }

    /// Accepts a top-level array of listings, or an object holding the
    /// listing array under an `items`/`item` key at any depth.
    pub fn from_value(value: Value) -> Self {
        let (path, nodes) = match locate_listings(value, "$") {
            Some(found) => found,
            None => {
                warn!("ListingDocument: no listing array found; document is empty");
                return Self::default();
            }
        };

        info!("ListingDocument: found listings count={}", nodes.len());
        let listings = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| ParsedListing {
                index,
                record_path: format!("{}[{}]", path, index),
                node,
            })
            .collect();

        Self { listings }
    }

    pub fn from_listings(nodes: Vec<Value>) -> Self {
        Self::from_value(Value::Array(nodes))
    }

    pub fn listings(&self) -> &[ParsedListing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn locate_listings(value: Value, path: &str) -> Option<(String, Vec<Value>)> {
    match value {
        Value::Array(items) => Some((path.to_string(), items)),
        Value::Object(mut map) => {
            for key in ["items", "item"] {
                match map.remove(key) {
                    Some(Value::Array(items)) => return Some((format!("{}.{}", path, key), items)),
                    Some(single @ Value::Object(_)) if single.get("sections").is_some() => {
                        return Some((format!("{}.{}", path, key), vec![single]));
                    }
                    Some(other) => {
                        if let Some(found) = locate_listings(other, &format!("{}.{}", path, key)) {
                            return Some(found);
                        }
                    }
                    None => {}
                }
            }
            if map.contains_key("sections") {
                return Some((path.to_string(), vec![Value::Object(map)]));
            }
            map.into_iter()
                .find_map(|(key, child)| match child {
                    Value::Object(_) => locate_listings(child, &format!("{}.{}", path, key)),
                    _ => None,
                })
        }
        _ => None,
    }
}

/// A typed sub-block of a listing
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub kind: Option<&'a str>,
    pub value: &'a Value,
}

impl<'a> Section<'a> {
    pub fn is(&self, kind: &str) -> bool {
        self.kind == Some(kind)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.value.get(key)
    }

    /// Leaf text for `key`, numbers rendered as text
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(leaf_text)
    }

    /// Follows a path of object keys, tolerating any missing level
    pub fn text_at(&self, path: &[&str]) -> Option<String> {
        let mut current = self.value;
        for key in path {
            current = current.get(*key)?;
        }
        leaf_text(current)
    }

    /// Attribute entries of this section, looked up at any depth
    pub fn attributes(&self) -> Vec<&'a Value> {
        let mut out = Vec::new();
        collect_key(self.value, "attributes", &mut out);
        out
    }
}

/// A validated listing node with its sections flattened in document order
#[derive(Debug, Clone)]
pub struct ListingNode<'a> {
    pub index: usize,
    pub value: &'a Value,
    sections: Vec<Section<'a>>,
}

impl<'a> ListingNode<'a> {
    pub fn parse(index: usize, value: &'a Value) -> Result<Self> {
        if !value.is_object() {
            return Err(PipelineError::malformed(index, "listing node is not an object"));
        }

        let mut sections = Vec::new();
        collect_sections(index, value, &mut sections)?;

        Ok(Self {
            index,
            value,
            sections,
        })
    }

    pub fn sections(&self) -> &[Section<'a>] {
        &self.sections
    }

    pub fn sections_of<'s>(&'s self, kind: &'s str) -> impl Iterator<Item = &'s Section<'a>> + 's {
        self.sections.iter().filter(move |s| s.is(kind))
    }

    pub fn first_section(&self, kind: &str) -> Option<&Section<'a>> {
        self.sections.iter().find(|s| s.is(kind))
    }

    /// The listing's `header.id`, found at the node itself or nested below it.
    pub fn header_id(&self) -> Option<String> {
        find_header_id(self.value)
    }
}

fn collect_sections<'a>(index: usize, node: &'a Value, out: &mut Vec<Section<'a>>) -> Result<()> {
    let raw = match node.get("sections") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(PipelineError::malformed(index, "`sections` is not a list"));
        }
    };

    for section in raw {
        if !section.is_object() {
            return Err(PipelineError::malformed(index, "section entry is not an object"));
        }
        out.push(Section {
            kind: section.get("type").and_then(|t| t.as_str()),
            value: section,
        });
        collect_sections(index, section, out)?;
    }

    Ok(())
}

fn collect_key<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, child) in map {
                if k == key {
                    match child {
                        Value::Array(items) => out.extend(items.iter()),
                        other => out.push(other),
                    }
                } else if k != "sections" {
                    collect_key(child, key, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_key(item, key, out);
            }
        }
        _ => {}
    }
}

/// Text of a leaf value; strings as-is, numbers and booleans rendered
/// An object's own `header.id` wins over anything nested below it
fn find_header_id(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("header")
            .and_then(|header| header.get("id"))
            .and_then(leaf_text)
            .or_else(|| map.values().find_map(find_header_id)),
        Value::Array(items) => items.iter().find_map(find_header_id),
        _ => None,
    }
}

pub fn leaf_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_array() {
        let doc = ListingDocument::from_value(json!([{"sections": []}, {"sections": []}]));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.listings()[1].record_path, "$[1]");
    }

    #[test]
    fn test_nested_items_key() {
        let doc = ListingDocument::from_value(json!({
            "root": { "item": [{"header": {"id": "1"}}, {"header": {"id": "2"}}] }
        }));
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.listings()[0].record_path, "$.root.item[0]");
    }

    #[test]
    fn test_unrecognized_document_is_empty() {
        let doc = ListingDocument::from_value(json!({"foo": 1}));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_sections_are_flattened_recursively() {
        let value = json!({
            "sections": [
                {"type": "TITLE", "title": "Plot"},
                {"type": "GROUP", "sections": [{"type": "MAP", "addressLine1": "Main St"}]}
            ]
        });
        let node = ListingNode::parse(0, &value).unwrap();
        assert_eq!(node.sections().len(), 3);
        assert_eq!(
            node.first_section("MAP").and_then(|s| s.text("addressLine1")),
            Some("Main St".to_string())
        );
    }

    #[test]
    fn test_malformed_sections() {
        let value = json!({"sections": "oops"});
        let err = ListingNode::parse(3, &value).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedListing { index: 3, .. }));

        let value = json!("not an object");
        assert!(ListingNode::parse(0, &value).is_err());
    }

    #[test]
    fn test_header_id_accepts_numbers() {
        let value = json!({"header": {"id": 12345}});
        let node = ListingNode::parse(0, &value).unwrap();
        assert_eq!(node.header_id(), Some("12345".to_string()));
    }

    #[test]
    fn test_header_id_found_below_listing() {
        let value = json!({
            "listing": {"header": {"id": "140551009"}},
            "sections": [{"type": "TITLE", "title": "Plot"}]
        });
        let node = ListingNode::parse(0, &value).unwrap();
        assert_eq!(node.header_id(), Some("140551009".to_string()));

        let inside_section = json!({
            "header": {"id": "outer"},
            "sections": [{"type": "MAP", "header": {"id": "inner"}}]
        });
        let node = ListingNode::parse(0, &inside_section).unwrap();
        assert_eq!(node.header_id(), Some("outer".to_string()));

        let missing = json!({"sections": []});
        assert_eq!(ListingNode::parse(0, &missing).unwrap().header_id(), None);
    }
}
