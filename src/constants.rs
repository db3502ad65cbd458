/// Section type discriminators used by the listing documents.
/// These mirror the `type` values the source site emits for each section.

pub const SECTION_MAP: &str = "MAP";
pub const SECTION_TOP_ATTRIBUTES: &str = "TOP_ATTRIBUTES";
pub const SECTION_ATTRIBUTE_LIST: &str = "ATTRIBUTE_LIST";
pub const SECTION_TEXT_AREA: &str = "TEXT_AREA";
pub const SECTION_AGENTS_INFO: &str = "AGENTS_INFO";
pub const SECTION_TITLE: &str = "TITLE";

/// Attribute entry type for boolean-style attributes without text
pub const ATTRIBUTE_CHECK: &str = "CHECK";

/// Value stored for a checked attribute
pub const CHECKED_VALUE: &str = "Yes";

/// Value assumed when a yes/no build-status label is not present at all
pub const UNSTATED_FLAG_VALUE: &str = "No";

// Text area titles
pub const TEXT_PROPERTY_DESCRIPTION: &str = "Property description";
pub const TEXT_LOCATION: &str = "Location";
pub const TEXT_FURTHER_NOTES: &str = "Further notes";

/// Quality score treated as "fair price, no adjustment"
pub const REFERENCE_QUALITY_SCORE: f64 = 70.0;

/// Log progress every N listings
pub const PROGRESS_INTERVAL: usize = 100;

/// Default number of extraction workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default number of listings returned by deal ranking
pub const DEFAULT_TOP_DEALS: usize = 20;
