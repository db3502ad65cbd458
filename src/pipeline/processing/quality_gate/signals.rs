//! Build-status signals read from free-form listing vocabulary.
//!
//! Each signal is classified by an ordered rule table; the first matching
//! rule wins and anything unmatched falls back to the signal's catch-all
//! variant.

use serde::{Deserialize, Serialize};

/// Case-insensitive test against a categorical field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Contains(&'static str),
    Equals(&'static str),
    /// Field missing or blank
    Absent,
}

impl Matcher {
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match (self, value) {
            (Matcher::Absent, value) => value.is_none(),
            (Matcher::Contains(needle), Some(v)) => v.to_lowercase().contains(needle),
            (Matcher::Equals(expected), Some(v)) => v.to_lowercase() == *expected,
            (_, None) => false,
        }
    }
}

pub trait Signal: Copy + Sized + 'static {
    const RULES: &'static [(Matcher, Self)];
    const FALLBACK: Self;

    /// Sub-score in 0..=100
    fn score(self) -> u8;

    fn classify(value: Option<&str>) -> Self {
        Self::RULES
            .iter()
            .find(|(matcher, _)| matcher.matches(value))
            .map(|(_, signal)| *signal)
            .unwrap_or(Self::FALLBACK)
    }
}

/// Planning-law basis for building, read from the constructible type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionSignal {
    ConstructionPlan,
    LikeNeighbour,
    Unstated,
    Other,
}

impl Signal for PermissionSignal {
    const RULES: &'static [(Matcher, Self)] = &[
        (Matcher::Contains("construction plan"), PermissionSignal::ConstructionPlan),
        (Matcher::Contains("bebauungsplan"), PermissionSignal::ConstructionPlan),
        (Matcher::Contains("like neighbour"), PermissionSignal::LikeNeighbour),
        (Matcher::Absent, PermissionSignal::Unstated),
    ];
    const FALLBACK: Self = PermissionSignal::Other;

    fn score(self) -> u8 {
        match self {
            PermissionSignal::ConstructionPlan => 50,
            PermissionSignal::LikeNeighbour => 40,
            PermissionSignal::Unstated => 20,
            PermissionSignal::Other => 30,
        }
    }
}

/// Utility connection state of the plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevelopmentSignal {
    Developed,
    PartiallyDeveloped,
    NotDeveloped,
    Unknown,
}

impl Signal for DevelopmentSignal {
    const RULES: &'static [(Matcher, Self)] = &[
        (Matcher::Equals("developed"), DevelopmentSignal::Developed),
        (Matcher::Contains("partially"), DevelopmentSignal::PartiallyDeveloped),
        (Matcher::Contains("not developed"), DevelopmentSignal::NotDeveloped),
    ];
    const FALLBACK: Self = DevelopmentSignal::Unknown;

    fn score(self) -> u8 {
        match self {
            DevelopmentSignal::Developed => 100,
            DevelopmentSignal::PartiallyDeveloped => 60,
            DevelopmentSignal::NotDeveloped => 20,
            DevelopmentSignal::Unknown => 50,
        }
    }
}

/// Whether the plot can be built on at short notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessSignal {
    ShortTerm,
    NotShortTerm,
}

impl Signal for ReadinessSignal {
    const RULES: &'static [(Matcher, Self)] =
        &[(Matcher::Equals("yes"), ReadinessSignal::ShortTerm)];
    const FALLBACK: Self = ReadinessSignal::NotShortTerm;

    fn score(self) -> u8 {
        match self {
            ReadinessSignal::ShortTerm => 100,
            ReadinessSignal::NotShortTerm => 40,
        }
    }
}

/// Whether existing buildings must be demolished first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemolitionSignal {
    NotRequired,
    Required,
    Unknown,
}

impl Signal for DemolitionSignal {
    const RULES: &'static [(Matcher, Self)] = &[
        (Matcher::Equals("no"), DemolitionSignal::NotRequired),
        (Matcher::Equals("yes"), DemolitionSignal::Required),
    ];
    const FALLBACK: Self = DemolitionSignal::Unknown;

    fn score(self) -> u8 {
        match self {
            DemolitionSignal::NotRequired => 100,
            DemolitionSignal::Required => 30,
            DemolitionSignal::Unknown => 70,
        }
    }
}
