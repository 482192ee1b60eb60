//! Canned data used across tests and the example.

use crate::core::{FrameItem, FrameSize};
use crate::loader::{FilterField, FilterKind};

/// Returns the canonical three-frame collection.
#[must_use]
pub fn sample_frames() -> Vec<FrameItem> {
    vec![
        FrameItem::new(
            "chart-sales",
            "Sales chart",
            "https://dash.example.com/chart/1",
            FrameSize::new(800, 400),
        ),
        FrameItem::new(
            "chart-inventory",
            "Inventory chart",
            "https://dash.example.com/chart/2",
            FrameSize::new(600, 300),
        ),
        FrameItem::new(
            "chart-users",
            "User trend",
            "https://dash.example.com/chart/3",
            FrameSize::new(700, 350),
        ),
    ]
}

/// Returns a small filter configuration.
#[must_use]
pub fn sample_filter_fields() -> Vec<FilterField> {
    vec![
        FilterField {
            id: "f-date".to_string(),
            alias: "DateRange".to_string(),
            kind: FilterKind::DateRange,
            label: "Period".to_string(),
            options: Vec::new(),
        },
        FilterField {
            id: "f-region".to_string(),
            alias: "Region".to_string(),
            kind: FilterKind::Select,
            label: "Region".to_string(),
            options: vec!["EMEA".to_string(), "APAC".to_string(), "AMER".to_string()],
        },
        FilterField {
            id: "f-query".to_string(),
            alias: "Query".to_string(),
            kind: FilterKind::Text,
            label: "Search".to_string(),
            options: Vec::new(),
        },
    ]
}
