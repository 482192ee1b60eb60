//! Filter configuration resource model.

use serde::{Deserialize, Serialize};

/// Kind of filter control a field drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    /// A date-range picker.
    DateRange,
    /// A select box over `options`.
    Select,
    /// Free text input.
    Text,
}

/// One filter field definition served by the upstream config endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterField {
    /// Stable identifier.
    pub id: String,
    /// Upstream alias (e.g. "DateRange").
    pub alias: String,
    /// Control kind.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Display label.
    pub label: String,
    /// Choices for `Select` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}
