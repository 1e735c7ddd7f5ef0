//! Normalized raw stop records, as produced by the feed adapters.

use serde::{Deserialize, Serialize};

/// One provider record, before catalog building.
///
/// Every field is optional: records missing a name or a usable id are
/// dropped at build time instead of failing the whole feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Provider id. For bike-share this is the public station number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Line identifiers the record belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,

    /// Id shared by every platform of one metro station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_id: Option<String>,

    /// Metro web id (one per platform record).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_id: Option<String>,

    /// Metro occupancy id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_id: Option<String>,

    /// Id used for live queries when it differs from `id` (bike-share).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_id: Option<String>,
}

impl RawStop {
    /// A record with just a name and id.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Add line memberships.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Trimmed name, if present and non-empty.
    pub(crate) fn clean_name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
    }
}

pub(crate) fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
