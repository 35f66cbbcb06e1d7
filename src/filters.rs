//! Filter scope configuration and its persisted form.
//!
//! A filter's scope names the containers whose descendant charts it
//! affects, plus chart ids explicitly excluded even when inside scope.
//! Per-dashboard filter configuration is persisted keyed by
//! `chartId -> columnName -> {scope, immune}`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::{ChartId, ROOT_ID};

/// Declared scope of one filter column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterScope {
    /// Container ids whose descendant charts are affected.
    #[serde(default)]
    pub scope: Vec<String>,
    /// Chart ids excluded even when inside scope.
    #[serde(default)]
    pub immune: Vec<ChartId>,
}

impl FilterScope {
    /// The default scope for a freshly created filter: the whole dashboard.
    pub fn dashboard_wide() -> Self {
        FilterScope {
            scope: vec![ROOT_ID.to_string()],
            immune: Vec::new(),
        }
    }

    /// True when the scope affects nothing.
    pub fn is_empty(&self) -> bool {
        self.scope.is_empty()
    }
}

/// One filter widget's configuration as edited in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardFilter {
    #[serde(rename = "chartId")]
    pub chart_id: ChartId,
    /// Filterable column names exposed by the widget.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Edited scopes keyed by column name.
    #[serde(default)]
    pub scopes: HashMap<String, FilterScope>,
}

/// Flattens filter configurations into the persisted
/// `chartId -> columnName -> {scope, immune}` map.
///
/// Columns with no edited scope fall back to the dashboard-wide default.
pub fn serialize_filter_scopes(
    filters: &[DashboardFilter],
) -> BTreeMap<ChartId, BTreeMap<String, FilterScope>> {
    filters
        .iter()
        .map(|filter| {
            let by_column = filter
                .columns
                .iter()
                .map(|column| {
                    let scope = filter
                        .scopes
                        .get(column)
                        .cloned()
                        .unwrap_or_else(FilterScope::dashboard_wide);
                    (column.clone(), scope)
                })
                .collect();
            (filter.chart_id, by_column)
        })
        .collect()
}
