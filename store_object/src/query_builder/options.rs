use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// List request as it arrives from a client
///
/// ```
/// use store_object::query_builder::ListOptions;
///
/// let options: ListOptions = serde_json::from_str(
///     r#"{"query": {"and": []}, "pageSize": 20, "sortFields": {"name": "desc"}}"#,
/// ).unwrap();
/// assert_eq!(options.page_size, Some(20));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub page_size: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
    /// Field name to `ASC`/`DESC`, applied in insertion order
    #[serde(default)]
    pub sort_fields: IndexMap<String, String>,
    /// Projection; all columns when empty
    #[serde(default)]
    pub fields: Vec<String>,
}
