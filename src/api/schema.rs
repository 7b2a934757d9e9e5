//! Validated shapes for the loosely-typed multi-modal payloads.
//!
//! The backend builds chart analyses and visual links from LLM output, so
//! numbers arrive as strings, lists arrive as `null` and individual records
//! are sometimes malformed. Everything here parses leniently: bad records are
//! dropped with a warning and missing fields take their defaults, so rendering
//! code never sees a shape mismatch.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Deserializes `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts numbers and numeric strings; anything else becomes `0.0`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value).unwrap_or(0.0))
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Accepts a list of anything; non-string entries are kept as their JSON text.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(string_list(value.as_ref()))
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn default_chart_type() -> String {
    "unknown".to_string()
}

fn chart_type_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default_chart_type))
}

/// Backend chart-to-text analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAnalysis {
    #[serde(default = "default_chart_type", deserialize_with = "chart_type_or_unknown")]
    pub chart_type: String,
    #[serde(default, alias = "text_content", deserialize_with = "null_as_default")]
    pub text_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_insights: DataInsights,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub queryable_facts: Vec<String>,
    /// Fraction in `[0, 1]`. Not range-checked.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDataInsights")]
pub struct DataInsights {
    pub data_points: Vec<DataPoint>,
    pub trends: Vec<String>,
    pub key_statistics: KeyStatistics,
    pub insights: Vec<String>,
    /// Free text the backend returns when the model's JSON could not be parsed.
    pub raw_analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub category: String,
    pub value: f64,
    pub series: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStatistics {
    pub highest: Option<StatPoint>,
    pub lowest: Option<StatPoint>,
    pub average: Option<f64>,
    pub total: Option<f64>,
}

impl KeyStatistics {
    pub fn is_empty(&self) -> bool {
        self.highest.is_none() && self.lowest.is_none() && self.average.is_none() && self.total.is_none()
    }
}

/// A highlighted value; the category is absent when the backend sent a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatPoint {
    pub category: Option<String>,
    pub value: f64,
}

#[derive(Deserialize, Default)]
struct RawDataInsights {
    #[serde(default)]
    data_points: Option<Value>,
    #[serde(default)]
    trends: Option<Value>,
    #[serde(default)]
    key_statistics: Option<Value>,
    #[serde(default)]
    insights: Option<Value>,
    #[serde(default)]
    raw_analysis: Option<String>,
}

impl From<RawDataInsights> for DataInsights {
    fn from(raw: RawDataInsights) -> Self {
        let data_points = raw
            .data_points
            .as_ref()
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(parse_data_point).collect())
            .unwrap_or_default();

        let key_statistics = raw
            .key_statistics
            .as_ref()
            .and_then(|v| v.as_object())
            .map(parse_key_statistics)
            .unwrap_or_default();

        DataInsights {
            data_points,
            trends: string_list(raw.trends.as_ref()),
            key_statistics,
            insights: string_list(raw.insights.as_ref()),
            raw_analysis: raw.raw_analysis.filter(|text| !text.trim().is_empty()),
        }
    }
}

fn parse_data_point(item: &Value) -> Option<DataPoint> {
    let obj = item.as_object()?;
    let value = obj.get("value").and_then(number_from_value);
    let Some(value) = value else {
        tracing::warn!(point = %item, "Dropping chart data point without a numeric value");
        return None;
    };
    let category = obj
        .get("category")
        .or_else(|| obj.get("label"))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    let series = obj
        .get("series")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Some(DataPoint {
        category,
        value,
        series,
    })
}

fn parse_key_statistics(map: &Map<String, Value>) -> KeyStatistics {
    KeyStatistics {
        highest: map.get("highest").and_then(parse_stat_point),
        lowest: map.get("lowest").and_then(parse_stat_point),
        average: map.get("average").and_then(number_from_value),
        total: map.get("total").and_then(number_from_value),
    }
}

fn parse_stat_point(value: &Value) -> Option<StatPoint> {
    if let Some(number) = number_from_value(value) {
        return Some(StatPoint {
            category: None,
            value: number,
        });
    }
    let obj = value.as_object()?;
    Some(StatPoint {
        category: obj
            .get("category")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        value: obj.get("value").and_then(number_from_value)?,
    })
}

fn default_relationship() -> String {
    "related".to_string()
}

/// Backend-asserted relationship between a visual element and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualTextLink {
    pub visual_id: String,
    #[serde(default = "default_relationship")]
    pub relationship: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub confidence: f64,
    #[serde(default, alias = "text_chunks", deserialize_with = "lenient_strings")]
    pub text_snippets: Vec<String>,
}

impl VisualTextLink {
    pub fn new(
        visual_id: impl Into<String>,
        relationship: impl Into<String>,
        confidence: f64,
        text_snippets: Vec<String>,
    ) -> Self {
        Self {
            visual_id: visual_id.into(),
            relationship: relationship.into(),
            confidence,
            text_snippets,
        }
    }
}

/// Parses a list of links, skipping entries that do not fit the shape.
pub fn parse_links(value: &Value) -> Vec<VisualTextLink> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<VisualTextLink>(item.clone()) {
            Ok(link) => Some(link),
            Err(err) => {
                tracing::warn!(error = %err, "Dropping malformed visual-text link");
                None
            }
        })
        .collect()
}

/// Multi-modal extras carried in a query response's `metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiModalMetadata {
    pub enhanced: bool,
    pub visual_links: Vec<VisualTextLink>,
    pub chart_analysis: Option<ChartAnalysis>,
}

impl MultiModalMetadata {
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        let enhanced = ["multimodal_enhancement", "enhanced"]
            .iter()
            .find_map(|key| metadata.get(*key).and_then(|v| v.as_bool()))
            .unwrap_or(false);

        let visual_links = ["visual_links", "visual_text_links"]
            .iter()
            .find_map(|key| metadata.get(*key))
            .map(parse_links)
            .unwrap_or_default();

        let chart_analysis = metadata
            .get("chart_analysis")
            .filter(|v| v.is_object())
            .and_then(|v| match serde_json::from_value::<ChartAnalysis>(v.clone()) {
                Ok(analysis) => Some(analysis),
                Err(err) => {
                    tracing::warn!(error = %err, "Ignoring malformed chart analysis in metadata");
                    None
                }
            });

        Self {
            enhanced,
            visual_links,
            chart_analysis,
        }
    }
}
