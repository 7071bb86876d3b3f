use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{AppError, AppResult};

/// Property name to value. Values are strings, numbers, booleans or arrays.
pub type PropertyBag = serde_json::Map<String, serde_json::Value>;

/// Reserved property key carrying the instance id during rendering.
pub const RESERVED_ID_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetCategory {
    Small,
    Large,
    Bar,
}

impl WidgetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
            Self::Bar => "bar",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPosition {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WidgetPosition {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge, clamped to `0..=u32::MAX` for widgets dragged off the
    /// left side or placed past the end of the canvas.
    pub fn right(&self) -> u32 {
        clamp_edge(i64::from(self.x) + i64::from(self.width))
    }

    pub fn bottom(&self) -> u32 {
        clamp_edge(i64::from(self.y) + i64::from(self.height))
    }
}

fn clamp_edge(edge: i64) -> u32 {
    u32::try_from(edge.max(0)).unwrap_or(u32::MAX)
}

/// A widget placed on a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInstance {
    pub id: String,
    #[serde(rename = "type", alias = "typeId")]
    pub type_id: String,
    #[serde(default)]
    pub properties: PropertyBag,
    #[serde(default)]
    pub position: WidgetPosition,
}

/// One reconstructable entry of a template. Carries no id: ids are scoped
/// to the dashboard that exported it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateWidget {
    #[serde(rename = "type", alias = "typeId")]
    pub type_id: String,
    #[serde(default)]
    pub properties: PropertyBag,
    #[serde(default)]
    pub position: WidgetPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMeta {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TemplateMeta {
    /// Splits a comma separated tag field the way the export form submits it.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        normalize_tags(raw.split(','))
    }
}

/// Trims, drops empties and de-duplicates while keeping first appearance.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() || normalized.iter().any(|existing| existing == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetaPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TemplateMetaPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.author.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTypeSummary {
    #[serde(rename = "type")]
    pub type_id: String,
    pub name: String,
    pub icon: String,
    pub count: usize,
}

/// The summary fields derived from a template's widget list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummaryFields {
    pub widget_count: usize,
    pub widget_type_counts: BTreeMap<String, usize>,
    pub widget_types: Vec<WidgetTypeSummary>,
    pub canvas_size: String,
    pub requires_setup: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub summary: TemplateSummaryFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Encoded preview (data URI). Attached after creation, absent by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
    pub widgets: Vec<TemplateWidget>,
}

impl TemplateRecord {
    pub fn to_summary(&self, has_preview: bool) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            tags: self.tags.clone(),
            summary: self.summary.clone(),
            has_preview,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Listing view of a template: metadata and summary, no widget payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub summary: TemplateSummaryFields,
    pub has_preview: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    Replace,
    Merge,
}

impl ImportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }
}

impl std::str::FromStr for ImportMode {
    type Err = AppError;

    fn from_str(raw: &str) -> AppResult<Self> {
        match raw.trim() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(AppError::Validation(format!("Unknown import mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTemplatePayload {
    pub id: String,
    pub mode: ImportMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub template_id: String,
    pub mode: ImportMode,
    pub widgets: Vec<WidgetInstance>,
    pub imported_ids: Vec<String>,
    pub requires_setup: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachPreviewPayload {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedWidget {
    pub id: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub markup: String,
    pub behavior: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, ImportMode, TemplateMeta, WidgetInstance, WidgetPosition};

    #[test]
    fn parses_comma_separated_tags() {
        let tags = TemplateMeta::parse_tags(" ops, ai ,, ops,Home ");
        assert_eq!(tags, vec!["ops", "ai", "Home"]);
    }

    #[test]
    fn normalize_keeps_case_distinct_tags() {
        assert_eq!(normalize_tags(["AI", "ai", " "]), vec!["AI", "ai"]);
    }

    #[test]
    fn import_mode_parses_known_values() {
        assert_eq!("merge".parse::<ImportMode>().expect("merge"), ImportMode::Merge);
        assert_eq!(" replace ".parse::<ImportMode>().expect("replace"), ImportMode::Replace);
        assert!("append".parse::<ImportMode>().is_err());
    }

    #[test]
    fn instance_accepts_type_alias() {
        let instance: WidgetInstance = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "typeId": "clock",
            "position": { "x": 10, "y": 20, "width": 200, "height": 120 }
        }))
        .expect("parse instance");
        assert_eq!(instance.type_id, "clock");
        assert!(instance.properties.is_empty());
        assert_eq!(instance.position, WidgetPosition::new(10, 20, 200, 120));

        let encoded = serde_json::to_value(&instance).expect("encode");
        assert_eq!(encoded["type"], "clock");
    }

    #[test]
    fn position_edges_clamp_at_zero() {
        let position = WidgetPosition::new(-300, -10, 100, 5);
        assert_eq!(position.right(), 0);
        assert_eq!(position.bottom(), 0);
    }

    #[test]
    fn position_edges_saturate_at_u32_max() {
        let position = WidgetPosition::new(i32::MAX, i32::MAX, u32::MAX, 1);
        assert_eq!(position.right(), u32::MAX);
        assert_eq!(position.bottom(), i32::MAX as u32 + 1);

        let widgets = vec![crate::models::TemplateWidget {
            type_id: "clock".to_string(),
            properties: Default::default(),
            position: WidgetPosition::new(i32::MAX, 0, u32::MAX, 1),
        }];
        assert_eq!(crate::codec::canvas_size(&widgets), "4294967295x1");
    }
}
