//! Template export summarization and import policies.
//!
//! The summary fields of a [`TemplateRecord`] are always derived from its
//! `widgets` through [`summarize`]; [`verify_summary`] re-derives them and
//! rejects a record whose stored summary diverges.

use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::errors::{AppError, AppResult};
use crate::ids::{new_template_id, IdAllocator};
use crate::models::{
    normalize_tags, ImportMode, PropertyBag, TemplateMeta, TemplateRecord, TemplateSummaryFields,
    TemplateWidget, WidgetInstance, WidgetTypeSummary, RESERVED_ID_KEY,
};
use crate::schema;
use crate::widgets::WidgetCatalog;

pub const DEFAULT_MAX_WIDGETS: usize = 500;

/// Derives every summary field from an ordered widget list.
pub fn summarize(catalog: &WidgetCatalog, widgets: &[TemplateWidget]) -> TemplateSummaryFields {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for widget in widgets {
        let count = counts.entry(widget.type_id.clone()).or_insert(0);
        if *count == 0 {
            order.push(widget.type_id.as_str());
        }
        *count += 1;
    }

    let widget_types = order
        .iter()
        .map(|type_id| {
            let descriptor = catalog.lookup(type_id);
            WidgetTypeSummary {
                type_id: type_id.to_string(),
                name: descriptor
                    .map(|descriptor| descriptor.display_name.clone())
                    .unwrap_or_else(|| type_id.to_string()),
                icon: descriptor
                    .map(|descriptor| descriptor.icon.clone())
                    .unwrap_or_else(|| type_id.to_string()),
                count: counts.get(*type_id).copied().unwrap_or(0),
            }
        })
        .collect();

    let requires_setup: BTreeSet<String> = counts
        .keys()
        .filter_map(|type_id| catalog.lookup(type_id))
        .filter_map(|descriptor| descriptor.credential_name.clone())
        .collect();

    TemplateSummaryFields {
        widget_count: widgets.len(),
        widget_type_counts: counts,
        widget_types,
        canvas_size: canvas_size(widgets),
        requires_setup: requires_setup.into_iter().collect(),
    }
}

/// Bounding extent `"{width}x{height}"` of the widgets, `"0x0"` when empty.
pub fn canvas_size(widgets: &[TemplateWidget]) -> String {
    let width = widgets.iter().map(|widget| widget.position.right()).max().unwrap_or(0);
    let height = widgets.iter().map(|widget| widget.position.bottom()).max().unwrap_or(0);
    format!("{}x{}", width, height)
}

/// Accepts string, number, boolean and array values under non-empty keys.
pub fn validate_properties(properties: &PropertyBag) -> AppResult<()> {
    for (key, value) in properties {
        if key.trim().is_empty() {
            return Err(AppError::Validation("property names must not be empty".to_string()));
        }
        match value {
            Value::Null => {
                return Err(AppError::Validation(format!("property '{}' must not be null", key)));
            }
            Value::Object(_) => {
                return Err(AppError::Validation(format!(
                    "property '{}' must be a string, number, boolean or list",
                    key
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Drops the dashboard-scoped id, including any copy under the reserved key.
pub fn to_template_widget(instance: &WidgetInstance) -> TemplateWidget {
    let mut properties = instance.properties.clone();
    properties.remove(RESERVED_ID_KEY);
    TemplateWidget {
        type_id: instance.type_id.clone(),
        properties,
        position: instance.position,
    }
}

/// Builds a new record from a dashboard snapshot. Fails on an empty name,
/// an oversized layout or an invalid property bag.
pub fn build_record(
    catalog: &WidgetCatalog,
    instances: &[WidgetInstance],
    meta: &TemplateMeta,
    max_widgets: usize,
) -> AppResult<TemplateRecord> {
    let name = meta.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("template name is required".to_string()));
    }
    if instances.len() > max_widgets {
        return Err(AppError::Validation(format!(
            "template has {} widgets, limit is {}",
            instances.len(),
            max_widgets
        )));
    }
    for instance in instances {
        validate_properties(&instance.properties)?;
    }

    let widgets: Vec<TemplateWidget> = instances.iter().map(to_template_widget).collect();
    let now = Utc::now();
    Ok(TemplateRecord {
        id: new_template_id(),
        name: name.to_string(),
        description: meta.description.trim().to_string(),
        author: meta.author.trim().to_string(),
        tags: normalize_tags(&meta.tags),
        summary: summarize(catalog, &widgets),
        created_at: now,
        updated_at: now,
        preview_image: None,
        widgets,
    })
}

/// Re-derives the summary from `widgets` and compares it with the stored one.
/// Display names and icons are not compared. Stored credential names may
/// exceed the derived ones only when some widget type is unresolved here.
pub fn verify_summary(catalog: &WidgetCatalog, record: &TemplateRecord) -> AppResult<()> {
    let derived = summarize(catalog, &record.widgets);
    let stored = &record.summary;

    let mismatch = |field: &str| {
        Err(AppError::Validation(format!(
            "template summary field '{}' does not match its widgets",
            field
        )))
    };
    if derived.widget_count != stored.widget_count {
        return mismatch("widgetCount");
    }
    if derived.widget_type_counts != stored.widget_type_counts {
        return mismatch("widgetTypeCounts");
    }
    if derived.canvas_size != stored.canvas_size {
        return mismatch("canvasSize");
    }
    // Credentials of types this catalog cannot resolve are taken on trust.
    let has_unresolved = record
        .widgets
        .iter()
        .any(|widget| !catalog.contains(&widget.type_id));
    let missing_resolved = derived
        .requires_setup
        .iter()
        .any(|name| !stored.requires_setup.contains(name));
    let extra_stored = stored
        .requires_setup
        .iter()
        .any(|name| !derived.requires_setup.contains(name));
    if missing_resolved || (extra_stored && !has_unresolved) {
        return mismatch("requiresSetup");
    }
    let shape = |types: &[WidgetTypeSummary]| -> Vec<(String, usize)> {
        types.iter().map(|summary| (summary.type_id.clone(), summary.count)).collect()
    };
    if shape(derived.widget_types.as_slice()) != shape(stored.widget_types.as_slice()) {
        return mismatch("widgetTypes");
    }
    Ok(())
}

/// Instances produced by an import, with the ids that were newly assigned.
#[derive(Debug, Clone)]
pub struct ImportedWidgets {
    pub widgets: Vec<WidgetInstance>,
    pub imported_ids: Vec<String>,
}

/// Replace discards `current`; merge appends after it with ids disjoint
/// from every existing id. Positions are copied verbatim in both modes.
pub fn apply_import(record: &TemplateRecord, mode: ImportMode, current: &[WidgetInstance]) -> ImportedWidgets {
    let (mut widgets, mut allocator) = match mode {
        ImportMode::Replace => (Vec::with_capacity(record.widgets.len()), IdAllocator::default()),
        ImportMode::Merge => (
            current.to_vec(),
            IdAllocator::new(current.iter().map(|instance| instance.id.clone())),
        ),
    };

    let mut imported_ids = Vec::with_capacity(record.widgets.len());
    for widget in &record.widgets {
        let id = allocator.allocate();
        let mut properties = widget.properties.clone();
        properties.remove(RESERVED_ID_KEY);
        imported_ids.push(id.clone());
        widgets.push(WidgetInstance {
            id,
            type_id: widget.type_id.clone(),
            properties,
            position: widget.position,
        });
    }

    ImportedWidgets { widgets, imported_ids }
}

/// Ids that appear more than once. Used to check dashboards loaded from
/// outside the engine.
pub fn duplicate_ids(instances: &[WidgetInstance]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for instance in instances {
        if !seen.insert(instance.id.as_str()) && !duplicates.contains(&instance.id) {
            duplicates.push(instance.id.clone());
        }
    }
    duplicates
}

impl TemplateRecord {
    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a portable template document. The document must match the
    /// template schema, carry valid property bags and a summary that
    /// re-derives from its widgets.
    pub fn from_json(raw: &str, catalog: &WidgetCatalog, max_widgets: usize) -> AppResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|error| AppError::Validation(format!("template document is not JSON: {}", error)))?;
        if let Some(errors) = schema::validate_template_document(&value) {
            return Err(AppError::Validation(format!(
                "template document failed schema validation: {}",
                errors.join("; ")
            )));
        }
        let mut record: TemplateRecord = serde_json::from_value(value)
            .map_err(|error| AppError::Validation(format!("template document is malformed: {}", error)))?;

        if record.name.trim().is_empty() {
            return Err(AppError::Validation("template name is required".to_string()));
        }
        if record.widgets.len() > max_widgets {
            return Err(AppError::Validation(format!(
                "template has {} widgets, limit is {}",
                record.widgets.len(),
                max_widgets
            )));
        }
        for widget in &record.widgets {
            validate_properties(&widget.properties)?;
        }
        verify_summary(catalog, &record)?;
        record.tags = normalize_tags(&record.tags);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_import, build_record, canvas_size, duplicate_ids, summarize, validate_properties, verify_summary};
    use crate::errors::AppError;
    use crate::models::{ImportMode, TemplateMeta, TemplateRecord, WidgetCategory, WidgetInstance, WidgetPosition};
    use crate::widgets::{builtin_catalog, WidgetCatalog, WidgetDescriptor};
    use serde_json::json;
    use std::collections::HashSet;

    fn instance(id: &str, type_id: &str, x: i32, y: i32) -> WidgetInstance {
        WidgetInstance {
            id: id.to_string(),
            type_id: type_id.to_string(),
            properties: Default::default(),
            position: WidgetPosition::new(x, y, 200, 120),
        }
    }

    fn meta(name: &str) -> TemplateMeta {
        TemplateMeta {
            name: name.to_string(),
            description: "desc".to_string(),
            author: "me".to_string(),
            tags: vec!["ops".to_string(), " ops ".to_string(), "home".to_string()],
        }
    }

    fn sample() -> Vec<WidgetInstance> {
        vec![
            instance("a1", "clock", 0, 0),
            instance("a2", "clock", 220, 0),
            instance("a3", "auth-status", 440, 0),
            instance("a4", "clock", 0, 140),
        ]
    }

    #[test]
    fn export_counts_types_and_credentials() {
        let record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        assert_eq!(record.summary.widget_count, 4);
        assert_eq!(record.summary.widget_type_counts.get("clock"), Some(&3));
        assert_eq!(record.summary.widget_type_counts.get("auth-status"), Some(&1));
        assert_eq!(record.summary.requires_setup, vec!["OPENCLAW_API"]);
        assert_eq!(record.summary.canvas_size, "640x260");
        assert_eq!(record.tags, vec!["ops", "home"]);
        assert_eq!(record.summary.widget_types[0].type_id, "clock");
        assert_eq!(record.summary.widget_types[0].name, "Clock");
        assert_eq!(record.summary.widget_types[1].count, 1);
        assert!(record.preview_image.is_none());
    }

    #[test]
    fn export_rejects_blank_name() {
        let result = build_record(builtin_catalog(), &sample(), &meta("   "), 500);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn export_rejects_oversized_layout() {
        let result = build_record(builtin_catalog(), &sample(), &meta("Big"), 3);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn export_strips_instance_ids() {
        let mut widgets = sample();
        widgets[0].properties.insert("id".to_string(), json!("a1"));
        widgets[0].properties.insert("title".to_string(), json!("Desk"));
        let record = build_record(builtin_catalog(), &widgets, &meta("Ops"), 500).expect("build record");
        assert!(!record.widgets[0].properties.contains_key("id"));
        assert_eq!(record.widgets[0].properties["title"], "Desk");
    }

    #[test]
    fn unresolved_types_are_counted_under_raw_name() {
        let widgets = vec![instance("z", "nonexistent-widget", 0, 0)];
        let record = build_record(builtin_catalog(), &widgets, &meta("Odd"), 500).expect("build record");
        assert_eq!(record.summary.widget_type_counts.get("nonexistent-widget"), Some(&1));
        assert_eq!(record.summary.widget_types[0].name, "nonexistent-widget");
        assert!(record.summary.requires_setup.is_empty());
    }

    #[test]
    fn empty_template_has_zero_canvas() {
        assert_eq!(canvas_size(&[]), "0x0");
        let summary = summarize(builtin_catalog(), &[]);
        assert_eq!(summary.widget_count, 0);
        assert!(summary.widget_type_counts.is_empty());
    }

    #[test]
    fn property_validation_rejects_null_and_objects() {
        let bag = |value: serde_json::Value| value.as_object().cloned().expect("object");
        assert!(validate_properties(&bag(json!({ "a": "x", "b": 1, "c": true, "d": [1, 2] }))).is_ok());
        assert!(validate_properties(&bag(json!({ "a": null }))).is_err());
        assert!(validate_properties(&bag(json!({ "a": { "nested": 1 } }))).is_err());
        assert!(validate_properties(&bag(json!({ "": 1 }))).is_err());
    }

    #[test]
    fn verify_detects_tampered_summary() {
        let mut record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        verify_summary(builtin_catalog(), &record).expect("fresh record verifies");
        record.summary.widget_type_counts.insert("clock".to_string(), 7);
        assert!(matches!(verify_summary(builtin_catalog(), &record), Err(AppError::Validation(_))));
    }

    #[test]
    fn extension_credentials_survive_import_into_builtin_catalog() {
        let mut extended = WidgetCatalog::with_builtins();
        extended
            .register(
                WidgetDescriptor::new("ext-widget", "Extension", "🧩", WidgetCategory::Small)
                    .credential("EXT_KEY")
                    .size(200, 120),
            )
            .expect("register extension");
        let instances = vec![instance("c1", "clock", 0, 0), instance("e1", "ext-widget", 220, 0)];
        let record = build_record(&extended, &instances, &meta("Ext"), 500).expect("build record");
        assert_eq!(record.summary.requires_setup, vec!["EXT_KEY"]);
        let document = record.to_json_pretty().expect("serialize");

        let imported = TemplateRecord::from_json(&document, builtin_catalog(), 500).expect("import with builtins");
        assert_eq!(imported.summary.requires_setup, vec!["EXT_KEY"]);
        assert_eq!(imported.widgets[1].type_id, "ext-widget");
    }

    #[test]
    fn extra_credentials_rejected_when_every_type_resolves() {
        let mut record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        record.summary.requires_setup.push("ROGUE_KEY".to_string());
        assert!(matches!(verify_summary(builtin_catalog(), &record), Err(AppError::Validation(_))));

        let mut dropped = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        dropped.summary.requires_setup.clear();
        assert!(matches!(verify_summary(builtin_catalog(), &dropped), Err(AppError::Validation(_))));
    }

    #[test]
    fn replace_import_assigns_fresh_ids() {
        let record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        let current = vec![instance("abc", "notes", 0, 0)];
        let imported = apply_import(&record, ImportMode::Replace, &current);
        assert_eq!(imported.widgets.len(), 4);
        assert_eq!(imported.imported_ids.len(), 4);
        assert!(imported.widgets.iter().all(|widget| widget.id != "abc"));
        let types: Vec<_> = imported.widgets.iter().map(|widget| widget.type_id.as_str()).collect();
        assert_eq!(types, vec!["clock", "clock", "auth-status", "clock"]);
    }

    #[test]
    fn merge_import_appends_with_disjoint_ids() {
        let record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        let current = vec![instance("abc", "notes", 0, 0)];
        let imported = apply_import(&record, ImportMode::Merge, &current);
        assert_eq!(imported.widgets.len(), 5);
        assert_eq!(imported.widgets[0].id, "abc");
        let ids: HashSet<_> = imported.widgets.iter().map(|widget| widget.id.clone()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(imported.widgets[1].position, record.widgets[0].position);
        assert!(duplicate_ids(&imported.widgets).is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported_once() {
        let widgets = vec![instance("a", "clock", 0, 0), instance("a", "clock", 0, 0), instance("a", "clock", 0, 0)];
        assert_eq!(duplicate_ids(&widgets), vec!["a"]);
    }

    #[test]
    fn document_round_trip_verifies_summary() {
        let record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        let text = record.to_json_pretty().expect("encode");
        let parsed = TemplateRecord::from_json(&text, builtin_catalog(), 500).expect("decode");
        assert_eq!(parsed, record);
    }

    #[test]
    fn document_with_divergent_summary_is_rejected() {
        let record = build_record(builtin_catalog(), &sample(), &meta("Ops"), 500).expect("build record");
        let mut value = serde_json::to_value(&record).expect("encode");
        value["canvasSize"] = json!("1x1");
        let result = TemplateRecord::from_json(&value.to_string(), builtin_catalog(), 500);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn document_must_be_json_object() {
        let result = TemplateRecord::from_json("[1,2]", builtin_catalog(), 500);
        assert!(matches!(result, Err(AppError::Validation(_))));
        let result = TemplateRecord::from_json("{not json", builtin_catalog(), 500);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
