use serde_json::Value;

use crate::codec::{self, ImportedWidgets};
use crate::errors::{AppError, AppResult};
use crate::ids::{is_identifier_safe, IdAllocator};
use crate::materializer::Materializer;
use crate::models::{
    ImportMode, MaterializedWidget, PropertyBag, TemplateRecord, WidgetInstance, WidgetPosition, RESERVED_ID_KEY,
};
use crate::widgets::WidgetCatalog;

/// One editing session's ordered widget collection. The session owns its
/// instances exclusively; ids are unique within it.
pub struct Dashboard<'c> {
    catalog: &'c WidgetCatalog,
    instances: Vec<WidgetInstance>,
}

impl<'c> Dashboard<'c> {
    pub fn new(catalog: &'c WidgetCatalog) -> Self {
        Self {
            catalog,
            instances: Vec::new(),
        }
    }

    /// Adopts a previously saved layout. Fails when an id is not
    /// identifier-safe or when two instances share an id.
    pub fn from_instances(catalog: &'c WidgetCatalog, instances: Vec<WidgetInstance>) -> AppResult<Self> {
        let unsafe_ids: Vec<&str> = instances
            .iter()
            .map(|instance| instance.id.as_str())
            .filter(|id| !is_identifier_safe(id))
            .collect();
        if !unsafe_ids.is_empty() {
            return Err(AppError::Validation(format!(
                "unsafe widget ids: {:?}",
                unsafe_ids
            )));
        }
        let duplicates = codec::duplicate_ids(&instances);
        if !duplicates.is_empty() {
            return Err(AppError::Validation(format!(
                "duplicate widget ids: {}",
                duplicates.join(", ")
            )));
        }
        Ok(Self { catalog, instances })
    }

    pub fn instances(&self) -> &[WidgetInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WidgetInstance> {
        self.instances.iter().find(|instance| instance.id == id)
    }

    /// Places a new widget at `(x, y)` with the descriptor's default
    /// properties and size.
    pub fn place(&mut self, type_id: &str, x: i32, y: i32) -> AppResult<&WidgetInstance> {
        let descriptor = self.catalog.require(type_id)?;
        let id = IdAllocator::new(self.instances.iter().map(|instance| instance.id.clone())).allocate();
        tracing::debug!(instance_id = %id, type_id, "placing widget");

        self.instances.push(WidgetInstance {
            id,
            type_id: descriptor.type_id.clone(),
            properties: descriptor.default_properties.clone(),
            position: WidgetPosition::new(x, y, descriptor.default_width, descriptor.default_height),
        });
        let index = self.instances.len() - 1;
        Ok(&self.instances[index])
    }

    pub fn remove(&mut self, id: &str) -> AppResult<WidgetInstance> {
        let index = self.index_of(id)?;
        Ok(self.instances.remove(index))
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Shallow merge into the instance's properties. A `null` value removes
    /// the key so the descriptor default applies again.
    pub fn update_properties(&mut self, id: &str, patch: PropertyBag) -> AppResult<&WidgetInstance> {
        if patch.contains_key(RESERVED_ID_KEY) {
            return Err(AppError::Validation("the 'id' property is reserved".to_string()));
        }
        let mut cleared = Vec::new();
        let mut updates = PropertyBag::new();
        for (key, value) in patch {
            match value {
                Value::Null => cleared.push(key),
                value => {
                    updates.insert(key, value);
                }
            }
        }
        codec::validate_properties(&updates)?;

        let index = self.index_of(id)?;
        let instance = &mut self.instances[index];
        for key in cleared {
            instance.properties.remove(&key);
        }
        instance.properties.extend(updates);
        Ok(&self.instances[index])
    }

    pub fn move_widget(&mut self, id: &str, position: WidgetPosition) -> AppResult<&WidgetInstance> {
        let index = self.index_of(id)?;
        self.instances[index].position = position;
        Ok(&self.instances[index])
    }

    pub fn render(&self) -> Vec<MaterializedWidget> {
        Materializer::new(self.catalog).materialize_all(&self.instances)
    }

    /// Replaces or extends the collection from a template and returns the
    /// ids assigned to the imported widgets.
    pub fn apply_import(&mut self, record: &TemplateRecord, mode: ImportMode) -> Vec<String> {
        let ImportedWidgets { widgets, imported_ids } = codec::apply_import(record, mode, &self.instances);
        self.instances = widgets;
        imported_ids
    }

    fn index_of(&self, id: &str) -> AppResult<usize> {
        self.instances
            .iter()
            .position(|instance| instance.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Widget not found: {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::Dashboard;
    use crate::errors::AppError;
    use crate::models::{ImportMode, WidgetInstance, WidgetPosition};
    use crate::widgets::builtin_catalog;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> crate::models::PropertyBag {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn place_uses_descriptor_defaults() {
        let mut dashboard = Dashboard::new(builtin_catalog());
        let placed = dashboard.place("weather", 40, 60).expect("place").clone();
        assert_eq!(placed.type_id, "weather");
        assert_eq!(placed.properties["units"], "F");
        let descriptor = builtin_catalog().lookup("weather").expect("weather");
        assert_eq!(
            placed.position,
            WidgetPosition::new(40, 60, descriptor.default_width, descriptor.default_height)
        );
        assert_eq!(dashboard.len(), 1);
    }

    #[test]
    fn from_instances_rejects_unsafe_ids() {
        let widget = |id: &str| WidgetInstance {
            id: id.to_string(),
            type_id: "clock".to_string(),
            properties: Default::default(),
            position: WidgetPosition::default(),
        };
        let markup = Dashboard::from_instances(builtin_catalog(), vec![widget("x\"><img src=x onerror=1> y")]);
        assert!(matches!(markup, Err(AppError::Validation(_))));
        let empty = Dashboard::from_instances(builtin_catalog(), vec![widget("ok-1"), widget("")]);
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let dashboard =
            Dashboard::from_instances(builtin_catalog(), vec![widget("ok-1"), widget("ok_2")]).expect("safe ids");
        assert_eq!(dashboard.len(), 2);
    }

    #[test]
    fn place_rejects_unknown_type() {
        let mut dashboard = Dashboard::new(builtin_catalog());
        assert!(matches!(dashboard.place("nonexistent-widget", 0, 0), Err(AppError::UnresolvedType(_))));
        assert!(dashboard.is_empty());
    }

    #[test]
    fn placed_ids_are_unique() {
        let mut dashboard = Dashboard::new(builtin_catalog());
        for _ in 0..20 {
            dashboard.place("clock", 0, 0).expect("place");
        }
        let ids: std::collections::HashSet<_> = dashboard.instances().iter().map(|w| w.id.clone()).collect();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn update_properties_merges_and_clears() {
        let mut dashboard = Dashboard::new(builtin_catalog());
        let id = dashboard.place("clock", 0, 0).expect("place").id.clone();
        dashboard
            .update_properties(&id, bag(json!({ "title": "Desk", "format24h": true })))
            .expect("update");
        let updated = dashboard.update_properties(&id, bag(json!({ "title": null }))).expect("clear");
        assert!(!updated.properties.contains_key("title"));
        assert_eq!(updated.properties["format24h"], true);

        let rendered = dashboard.render();
        assert!(rendered[0].markup.contains("Clock"));
        assert!(!rendered[0].markup.contains("Desk"));
    }

    #[test]
    fn update_properties_rejects_reserved_and_nested_values() {
        let mut dashboard = Dashboard::new(builtin_catalog());
        let id = dashboard.place("clock", 0, 0).expect("place").id.clone();
        assert!(matches!(
            dashboard.update_properties(&id, bag(json!({ "id": "other" }))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            dashboard.update_properties(&id, bag(json!({ "title": { "a": 1 } }))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            dashboard.update_properties("missing", bag(json!({ "title": "x" }))),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn remove_move_and_clear() {
        let mut dashboard = Dashboard::new(builtin_catalog());
        let first = dashboard.place("clock", 0, 0).expect("place").id.clone();
        let second = dashboard.place("notes", 0, 0).expect("place").id.clone();

        let moved = dashboard.move_widget(&second, WidgetPosition::new(5, 6, 7, 8)).expect("move");
        assert_eq!(moved.position, WidgetPosition::new(5, 6, 7, 8));

        assert_eq!(dashboard.remove(&first).expect("remove").id, first);
        assert!(matches!(dashboard.remove(&first), Err(AppError::NotFound(_))));
        assert!(matches!(
            dashboard.move_widget(&first, WidgetPosition::default()),
            Err(AppError::NotFound(_))
        ));
        dashboard.clear();
        assert!(dashboard.is_empty());
    }

    #[test]
    fn from_instances_rejects_duplicate_ids() {
        let instance = WidgetInstance {
            id: "dup".to_string(),
            type_id: "clock".to_string(),
            properties: Default::default(),
            position: WidgetPosition::default(),
        };
        let result = Dashboard::from_instances(builtin_catalog(), vec![instance.clone(), instance]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn render_degrades_unknown_types() {
        let instance = WidgetInstance {
            id: "ghost".to_string(),
            type_id: "nonexistent-widget".to_string(),
            properties: Default::default(),
            position: WidgetPosition::default(),
        };
        let dashboard = Dashboard::from_instances(builtin_catalog(), vec![instance]).expect("dashboard");
        let rendered = dashboard.render();
        assert!(!rendered[0].resolved);
        assert!(rendered[0].behavior.is_empty());
    }

    #[test]
    fn apply_import_replace_and_merge() {
        let mut source = Dashboard::new(builtin_catalog());
        source.place("clock", 0, 0).expect("place");
        source.place("auth-status", 220, 0).expect("place");
        let meta = crate::models::TemplateMeta {
            name: "Pair".to_string(),
            ..Default::default()
        };
        let record = crate::codec::build_record(builtin_catalog(), source.instances(), &meta, 500).expect("record");

        let mut target = Dashboard::new(builtin_catalog());
        target.place("notes", 0, 0).expect("place");
        let merged = target.apply_import(&record, ImportMode::Merge);
        assert_eq!(merged.len(), 2);
        assert_eq!(target.len(), 3);

        let replaced = target.apply_import(&record, ImportMode::Replace);
        assert_eq!(target.len(), 2);
        assert_eq!(replaced.len(), 2);
        assert_eq!(target.instances()[1].type_id, "auth-status");
    }
}
