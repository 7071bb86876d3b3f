use serde_json::Value;

use crate::models::{MaterializedWidget, PropertyBag, WidgetInstance, RESERVED_ID_KEY};
use crate::widgets::props::WidgetProps;
use crate::widgets::{PlaceholderRenderer, WidgetCatalog, WidgetDescriptor, WidgetRenderer};

/// Descriptor defaults overlaid by instance properties, with the instance
/// id injected under the reserved key. The injected id always wins.
pub fn effective_properties(descriptor: Option<&WidgetDescriptor>, instance: &WidgetInstance) -> PropertyBag {
    let mut merged = descriptor
        .map(|descriptor| descriptor.default_properties.clone())
        .unwrap_or_default();
    for (key, value) in &instance.properties {
        merged.insert(key.clone(), value.clone());
    }
    merged.insert(RESERVED_ID_KEY.to_string(), Value::String(instance.id.clone()));
    merged
}

/// Renders placed instances against a catalog.
#[derive(Clone, Copy)]
pub struct Materializer<'c> {
    catalog: &'c WidgetCatalog,
}

impl<'c> Materializer<'c> {
    pub fn new(catalog: &'c WidgetCatalog) -> Self {
        Self { catalog }
    }

    /// Never fails: an unknown type renders the placeholder with empty
    /// behaviour and `resolved = false`.
    pub fn materialize(&self, instance: &WidgetInstance) -> MaterializedWidget {
        let descriptor = self.catalog.lookup(&instance.type_id);
        let bag = effective_properties(descriptor, instance);
        let props = WidgetProps::new(&bag);

        let (markup, behavior) = match descriptor {
            Some(descriptor) => (descriptor.render_markup(&props), descriptor.render_behavior(&props)),
            None => {
                tracing::warn!(
                    instance_id = %instance.id,
                    type_id = %instance.type_id,
                    "rendering placeholder for unresolved widget type"
                );
                let placeholder = PlaceholderRenderer::new(instance.type_id.clone());
                (placeholder.markup(&props), placeholder.behavior(&props))
            }
        };
        tracing::debug!(instance_id = %instance.id, type_id = %instance.type_id, "materialized widget");

        MaterializedWidget {
            id: instance.id.clone(),
            type_id: instance.type_id.clone(),
            markup,
            behavior,
            resolved: descriptor.is_some(),
        }
    }

    pub fn materialize_all(&self, instances: &[WidgetInstance]) -> Vec<MaterializedWidget> {
        instances.iter().map(|instance| self.materialize(instance)).collect()
    }
}
