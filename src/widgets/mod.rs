//! Widget descriptors and the process-wide catalog.
//!
//! A descriptor carries display metadata, default geometry, default
//! properties, an optional credential name and a [`WidgetRenderer`] that
//! turns an effective property bag into markup and behaviour text.

pub mod markup;
pub mod props;

mod ai;
mod bars;
mod finance;
mod home;
mod media;
mod productivity;
mod status;
mod system;
mod time;
mod weather;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{AppError, AppResult};
use crate::models::{PropertyBag, WidgetCategory};
use props::{escape_html, WidgetProps};

/// Generation functions of a widget type. Both must be total over any
/// property bag that is a superset of the descriptor defaults.
pub trait WidgetRenderer: Send + Sync {
    fn markup(&self, props: &WidgetProps<'_>) -> String;
    fn behavior(&self, props: &WidgetProps<'_>) -> String;
}

pub type RenderFn = fn(&WidgetProps<'_>) -> String;

struct FnRenderer {
    markup: RenderFn,
    behavior: RenderFn,
}

impl WidgetRenderer for FnRenderer {
    fn markup(&self, props: &WidgetProps<'_>) -> String {
        (self.markup)(props)
    }

    fn behavior(&self, props: &WidgetProps<'_>) -> String {
        (self.behavior)(props)
    }
}

/// Stand-in for a type id with no descriptor.
pub struct PlaceholderRenderer {
    type_id: String,
}

impl PlaceholderRenderer {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self { type_id: type_id.into() }
    }
}

impl WidgetRenderer for PlaceholderRenderer {
    fn markup(&self, props: &WidgetProps<'_>) -> String {
        format!(
            r#"
      <div class="dash-card dash-card-unknown" id="widget-{id}" style="height:100%;">
        <div class="dash-card-body" style="display:flex;align-items:center;justify-content:center;">
          <span class="kpi-label">Unknown widget type: {type_id}</span>
        </div>
      </div>"#,
            id = props.dom_id(),
            type_id = escape_html(&self.type_id),
        )
    }

    fn behavior(&self, _props: &WidgetProps<'_>) -> String {
        String::new()
    }
}

pub struct WidgetDescriptor {
    pub type_id: String,
    pub display_name: String,
    pub icon: String,
    pub category: WidgetCategory,
    pub description: String,
    pub default_width: u32,
    pub default_height: u32,
    pub credential_name: Option<String>,
    pub default_properties: PropertyBag,
    renderer: Box<dyn WidgetRenderer>,
}

impl std::fmt::Debug for WidgetDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetDescriptor")
            .field("type_id", &self.type_id)
            .field("category", &self.category)
            .field("credential_name", &self.credential_name)
            .finish_non_exhaustive()
    }
}

impl WidgetDescriptor {
    /// Starts a descriptor with a 200x120 footprint, no defaults and the
    /// placeholder renderer.
    pub fn new(
        type_id: impl Into<String>,
        display_name: impl Into<String>,
        icon: impl Into<String>,
        category: WidgetCategory,
    ) -> Self {
        let type_id = type_id.into();
        Self {
            renderer: Box::new(PlaceholderRenderer::new(type_id.clone())),
            type_id,
            display_name: display_name.into(),
            icon: icon.into(),
            category,
            description: String::new(),
            default_width: 200,
            default_height: 120,
            credential_name: None,
            default_properties: PropertyBag::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.default_width = width;
        self.default_height = height;
        self
    }

    pub fn credential(mut self, name: impl Into<String>) -> Self {
        self.credential_name = Some(name.into());
        self
    }

    /// Default properties from a JSON object literal. Non-object values
    /// leave the defaults empty.
    pub fn defaults(mut self, defaults: serde_json::Value) -> Self {
        self.default_properties = match defaults {
            serde_json::Value::Object(map) => map,
            _ => PropertyBag::new(),
        };
        self
    }

    pub fn render(self, markup: RenderFn, behavior: RenderFn) -> Self {
        self.renderer(FnRenderer { markup, behavior })
    }

    pub fn renderer(mut self, renderer: impl WidgetRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn requires_credential(&self) -> bool {
        self.credential_name.is_some()
    }

    pub fn render_markup(&self, props: &WidgetProps<'_>) -> String {
        self.renderer.markup(props)
    }

    pub fn render_behavior(&self, props: &WidgetProps<'_>) -> String {
        self.renderer.behavior(props)
    }

    pub fn view(&self) -> WidgetDescriptorView {
        WidgetDescriptorView {
            type_id: self.type_id.clone(),
            display_name: self.display_name.clone(),
            icon: self.icon.clone(),
            category: self.category,
            description: self.description.clone(),
            default_width: self.default_width,
            default_height: self.default_height,
            requires_credential: self.requires_credential(),
            credential_name: self.credential_name.clone(),
            default_properties: self.default_properties.clone(),
        }
    }
}

/// Serializable descriptor metadata for pickers and listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptorView {
    pub type_id: String,
    pub display_name: String,
    pub icon: String,
    pub category: WidgetCategory,
    pub description: String,
    pub default_width: u32,
    pub default_height: u32,
    pub requires_credential: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_name: Option<String>,
    pub default_properties: PropertyBag,
}

/// Descriptors keyed by type id, kept in registration order.
#[derive(Debug, Default)]
pub struct WidgetCatalog {
    descriptors: Vec<WidgetDescriptor>,
    index: HashMap<String, usize>,
}

impl WidgetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in widget types.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        let groups = [
            weather::descriptors(),
            status::descriptors(),
            time::descriptors(),
            productivity::descriptors(),
            bars::descriptors(),
            ai::descriptors(),
            system::descriptors(),
            finance::descriptors(),
            home::descriptors(),
            media::descriptors(),
        ];
        for descriptor in groups.into_iter().flatten() {
            if let Err(error) = catalog.register(descriptor) {
                tracing::warn!(error = %error, "skipping built-in widget descriptor");
            }
        }
        catalog
    }

    /// Append-only: an already registered type id is rejected.
    pub fn register(&mut self, descriptor: WidgetDescriptor) -> AppResult<()> {
        let type_id = descriptor.type_id.as_str();
        if type_id.trim().is_empty() {
            return Err(AppError::Validation("widget type id is required".to_string()));
        }
        if self.index.contains_key(type_id) {
            return Err(AppError::Validation(format!(
                "widget type already registered: {}",
                type_id
            )));
        }
        self.index.insert(type_id.to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn lookup(&self, type_id: &str) -> Option<&WidgetDescriptor> {
        self.index.get(type_id).map(|position| &self.descriptors[*position])
    }

    pub fn require(&self, type_id: &str) -> AppResult<&WidgetDescriptor> {
        self.lookup(type_id)
            .ok_or_else(|| AppError::UnresolvedType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    pub fn list(&self) -> impl Iterator<Item = &WidgetDescriptor> {
        self.descriptors.iter()
    }

    pub fn list_by_category(&self, category: WidgetCategory) -> impl Iterator<Item = &WidgetDescriptor> {
        self.descriptors
            .iter()
            .filter(move |descriptor| descriptor.category == category)
    }

    pub fn views(&self) -> Vec<WidgetDescriptorView> {
        self.descriptors.iter().map(WidgetDescriptor::view).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

static BUILTIN_CATALOG: Lazy<WidgetCatalog> = Lazy::new(WidgetCatalog::with_builtins);

/// The read-only catalog shared by the whole process.
pub fn builtin_catalog() -> &'static WidgetCatalog {
    &BUILTIN_CATALOG
}

/// Renders a built-in type over its defaults plus `overrides`.
#[cfg(test)]
pub(crate) fn render_for_test(type_id: &str, overrides: serde_json::Value) -> (String, String) {
    let descriptor = builtin_catalog().require(type_id).expect("built-in type");
    let mut bag = descriptor.default_properties.clone();
    if let serde_json::Value::Object(overrides) = overrides {
        bag.extend(overrides);
    }
    let props = WidgetProps::new(&bag);
    (descriptor.render_markup(&props), descriptor.render_behavior(&props))
}
