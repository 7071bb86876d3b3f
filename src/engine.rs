//! Facade tying the widget catalog, template codec and gallery together.

use std::sync::Arc;

use chrono::Utc;

use crate::codec::{self, ImportedWidgets};
use crate::dashboard::Dashboard;
use crate::errors::{AppError, AppResult};
use crate::gallery::GalleryIndex;
use crate::ids::new_template_id;
use crate::materializer::Materializer;
use crate::models::{
    ImportMode, ImportOutcome, MaterializedWidget, TemplateMeta, TemplateMetaPatch, TemplateRecord, TemplateSummary,
    WidgetInstance,
};
use crate::preview::PreviewImage;
use crate::settings::EngineSettings;
use crate::store::TemplateStore;
use crate::widgets::WidgetCatalog;

#[derive(Debug, Clone, Copy)]
pub struct EngineLimits {
    pub max_widgets_per_template: usize,
    pub max_preview_bytes: usize,
}

impl From<&EngineSettings> for EngineLimits {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            max_widgets_per_template: settings.max_widgets_per_template,
            max_preview_bytes: settings.max_preview_bytes,
        }
    }
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self::from(&EngineSettings::default())
    }
}

pub struct TemplateEngine {
    catalog: Arc<WidgetCatalog>,
    store: Arc<dyn TemplateStore>,
    gallery: GalleryIndex,
    limits: EngineLimits,
}

impl TemplateEngine {
    pub fn new(
        catalog: Arc<WidgetCatalog>,
        store: Arc<dyn TemplateStore>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            gallery: GalleryIndex::new(store.clone(), settings.preview_cache_ttl()),
            catalog,
            store,
            limits: EngineLimits::from(settings),
        }
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    pub fn gallery(&self) -> &GalleryIndex {
        &self.gallery
    }

    pub fn limits(&self) -> EngineLimits {
        self.limits
    }

    pub fn new_dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(&self.catalog)
    }

    pub fn materialize(&self, instance: &WidgetInstance) -> MaterializedWidget {
        Materializer::new(&self.catalog).materialize(instance)
    }

    pub fn materialize_all(&self, instances: &[WidgetInstance]) -> Vec<MaterializedWidget> {
        Materializer::new(&self.catalog).materialize_all(instances)
    }

    /// Snapshots `instances` into a new stored template. The returned record
    /// never carries a preview; see [`Self::attach_preview`].
    pub async fn export_template(&self, instances: &[WidgetInstance], meta: TemplateMeta) -> AppResult<TemplateRecord> {
        let record = codec::build_record(&self.catalog, instances, &meta, self.limits.max_widgets_per_template)?;
        let store = self.store.clone();
        let stored = record.clone();
        let template_id = tokio::task::spawn_blocking(move || store.create(&stored)).await??;
        tracing::info!(
            template_id = %template_id,
            widget_count = record.summary.widget_count,
            requires_setup = ?record.summary.requires_setup,
            "exported template"
        );
        Ok(record)
    }

    /// Second phase of an export. Fails with `NotFound` if the template was
    /// deleted in between.
    pub async fn attach_preview(&self, template_id: &str, data_uri: &str) -> AppResult<()> {
        let image = match PreviewImage::from_data_uri(data_uri, self.limits.max_preview_bytes) {
            Ok(image) => image,
            Err(error) => {
                tracing::warn!(template_id = %template_id, error = %error, "rejected preview image");
                return Err(error);
            }
        };
        let store = self.store.clone();
        let id = template_id.to_string();
        let encoded = image.to_data_uri();
        let saved = tokio::task::spawn_blocking(move || store.save_preview(&id, &encoded)).await??;
        if !saved {
            tracing::warn!(template_id = %template_id, "preview target template is gone");
            return Err(AppError::NotFound(format!("Template not found: {}", template_id)));
        }
        self.gallery.invalidate_preview(template_id)?;
        tracing::info!(template_id = %template_id, mime = %image.mime, bytes = image.data.len(), "attached preview");
        Ok(())
    }

    /// Resolves the template at call time and applies it to `current`.
    pub fn import_template(
        &self,
        template_id: &str,
        mode: ImportMode,
        current: &[WidgetInstance],
    ) -> AppResult<ImportOutcome> {
        let record = self.gallery.get(template_id)?;
        let ImportedWidgets { widgets, imported_ids } = codec::apply_import(&record, mode, current);
        tracing::info!(
            template_id = %template_id,
            mode = mode.as_str(),
            imported = imported_ids.len(),
            "imported template"
        );
        Ok(ImportOutcome {
            template_id: record.id.clone(),
            mode,
            message: import_message(&record, mode, imported_ids.len()),
            widgets,
            imported_ids,
            requires_setup: record.summary.requires_setup,
        })
    }

    /// Same as [`Self::import_template`] but applied to a live dashboard.
    pub fn import_into(&self, template_id: &str, mode: ImportMode, dashboard: &mut Dashboard<'_>) -> AppResult<ImportOutcome> {
        let record = self.gallery.get(template_id)?;
        let imported_ids = dashboard.apply_import(&record, mode);
        tracing::info!(template_id = %template_id, mode = mode.as_str(), imported = imported_ids.len(), "imported template");
        Ok(ImportOutcome {
            template_id: record.id.clone(),
            mode,
            message: import_message(&record, mode, imported_ids.len()),
            widgets: dashboard.instances().to_vec(),
            imported_ids,
            requires_setup: record.summary.requires_setup,
        })
    }

    pub fn update_template_meta(&self, template_id: &str, patch: &TemplateMetaPatch) -> AppResult<TemplateRecord> {
        if patch.is_empty() {
            return self.gallery.get(template_id);
        }
        let updated = self
            .store
            .update(template_id, patch)?
            .ok_or_else(|| AppError::NotFound(format!("Template not found: {}", template_id)))?;
        tracing::info!(template_id = %template_id, "updated template metadata");
        Ok(updated)
    }

    pub fn get_template(&self, template_id: &str) -> AppResult<TemplateRecord> {
        self.gallery.get(template_id)
    }

    pub fn list(&self) -> AppResult<Vec<TemplateSummary>> {
        self.gallery.list()
    }

    pub fn search(&self, query: &str) -> AppResult<Vec<TemplateSummary>> {
        self.gallery.search(query)
    }

    pub fn delete(&self, template_id: &str) -> AppResult<()> {
        self.gallery.delete(template_id)
    }

    pub fn preview(&self, template_id: &str) -> AppResult<Option<String>> {
        self.gallery.preview(template_id)
    }

    /// Serializes a stored template as a portable document.
    pub fn export_document(&self, template_id: &str) -> AppResult<String> {
        self.gallery.get(template_id)?.to_json_pretty()
    }

    /// Stores a portable document as a new template under a fresh id.
    pub async fn import_document(&self, raw: &str) -> AppResult<TemplateRecord> {
        let mut record = TemplateRecord::from_json(raw, &self.catalog, self.limits.max_widgets_per_template)?;
        if let Some(preview) = record.preview_image.take() {
            let image = PreviewImage::from_data_uri(&preview, self.limits.max_preview_bytes)?;
            record.preview_image = Some(image.to_data_uri());
        }
        record.id = new_template_id();
        record.updated_at = Utc::now();

        let store = self.store.clone();
        let stored = record.clone();
        let template_id = tokio::task::spawn_blocking(move || store.create(&stored)).await??;
        tracing::info!(template_id = %template_id, name = %record.name, "imported template document");
        Ok(record)
    }
}

fn import_message(record: &TemplateRecord, mode: ImportMode, imported: usize) -> String {
    let verb = match mode {
        ImportMode::Replace => "Replaced dashboard with",
        ImportMode::Merge => "Merged",
    };
    let mut message = format!(
        "{} {} widget{} from \"{}\"",
        verb,
        imported,
        if imported == 1 { "" } else { "s" },
        record.name
    );
    if !record.summary.requires_setup.is_empty() {
        message.push_str(&format!(". Requires: {}", record.summary.requires_setup.join(", ")));
    }
    message
}
