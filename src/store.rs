//! Storage boundary for template records.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::models::{normalize_tags, TemplateMetaPatch, TemplateRecord, TemplateSummary};

/// Request/response storage for templates. Implementations own their own
/// locking; the engine never holds a transaction across two calls.
pub trait TemplateStore: Send + Sync {
    /// Persists a new record and returns its id.
    fn create(&self, record: &TemplateRecord) -> AppResult<String>;
    /// Full record including widgets and preview, if present.
    fn read(&self, id: &str) -> AppResult<Option<TemplateRecord>>;
    /// Summaries in insertion order.
    fn list(&self) -> AppResult<Vec<TemplateSummary>>;
    /// Patches metadata only. `None` when the id is unknown.
    fn update(&self, id: &str, patch: &TemplateMetaPatch) -> AppResult<Option<TemplateRecord>>;
    fn delete(&self, id: &str) -> AppResult<bool>;
    /// `false` when the template does not exist.
    fn save_preview(&self, id: &str, data_uri: &str) -> AppResult<bool>;
    fn read_preview(&self, id: &str) -> AppResult<Option<String>>;
}

/// Applies a metadata patch in place. The name must stay non-empty.
pub fn apply_meta_patch(record: &mut TemplateRecord, patch: &TemplateMetaPatch, now: DateTime<Utc>) -> AppResult<()> {
    if let Some(name) = &patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("template name is required".to_string()));
        }
        record.name = name.to_string();
    }
    if let Some(description) = &patch.description {
        record.description = description.trim().to_string();
    }
    if let Some(author) = &patch.author {
        record.author = author.trim().to_string();
    }
    if let Some(tags) = &patch.tags {
        record.tags = normalize_tags(tags);
    }
    record.updated_at = now;
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TemplateRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<TemplateRecord>>> {
        self.records
            .lock()
            .map_err(|_| AppError::Internal("template store mutex poisoned".to_string()))
    }
}

impl TemplateStore for MemoryStore {
    fn create(&self, record: &TemplateRecord) -> AppResult<String> {
        let mut records = self.lock()?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(AppError::Validation(format!("Template already exists: {}", record.id)));
        }
        records.push(record.clone());
        Ok(record.id.clone())
    }

    fn read(&self, id: &str) -> AppResult<Option<TemplateRecord>> {
        Ok(self.lock()?.iter().find(|record| record.id == id).cloned())
    }

    fn list(&self) -> AppResult<Vec<TemplateSummary>> {
        Ok(self
            .lock()?
            .iter()
            .map(|record| record.to_summary(record.preview_image.is_some()))
            .collect())
    }

    fn update(&self, id: &str, patch: &TemplateMetaPatch) -> AppResult<Option<TemplateRecord>> {
        let mut records = self.lock()?;
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            return Ok(None);
        };
        let mut updated = record.clone();
        apply_meta_patch(&mut updated, patch, Utc::now())?;
        *record = updated.clone();
        Ok(Some(updated))
    }

    fn delete(&self, id: &str) -> AppResult<bool> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }

    fn save_preview(&self, id: &str, data_uri: &str) -> AppResult<bool> {
        let mut records = self.lock()?;
        match records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.preview_image = Some(data_uri.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_preview(&self, id: &str) -> AppResult<Option<String>> {
        Ok(self
            .lock()?
            .iter()
            .find(|record| record.id == id)
            .and_then(|record| record.preview_image.clone()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{MemoryStore, TemplateStore};
    use crate::codec::build_record;
    use crate::errors::AppError;
    use crate::models::{TemplateMeta, TemplateMetaPatch, TemplateRecord, WidgetInstance, WidgetPosition};
    use crate::widgets::builtin_catalog;

    pub(crate) fn sample_record(name: &str, tags: &[&str]) -> TemplateRecord {
        let instances = vec![WidgetInstance {
            id: "w1".to_string(),
            type_id: "clock".to_string(),
            properties: Default::default(),
            position: WidgetPosition::new(0, 0, 200, 120),
        }];
        let meta = TemplateMeta {
            name: name.to_string(),
            description: format!("{} layout", name),
            author: "tester".to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        };
        build_record(builtin_catalog(), &instances, &meta, 500).expect("sample record")
    }

    /// Behaviour every store implementation must share.
    pub(crate) fn exercise_store(store: &dyn TemplateStore) {
        let first = sample_record("Ops", &["ops"]);
        let second = sample_record("Home", &["home"]);
        store.create(&first).expect("create first");
        store.create(&second).expect("create second");

        let listed = store.list().expect("list");
        let names: Vec<_> = listed.iter().map(|summary| summary.name.as_str()).collect();
        assert_eq!(names, vec!["Ops", "Home"]);
        assert!(listed.iter().all(|summary| !summary.has_preview));

        let read = store.read(&first.id).expect("read").expect("present");
        assert_eq!(read, first);
        assert!(store.read("missing").expect("read missing").is_none());

        let patch = TemplateMetaPatch {
            name: Some("  Ops v2 ".to_string()),
            tags: Some(vec!["ops".to_string(), "ops".to_string(), "night".to_string()]),
            ..Default::default()
        };
        let updated = store.update(&first.id, &patch).expect("update").expect("present");
        assert_eq!(updated.name, "Ops v2");
        assert_eq!(updated.tags, vec!["ops", "night"]);
        assert_eq!(updated.summary, first.summary);
        assert_eq!(updated.widgets, first.widgets);
        assert!(store.update("missing", &patch).expect("update missing").is_none());

        let blank = TemplateMetaPatch {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(store.update(&first.id, &blank), Err(AppError::Validation(_))));

        assert!(store.save_preview(&second.id, "data:image/png;base64,iVBORw0KGgo=").expect("save preview"));
        assert!(!store.save_preview("missing", "data:image/png;base64,iVBORw0KGgo=").expect("save missing"));
        assert_eq!(
            store.read_preview(&second.id).expect("read preview").as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
        assert!(store.list().expect("list").iter().any(|summary| summary.has_preview));

        assert!(store.delete(&second.id).expect("delete"));
        assert!(!store.delete(&second.id).expect("delete again"));
        assert!(store.read_preview(&second.id).expect("preview after delete").is_none());
        assert_eq!(store.list().expect("list").len(), 1);
    }

    #[test]
    fn memory_store_behaves_like_a_store() {
        exercise_store(&MemoryStore::new());
    }

    #[test]
    fn memory_store_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        let record = sample_record("Ops", &[]);
        store.create(&record).expect("create");
        assert!(matches!(store.create(&record), Err(AppError::Validation(_))));
    }
}
