use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::cache::TtlCache;
use crate::errors::{AppError, AppResult};
use crate::models::{TemplateRecord, TemplateSummary};
use crate::store::TemplateStore;

/// Listing, search and deletion over stored templates, with a short-lived
/// cache in front of preview images.
pub struct GalleryIndex {
    store: Arc<dyn TemplateStore>,
    previews: Mutex<TtlCache<String, Option<String>>>,
}

impl GalleryIndex {
    pub fn new(store: Arc<dyn TemplateStore>, preview_ttl: Duration) -> Self {
        Self {
            store,
            previews: Mutex::new(TtlCache::new(preview_ttl)),
        }
    }

    pub fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    pub fn list(&self) -> AppResult<Vec<TemplateSummary>> {
        self.store.list()
    }

    /// Case-insensitive substring match on name, description or any tag.
    /// A blank query returns every template.
    pub fn search(&self, query: &str) -> AppResult<Vec<TemplateSummary>> {
        let needle = query.trim().to_lowercase();
        let summaries = self.store.list()?;
        if needle.is_empty() {
            return Ok(summaries);
        }
        Ok(summaries
            .into_iter()
            .filter(|summary| matches_query(summary, &needle))
            .collect())
    }

    pub fn get(&self, id: &str) -> AppResult<TemplateRecord> {
        self.store
            .read(id)?
            .ok_or_else(|| AppError::NotFound(format!("Template not found: {}", id)))
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(id)? {
            return Err(AppError::NotFound(format!("Template not found: {}", id)));
        }
        self.invalidate_preview(id)?;
        tracing::info!(template_id = %id, "deleted template");
        Ok(())
    }

    /// The cache lock is held across the store read so an invalidation
    /// cannot slip in between the read and the insert.
    pub fn preview(&self, id: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        let key = id.to_string();
        let mut cache = self.cache()?;
        if let Some(cached) = cache.get(&key, now) {
            tracing::debug!(template_id = %id, "preview cache hit");
            return Ok(cached);
        }
        let preview = self.store.read_preview(id)?;
        cache.purge_expired(now);
        cache.insert(key, preview.clone(), now);
        Ok(preview)
    }

    pub fn invalidate_preview(&self, id: &str) -> AppResult<()> {
        self.cache()?.invalidate(&id.to_string());
        Ok(())
    }

    fn cache(&self) -> AppResult<std::sync::MutexGuard<'_, TtlCache<String, Option<String>>>> {
        self.previews
            .lock()
            .map_err(|_| AppError::Internal("preview cache mutex poisoned".to_string()))
    }
}

/// `needle` must already be lowercased.
pub fn matches_query(summary: &TemplateSummary, needle: &str) -> bool {
    summary.name.to_lowercase().contains(needle)
        || summary.description.to_lowercase().contains(needle)
        || summary.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
}
