//! Override administration
//!
//! Every successful write invalidates the override cache before returning.

use std::sync::Arc;
use tracing::info;

use crate::cache::OverrideCache;
use crate::error::SourceError;
use crate::loader::{OverrideStore, SourceResult};
use crate::records::RawOverrideRow;

pub struct OverrideAdmin {
    store: Arc<dyn OverrideStore>,
    cache: Arc<OverrideCache>,
}

impl OverrideAdmin {
    pub fn new(store: Arc<dyn OverrideStore>, cache: Arc<OverrideCache>) -> Self {
        Self { store, cache }
    }

    pub async fn insert(&self, row: RawOverrideRow) -> SourceResult<()> {
        let validated = row.validate()?;
        self.store.insert_override(row).await?;
        self.cache.invalidate().await;
        info!(id = %validated.id, term = %validated.forbidden_term, "Inserted guardrail override");
        Ok(())
    }

    pub async fn update(&self, row: RawOverrideRow) -> SourceResult<()> {
        let validated = row.validate()?;
        if !self.store.update_override(row).await? {
            return Err(SourceError::Unavailable(format!(
                "override {} not found",
                validated.id
            )));
        }
        self.cache.invalidate().await;
        info!(id = %validated.id, active = validated.active, "Updated guardrail override");
        Ok(())
    }

    /// Returns `false` if nothing was deleted; the cache is left alone then.
    pub async fn delete(&self, id: &str) -> SourceResult<bool> {
        let deleted = self.store.delete_override(id).await?;
        if deleted {
            self.cache.invalidate().await;
            info!(id = %id, "Deleted guardrail override");
        }
        Ok(deleted)
    }
}
