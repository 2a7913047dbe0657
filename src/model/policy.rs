//! Identity, timestamp and soft-delete policies.
//!
//! Creation stamps apply only when a record goes from unsaved to saved, update
//! stamps only when an existing record is rewritten, and soft delete swaps the
//! backend's delete for a marker write.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ModelSettings;
use crate::backend::Backend;
use crate::error::BackendError;
use crate::schema::{self, Document, Meta};

/// Source of the current time for policy stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Assign a fresh id and, if enabled, the creation stamp.
pub(crate) fn prepare_create(meta: &mut Meta, settings: &ModelSettings, clock: &dyn Clock) {
    meta.id = Some(new_id());
    if settings.timestamps {
        meta.created_at = Some(clock.now());
    }
}

pub(crate) fn prepare_update(meta: &mut Meta, settings: &ModelSettings, clock: &dyn Clock) {
    if settings.timestamps {
        meta.updated_at = Some(clock.now());
    }
}

/// Same as [`prepare_update`] for a raw patch. Identity and creation time are
/// stripped so a patch can never rewrite them.
pub(crate) fn prepare_patch(patch: &mut Document, settings: &ModelSettings, clock: &dyn Clock) {
    patch.remove(schema::ID);
    patch.remove(schema::CREATED_AT);
    patch.remove(schema::UPDATED_AT);
    if settings.timestamps {
        if let Ok(stamp) = serde_json::to_value(clock.now()) {
            patch.insert(schema::UPDATED_AT.to_string(), stamp);
        }
    }
}

/// Delete or soft delete per settings. Returns the stamp written by a soft
/// delete so callers can mirror it in memory.
pub(crate) fn remove(
    backend: &dyn Backend,
    id: &str,
    settings: &ModelSettings,
    clock: &dyn Clock,
) -> Result<(bool, Option<DateTime<Utc>>), BackendError> {
    if settings.soft_delete {
        let at = clock.now();
        Ok((backend.soft_delete(id, at)?, Some(at)))
    } else {
        Ok((backend.delete(id)?, None))
    }
}
