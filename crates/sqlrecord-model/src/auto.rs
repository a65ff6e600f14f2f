//! Auto-filled timestamp columns.

use crate::model::Model;
use chrono::{DateTime, SubsecRound, Utc};
use sqlrecord_core::{AutoMode, Result, Value};

/// Why a record is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteReason {
    Create,
    Update,
    Upsert,
}

/// Fills auto-managed columns right before a write.
///
/// On-create columns receive the current time only when they hold no value
/// (NULL or the empty string). On-every-write columns are always overwritten.
/// Both apply to every [`WriteReason`].
#[derive(Debug, Clone, Copy)]
pub struct AutoApplicator {
    now: DateTime<Utc>,
}

impl AutoApplicator {
    /// Use `now`, truncated to whole seconds, as the fill value.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: now.trunc_subsecs(0),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Fill the auto columns of `model`. Returns whether anything was set.
    #[tracing::instrument(level = "trace", skip(self, model), fields(model = std::any::type_name::<M>()))]
    #[allow(clippy::result_large_err)]
    pub fn apply<M: Model>(&self, model: &mut M, reason: WriteReason) -> Result<bool> {
        let mut changed = false;
        for column in M::table().columns() {
            let fill = match column.auto {
                AutoMode::None => false,
                AutoMode::OnCreate => model.get(column.property).is_empty(),
                AutoMode::OnEveryWrite => true,
            };
            if fill {
                model.set(column.property, Value::DateTime(self.now))?;
                tracing::trace!(property = column.property, "auto-filled timestamp");
                changed = true;
            }
        }
        Ok(changed)
    }
}
