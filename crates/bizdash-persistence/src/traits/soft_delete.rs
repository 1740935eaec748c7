//! Soft-delete capability
//!
//! A soft-deleted row keeps its data with `is_deleted = true` and the time of
//! deletion in `deleted_at`. Restoring clears both.

use sea_orm::EntityTrait;
use sea_orm::prelude::DateTime;

use super::MasterEntity;
use crate::entity::{desa, kecamatan, micro_cluster, partner, partner_territory, site};
use crate::model::now;

/// Soft-delete state transitions on a loaded model
pub trait SoftDelete {
    fn is_deleted(&self) -> bool;

    fn deleted_at(&self) -> Option<DateTime>;

    /// Mark as deleted. A model that is already deleted keeps its original `deleted_at`.
    fn soft_delete(&mut self);

    /// Clear the deleted flag and timestamp
    fn restore(&mut self);
}

/// Entities whose table carries the soft-delete columns
pub trait SoftDeleteEntity: MasterEntity + EntityTrait {
    fn is_deleted_column() -> Self::Column;

    fn deleted_at_column() -> Self::Column;
}

macro_rules! soft_deletable {
    ($($module:ident),+ $(,)?) => {
        $(
            impl SoftDelete for $module::Model {
                fn is_deleted(&self) -> bool {
                    self.is_deleted
                }

                fn deleted_at(&self) -> Option<DateTime> {
                    self.deleted_at
                }

                fn soft_delete(&mut self) {
                    if !self.is_deleted {
                        self.is_deleted = true;
                        self.deleted_at = Some(now());
                    }
                }

                fn restore(&mut self) {
                    self.is_deleted = false;
                    self.deleted_at = None;
                }
            }

            impl SoftDeleteEntity for $module::Entity {
                fn is_deleted_column() -> Self::Column {
                    $module::Column::IsDeleted
                }

                fn deleted_at_column() -> Self::Column {
                    $module::Column::DeletedAt
                }
            }
        )+
    };
}

soft_deletable!(partner, micro_cluster, partner_territory, kecamatan, desa, site);
