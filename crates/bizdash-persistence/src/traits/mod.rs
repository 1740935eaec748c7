//! Capability traits over the SeaORM entities
//!
//! Every entity is a [`MasterEntity`] with a string primary key and a
//! create/update service. All entities except Retailer are also
//! [`SoftDeleteEntity`]s whose models implement [`SoftDelete`]; Retailer
//! implements neither soft-delete trait, so only a destructive delete exists
//! for it.

pub mod master;
pub mod soft_delete;

pub use master::{MasterEntity, MasterService};
pub use soft_delete::{SoftDelete, SoftDeleteEntity};
