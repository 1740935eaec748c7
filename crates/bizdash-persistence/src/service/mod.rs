//! Entity services
//!
//! Generic reads and soft-delete transitions work over any entity that
//! carries the matching capability trait. Create and update live with each
//! entity's input forms.

pub mod desa;
pub mod kecamatan;
pub mod micro_cluster;
pub mod partner;
pub mod partner_territory;
pub mod report;
pub mod retailer;
pub mod site;
pub mod validation;

use sea_orm::prelude::DateTime;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JsonValue, QueryFilter, QueryOrder, SqlErr,
};
use serde::Serialize;
use tracing::{debug, info};

use bizdash_common::BizdashError;

use crate::db::{Database, Rows};
use crate::model::QueryCategory;
use crate::traits::{MasterEntity, MasterService, SoftDelete, SoftDeleteEntity};

/// Classify a failed insert or update of `entity` row `id`
pub(crate) fn write_error(entity: &str, id: &str, err: DbErr) -> anyhow::Error {
    let message = err.to_string();
    let unique = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || message.contains("UNIQUE constraint failed");
    let foreign_key = matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
        || message.contains("FOREIGN KEY constraint failed");

    if unique {
        BizdashError::already_exists(entity, id).into()
    } else if foreign_key {
        BizdashError::ParentNotFound(format!("{entity} '{id}' references a missing parent")).into()
    } else {
        BizdashError::DatabaseError(message).into()
    }
}

pub async fn find_by_id<E, C>(db: &C, id: &str) -> anyhow::Result<Option<E::Model>>
where
    E: MasterEntity,
    C: ConnectionTrait,
{
    Ok(E::find().filter(E::id_column().eq(id)).one(db).await?)
}

/// Load one row, failing with `NotFound` when it does not exist
pub async fn get<E, C>(db: &C, id: &str) -> anyhow::Result<E::Model>
where
    E: MasterEntity,
    C: ConnectionTrait,
{
    find_by_id::<E, C>(db, id)
        .await?
        .ok_or_else(|| BizdashError::not_found(E::NAME, id).into())
}

/// Every row ordered by primary key
pub async fn list<E, C>(db: &C) -> anyhow::Result<Vec<E::Model>>
where
    E: MasterEntity,
    C: ConnectionTrait,
{
    Ok(E::find().order_by_asc(E::id_column()).all(db).await?)
}

/// Rows that are not soft-deleted, or every row when `include_deleted` is set
pub async fn list_live<E, C>(db: &C, include_deleted: bool) -> anyhow::Result<Vec<E::Model>>
where
    E: SoftDeleteEntity,
    C: ConnectionTrait,
{
    let mut query = E::find();
    if !include_deleted {
        query = query.filter(E::is_deleted_column().eq(false));
    }

    Ok(query.order_by_asc(E::id_column()).all(db).await?)
}

/// Mark a row as deleted. Deleting an already deleted row changes nothing.
#[tracing::instrument(skip(db), fields(entity = E::NAME))]
pub async fn soft_delete<E, C>(db: &C, id: &str) -> anyhow::Result<E::Model>
where
    E: SoftDeleteEntity,
    E::Model: SoftDelete,
    C: ConnectionTrait,
{
    let mut model = get::<E, C>(db, id).await?;
    if model.is_deleted() {
        debug!("Already deleted");
        return Ok(model);
    }

    model.soft_delete();
    store_deleted_state::<E, C>(db, id, model.is_deleted(), model.deleted_at()).await?;

    info!("Soft deleted");
    Ok(model)
}

/// Clear the deleted flag and timestamp of a row
#[tracing::instrument(skip(db), fields(entity = E::NAME))]
pub async fn restore<E, C>(db: &C, id: &str) -> anyhow::Result<E::Model>
where
    E: SoftDeleteEntity,
    E::Model: SoftDelete,
    C: ConnectionTrait,
{
    let mut model = get::<E, C>(db, id).await?;
    if !model.is_deleted() {
        debug!("Not deleted");
        return Ok(model);
    }

    model.restore();
    store_deleted_state::<E, C>(db, id, model.is_deleted(), model.deleted_at()).await?;

    info!("Restored");
    Ok(model)
}

async fn store_deleted_state<E, C>(
    db: &C,
    id: &str,
    is_deleted: bool,
    deleted_at: Option<DateTime>,
) -> anyhow::Result<()>
where
    E: SoftDeleteEntity,
    C: ConnectionTrait,
{
    E::update_many()
        .col_expr(E::is_deleted_column(), Expr::value(is_deleted))
        .col_expr(E::deleted_at_column(), Expr::value(deleted_at))
        .filter(E::id_column().eq(id))
        .exec(db)
        .await?;
    Ok(())
}

fn to_rows<M: Serialize>(models: &[M]) -> anyhow::Result<Vec<JsonValue>> {
    models
        .iter()
        .map(|m| serde_json::to_value(m).map_err(anyhow::Error::from))
        .collect()
}

/// Rows of a soft-deletable entity through the master data cache
pub async fn list_live_cached<E>(db: &Database, include_deleted: bool) -> anyhow::Result<Rows>
where
    E: SoftDeleteEntity,
    E::Model: Serialize,
{
    let key = format!("master:{}:{}", E::NAME, include_deleted);
    db.cached(&key, QueryCategory::Master, || async {
        to_rows(&list_live::<E, _>(db.conn(), include_deleted).await?)
    })
    .await
}

/// Every row of an entity through the master data cache
pub async fn list_cached<E>(db: &Database) -> anyhow::Result<Rows>
where
    E: MasterEntity,
    E::Model: Serialize,
{
    let key = format!("master:{}", E::NAME);
    db.cached(&key, QueryCategory::Master, || async {
        to_rows(&list::<E, _>(db.conn()).await?)
    })
    .await
}

/// Create a row inside a scoped write
pub async fn create<E: MasterService>(
    db: &Database,
    form: E::CreateForm,
) -> anyhow::Result<E::Model> {
    db.write(move |txn| {
        Box::pin(async move { <E as MasterService>::create(txn, form).await })
    })
    .await
}

/// Update a row inside a scoped write
pub async fn update<E: MasterService>(
    db: &Database,
    id: &str,
    form: E::UpdateForm,
) -> anyhow::Result<E::Model> {
    let id = id.to_string();
    db.write(move |txn| {
        Box::pin(async move { <E as MasterService>::update(txn, &id, form).await })
    })
    .await
}

/// Soft delete a row inside a scoped write
pub async fn delete_soft<E>(db: &Database, id: &str) -> anyhow::Result<E::Model>
where
    E: SoftDeleteEntity,
    E::Model: SoftDelete,
{
    let id = id.to_string();
    db.write(move |txn| Box::pin(async move { soft_delete::<E, _>(txn, &id).await }))
        .await
}

/// Restore a soft-deleted row inside a scoped write
pub async fn undelete<E>(db: &Database, id: &str) -> anyhow::Result<E::Model>
where
    E: SoftDeleteEntity,
    E::Model: SoftDelete,
{
    let id = id.to_string();
    db.write(move |txn| Box::pin(async move { restore::<E, _>(txn, &id).await }))
        .await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::entity::{micro_cluster, partner, site};

    pub(crate) fn partner_form(code: &str) -> super::partner::PartnerForm {
        super::partner::PartnerForm {
            partner_code: code.to_string(),
            partner_name: format!("Partner {code}"),
            ..Default::default()
        }
    }

    pub(crate) fn site_form(id: &str) -> super::site::SiteForm {
        super::site::SiteForm {
            site_id: id.to_string(),
            site_name: format!("Site {id}"),
            longitude: 106.82,
            latitude: -6.17,
            category: "technical".to_string(),
            desa_name: "Menteng".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore_persist() {
        let db = Database::connect_in_memory().await.unwrap();
        create::<partner::Entity>(&db, partner_form("P001")).await.unwrap();

        let deleted = delete_soft::<partner::Entity>(&db, "P001").await.unwrap();
        assert!(deleted.is_deleted);
        assert!(deleted.deleted_at.is_some());

        let stored = get::<partner::Entity, _>(db.conn(), "P001").await.unwrap();
        assert!(stored.is_deleted);
        assert_eq!(stored.deleted_at, deleted.deleted_at);

        let live = list_live::<partner::Entity, _>(db.conn(), false).await.unwrap();
        assert!(live.is_empty());
        let all = list_live::<partner::Entity, _>(db.conn(), true).await.unwrap();
        assert_eq!(all.len(), 1);

        let restored = undelete::<partner::Entity>(&db, "P001").await.unwrap();
        assert!(!restored.is_deleted);
        assert!(restored.deleted_at.is_none());

        let stored = get::<partner::Entity, _>(db.conn(), "P001").await.unwrap();
        assert!(!stored.is_deleted);
        assert!(stored.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_scoped_update_is_visible_through_cache() {
        let db = Database::connect_in_memory().await.unwrap();
        create::<partner::Entity>(&db, partner_form("P001")).await.unwrap();
        let rows = list_cached::<partner::Entity>(&db).await.unwrap();
        assert_eq!(rows[0]["partner_name"], "Partner P001");

        let form = super::partner::PartnerUpdate {
            partner_name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = update::<partner::Entity>(&db, "P001", form).await.unwrap();
        assert_eq!(updated.partner_name, "Renamed");

        let rows = list_cached::<partner::Entity>(&db).await.unwrap();
        assert_eq!(rows[0]["partner_name"], "Renamed");

        let err = update::<partner::Entity>(&db, "MISSING", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BizdashError>(),
            Some(BizdashError::NotFound(_, _))
        ));
    }

    #[tokio::test]
    async fn test_soft_delete_twice_keeps_first_timestamp() {
        let db = Database::connect_in_memory().await.unwrap();
        create::<site::Entity>(&db, site_form("S001")).await.unwrap();

        let first = delete_soft::<site::Entity>(&db, "S001").await.unwrap();
        let second = delete_soft::<site::Entity>(&db, "S001").await.unwrap();
        assert!(second.is_deleted);
        assert_eq!(first.deleted_at, second.deleted_at);
    }

    #[tokio::test]
    async fn test_soft_delete_missing_row() {
        let db = Database::connect_in_memory().await.unwrap();

        let err = delete_soft::<micro_cluster::Entity>(&db, "MISSING")
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BizdashError>(),
            Some(BizdashError::NotFound(_, _))
        ));
    }

    #[tokio::test]
    async fn test_cached_list_sees_committed_writes() {
        let db = Database::connect_in_memory().await.unwrap();

        let rows = list_live_cached::<partner::Entity>(&db, false).await.unwrap();
        assert!(rows.is_empty());

        create::<partner::Entity>(&db, partner_form("P001")).await.unwrap();
        let rows = list_live_cached::<partner::Entity>(&db, false).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["partner_code"], "P001");

        delete_soft::<partner::Entity>(&db, "P001").await.unwrap();
        let rows = list_live_cached::<partner::Entity>(&db, false).await.unwrap();
        assert!(rows.is_empty());
        let rows = list_live_cached::<partner::Entity>(&db, true).await.unwrap();
        assert_eq!(rows[0]["is_deleted"], true);
    }
}
