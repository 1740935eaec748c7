//! Retailer service
//!
//! Retailers have no soft-delete state; [`delete`] removes the row.

use async_trait::async_trait;
use sea_orm::prelude::DateTime;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use bizdash_common::BizdashError;

use crate::db::Database;
use crate::entity::retailer;
use crate::model::now;
use crate::service::validation::{
    DATA_SOURCES, check, validate_code, validate_coordinates, validate_email, validate_name,
    validate_one_of,
};
use crate::service::{get, write_error};
use crate::traits::MasterService;

pub const DEFAULT_DATA_SOURCE: &str = "etl";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RetailerForm {
    pub organization_id: String,
    pub organization_name: String,
    pub outlet_type: String,
    pub partner_code: String,
    pub site_id: String,
    pub data_source: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<String>,
    pub is_active: Option<bool>,
    pub registration_date: Option<DateTime>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RetailerUpdate {
    pub organization_name: Option<String>,
    pub outlet_type: Option<String>,
    pub partner_code: Option<String>,
    pub site_id: Option<String>,
    pub data_source: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<String>,
    pub is_active: Option<bool>,
    pub registration_date: Option<DateTime>,
}

impl RetailerForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("organization_id", validate_code(&self.organization_id))?;
        check("organization_name", validate_name(&self.organization_name))?;
        check("outlet_type", validate_name(&self.outlet_type))?;
        check("partner_code", validate_code(&self.partner_code))?;
        check("site_id", validate_code(&self.site_id))?;
        if let Some(source) = &self.data_source {
            check("data_source", validate_one_of(source, &DATA_SOURCES))?;
        }
        check("email", validate_email(self.email.as_deref()))?;
        check("coordinates", validate_coordinates(self.coordinates.as_deref()))?;
        Ok(())
    }
}

#[async_trait]
impl MasterService for retailer::Entity {
    type CreateForm = RetailerForm;
    type UpdateForm = RetailerUpdate;

    #[tracing::instrument(skip(db, form), fields(organization_id = %form.organization_id))]
    async fn create<C: ConnectionTrait>(
        db: &C,
        form: RetailerForm,
    ) -> anyhow::Result<retailer::Model> {
        form.validate()?;

        let id = form.organization_id.clone();
        let entity = retailer::ActiveModel {
            organization_id: Set(form.organization_id),
            organization_name: Set(form.organization_name),
            outlet_type: Set(form.outlet_type),
            partner_code: Set(form.partner_code),
            site_id: Set(form.site_id),
            data_source: Set(form
                .data_source
                .unwrap_or_else(|| DEFAULT_DATA_SOURCE.to_string())),
            phone: Set(form.phone),
            email: Set(form.email),
            address: Set(form.address),
            coordinates: Set(form.coordinates),
            is_active: Set(form.is_active.unwrap_or(true)),
            registration_date: Set(form.registration_date),
            created_at: Set(now()),
        };

        retailer::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("retailer", &id, e))?;

        get::<retailer::Entity, C>(db, &id).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: RetailerUpdate,
    ) -> anyhow::Result<retailer::Model> {
        let mut entity: retailer::ActiveModel = get::<retailer::Entity, C>(db, id).await?.into();

        if let Some(name) = form.organization_name {
            check("organization_name", validate_name(&name))?;
            entity.organization_name = Set(name);
        }
        if let Some(outlet_type) = form.outlet_type {
            entity.outlet_type = Set(outlet_type);
        }
        if let Some(partner_code) = form.partner_code {
            entity.partner_code = Set(partner_code);
        }
        if let Some(site_id) = form.site_id {
            entity.site_id = Set(site_id);
        }
        if let Some(source) = form.data_source {
            check("data_source", validate_one_of(&source, &DATA_SOURCES))?;
            entity.data_source = Set(source);
        }
        if form.phone.is_some() {
            entity.phone = Set(form.phone);
        }
        if form.email.is_some() {
            check("email", validate_email(form.email.as_deref()))?;
            entity.email = Set(form.email);
        }
        if form.address.is_some() {
            entity.address = Set(form.address);
        }
        if form.coordinates.is_some() {
            check("coordinates", validate_coordinates(form.coordinates.as_deref()))?;
            entity.coordinates = Set(form.coordinates);
        }
        if let Some(is_active) = form.is_active {
            entity.is_active = Set(is_active);
        }
        if form.registration_date.is_some() {
            entity.registration_date = Set(form.registration_date);
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("retailer", id, e))
    }
}

/// Physically delete a retailer row
#[tracing::instrument(skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: &str) -> anyhow::Result<()> {
    let result = retailer::Entity::delete_many()
        .filter(retailer::Column::OrganizationId.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(BizdashError::not_found("retailer", id).into());
    }

    info!("Retailer deleted");
    Ok(())
}

/// Physically delete a retailer inside a scoped write
pub async fn remove(db: &Database, id: &str) -> anyhow::Result<()> {
    let id = id.to_string();
    db.write(move |txn| Box::pin(async move { delete(txn, &id).await }))
        .await
}
