//! Site service

use async_trait::async_trait;
use sea_orm::prelude::DateTime;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entity::site;
use crate::model::now;
use crate::service::validation::{
    SITE_CATEGORIES, SITE_STATUSES, check, validate_code, validate_latitude, validate_longitude,
    validate_name, validate_one_of, validate_positive,
};
use crate::service::{get, write_error};
use crate::traits::MasterService;

pub const DEFAULT_REACH_KM: f64 = 2.0;
pub const DEFAULT_STATUS: &str = "active";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteForm {
    pub site_id: String,
    pub site_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub category: String,
    pub reach_km: Option<f64>,
    pub status: Option<String>,
    pub desa_name: String,
    pub tower_height: Option<f64>,
    pub power_source: Option<String>,
    pub installation_date: Option<DateTime>,
    pub last_maintenance: Option<DateTime>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteUpdate {
    pub site_name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub category: Option<String>,
    pub reach_km: Option<f64>,
    pub status: Option<String>,
    pub desa_name: Option<String>,
    pub tower_height: Option<f64>,
    pub power_source: Option<String>,
    pub installation_date: Option<DateTime>,
    pub last_maintenance: Option<DateTime>,
}

impl SiteForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("site_id", validate_code(&self.site_id))?;
        check("site_name", validate_name(&self.site_name))?;
        check("longitude", validate_longitude(self.longitude))?;
        check("latitude", validate_latitude(self.latitude))?;
        check("category", validate_one_of(&self.category, &SITE_CATEGORIES))?;
        check("desa_name", validate_name(&self.desa_name))?;
        if let Some(reach_km) = self.reach_km {
            check("reach_km", validate_positive(reach_km))?;
        }
        if let Some(status) = &self.status {
            check("status", validate_one_of(status, &SITE_STATUSES))?;
        }
        Ok(())
    }
}

#[async_trait]
impl MasterService for site::Entity {
    type CreateForm = SiteForm;
    type UpdateForm = SiteUpdate;

    #[tracing::instrument(skip(db, form), fields(site_id = %form.site_id))]
    async fn create<C: ConnectionTrait>(db: &C, form: SiteForm) -> anyhow::Result<site::Model> {
        form.validate()?;

        let id = form.site_id.clone();
        let entity = site::ActiveModel {
            site_id: Set(form.site_id),
            site_name: Set(form.site_name),
            longitude: Set(form.longitude),
            latitude: Set(form.latitude),
            category: Set(form.category),
            reach_km: Set(form.reach_km.unwrap_or(DEFAULT_REACH_KM)),
            status: Set(form.status.unwrap_or_else(|| DEFAULT_STATUS.to_string())),
            desa_name: Set(form.desa_name),
            tower_height: Set(form.tower_height),
            power_source: Set(form.power_source),
            installation_date: Set(form.installation_date),
            last_maintenance: Set(form.last_maintenance),
            created_at: Set(now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        site::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("site", &id, e))?;

        get::<site::Entity, C>(db, &id).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: SiteUpdate,
    ) -> anyhow::Result<site::Model> {
        let mut entity: site::ActiveModel = get::<site::Entity, C>(db, id).await?.into();

        if let Some(name) = form.site_name {
            check("site_name", validate_name(&name))?;
            entity.site_name = Set(name);
        }
        if let Some(longitude) = form.longitude {
            check("longitude", validate_longitude(longitude))?;
            entity.longitude = Set(longitude);
        }
        if let Some(latitude) = form.latitude {
            check("latitude", validate_latitude(latitude))?;
            entity.latitude = Set(latitude);
        }
        if let Some(category) = form.category {
            check("category", validate_one_of(&category, &SITE_CATEGORIES))?;
            entity.category = Set(category);
        }
        if let Some(reach_km) = form.reach_km {
            check("reach_km", validate_positive(reach_km))?;
            entity.reach_km = Set(reach_km);
        }
        if let Some(status) = form.status {
            check("status", validate_one_of(&status, &SITE_STATUSES))?;
            entity.status = Set(status);
        }
        if let Some(desa_name) = form.desa_name {
            entity.desa_name = Set(desa_name);
        }
        if form.tower_height.is_some() {
            entity.tower_height = Set(form.tower_height);
        }
        if form.power_source.is_some() {
            entity.power_source = Set(form.power_source);
        }
        if form.installation_date.is_some() {
            entity.installation_date = Set(form.installation_date);
        }
        if form.last_maintenance.is_some() {
            entity.last_maintenance = Set(form.last_maintenance);
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("site", id, e))
    }
}
