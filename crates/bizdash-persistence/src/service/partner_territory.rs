//! PartnerTerritory service

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entity::partner_territory;
use crate::model::now;
use crate::service::validation::{check, validate_code, validate_name};
use crate::service::{get, write_error};
use crate::traits::MasterService;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TerritoryForm {
    pub pt_code: String,
    pub pt_name: String,
    pub mc_code: String,
    pub coverage_description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TerritoryUpdate {
    pub pt_name: Option<String>,
    pub mc_code: Option<String>,
    pub coverage_description: Option<String>,
    pub is_active: Option<bool>,
}

impl TerritoryForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("pt_code", validate_code(&self.pt_code))?;
        check("pt_name", validate_name(&self.pt_name))?;
        check("mc_code", validate_code(&self.mc_code))?;
        Ok(())
    }
}

#[async_trait]
impl MasterService for partner_territory::Entity {
    type CreateForm = TerritoryForm;
    type UpdateForm = TerritoryUpdate;

    #[tracing::instrument(skip(db, form), fields(pt_code = %form.pt_code))]
    async fn create<C: ConnectionTrait>(
        db: &C,
        form: TerritoryForm,
    ) -> anyhow::Result<partner_territory::Model> {
        form.validate()?;

        let code = form.pt_code.clone();
        let entity = partner_territory::ActiveModel {
            pt_code: Set(form.pt_code),
            pt_name: Set(form.pt_name),
            mc_code: Set(form.mc_code),
            coverage_description: Set(form.coverage_description),
            is_active: Set(form.is_active.unwrap_or(true)),
            created_at: Set(now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        partner_territory::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("territory", &code, e))?;

        get::<partner_territory::Entity, C>(db, &code).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: TerritoryUpdate,
    ) -> anyhow::Result<partner_territory::Model> {
        let mut entity: partner_territory::ActiveModel =
            get::<partner_territory::Entity, C>(db, id).await?.into();

        if let Some(name) = form.pt_name {
            check("pt_name", validate_name(&name))?;
            entity.pt_name = Set(name);
        }
        if let Some(mc_code) = form.mc_code {
            entity.mc_code = Set(mc_code);
        }
        if form.coverage_description.is_some() {
            entity.coverage_description = Set(form.coverage_description);
        }
        if let Some(is_active) = form.is_active {
            entity.is_active = Set(is_active);
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("territory", id, e))
    }
}
