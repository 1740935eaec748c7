//! MicroCluster service

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entity::micro_cluster;
use crate::model::now;
use crate::service::validation::{check, validate_code, validate_name};
use crate::service::{get, write_error};
use crate::traits::MasterService;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MicroClusterForm {
    pub mc_code: String,
    pub mc_name: String,
    pub partner_code: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MicroClusterUpdate {
    pub mc_name: Option<String>,
    pub partner_code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl MicroClusterForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("mc_code", validate_code(&self.mc_code))?;
        check("mc_name", validate_name(&self.mc_name))?;
        check("partner_code", validate_code(&self.partner_code))?;
        Ok(())
    }
}

#[async_trait]
impl MasterService for micro_cluster::Entity {
    type CreateForm = MicroClusterForm;
    type UpdateForm = MicroClusterUpdate;

    #[tracing::instrument(skip(db, form), fields(mc_code = %form.mc_code))]
    async fn create<C: ConnectionTrait>(
        db: &C,
        form: MicroClusterForm,
    ) -> anyhow::Result<micro_cluster::Model> {
        form.validate()?;

        let code = form.mc_code.clone();
        let entity = micro_cluster::ActiveModel {
            mc_code: Set(form.mc_code),
            mc_name: Set(form.mc_name),
            partner_code: Set(form.partner_code),
            description: Set(form.description),
            is_active: Set(form.is_active.unwrap_or(true)),
            created_at: Set(now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        micro_cluster::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("microcluster", &code, e))?;

        get::<micro_cluster::Entity, C>(db, &code).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: MicroClusterUpdate,
    ) -> anyhow::Result<micro_cluster::Model> {
        let mut entity: micro_cluster::ActiveModel =
            get::<micro_cluster::Entity, C>(db, id).await?.into();

        if let Some(name) = form.mc_name {
            check("mc_name", validate_name(&name))?;
            entity.mc_name = Set(name);
        }
        if let Some(partner_code) = form.partner_code {
            entity.partner_code = Set(partner_code);
        }
        if form.description.is_some() {
            entity.description = Set(form.description);
        }
        if let Some(is_active) = form.is_active {
            entity.is_active = Set(is_active);
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("microcluster", id, e))
    }
}
