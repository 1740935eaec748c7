//! Kecamatan service

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entity::kecamatan;
use crate::model::now;
use crate::service::validation::{check, validate_code, validate_name};
use crate::service::{get, write_error};
use crate::traits::MasterService;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KecamatanForm {
    pub kecamatan_id: String,
    pub kecamatan_name: String,
    pub pt_code: String,
    pub postal_code: Option<String>,
    pub population: Option<i32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KecamatanUpdate {
    pub kecamatan_name: Option<String>,
    pub pt_code: Option<String>,
    pub postal_code: Option<String>,
    pub population: Option<i32>,
}

impl KecamatanForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("kecamatan_id", validate_code(&self.kecamatan_id))?;
        check("kecamatan_name", validate_name(&self.kecamatan_name))?;
        check("pt_code", validate_code(&self.pt_code))?;
        Ok(())
    }
}

#[async_trait]
impl MasterService for kecamatan::Entity {
    type CreateForm = KecamatanForm;
    type UpdateForm = KecamatanUpdate;

    #[tracing::instrument(skip(db, form), fields(kecamatan_id = %form.kecamatan_id))]
    async fn create<C: ConnectionTrait>(
        db: &C,
        form: KecamatanForm,
    ) -> anyhow::Result<kecamatan::Model> {
        form.validate()?;

        let id = form.kecamatan_id.clone();
        let entity = kecamatan::ActiveModel {
            kecamatan_id: Set(form.kecamatan_id),
            kecamatan_name: Set(form.kecamatan_name),
            pt_code: Set(form.pt_code),
            postal_code: Set(form.postal_code),
            population: Set(form.population),
            created_at: Set(now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        kecamatan::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("kecamatan", &id, e))?;

        get::<kecamatan::Entity, C>(db, &id).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: KecamatanUpdate,
    ) -> anyhow::Result<kecamatan::Model> {
        let mut entity: kecamatan::ActiveModel = get::<kecamatan::Entity, C>(db, id).await?.into();

        if let Some(name) = form.kecamatan_name {
            check("kecamatan_name", validate_name(&name))?;
            entity.kecamatan_name = Set(name);
        }
        if let Some(pt_code) = form.pt_code {
            entity.pt_code = Set(pt_code);
        }
        if form.postal_code.is_some() {
            entity.postal_code = Set(form.postal_code);
        }
        if form.population.is_some() {
            entity.population = Set(form.population);
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("kecamatan", id, e))
    }
}
