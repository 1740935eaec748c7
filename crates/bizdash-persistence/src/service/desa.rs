//! Desa service

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entity::desa;
use crate::model::now;
use crate::service::validation::{check, validate_code, validate_name, validate_positive};
use crate::service::{get, write_error};
use crate::traits::MasterService;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DesaForm {
    pub desa_id: String,
    pub desa_name: String,
    pub kecamatan_id: String,
    pub postal_code: Option<String>,
    pub population: Option<i32>,
    pub area_km2: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DesaUpdate {
    pub desa_name: Option<String>,
    pub kecamatan_id: Option<String>,
    pub postal_code: Option<String>,
    pub population: Option<i32>,
    pub area_km2: Option<f64>,
}

impl DesaForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("desa_id", validate_code(&self.desa_id))?;
        check("desa_name", validate_name(&self.desa_name))?;
        check("kecamatan_id", validate_code(&self.kecamatan_id))?;
        if let Some(area) = self.area_km2 {
            check("area_km2", validate_positive(area))?;
        }
        Ok(())
    }
}

#[async_trait]
impl MasterService for desa::Entity {
    type CreateForm = DesaForm;
    type UpdateForm = DesaUpdate;

    #[tracing::instrument(skip(db, form), fields(desa_id = %form.desa_id))]
    async fn create<C: ConnectionTrait>(db: &C, form: DesaForm) -> anyhow::Result<desa::Model> {
        form.validate()?;

        let id = form.desa_id.clone();
        let entity = desa::ActiveModel {
            desa_id: Set(form.desa_id),
            desa_name: Set(form.desa_name),
            kecamatan_id: Set(form.kecamatan_id),
            postal_code: Set(form.postal_code),
            population: Set(form.population),
            area_km2: Set(form.area_km2),
            created_at: Set(now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        desa::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("desa", &id, e))?;

        get::<desa::Entity, C>(db, &id).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: DesaUpdate,
    ) -> anyhow::Result<desa::Model> {
        let mut entity: desa::ActiveModel = get::<desa::Entity, C>(db, id).await?.into();

        if let Some(name) = form.desa_name {
            check("desa_name", validate_name(&name))?;
            entity.desa_name = Set(name);
        }
        if let Some(kecamatan_id) = form.kecamatan_id {
            entity.kecamatan_id = Set(kecamatan_id);
        }
        if form.postal_code.is_some() {
            entity.postal_code = Set(form.postal_code);
        }
        if form.population.is_some() {
            entity.population = Set(form.population);
        }
        if let Some(area) = form.area_km2 {
            check("area_km2", validate_positive(area))?;
            entity.area_km2 = Set(Some(area));
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("desa", id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::entity::{kecamatan, micro_cluster, partner, partner_territory};
    use crate::service::kecamatan::KecamatanForm;
    use crate::service::micro_cluster::MicroClusterForm;
    use crate::service::partner_territory::TerritoryForm;
    use crate::service::{self, tests::partner_form};
    use bizdash_common::BizdashError;

    fn is_parent_missing(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<BizdashError>(),
            Some(BizdashError::ParentNotFound(_))
        )
    }

    fn territory(code: &str, mc_code: &str) -> TerritoryForm {
        TerritoryForm {
            pt_code: code.to_string(),
            pt_name: format!("Territory {code}"),
            mc_code: mc_code.to_string(),
            ..Default::default()
        }
    }

    fn kecamatan(id: &str, pt_code: &str) -> KecamatanForm {
        KecamatanForm {
            kecamatan_id: id.to_string(),
            kecamatan_name: format!("Kecamatan {id}"),
            pt_code: pt_code.to_string(),
            ..Default::default()
        }
    }

    fn desa(id: &str, kecamatan_id: &str) -> DesaForm {
        DesaForm {
            desa_id: id.to_string(),
            desa_name: format!("Desa {id}"),
            kecamatan_id: kecamatan_id.to_string(),
            area_km2: Some(3.5),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_hierarchy_requires_existing_parents() {
        let db = Database::connect_in_memory().await.unwrap();

        let err = service::create::<partner_territory::Entity>(&db, territory("PT01", "MC01"))
            .await
            .unwrap_err();
        assert!(is_parent_missing(&err));

        let err = service::create::<kecamatan::Entity>(&db, kecamatan("K01", "PT01"))
            .await
            .unwrap_err();
        assert!(is_parent_missing(&err));

        let err = service::create::<desa::Entity>(&db, desa("D01", "K01"))
            .await
            .unwrap_err();
        assert!(is_parent_missing(&err));

        service::create::<partner::Entity>(&db, partner_form("P001"))
            .await
            .unwrap();
        service::create::<micro_cluster::Entity>(
            &db,
            MicroClusterForm {
                mc_code: "MC01".to_string(),
                mc_name: "Cluster".to_string(),
                partner_code: "P001".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        service::create::<partner_territory::Entity>(&db, territory("PT01", "MC01"))
            .await
            .unwrap();
        service::create::<kecamatan::Entity>(&db, kecamatan("K01", "PT01"))
            .await
            .unwrap();
        let model = service::create::<desa::Entity>(&db, desa("D01", "K01"))
            .await
            .unwrap();
        assert_eq!(model.kecamatan_id, "K01");
        assert_eq!(model.area_km2, Some(3.5));
    }

    #[tokio::test]
    async fn test_soft_deleted_parent_still_satisfies_foreign_key() {
        let db = Database::connect_in_memory().await.unwrap();
        service::create::<partner::Entity>(&db, partner_form("P001"))
            .await
            .unwrap();
        service::delete_soft::<partner::Entity>(&db, "P001")
            .await
            .unwrap();

        let result = service::create::<micro_cluster::Entity>(
            &db,
            MicroClusterForm {
                mc_code: "MC01".to_string(),
                mc_name: "Cluster".to_string(),
                partner_code: "P001".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(result.is_ok());
    }
}
