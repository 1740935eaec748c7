//! Partner service

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entity::partner;
use crate::model::now;
use crate::service::validation::{check, validate_code, validate_email, validate_name};
use crate::service::{get, write_error};
use crate::traits::MasterService;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartnerForm {
    pub partner_code: String,
    pub partner_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub setup_completed: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartnerUpdate {
    pub partner_name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub setup_completed: Option<bool>,
}

impl PartnerForm {
    pub fn validate(&self) -> anyhow::Result<()> {
        check("partner_code", validate_code(&self.partner_code))?;
        check("partner_name", validate_name(&self.partner_name))?;
        check("email", validate_email(self.email.as_deref()))?;
        Ok(())
    }
}

#[async_trait]
impl MasterService for partner::Entity {
    type CreateForm = PartnerForm;
    type UpdateForm = PartnerUpdate;

    #[tracing::instrument(skip(db, form), fields(partner_code = %form.partner_code))]
    async fn create<C: ConnectionTrait>(db: &C, form: PartnerForm) -> anyhow::Result<partner::Model> {
        form.validate()?;

        let code = form.partner_code.clone();
        let entity = partner::ActiveModel {
            partner_code: Set(form.partner_code),
            partner_name: Set(form.partner_name),
            contact_person: Set(form.contact_person),
            phone: Set(form.phone),
            email: Set(form.email),
            is_active: Set(form.is_active.unwrap_or(true)),
            setup_completed: Set(form.setup_completed.unwrap_or(false)),
            created_at: Set(now()),
            is_deleted: Set(false),
            deleted_at: Set(None),
        };

        partner::Entity::insert(entity)
            .exec_without_returning(db)
            .await
            .map_err(|e| write_error("partner", &code, e))?;

        get::<partner::Entity, C>(db, &code).await
    }

    #[tracing::instrument(skip(db, form))]
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: PartnerUpdate,
    ) -> anyhow::Result<partner::Model> {
        let mut entity: partner::ActiveModel = get::<partner::Entity, C>(db, id).await?.into();

        if let Some(name) = form.partner_name {
            check("partner_name", validate_name(&name))?;
            entity.partner_name = Set(name);
        }
        if form.contact_person.is_some() {
            entity.contact_person = Set(form.contact_person);
        }
        if form.phone.is_some() {
            entity.phone = Set(form.phone);
        }
        if form.email.is_some() {
            check("email", validate_email(form.email.as_deref()))?;
            entity.email = Set(form.email);
        }
        if let Some(is_active) = form.is_active {
            entity.is_active = Set(is_active);
        }
        if let Some(setup_completed) = form.setup_completed {
            entity.setup_completed = Set(setup_completed);
        }

        entity
            .update(db)
            .await
            .map_err(|e| write_error("partner", id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::service::{self, tests::partner_form};
    use bizdash_common::BizdashError;

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let db = Database::connect_in_memory().await.unwrap();

        let model = service::create::<partner::Entity>(&db, partner_form("P001"))
            .await
            .unwrap();
        assert_eq!(model.partner_code, "P001");
        assert!(model.is_active);
        assert!(!model.setup_completed);
        assert!(!model.is_deleted);
        assert!(model.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_code() {
        let db = Database::connect_in_memory().await.unwrap();
        service::create::<partner::Entity>(&db, partner_form("P001"))
            .await
            .unwrap();

        let err = service::create::<partner::Entity>(&db, partner_form("P001"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BizdashError>(),
            Some(BizdashError::AlreadyExists(_, _))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let db = Database::connect_in_memory().await.unwrap();
        let form = PartnerForm {
            email: Some("nope".to_string()),
            ..partner_form("P001")
        };

        let err = service::create::<partner::Entity>(&db, form)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BizdashError>(),
            Some(BizdashError::IllegalArgument(_))
        ));
        assert!(
            service::find_by_id::<partner::Entity, _>(db.conn(), "P001")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        let form = PartnerForm {
            phone: Some("021-555".to_string()),
            ..partner_form("P001")
        };
        service::create::<partner::Entity>(&db, form).await.unwrap();

        let update = PartnerUpdate {
            partner_name: Some("Renamed".to_string()),
            setup_completed: Some(true),
            ..Default::default()
        };
        let model = service::update::<partner::Entity>(&db, "P001", update)
            .await
            .unwrap();
        assert_eq!(model.partner_name, "Renamed");
        assert!(model.setup_completed);
        assert_eq!(model.phone.as_deref(), Some("021-555"));
    }

    #[tokio::test]
    async fn test_update_missing_partner() {
        let db = Database::connect_in_memory().await.unwrap();

        let err = service::update::<partner::Entity>(&db, "NOPE", PartnerUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BizdashError>(),
            Some(BizdashError::NotFound(_, _))
        ));
    }
}
