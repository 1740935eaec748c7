//! Retailer entity
//!
//! Retailers carry no soft-delete columns; removing one deletes the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "retailer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: String,
    pub organization_name: String,
    pub outlet_type: String,
    pub partner_code: String,
    pub site_id: String,
    pub data_source: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<String>,
    pub is_active: bool,
    pub registration_date: Option<DateTime>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::PartnerCode",
        to = "super::partner::Column::PartnerCode",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Partner,
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::SiteId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Site,
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
