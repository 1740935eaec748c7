//! MicroCluster entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "microcluster")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub mc_code: String,
    pub mc_name: String,
    pub partner_code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
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
    #[sea_orm(has_many = "super::partner_territory::Entity")]
    PartnerTerritory,
}

impl Related<super::partner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Partner.def()
    }
}

impl Related<super::partner_territory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartnerTerritory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
