//! PartnerTerritory entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "partnerterritory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pt_code: String,
    pub pt_name: String,
    pub mc_code: String,
    pub coverage_description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::micro_cluster::Entity",
        from = "Column::McCode",
        to = "super::micro_cluster::Column::McCode",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    MicroCluster,
    #[sea_orm(has_many = "super::kecamatan::Entity")]
    Kecamatan,
}

impl Related<super::micro_cluster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MicroCluster.def()
    }
}

impl Related<super::kecamatan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kecamatan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
