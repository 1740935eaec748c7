//! Kecamatan (sub-district) entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "kecamatan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub kecamatan_id: String,
    pub kecamatan_name: String,
    pub pt_code: String,
    pub postal_code: Option<String>,
    pub population: Option<i32>,
    pub created_at: DateTime,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::partner_territory::Entity",
        from = "Column::PtCode",
        to = "super::partner_territory::Column::PtCode",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    PartnerTerritory,
    #[sea_orm(has_many = "super::desa::Entity")]
    Desa,
}

impl Related<super::partner_territory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PartnerTerritory.def()
    }
}

impl Related<super::desa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Desa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
