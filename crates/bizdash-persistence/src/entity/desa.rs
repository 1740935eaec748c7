//! Desa (village) entity, leaf of the geographic hierarchy

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "desa")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub desa_id: String,
    pub desa_name: String,
    pub kecamatan_id: String,
    pub postal_code: Option<String>,
    pub population: Option<i32>,
    pub area_km2: Option<f64>,
    pub created_at: DateTime,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kecamatan::Entity",
        from = "Column::KecamatanId",
        to = "super::kecamatan::Column::KecamatanId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Kecamatan,
}

impl Related<super::kecamatan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kecamatan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
