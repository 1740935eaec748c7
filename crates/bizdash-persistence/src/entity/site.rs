//! Site entity: a physical installation with a coverage radius
//!
//! `desa_name` is a name reference only, there is no foreign key to `desa`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub site_id: String,
    pub site_name: String,
    pub longitude: f64,
    pub latitude: f64,
    pub category: String,
    pub reach_km: f64,
    pub status: String,
    pub desa_name: String,
    pub tower_height: Option<f64>,
    pub power_source: Option<String>,
    pub installation_date: Option<DateTime>,
    pub last_maintenance: Option<DateTime>,
    pub created_at: DateTime,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::retailer::Entity")]
    Retailer,
}

impl Related<super::retailer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Retailer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
