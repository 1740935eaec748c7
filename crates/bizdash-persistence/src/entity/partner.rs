//! Partner entity, the root of the business hierarchy

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "partner")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub partner_code: String,
    pub partner_name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub setup_completed: bool,
    pub created_at: DateTime,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::micro_cluster::Entity")]
    MicroCluster,
    #[sea_orm(has_many = "super::retailer::Entity")]
    Retailer,
}

impl Related<super::micro_cluster::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MicroCluster.def()
    }
}

impl Related<super::retailer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Retailer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
