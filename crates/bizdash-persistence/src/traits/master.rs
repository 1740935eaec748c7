//! Master data entity traits

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::de::DeserializeOwned;

use crate::entity::{
    desa, kecamatan, micro_cluster, partner, partner_territory, retailer, site,
};

/// An entity addressed by a string primary key
pub trait MasterEntity: EntityTrait {
    /// Name used in routes, cache keys and error messages
    const NAME: &'static str;

    fn id_column() -> Self::Column;
}

/// Create and update operations with per-entity input forms
#[async_trait]
pub trait MasterService: MasterEntity {
    type CreateForm: DeserializeOwned + Send + 'static;
    type UpdateForm: DeserializeOwned + Send + 'static;

    /// Validate and insert a new row, returning the stored model
    async fn create<C: ConnectionTrait>(
        db: &C,
        form: Self::CreateForm,
    ) -> anyhow::Result<Self::Model>;

    /// Apply the fields present in `form` to an existing row
    async fn update<C: ConnectionTrait>(
        db: &C,
        id: &str,
        form: Self::UpdateForm,
    ) -> anyhow::Result<Self::Model>;
}

macro_rules! master_entity {
    ($($module:ident => ($name:literal, $id:ident)),+ $(,)?) => {
        $(
            impl MasterEntity for $module::Entity {
                const NAME: &'static str = $name;

                fn id_column() -> Self::Column {
                    $module::Column::$id
                }
            }
        )+
    };
}

master_entity!(
    partner => ("partner", PartnerCode),
    micro_cluster => ("microcluster", McCode),
    partner_territory => ("territory", PtCode),
    kecamatan => ("kecamatan", KecamatanId),
    desa => ("desa", DesaId),
    site => ("site", SiteId),
    retailer => ("retailer", OrganizationId),
);
