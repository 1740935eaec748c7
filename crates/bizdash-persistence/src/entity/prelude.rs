pub use super::desa::Entity as Desa;
pub use super::kecamatan::Entity as Kecamatan;
pub use super::micro_cluster::Entity as MicroCluster;
pub use super::partner::Entity as Partner;
pub use super::partner_territory::Entity as PartnerTerritory;
pub use super::retailer::Entity as Retailer;
pub use super::site::Entity as Site;
