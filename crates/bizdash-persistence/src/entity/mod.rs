//! SeaORM entity definitions
//!
//! Grouped the way the schema bootstrap creates them:
//! core (partner, microcluster, partnerterritory), geo (kecamatan, desa),
//! infrastructure (site) and business (retailer).

pub mod prelude;

pub mod desa;
pub mod kecamatan;
pub mod micro_cluster;
pub mod partner;
pub mod partner_territory;
pub mod retailer;
pub mod site;
