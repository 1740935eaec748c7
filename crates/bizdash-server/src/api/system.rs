//! Database diagnostics and cache maintenance

use actix_web::{Responder, get, post, web};
use serde::Serialize;
use tracing::info;

use bizdash_persistence::{DatabaseInfo, DatabaseStatus};

use crate::model::{AppState, response};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseReport {
    pub info: DatabaseInfo,
    pub status: DatabaseStatus,
    pub ping: bool,
}

#[get("/database")]
async fn database(data: web::Data<AppState>) -> impl Responder {
    let report = DatabaseReport {
        info: data.database.info(),
        status: data.database.status().await,
        ping: data.database.ping().await,
    };

    response::Result::<DatabaseReport>::http_success(report)
}

#[post("/cache/clear")]
async fn clear_cache(data: web::Data<AppState>) -> impl Responder {
    data.database.clear_cache();
    info!("Query caches cleared");

    response::Result::<bool>::http_success(true)
}
