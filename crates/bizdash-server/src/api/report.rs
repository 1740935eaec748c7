//! Report endpoints

use actix_web::{HttpResponse, get, web};

use bizdash_persistence::service::report::{self, DashboardSummary, TabularReport};

use crate::error::{AppError, BizdashError};
use crate::model::{AppState, response};

#[get("/dashboard")]
async fn dashboard(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let summary = report::dashboard(&data.database).await?;
    Ok(response::Result::<DashboardSummary>::http_success(summary))
}

/// Reports over ingested data: transactions, rgu, sellin and tertiary
#[get("/{report}")]
async fn ingested(path: web::Path<String>) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    let report = report::ingested(&name).ok_or_else(|| BizdashError::not_found("report", &name))?;

    Ok(response::Result::<TabularReport>::http_success(report))
}
