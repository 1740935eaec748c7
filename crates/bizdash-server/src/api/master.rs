//! Master data endpoints
//!
//! Handlers are generic over the entity. Soft-deletable entities get a delete
//! that only flags the row and a restore route; retailers are deleted for good.

use actix_web::{HttpResponse, Scope, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use bizdash_persistence::entity::{
    desa, kecamatan, micro_cluster, partner, partner_territory, retailer, site,
};
use bizdash_persistence::sea_orm::JsonValue;
use bizdash_persistence::service::{self, retailer as retailer_service};
use bizdash_persistence::{MasterEntity, MasterService, Page, SoftDelete, SoftDeleteEntity};

use crate::error::{AppError, BizdashError};
use crate::model::{AppState, response};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub include_deleted: bool,
    pub page_no: Option<u64>,
    pub page_size: Option<u64>,
}

/// Largest page a listing may ask for
pub const MAX_PAGE_SIZE: u64 = 1000;

impl ListParams {
    /// Page number and size, when paging was requested and both are in range
    fn paging(&self) -> Result<Option<(u64, u64)>, BizdashError> {
        let Some(page_size) = self.page_size else {
            return Ok(None);
        };
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(BizdashError::IllegalArgument(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let page_no = self.page_no.unwrap_or(1);
        if page_no == 0 {
            return Err(BizdashError::IllegalArgument(
                "pageNo starts at 1".to_string(),
            ));
        }
        Ok(Some((page_no, page_size)))
    }
}

fn listing(rows: &[JsonValue], params: &ListParams) -> Result<HttpResponse, AppError> {
    Ok(match params.paging()? {
        Some((page_no, page_size)) => response::Result::<Page<JsonValue>>::http_success(
            Page::slice(rows, page_no, page_size),
        ),
        None => response::Result::<&[JsonValue]>::http_success(rows),
    })
}

async fn list_live<E>(
    data: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError>
where
    E: SoftDeleteEntity,
    E::Model: Serialize,
{
    let rows = service::list_live_cached::<E>(&data.database, params.include_deleted).await?;
    listing(&rows, &params)
}

async fn list_all<E>(
    data: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError>
where
    E: MasterEntity,
    E::Model: Serialize,
{
    let rows = service::list_cached::<E>(&data.database).await?;
    listing(&rows, &params)
}

async fn get_one<E>(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError>
where
    E: MasterEntity,
    E::Model: Serialize,
{
    let model = service::get::<E, _>(data.database.conn(), &path).await?;
    Ok(response::Result::<E::Model>::http_success(model))
}

async fn create<E>(
    data: web::Data<AppState>,
    form: web::Json<E::CreateForm>,
) -> Result<HttpResponse, AppError>
where
    E: MasterService,
    E::Model: Serialize,
{
    let model = service::create::<E>(&data.database, form.into_inner()).await?;
    Ok(response::Result::<E::Model>::http_success(model))
}

async fn update<E>(
    data: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Json<E::UpdateForm>,
) -> Result<HttpResponse, AppError>
where
    E: MasterService,
    E::Model: Serialize,
{
    let model = service::update::<E>(&data.database, &path, form.into_inner()).await?;
    Ok(response::Result::<E::Model>::http_success(model))
}

async fn soft_delete<E>(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError>
where
    E: SoftDeleteEntity,
    E::Model: SoftDelete + Serialize,
{
    let model = service::delete_soft::<E>(&data.database, &path).await?;
    Ok(response::Result::<E::Model>::http_success(model))
}

async fn restore<E>(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError>
where
    E: SoftDeleteEntity,
    E::Model: SoftDelete + Serialize,
{
    let model = service::undelete::<E>(&data.database, &path).await?;
    Ok(response::Result::<E::Model>::http_success(model))
}

async fn hard_delete_retailer(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    retailer_service::remove(&data.database, &id).await?;

    info!(organization_id = %id, "Retailer deleted");
    Ok(response::Result::<JsonValue>::http_success(
        json!({ "organizationId": id, "deleted": true }),
    ))
}

/// CRUD, soft delete and restore routes of a soft-deletable entity
pub fn soft_deletable<E>() -> Scope
where
    E: MasterService + SoftDeleteEntity + 'static,
    E::Model: SoftDelete + Serialize,
{
    web::scope(&format!("/{}", E::NAME))
        .service(
            web::resource("")
                .route(web::get().to(list_live::<E>))
                .route(web::post().to(create::<E>)),
        )
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_one::<E>))
                .route(web::put().to(update::<E>))
                .route(web::delete().to(soft_delete::<E>)),
        )
        .service(web::resource("/{id}/restore").route(web::post().to(restore::<E>)))
}

/// Retailer routes: no restore, delete removes the row
pub fn retailers() -> Scope {
    type E = retailer::Entity;

    web::scope(&format!("/{}", E::NAME))
        .service(
            web::resource("")
                .route(web::get().to(list_all::<E>))
                .route(web::post().to(create::<E>)),
        )
        .service(
            web::resource("/{id}")
                .route(web::get().to(get_one::<E>))
                .route(web::put().to(update::<E>))
                .route(web::delete().to(hard_delete_retailer)),
        )
}

pub fn routes() -> Scope {
    web::scope("/master")
        .service(soft_deletable::<partner::Entity>())
        .service(soft_deletable::<micro_cluster::Entity>())
        .service(soft_deletable::<partner_territory::Entity>())
        .service(soft_deletable::<kecamatan::Entity>())
        .service(soft_deletable::<desa::Entity>())
        .service(soft_deletable::<site::Entity>())
        .service(retailers())
}
