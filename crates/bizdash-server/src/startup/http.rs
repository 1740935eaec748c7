//! HTTP server setup.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{
    api,
    error::{AppError, BizdashError},
    middleware::auth::Authentication,
    model::AppState,
};

/// Routes and extractor settings under the context path.
///
/// JSON and query extraction failures answer with the standard error envelope.
pub fn app_config(cfg: &mut web::ServiceConfig, context_path: &str) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(BizdashError::IllegalArgument(err.to_string())).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::from(BizdashError::IllegalArgument(err.to_string())).into()
    }))
    .service(web::scope(context_path).service(api::route::routes()));
}

/// Creates and binds the HTTP server.
pub fn main_server(
    app_state: Arc<AppState>,
    context_path: String,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        let context_path = context_path.clone();
        App::new()
            .wrap(Authentication)
            .wrap(Logger::default())
            .app_data(web::Data::from(app_state.clone()))
            .configure(move |cfg| app_config(cfg, &context_path))
    })
    .bind((address, port))?
    .run())
}
