//! Common test utilities for HTTP testing
//!
//! - `app_state`: application state over an in-memory database
//! - `init_app!`: test service with the session middleware and every route
//! - request builders for login, JSON bodies and multipart uploads

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::test::TestRequest;

use bizdash_persistence::Database;
use bizdash_server::model::{AppState, Configuration, SESSION_COOKIE};

pub const CONTEXT_PATH: &str = "/bizdash";

pub const BOUNDARY: &str = "bizdash-test-boundary";

/// Build the test service for an `Arc<AppState>`. Needs `#[macro_use] mod common;`.
macro_rules! init_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(bizdash_server::middleware::auth::Authentication)
                .app_data(actix_web::web::Data::from($state.clone()))
                .configure(|cfg| {
                    bizdash_server::startup::app_config(cfg, common::CONTEXT_PATH)
                }),
        )
        .await
    };
}

pub async fn app_state() -> Arc<AppState> {
    let database = Database::connect_in_memory()
        .await
        .expect("in-memory database");
    Arc::new(AppState::new(Configuration::default(), database))
}

pub fn url(path: &str) -> String {
    format!("{CONTEXT_PATH}{path}")
}

pub fn login() -> TestRequest {
    TestRequest::post().uri(&url("/v1/auth/login"))
}

/// Session cookie set by a login response
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("session cookie")
}

pub fn get(path: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::get().uri(&url(path)).cookie(cookie.clone())
}

pub fn post(path: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::post().uri(&url(path)).cookie(cookie.clone())
}

pub fn put(path: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::put().uri(&url(path)).cookie(cookie.clone())
}

pub fn delete(path: &str, cookie: &Cookie<'static>) -> TestRequest {
    TestRequest::delete().uri(&url(path)).cookie(cookie.clone())
}

/// Multipart upload of `(file name, content)` pairs
pub fn upload(files: &[(&str, &str)], cookie: &Cookie<'static>) -> TestRequest {
    let mut body = String::new();
    for (name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    upload_raw(body, cookie)
}

/// Upload a hand-built multipart body framed by `BOUNDARY`
pub fn upload_raw(body: String, cookie: &Cookie<'static>) -> TestRequest {
    post("/v1/tools/upload", cookie)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}
