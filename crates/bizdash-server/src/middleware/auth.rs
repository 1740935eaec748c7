// Session middleware for Actix-web
// Resolves the session cookie and rejects gated routes without a logged in session

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web::Data,
};

use futures::future::LocalBoxFuture;

use crate::error::ACCESS_DENIED;
use crate::model::{AppState, SESSION_COOKIE, response};

/// Routes reachable without logging in, relative to the context path
pub const PUBLIC_ROUTES: [&str; 3] = ["/v1/auth/login", "/v1/auth/state", "/v1/navigation"];

pub fn is_public(path: &str, context_path: &str) -> bool {
    let relative = path.strip_prefix(context_path).unwrap_or(path);
    let relative = relative.trim_end_matches('/');
    PUBLIC_ROUTES.contains(&relative)
}

// Authentication middleware transformer
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware { service })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if Method::OPTIONS != *req.method() {
            let Some(app_state) = req.app_data::<Data<AppState>>().cloned() else {
                tracing::error!("AppState not found in request app_data");
                let res = self.service.call(req);
                return Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) });
            };

            let session = req
                .cookie(SESSION_COOKIE)
                .and_then(|cookie| app_state.sessions.get(cookie.value()));
            let logged_in = session.as_ref().is_some_and(|s| s.is_logged_in());

            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }

            if !logged_in && !is_public(req.path(), &app_state.context_path()) {
                tracing::debug!(path = req.path(), "Rejected request without login");
                let response = response::Result::<String>::http_error(
                    401,
                    ACCESS_DENIED.code,
                    "login required",
                );
                return Box::pin(async move {
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        }

        let res = self.service.call(req);

        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}
