//! Login, logout and session state

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, cookie::Cookie, get, post, web};
use tracing::info;

use crate::error::AppError;
use crate::model::{AppState, SESSION_COOKIE, SessionHandle, response, session::SessionState};

fn session_cookie(id: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

fn state_of(session: Option<&SessionHandle>) -> SessionState {
    match session {
        Some(session) => {
            let context = session.context.lock();
            SessionState {
                logged_in: context.logged_in,
                wizard_step: context.wizard.step().name().to_string(),
            }
        }
        None => SessionState {
            logged_in: false,
            wizard_step: bizdash_ingest::WizardStep::Upload.name().to_string(),
        },
    }
}

/// Flip the session's login flag on, starting a session when the request has none
#[post("/login")]
async fn login(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let existing = req.extensions().get::<SessionHandle>().cloned();
    let session = existing.unwrap_or_else(|| data.sessions.create());
    session.context.lock().logged_in = true;

    info!(session = %session.id, "Logged in");

    HttpResponse::Ok()
        .cookie(session_cookie(&session.id))
        .json(response::Result::success(state_of(Some(&session))))
}

/// End the session. Its wizard progress is discarded.
#[post("/logout")]
async fn logout(req: HttpRequest, data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let session = super::current_session(&req)?;
    data.sessions.remove(&session.id);

    info!(session = %session.id, "Logged out");

    let mut cookie = session_cookie("");
    cookie.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(response::Result::success(state_of(None))))
}

#[get("/state")]
async fn state(req: HttpRequest) -> impl Responder {
    let session = req.extensions().get::<SessionHandle>().cloned();
    response::Result::<SessionState>::http_success(state_of(session.as_ref()))
}
