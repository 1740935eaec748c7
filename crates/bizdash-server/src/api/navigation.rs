//! Named routes grouped for the navigation menu

use actix_web::{HttpMessage, HttpRequest, Responder, get, web};
use serde::Serialize;

use crate::model::{AppState, SessionHandle, response};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub name: &'static str,
    pub title: &'static str,
    pub path: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavGroup {
    pub name: &'static str,
    pub items: Vec<NavItem>,
}

type Entry = (&'static str, &'static str, &'static str);

const ACCOUNT: [Entry; 1] = [("logout", "Log out", "/v1/auth/logout")];

const REPORTS: [Entry; 5] = [
    ("dashboard", "Dashboard", "/v1/reports/dashboard"),
    ("transactions", "Transactions", "/v1/reports/transactions"),
    ("rgu", "RGU", "/v1/reports/rgu"),
    ("sellin", "Sell-in", "/v1/reports/sellin"),
    ("tertiary", "Tertiary", "/v1/reports/tertiary"),
];

const MASTER: [Entry; 7] = [
    ("partner", "Partner", "/v1/master/partner"),
    ("microcluster", "Micro Cluster", "/v1/master/microcluster"),
    ("territory", "Partner Territory", "/v1/master/territory"),
    ("kecamatan", "Kecamatan", "/v1/master/kecamatan"),
    ("desa", "Desa", "/v1/master/desa"),
    ("site", "Site", "/v1/master/site"),
    ("retailer", "Retailer", "/v1/master/retailer"),
];

const TOOLS: [Entry; 2] = [
    ("upload", "File Upload", "/v1/tools/upload"),
    ("database", "Database", "/v1/system/database"),
];

const LOGIN: [Entry; 1] = [("login", "Log in", "/v1/auth/login")];

fn group(name: &'static str, entries: &[Entry], context_path: &str) -> NavGroup {
    NavGroup {
        name,
        items: entries
            .iter()
            .map(|&(name, title, path)| NavItem {
                name,
                title,
                path: format!("{context_path}{path}"),
            })
            .collect(),
    }
}

/// Menu for a session: every group once logged in, only the login route otherwise
pub fn menu(logged_in: bool, context_path: &str) -> Vec<NavGroup> {
    if logged_in {
        vec![
            group("Account", &ACCOUNT, context_path),
            group("Reports", &REPORTS, context_path),
            group("Master", &MASTER, context_path),
            group("Tools", &TOOLS, context_path),
        ]
    } else {
        vec![group("Account", &LOGIN, context_path)]
    }
}

#[get("/navigation")]
async fn navigation(req: HttpRequest, data: web::Data<AppState>) -> impl Responder {
    let logged_in = req
        .extensions()
        .get::<SessionHandle>()
        .is_some_and(|s| s.is_logged_in());

    response::Result::<Vec<NavGroup>>::http_success(menu(logged_in, &data.context_path()))
}
