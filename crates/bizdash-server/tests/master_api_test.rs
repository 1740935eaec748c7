//! Master data CRUD, soft delete and hard delete over HTTP

#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

#[actix_web::test]
async fn test_partner_crud_and_soft_delete() {
    let state = common::app_state().await;
    let app = init_app!(state);
    let resp = test::call_service(&app, common::login().to_request()).await;
    let cookie = common::session_cookie(&resp);

    let req = common::post("/v1/master/partner", &cookie)
        .set_json(json!({
            "partner_code": "P001",
            "partner_name": "Partner One",
            "email": "ops@partner.example"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["partner_code"], "P001");
    assert_eq!(body["data"]["is_deleted"], false);

    let req = common::put("/v1/master/partner/P001", &cookie)
        .set_json(json!({ "partner_name": "Renamed" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["partner_name"], "Renamed");

    let req = common::delete("/v1/master/partner/P001", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["is_deleted"], true);
    assert!(body["data"]["deleted_at"].is_string());

    let req = common::get("/v1/master/partner", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let req = common::get("/v1/master/partner?includeDeleted=true", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = common::post("/v1/master/partner/P001/restore", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["is_deleted"], false);
    assert!(body["data"]["deleted_at"].is_null());

    let req = common::get("/v1/master/partner", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["partner_name"], "Renamed");
}

#[actix_web::test]
async fn test_create_errors_map_to_codes() {
    let state = common::app_state().await;
    let app = init_app!(state);
    let resp = test::call_service(&app, common::login().to_request()).await;
    let cookie = common::session_cookie(&resp);

    let req = common::post("/v1/master/microcluster", &cookie)
        .set_json(json!({
            "mc_code": "MC01",
            "mc_name": "Cluster",
            "partner_code": "MISSING"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 20006);

    let partner = json!({ "partner_code": "P001", "partner_name": "Partner" });
    let req = common::post("/v1/master/partner", &cookie)
        .set_json(&partner)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = common::post("/v1/master/partner", &cookie)
        .set_json(&partner)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = common::post("/v1/master/partner", &cookie)
        .set_json(json!({ "partner_code": "", "partner_name": "Nameless" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 20002);

    let req = common::post("/v1/master/partner", &cookie)
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = common::get("/v1/master/site/NOPE", &cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 20004);
}

#[actix_web::test]
async fn test_retailer_delete_is_physical() {
    let state = common::app_state().await;
    let app = init_app!(state);
    let resp = test::call_service(&app, common::login().to_request()).await;
    let cookie = common::session_cookie(&resp);

    let setup = [
        (
            "/v1/master/partner",
            json!({ "partner_code": "P001", "partner_name": "Partner" }),
        ),
        (
            "/v1/master/site",
            json!({
                "site_id": "S001",
                "site_name": "Tower",
                "longitude": 106.82,
                "latitude": -6.17,
                "category": "technical",
                "desa_name": "Menteng"
            }),
        ),
        (
            "/v1/master/retailer",
            json!({
                "organization_id": "R001",
                "organization_name": "Toko",
                "outlet_type": "kiosk",
                "partner_code": "P001",
                "site_id": "S001"
            }),
        ),
    ];
    for (path, body) in setup {
        let req = common::post(path, &cookie).set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }

    let req = common::get("/v1/master/retailer/R001", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["data_source"], "etl");
    assert!(body["data"].get("is_deleted").is_none());

    let req = common::delete("/v1/master/retailer/R001", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["deleted"], true);

    let req = common::get("/v1/master/retailer/R001", &cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = common::get("/v1/master/retailer", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let req = common::post("/v1/master/retailer/R001/restore", &cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_list_paging() {
    let state = common::app_state().await;
    let app = init_app!(state);
    let resp = test::call_service(&app, common::login().to_request()).await;
    let cookie = common::session_cookie(&resp);

    for code in ["P001", "P002", "P003"] {
        let req = common::post("/v1/master/partner", &cookie)
            .set_json(json!({ "partner_code": code, "partner_name": code }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = common::get("/v1/master/partner?pageNo=2&pageSize=2", &cookie).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["totalCount"], 3);
    assert_eq!(body["data"]["pagesAvailable"], 2);
    assert_eq!(body["data"]["pageItems"][0]["partner_code"], "P003");
}

#[actix_web::test]
async fn test_list_paging_out_of_range() {
    let state = common::app_state().await;
    let app = init_app!(state);
    let resp = test::call_service(&app, common::login().to_request()).await;
    let cookie = common::session_cookie(&resp);

    let req = common::post("/v1/master/partner", &cookie)
        .set_json(json!({ "partner_code": "P001", "partner_name": "One" }))
        .to_request();
    test::call_service(&app, req).await;

    let req = common::get("/v1/master/partner?pageNo=18446744073709551615&pageSize=2", &cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["totalCount"], 1);
    assert!(body["data"]["pageItems"].as_array().unwrap().is_empty());

    for query in [
        "pageNo=2&pageSize=18446744073709551615",
        "pageNo=1&pageSize=0",
        "pageNo=0&pageSize=10",
    ] {
        let uri = format!("/v1/master/partner?{query}");
        let resp = test::call_service(&app, common::get(&uri, &cookie).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{query}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 20002);
    }
}
