mod common;

use actix_web::http::header;
use actix_web::test;
use backend::entities::{card_likes, cards};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::Value;

#[actix_web::test]
async fn missing_card_is_404_even_for_a_would_be_unauthorized_caller() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(2, "other@example.com", false, false)]])
        .append_query_results([Vec::<cards::Model>::new()])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    // Existence is checked before ownership, so the caller cannot use the
    // 403/404 split to probe which ids exist.
    let token = common::token_for(2, false, false);
    let req = test::TestRequest::put()
        .uri("/api/cards/999")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_json(common::card_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    common::assert_problem_details(resp, 404, "CARD_NOT_FOUND").await;
}

#[actix_web::test]
async fn non_owner_cannot_delete_a_card() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(2, "other@example.com", false, false)]])
        .append_query_results([vec![common::card_row(1, 1)]])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    let token = common::token_for(2, false, false);
    let req = test::TestRequest::delete()
        .uri("/api/cards/1")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    common::assert_problem_details(resp, 403, "FORBIDDEN").await;
}

#[actix_web::test]
async fn owner_can_update_their_card() {
    let mut updated = common::card_row(1, 1);
    updated.title = "Roastery".to_string();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(1, "owner@example.com", false, true)]])
        .append_query_results([vec![common::card_row(1, 1)]])
        .append_query_results([vec![updated]])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    let mut body = common::card_body();
    body["title"] = Value::from("Roastery");

    let token = common::token_for(1, false, true);
    let req = test::TestRequest::put()
        .uri("/api/cards/1")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Roastery");
    assert_eq!(body["owner_id"], 1);
}

#[actix_web::test]
async fn admin_can_delete_any_card_and_it_is_gone() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(1, "admin@example.com", true, false)]])
        .append_query_results([vec![common::card_row(1, 2)]])
        .append_query_results([Vec::<cards::Model>::new()])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    let token = common::token_for(1, true, false);
    let req = test::TestRequest::delete()
        .uri("/api/cards/1")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 204);

    let req = test::TestRequest::get().uri("/api/cards/1").to_request();
    let resp = test::call_service(&app, req).await;
    common::assert_problem_details(resp, 404, "CARD_NOT_FOUND").await;
}

#[actix_web::test]
async fn update_accepts_a_numeric_house_number() {
    let mut updated = common::card_row(1, 1);
    updated.house_number = "7".to_string();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(1, "owner@example.com", false, true)]])
        .append_query_results([vec![common::card_row(1, 1)]])
        .append_query_results([vec![updated]])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    let mut body = common::card_body();
    body["house_number"] = Value::from(7);

    let token = common::token_for(1, false, true);
    let req = test::TestRequest::put()
        .uri("/api/cards/1")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["house_number"], "7");
}

#[actix_web::test]
async fn like_toggles_on() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(2, "fan@example.com", false, false)]])
        .append_query_results([vec![common::card_row(1, 1)]])
        .append_query_results([Vec::<card_likes::Model>::new()])
        .append_query_results([vec![common::like_row(5, 1, 2)]])
        .append_query_results([vec![common::like_row(5, 1, 2)]])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    let token = common::token_for(2, false, false);
    let req = test::TestRequest::patch()
        .uri("/api/cards/1/like")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!([2]));
}

#[actix_web::test]
async fn like_toggles_off() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![common::user_row(2, "fan@example.com", false, false)]])
        .append_query_results([vec![common::card_row(1, 1)]])
        .append_query_results([vec![common::like_row(5, 1, 2)]])
        .append_query_results([Vec::<card_likes::Model>::new()])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let app = test::init_service(common::test_app(db)).await;

    let token = common::token_for(2, false, false);
    let req = test::TestRequest::patch()
        .uri("/api/cards/1/like")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!([]));
}
