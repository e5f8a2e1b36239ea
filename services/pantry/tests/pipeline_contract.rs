mod common;

use axum::http::{StatusCode, header};
use common::{
    FailingPublisher, Reply, ScriptedStore, json_request, read_json, request, service_setting,
    service_settings_app, user_token,
};
use pantry::publisher::memory::MemoryPublisher;
use std::sync::Arc;
use tower::ServiceExt;

const MOTD: &str = r#"{"name":"motd","description":"d","defaultValue":"v","enumeration":["v"]}"#;

#[tokio::test]
async fn create_returns_created_record_and_publishes_once() {
    let store = ScriptedStore::new(Reply::Ok);
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/service_settings",
            Some(&user_token()),
            Some(MOTD),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let id = body["data"]["id"].as_str().expect("id").to_string();
    assert!(!id.is_empty());
    assert_eq!(body["data"]["name"], "motd");
    assert!(body.get("error").is_none());
    assert!(!body["details"]["traceId"].is_null());
    assert_eq!(body["details"]["currentHouseholdId"], common::HOUSEHOLD_ID);

    let messages = publisher.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].event_type.to_string(), "service_setting.created");
    assert_eq!(messages[0].user_id, common::USER_ID);
    let data = messages[0].data.as_ref().expect("event data");
    assert_eq!(data["id"], id.as_str());
    assert_eq!(data["name"], "motd");

    // The id the store saw is the id the client and the event saw.
    assert_eq!(store.stored().expect("stored").id, id);
}

#[tokio::test]
async fn create_with_empty_object_fails_validation_without_touching_store() {
    let store = ScriptedStore::new(Reply::Ok);
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/service_settings",
            Some(&user_token()),
            Some("{}"),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "validating_request_input");
    assert_eq!(body["error"]["message"], "name: cannot be blank");
    assert!(body.get("data").is_none());
    assert!(store.calls().is_empty());
    assert!(publisher.messages().await.is_empty());
}

#[tokio::test]
async fn read_of_missing_record_is_not_found() {
    let store = ScriptedStore::new(Reply::NotFound);
    let app = service_settings_app(store, Arc::new(MemoryPublisher::new()));

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/service_settings/does-not-exist",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("read");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "data_not_found");
    assert_eq!(body["error"]["message"], "not_found");
}

#[tokio::test]
async fn list_of_missing_collection_is_empty_page() {
    let store = ScriptedStore::new(Reply::NotFound);
    let app = service_settings_app(store, Arc::new(MemoryPublisher::new()));

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/service_settings",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"], serde_json::json!([]));
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 20);
}

#[tokio::test]
async fn update_succeeds_when_publishing_fails() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let publisher = Arc::new(FailingPublisher::default());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            serde_json::json!({"description": "updated"}),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body.get("error").is_none());
    assert_eq!(body["data"]["id"], "s1");
    assert_eq!(body["data"]["name"], "motd");
    assert_eq!(body["data"]["description"], "updated");
    assert!(!body["data"]["lastUpdatedAt"].is_null());

    assert_eq!(publisher.attempts(), 1);
    assert_eq!(store.calls(), vec!["get", "update"]);
    assert_eq!(store.stored().expect("stored").description, "updated");
}

#[tokio::test]
async fn create_and_archive_succeed_when_publishing_fails() {
    let store = ScriptedStore::new(Reply::Ok);
    let publisher = Arc::new(FailingPublisher::default());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/service_settings",
            Some(&user_token()),
            Some(MOTD),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/service_settings/{id}"),
            Some(&user_token()),
            None,
        ))
        .await
        .expect("archive");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(publisher.attempts(), 2);
}

#[tokio::test]
async fn archive_then_read_is_not_found() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("archive");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["data"].is_null());
    assert!(body.get("error").is_none());

    let messages = publisher.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].event_type.to_string(), "service_setting.archived");
    assert!(messages[0].data.is_none());

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("read");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.calls(), vec!["exists", "archive", "get"]);
}

#[tokio::test]
async fn unauthenticated_requests_never_reach_store_or_publisher() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());

    let cases = [
        ("POST", "/api/v1/service_settings", Some(MOTD)),
        ("POST", "/api/v1/service_settings", Some("not json")),
        ("GET", "/api/v1/service_settings", None),
        ("GET", "/api/v1/service_settings/search?q=motd", None),
        ("GET", "/api/v1/service_settings/s1", None),
        ("PUT", "/api/v1/service_settings/s1", Some(r#"{"name":"x"}"#)),
        ("DELETE", "/api/v1/service_settings/s1", None),
    ];
    for (method, uri, body) in cases {
        let response = app
            .clone()
            .oneshot(request(method, uri, None, body))
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "fetching_session_context");
        assert_eq!(body["error"]["message"], "unauthenticated");
    }

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/service_settings/s1",
            Some("not-a-token"),
            None,
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(store.calls().is_empty());
    assert!(publisher.messages().await.is_empty());
}

#[tokio::test]
async fn undecodable_bodies_fail_before_validation() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let app = service_settings_app(store.clone(), Arc::new(MemoryPublisher::new()));
    let token = user_token();

    for (method, uri) in [
        ("POST", "/api/v1/service_settings"),
        ("PUT", "/api/v1/service_settings/s1"),
    ] {
        for body in ["", "   ", "{\"name\":", "[1, 2"] {
            let response = app
                .clone()
                .oneshot(request(method, uri, Some(&token), Some(body)))
                .await
                .expect("request");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {body:?}");
            let json = read_json(response).await;
            assert_eq!(json["error"]["code"], "decoding_request_input");
            assert_eq!(json["error"]["message"], "invalid_request_content");
        }
    }

    let wrong_type = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/service_settings")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "text/plain")
        .body(axum::body::Body::from(MOTD))
        .expect("request");
    let response = app.oneshot(wrong_type).await.expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"]["code"],
        "decoding_request_input"
    );

    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn invalid_updates_never_fetch_or_mutate() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let app = service_settings_app(store.clone(), Arc::new(MemoryPublisher::new()));

    for body in ["{}", r#"{"type":"global"}"#, r#"{"name":""}"#] {
        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                "/api/v1/service_settings/s1",
                Some(&user_token()),
                Some(body),
            ))
            .await
            .expect("update");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            read_json(response).await["error"]["code"],
            "validating_request_input"
        );
    }
    assert!(store.calls().is_empty());
    assert_eq!(store.mutations(), 0);
}

#[tokio::test]
async fn update_producing_an_invalid_record_is_rejected() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            serde_json::json!({"defaultValue": "x"}),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "validating_request_input");
    assert_eq!(
        body["error"]["message"],
        "defaultValue: must be one of the enumerated values"
    );

    assert_eq!(store.calls(), vec!["get"]);
    let stored = store.stored().expect("stored");
    assert_eq!(stored.default_value.as_deref(), Some("v"));
    assert!(publisher.messages().await.is_empty());
}

#[tokio::test]
async fn create_producing_an_invalid_record_never_reaches_store() {
    let store = ScriptedStore::new(Reply::Ok);
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/service_settings",
            Some(&user_token()),
            serde_json::json!({"name": "motd", "defaultValue": "x", "enumeration": ["v"]}),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await["error"]["code"],
        "validating_request_input"
    );
    assert!(store.calls().is_empty());
    assert!(publisher.messages().await.is_empty());
}

#[tokio::test]
async fn store_failures_map_to_internal_errors() {
    let store = ScriptedStore::new(Reply::Fail);
    let publisher = Arc::new(MemoryPublisher::new());
    let app = service_settings_app(store.clone(), publisher.clone());
    let token = user_token();

    let cases = [
        ("GET", "/api/v1/service_settings/s1", None),
        ("GET", "/api/v1/service_settings", None),
        ("GET", "/api/v1/service_settings/search?q=motd", None),
        ("POST", "/api/v1/service_settings", Some(MOTD)),
        ("PUT", "/api/v1/service_settings/s1", Some(r#"{"name":"x"}"#)),
        ("DELETE", "/api/v1/service_settings/s1", None),
    ];
    for (method, uri, body) in cases {
        let response = app
            .clone()
            .oneshot(request(method, uri, Some(&token), body))
            .await
            .expect("request");
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{method} {uri}"
        );
        let json = read_json(response).await;
        assert_eq!(json["error"]["code"], "talking_to_database");
        assert_eq!(json["error"]["message"], "database_error");
    }
    assert!(publisher.messages().await.is_empty());
}

#[tokio::test]
async fn update_and_archive_of_missing_records_are_not_found() {
    let store = ScriptedStore::new(Reply::NotFound);
    let app = service_settings_app(store.clone(), Arc::new(MemoryPublisher::new()));

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            Some(r#"{"name":"x"}"#),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request(
            "DELETE",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("archive");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.mutations(), 0);

    let absent = ScriptedStore::missing_on_exists();
    let app = service_settings_app(absent.clone(), Arc::new(MemoryPublisher::new()));
    let response = app
        .oneshot(request(
            "DELETE",
            "/api/v1/service_settings/s1",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("archive");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(absent.calls(), vec!["exists"]);
}

#[tokio::test]
async fn search_without_index_uses_store() {
    let store = ScriptedStore::holding(service_setting("s1", "motd"));
    let app = service_settings_app(store.clone(), Arc::new(MemoryPublisher::new()));

    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/service_settings/search?q=motd&limit=5",
            Some(&user_token()),
            None,
        ))
        .await
        .expect("search");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"][0]["id"], "s1");
    assert_eq!(body["pagination"]["limit"], 5);
    assert_eq!(store.calls(), vec!["search"]);
}
