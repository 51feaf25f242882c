use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "Bearer header.claims.signature";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, TOKEN)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, TOKEN)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn tester_body(email: &str) -> String {
    format!(
        r#"{{"data":{{"type":"betaTesters","attributes":{{"email":"{email}","firstName":"Ada"}},
            "relationships":{{"betaGroups":{{"data":[{{"type":"betaGroups","id":"group-1"}}]}}}}}}}}"#
    )
}

// --- auth ---

#[tokio::test]
async fn missing_bearer_is_rejected_with_envelope() {
    let resp = app()
        .oneshot(Request::builder().uri("/v1/apps").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "NOT_AUTHORIZED");
    assert_eq!(body["errors"][0]["status"], "401");
}

#[tokio::test]
async fn malformed_bearer_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/v1/apps")
                .header(http::header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- apps ---

#[tokio::test]
async fn list_apps_returns_collection_document() {
    let resp = app().oneshot(get("/v1/apps")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["type"], "apps");
    assert_eq!(body["meta"]["paging"]["total"], 3);
    assert!(body["links"].get("next").is_none());
}

#[tokio::test]
async fn list_apps_filters_by_bundle_id() {
    let resp = app()
        .oneshot(get("/v1/apps?filter%5BbundleId%5D=com.example.alpha,com.example.charlie"))
        .await
        .unwrap();

    let body = body_json(resp).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["attributes"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Charlie"]);
}

#[tokio::test]
async fn list_apps_sorts_descending() {
    let resp = app().oneshot(get("/v1/apps?sort=-name")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["attributes"]["name"], "Charlie");
    assert_eq!(body["data"][2]["attributes"]["name"], "Alpha");
}

#[tokio::test]
async fn list_apps_pages_with_next_link() {
    let resp = app().oneshot(get("/v1/apps?limit=2")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["paging"]["limit"], 2);
    let next = body["links"]["next"].as_str().unwrap();
    assert!(next.ends_with("/v1/apps?limit=2&cursor=2"), "{next}");

    let resp = app().oneshot(get("/v1/apps?limit=2&cursor=2")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert!(body["links"].get("next").is_none());
}

#[tokio::test]
async fn limit_above_maximum_is_a_parameter_error() {
    let resp = app().oneshot(get("/v1/apps?limit=201")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "PARAMETER_ERROR.INVALID");
    assert_eq!(body["errors"][0]["source"]["parameter"], "limit");
}

#[tokio::test]
async fn include_builds_adds_relationships_and_included() {
    let resp = app()
        .oneshot(get("/v1/apps?filter%5BbundleId%5D=com.example.alpha&include=builds"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let linked = body["data"][0]["relationships"]["builds"]["data"].as_array().unwrap();
    assert_eq!(linked.len(), 2);
    assert_eq!(body["included"].as_array().unwrap().len(), 2);
    assert_eq!(body["included"][0]["type"], "builds");
}

#[tokio::test]
async fn get_app_not_found_returns_envelope() {
    let resp = app().oneshot(get("/v1/apps/missing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn app_builds_are_scoped_to_the_app() {
    let resp = app().oneshot(get("/v1/apps/app-2/builds")).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["relationships"]["app"]["data"]["id"], "app-2");
}

// --- beta groups ---

#[tokio::test]
async fn update_beta_group_with_wrong_id_conflicts() {
    let resp = app()
        .oneshot(json_request(
            "PATCH",
            "/v1/betaGroups/group-1",
            r#"{"data":{"type":"betaGroups","id":"other","attributes":{"name":"x"}}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// --- beta testers ---

#[tokio::test]
async fn create_tester_missing_email_lists_every_error() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v1/betaTesters",
            r#"{"data":{"type":"betaTesters","attributes":{"inviteType":"CARRIER_PIGEON"}}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["code"], "ENTITY_ERROR.ATTRIBUTE.REQUIRED");
    assert_eq!(errors[1]["code"], "ENTITY_ERROR.ATTRIBUTE.INVALID");
}

#[tokio::test]
async fn invitation_for_unknown_tester_is_not_found() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v1/betaTesterInvitations",
            r#"{"data":{"type":"betaTesterInvitations","relationships":{
                "app":{"data":{"type":"apps","id":"app-1"}},
                "betaTester":{"data":{"type":"betaTesters","id":"nobody"}}}}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full tester lifecycle ---

#[tokio::test]
async fn tester_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/betaTesters", &tester_body("ada@example.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["data"]["attributes"]["email"], "ada@example.com");
    assert_eq!(created["data"]["attributes"]["inviteType"], "EMAIL");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // duplicate
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/betaTesters", &tester_body("ada@example.com")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["errors"][0]["code"], "ENTITY_ERROR.ATTRIBUTE.INVALID.DUPLICATE");

    // filter by email
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/v1/betaTesters?filter%5Bemail%5D=ada@example.com"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["id"], id.as_str());

    // group membership
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/v1/betaGroups/group-1/betaTesters"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // invite twice
    let invitation = format!(
        r#"{{"data":{{"type":"betaTesterInvitations","relationships":{{
            "app":{{"data":{{"type":"apps","id":"app-1"}}}},
            "betaTester":{{"data":{{"type":"betaTesters","id":"{id}"}}}}}}}}}}"#
    );
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/betaTesterInvitations", &invitation))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/betaTesterInvitations", &invitation))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(format!("/v1/betaTesters/{id}"))
                .header(http::header::AUTHORIZATION, TOKEN)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/v1/betaTesters/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
