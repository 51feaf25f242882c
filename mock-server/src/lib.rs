//! In-memory emulator of a slice of the App Store Connect API.
//!
//! Serves resource documents (`data`, `relationships`, `included`, `links`,
//! `meta.paging`) and error envelopes the way the real service does, enough
//! for the client's integration tests: bearer check, filters, sort, limit,
//! cursor pagination, duplicate detection and 404s.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 200;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppAttributes {
    pub name: String,
    pub bundle_id: String,
    pub sku: String,
    pub primary_locale: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildAttributes {
    pub version: String,
    pub processing_state: String,
    pub expired: bool,
    pub uploaded_date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaGroupAttributes {
    pub name: String,
    pub is_internal_group: bool,
    pub public_link_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetaTesterAttributes {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub invite_type: String,
}

#[derive(Clone, Debug)]
pub struct App {
    pub id: String,
    pub attributes: AppAttributes,
}

#[derive(Clone, Debug)]
pub struct Build {
    pub id: String,
    pub app_id: String,
    pub attributes: BuildAttributes,
}

#[derive(Clone, Debug)]
pub struct BetaGroup {
    pub id: String,
    pub app_id: String,
    pub attributes: BetaGroupAttributes,
}

#[derive(Clone, Debug)]
pub struct BetaTester {
    pub id: String,
    pub group_ids: Vec<String>,
    pub attributes: BetaTesterAttributes,
}

#[derive(Debug, Default)]
pub struct Store {
    pub apps: Vec<App>,
    pub builds: Vec<Build>,
    pub beta_groups: BTreeMap<String, BetaGroup>,
    pub beta_testers: BTreeMap<String, BetaTester>,
    /// Accepted `(app id, tester id)` invitations.
    pub invitations: Vec<(String, String)>,
}

impl Store {
    /// Three apps, three builds and one external beta group.
    pub fn seeded() -> Self {
        let app = |id: &str, name: &str, bundle_id: &str| App {
            id: id.to_string(),
            attributes: AppAttributes {
                name: name.to_string(),
                bundle_id: bundle_id.to_string(),
                sku: name.to_uppercase(),
                primary_locale: "en-US".to_string(),
            },
        };
        let build = |id: &str, app_id: &str, version: &str| Build {
            id: id.to_string(),
            app_id: app_id.to_string(),
            attributes: BuildAttributes {
                version: version.to_string(),
                processing_state: "VALID".to_string(),
                expired: false,
                uploaded_date: "2024-05-01T10:00:00-07:00".to_string(),
            },
        };
        let group = BetaGroup {
            id: "group-1".to_string(),
            app_id: "app-1".to_string(),
            attributes: BetaGroupAttributes {
                name: "External Testers".to_string(),
                is_internal_group: false,
                public_link_enabled: false,
            },
        };
        Self {
            apps: vec![
                app("app-1", "Alpha", "com.example.alpha"),
                app("app-2", "Bravo", "com.example.bravo"),
                app("app-3", "Charlie", "com.example.charlie"),
            ],
            builds: vec![
                build("build-1", "app-1", "100"),
                build("build-2", "app-1", "101"),
                build("build-3", "app-2", "7"),
            ],
            beta_groups: BTreeMap::from([(group.id.clone(), group)]),
            beta_testers: BTreeMap::new(),
            invitations: Vec::new(),
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/v1/apps", get(list_apps))
        .route("/v1/apps/{id}", get(get_app))
        .route("/v1/apps/{id}/builds", get(list_app_builds))
        .route("/v1/betaGroups/{id}", get(get_beta_group).patch(update_beta_group))
        .route("/v1/betaGroups/{id}/betaTesters", get(list_group_testers))
        .route("/v1/betaTesters", get(list_beta_testers).post(create_beta_tester))
        .route("/v1/betaTesters/{id}", get(get_beta_tester).delete(delete_beta_tester))
        .route("/v1/betaTesterInvitations", post(create_invitation))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    errors: Vec<Value>,
}

impl ApiFailure {
    fn new(status: StatusCode, code: &str, title: &str, detail: impl Into<String>) -> Self {
        Self {
            status,
            errors: Vec::new(),
        }
        .and(code, title, detail, None)
    }

    fn and(mut self, code: &str, title: &str, detail: impl Into<String>, pointer: Option<&str>) -> Self {
        let mut error = json!({
            "id": Uuid::new_v4().to_string(),
            "status": self.status.as_u16().to_string(),
            "code": code,
            "title": title,
            "detail": detail.into(),
        });
        if let Some(pointer) = pointer {
            error["source"] = json!({ "pointer": pointer });
        }
        self.errors.push(error);
        self
    }

    fn not_found(resource_type: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "The specified resource does not exist",
            format!("There is no resource of type '{resource_type}' with id '{id}'"),
        )
    }

    fn parameter(name: &str, detail: impl Into<String>) -> Self {
        let mut failure = Self::new(
            StatusCode::BAD_REQUEST,
            "PARAMETER_ERROR.INVALID",
            "A parameter has an invalid value",
            detail,
        );
        failure.errors[0]["source"] = json!({ "parameter": name });
        failure
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "errors": self.errors }))).into_response()
    }
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token.split('.').count() == 3);
    if !authorized {
        return ApiFailure::new(
            StatusCode::UNAUTHORIZED,
            "NOT_AUTHORIZED",
            "Authentication credentials are missing or invalid.",
            "Provide a properly configured and signed bearer token, and make sure that it has not expired.",
        )
        .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

fn resource(resource_type: &str, id: &str, attributes: impl Serialize) -> Value {
    json!({
        "type": resource_type,
        "id": id,
        "attributes": attributes,
    })
}

fn identifiers(resource_type: &str, ids: &[String]) -> Value {
    json!({
        "data": ids.iter().map(|id| json!({"type": resource_type, "id": id})).collect::<Vec<_>>()
    })
}

fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn parse_limit(params: &HashMap<String, String>) -> Result<usize, ApiFailure> {
    match params.get("limit") {
        None => Ok(DEFAULT_LIMIT),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
            _ => Err(ApiFailure::parameter(
                "limit",
                format!("'{raw}' is not a valid value. The value must be between 1 and {MAX_LIMIT}."),
            )),
        },
    }
}

fn split_values(raw: &str) -> Vec<&str> {
    raw.split(',').filter(|v| !v.is_empty()).collect()
}

/// Slice `items` into one page and build `links` + `meta.paging`.
fn paginate<T>(
    items: Vec<T>,
    params: &HashMap<String, String>,
    raw_query: Option<&str>,
    self_url: &str,
) -> Result<(Vec<T>, Value, Value), ApiFailure> {
    let limit = parse_limit(params)?;
    let offset = match params.get("cursor") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiFailure::parameter("cursor", "The cursor is invalid."))?,
        None => 0,
    };
    let total = items.len();
    let page: Vec<T> = items.into_iter().skip(offset).take(limit).collect();

    let mut links = json!({ "self": self_url });
    let end = offset.saturating_add(limit);
    if end < total {
        let cursor = format!("cursor={end}");
        let mut query: Vec<&str> = raw_query
            .unwrap_or_default()
            .split('&')
            .filter(|p| !p.is_empty() && !p.starts_with("cursor="))
            .collect();
        query.push(&cursor);
        links["next"] = json!(format!("{self_url}?{}", query.join("&")));
    }
    let meta = json!({ "paging": { "total": total, "limit": limit } });
    Ok((page, links, meta))
}

// ---------------------------------------------------------------------------
// Apps and builds
// ---------------------------------------------------------------------------

fn app_resource(app: &App, build_ids: Option<Vec<String>>) -> Value {
    let mut value = resource("apps", &app.id, &app.attributes);
    if let Some(ids) = build_ids {
        value["relationships"] = json!({ "builds": identifiers("builds", &ids) });
    }
    value
}

fn build_resource(build: &Build) -> Value {
    let mut value = resource("builds", &build.id, &build.attributes);
    value["relationships"] = json!({ "app": { "data": { "type": "apps", "id": build.app_id } } });
    value
}

async fn list_apps(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let mut apps: Vec<&App> = store.apps.iter().collect();

    if let Some(raw) = params.get("filter[bundleId]") {
        let wanted = split_values(raw);
        apps.retain(|a| wanted.contains(&a.attributes.bundle_id.as_str()));
    }
    if let Some(raw) = params.get("filter[name]") {
        let wanted = split_values(raw);
        apps.retain(|a| wanted.contains(&a.attributes.name.as_str()));
    }
    if let Some(raw) = params.get("sort") {
        for key in split_values(raw).into_iter().rev() {
            let (field, descending) = match key.strip_prefix('-') {
                Some(field) => (field, true),
                None => (key, false),
            };
            if !matches!(field, "name" | "bundleId" | "sku") {
                return Err(ApiFailure::parameter(
                    "sort",
                    format!("'{field}' is not a valid field name"),
                ));
            }
            apps.sort_by(|a, b| {
                let ordering = app_sort_key(a, field).cmp(app_sort_key(b, field));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
    }

    let include_builds = params
        .get("include")
        .is_some_and(|raw| split_values(raw).contains(&"builds"));
    let self_url = format!("{}/v1/apps", base_url(&headers));
    let (page, links, meta) = paginate(apps, &params, raw_query.as_deref(), &self_url)?;

    let mut included = Vec::new();
    let data: Vec<Value> = page
        .iter()
        .map(|app| {
            if !include_builds {
                return app_resource(app, None);
            }
            let builds: Vec<&Build> = store.builds.iter().filter(|b| b.app_id == app.id).collect();
            included.extend(builds.iter().map(|b| build_resource(b)));
            app_resource(app, Some(builds.iter().map(|b| b.id.clone()).collect()))
        })
        .collect();

    let mut document = json!({ "data": data, "links": links, "meta": meta });
    if include_builds {
        document["included"] = json!(included);
    }
    Ok(Json(document))
}

fn app_sort_key<'a>(app: &'a App, field: &str) -> &'a str {
    match field {
        "bundleId" => &app.attributes.bundle_id,
        "sku" => &app.attributes.sku,
        _ => &app.attributes.name,
    }
}

async fn get_app(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let app = store
        .apps
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| ApiFailure::not_found("apps", &id))?;
    Ok(Json(json!({ "data": app_resource(app, None) })))
}

async fn list_app_builds(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    if !store.apps.iter().any(|a| a.id == id) {
        return Err(ApiFailure::not_found("apps", &id));
    }
    let builds: Vec<&Build> = store.builds.iter().filter(|b| b.app_id == id).collect();
    let self_url = format!("{}/v1/apps/{id}/builds", base_url(&headers));
    let (page, links, meta) = paginate(builds, &params, raw_query.as_deref(), &self_url)?;
    let data: Vec<Value> = page.iter().map(|b| build_resource(b)).collect();
    Ok(Json(json!({ "data": data, "links": links, "meta": meta })))
}

// ---------------------------------------------------------------------------
// Beta groups
// ---------------------------------------------------------------------------

fn group_resource(group: &BetaGroup) -> Value {
    let mut value = resource("betaGroups", &group.id, &group.attributes);
    value["relationships"] = json!({ "app": { "data": { "type": "apps", "id": group.app_id } } });
    value
}

async fn get_beta_group(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let group = store
        .beta_groups
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("betaGroups", &id))?;
    Ok(Json(json!({ "data": group_resource(group) })))
}

async fn update_beta_group(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiFailure> {
    let mut store = db.write().await;
    let group = store
        .beta_groups
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("betaGroups", &id))?;

    let data = &body["data"];
    if data["type"] != "betaGroups" || data["id"] != id.as_str() {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            "ENTITY_ERROR.ID.INVALID",
            "The provided entity id is invalid",
            format!("The resource id in the request must be '{id}'"),
        ));
    }
    let attributes = &data["attributes"];
    if let Some(name) = attributes["name"].as_str() {
        group.attributes.name = name.to_string();
    }
    if let Some(enabled) = attributes["publicLinkEnabled"].as_bool() {
        group.attributes.public_link_enabled = enabled;
    }
    debug!(group = %id, "beta group updated");
    Ok(Json(json!({ "data": group_resource(group) })))
}

async fn list_group_testers(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    if !store.beta_groups.contains_key(&id) {
        return Err(ApiFailure::not_found("betaGroups", &id));
    }
    let testers: Vec<&BetaTester> = store
        .beta_testers
        .values()
        .filter(|t| t.group_ids.contains(&id))
        .collect();
    let self_url = format!("{}/v1/betaGroups/{id}/betaTesters", base_url(&headers));
    let (page, links, meta) = paginate(testers, &params, raw_query.as_deref(), &self_url)?;
    let data: Vec<Value> = page.iter().map(|t| tester_resource(t)).collect();
    Ok(Json(json!({ "data": data, "links": links, "meta": meta })))
}

// ---------------------------------------------------------------------------
// Beta testers
// ---------------------------------------------------------------------------

fn tester_resource(tester: &BetaTester) -> Value {
    let mut value = resource("betaTesters", &tester.id, &tester.attributes);
    value["relationships"] = json!({ "betaGroups": identifiers("betaGroups", &tester.group_ids) });
    value
}

async fn list_beta_testers(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let mut testers: Vec<&BetaTester> = store.beta_testers.values().collect();
    if let Some(raw) = params.get("filter[email]") {
        let wanted = split_values(raw);
        testers.retain(|t| wanted.contains(&t.attributes.email.as_str()));
    }
    let self_url = format!("{}/v1/betaTesters", base_url(&headers));
    let (page, links, meta) = paginate(testers, &params, raw_query.as_deref(), &self_url)?;
    let data: Vec<Value> = page.iter().map(|t| tester_resource(t)).collect();
    Ok(Json(json!({ "data": data, "links": links, "meta": meta })))
}

async fn create_beta_tester(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    let data = &body["data"];
    let attributes = &data["attributes"];
    let mut failure: Option<ApiFailure> = None;
    let mut reject = |code: &str, title: &str, detail: String, pointer: &str| {
        failure = Some(match failure.take() {
            Some(f) => f.and(code, title, detail, Some(pointer)),
            None => ApiFailure {
                status: StatusCode::CONFLICT,
                errors: Vec::new(),
            }
            .and(code, title, detail, Some(pointer)),
        });
    };

    if data["type"] != "betaTesters" {
        reject(
            "ENTITY_ERROR.INCLUDED.INVALID",
            "The provided entity type is invalid",
            format!("Expected 'betaTesters' but got {}", data["type"]),
            "/data/type",
        );
    }
    let email = attributes["email"].as_str().unwrap_or_default().to_string();
    if email.is_empty() {
        reject(
            "ENTITY_ERROR.ATTRIBUTE.REQUIRED",
            "The provided entity is missing a required attribute",
            "You must provide a value for the attribute 'email' with this request".to_string(),
            "/data/attributes/email",
        );
    }
    if let Some(invite_type) = attributes["inviteType"].as_str() {
        if invite_type != "EMAIL" && invite_type != "PUBLIC_LINK" {
            reject(
                "ENTITY_ERROR.ATTRIBUTE.INVALID",
                "An attribute value is invalid.",
                format!("'{invite_type}' is not a valid invite type"),
                "/data/attributes/inviteType",
            );
        }
    }
    if let Some(failure) = failure {
        return Err(failure);
    }

    let mut store = db.write().await;
    if store.beta_testers.values().any(|t| t.attributes.email == email) {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            "ENTITY_ERROR.ATTRIBUTE.INVALID.DUPLICATE",
            "The provided entity includes an attribute with a value that has already been used",
            format!("A beta tester with email '{email}' already exists"),
        ));
    }

    let group_ids: Vec<String> = data["relationships"]["betaGroups"]["data"]
        .as_array()
        .map(|ids| ids.iter().filter_map(|r| r["id"].as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    if let Some(missing) = group_ids.iter().find(|g| !store.beta_groups.contains_key(*g)) {
        return Err(ApiFailure::not_found("betaGroups", missing));
    }

    let tester = BetaTester {
        id: Uuid::new_v4().to_string(),
        group_ids,
        attributes: BetaTesterAttributes {
            email,
            first_name: attributes["firstName"].as_str().map(str::to_string),
            last_name: attributes["lastName"].as_str().map(str::to_string),
            invite_type: attributes["inviteType"].as_str().unwrap_or("EMAIL").to_string(),
        },
    };
    debug!(tester = %tester.id, "beta tester created");
    let document = json!({ "data": tester_resource(&tester) });
    store.beta_testers.insert(tester.id.clone(), tester);
    Ok((StatusCode::CREATED, Json(document)))
}

async fn get_beta_tester(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let store = db.read().await;
    let tester = store
        .beta_testers
        .get(&id)
        .ok_or_else(|| ApiFailure::not_found("betaTesters", &id))?;
    Ok(Json(json!({ "data": tester_resource(tester) })))
}

async fn delete_beta_tester(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiFailure> {
    let mut store = db.write().await;
    store
        .beta_testers
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiFailure::not_found("betaTesters", &id))
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

async fn create_invitation(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    let relationships = &body["data"]["relationships"];
    let app_id = relationships["app"]["data"]["id"].as_str().unwrap_or_default().to_string();
    let tester_id = relationships["betaTester"]["data"]["id"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let mut store = db.write().await;
    if !store.apps.iter().any(|a| a.id == app_id) {
        return Err(ApiFailure::not_found("apps", &app_id));
    }
    if !store.beta_testers.contains_key(&tester_id) {
        return Err(ApiFailure::not_found("betaTesters", &tester_id));
    }
    let pair = (app_id.clone(), tester_id.clone());
    if store.invitations.contains(&pair) {
        return Err(ApiFailure::new(
            StatusCode::CONFLICT,
            "STATE_ERROR.TESTER_INVITE_ALREADY_ACCEPTED",
            "The tester has already accepted an invitation",
            format!("Beta tester '{tester_id}' already accepted the invitation for app '{app_id}'"),
        ));
    }
    store.invitations.push(pair);
    let document = json!({
        "data": {
            "type": "betaTesterInvitations",
            "id": Uuid::new_v4().to_string(),
            "relationships": {
                "app": { "data": { "type": "apps", "id": app_id } },
                "betaTester": { "data": { "type": "betaTesters", "id": tester_id } }
            }
        }
    });
    Ok((StatusCode::CREATED, Json(document)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_has_related_records() {
        let store = Store::seeded();
        assert_eq!(store.apps.len(), 3);
        assert!(store.builds.iter().all(|b| store.apps.iter().any(|a| a.id == b.app_id)));
        assert!(store.beta_groups.contains_key("group-1"));
        assert!(store.beta_testers.is_empty());
    }

    #[test]
    fn attributes_serialize_in_camel_case() {
        let json = serde_json::to_value(&Store::seeded().apps[0].attributes).unwrap();
        assert_eq!(json["bundleId"], "com.example.alpha");
        assert_eq!(json["primaryLocale"], "en-US");
    }

    #[test]
    fn tester_attributes_omit_missing_names() {
        let attributes = BetaTesterAttributes {
            email: "a@example.com".to_string(),
            first_name: None,
            last_name: Some("Lovelace".to_string()),
            invite_type: "EMAIL".to_string(),
        };
        let json = serde_json::to_value(&attributes).unwrap();
        assert!(json.get("firstName").is_none());
        assert_eq!(json["lastName"], "Lovelace");
    }

    #[test]
    fn failure_envelope_lists_every_error() {
        let failure = ApiFailure::new(StatusCode::CONFLICT, "A", "first", "one").and("B", "second", "two", Some("/data"));
        assert_eq!(failure.errors.len(), 2);
        assert_eq!(failure.errors[0]["status"], "409");
        assert_eq!(failure.errors[1]["source"]["pointer"], "/data");
    }

    #[test]
    fn paginate_emits_next_cursor_until_exhausted() {
        let params = HashMap::from([("limit".to_string(), "2".to_string())]);
        let (page, links, meta) = paginate(vec![1, 2, 3], &params, Some("limit=2"), "http://h/v1/apps").unwrap();
        assert_eq!(page, vec![1, 2]);
        assert_eq!(links["next"], "http://h/v1/apps?limit=2&cursor=2");
        assert_eq!(meta["paging"]["total"], 3);

        let params = HashMap::from([
            ("limit".to_string(), "2".to_string()),
            ("cursor".to_string(), "2".to_string()),
        ]);
        let (page, links, _) = paginate(vec![1, 2, 3], &params, Some("limit=2&cursor=2"), "http://h/v1/apps").unwrap();
        assert_eq!(page, vec![3]);
        assert!(links.get("next").is_none());
    }

    #[test]
    fn paginate_past_the_end_with_a_maximal_cursor() {
        let params = HashMap::from([
            ("limit".to_string(), "200".to_string()),
            ("cursor".to_string(), usize::MAX.to_string()),
        ]);
        let (page, links, meta) = paginate(vec![1, 2, 3], &params, None, "http://h/v1/apps").unwrap();
        assert!(page.is_empty());
        assert!(links.get("next").is_none());
        assert_eq!(meta["paging"]["total"], 3);
    }
}
