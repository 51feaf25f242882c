//! Resource documents exchanged with the API.
//!
//! # Design
//! Every response body is a document with `data` (one resource or a list),
//! optional `included` related resources, `links` and `meta`. Attributes are
//! generic: the default [`Attributes`] map keeps whatever the server sent,
//! while callers that know the shape can deserialize straight into their own
//! struct (typically `#[serde(rename_all = "camelCase")]`).
//!
//! Failures come back as an [`ErrorDocument`] whose records are surfaced
//! unchanged through [`Error::Api`](crate::Error::Api).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::naming::snake_to_camel;

/// Untyped attribute bag, keyed by wire (camelCase) names.
pub type Attributes = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub struct Document<A = Attributes> {
    #[serde(default = "Option::default")]
    pub data: Option<Data<A>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<DocumentLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Data<A> {
    Many(Vec<Resource<A>>),
    One(Box<Resource<A>>),
}

impl<A> Document<A> {
    /// The primary resources, whether the server sent one or a list.
    pub fn resources(&self) -> &[Resource<A>] {
        match &self.data {
            Some(Data::Many(list)) => list,
            Some(Data::One(one)) => std::slice::from_ref(one.as_ref()),
            None => &[],
        }
    }

    pub fn into_resources(self) -> Vec<Resource<A>> {
        match self.data {
            Some(Data::Many(list)) => list,
            Some(Data::One(one)) => vec![*one],
            None => Vec::new(),
        }
    }

    /// The single primary resource of an instance response.
    pub fn resource(&self) -> Option<&Resource<A>> {
        self.resources().first()
    }

    pub fn included_of<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a Resource<Value>> + 'a {
        self.included.iter().filter(move |r| r.resource_type == resource_type)
    }

    /// Cursor URL of the following page, if the server advertised one.
    pub fn next_url(&self) -> Option<&str> {
        self.links.as_ref().and_then(|l| l.next.as_deref())
    }

    pub fn total(&self) -> Option<u64> {
        self.meta.as_ref().and_then(|m| m.paging.as_ref()).map(|p| p.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub struct Resource<A = Attributes> {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<A>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ResourceLinks>,
}

impl Resource<Attributes> {
    /// Attribute lookup by snake_case name (`bundle_id` reads `bundleId`).
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.as_ref()?.get(&snake_to_camel(name))
    }

    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }
}

impl<A> Resource<A> {
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(&snake_to_camel(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RelationshipData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<RelationshipLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Relationship {
    pub fn ids(&self) -> Vec<&str> {
        match &self.data {
            Some(RelationshipData::One(one)) => vec![one.id.as_str()],
            Some(RelationshipData::Many(many)) => many.iter().map(|r| r.id.as_str()).collect(),
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    Many(Vec<ResourceIdentifier>),
    One(ResourceIdentifier),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLinks {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub total: u64,
    pub limit: u32,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of a create (`POST`) or update (`PATCH`) request.
///
/// ```
/// use appstore_connect::RequestDocument;
///
/// let body = RequestDocument::create("betaTesters")
///     .attribute("first_name", "Ada")
///     .attribute("email", "ada@example.com")
///     .to_many("beta_groups", "betaGroups", ["group-1"]);
/// assert_eq!(body.data.resource_type, "betaTesters");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub struct RequestDocument<A = Attributes> {
    pub data: RequestData<A>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub struct RequestData<A = Attributes> {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<A>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl<A> RequestDocument<A> {
    /// Wrap already-typed attributes.
    pub fn typed(resource_type: impl Into<String>, id: Option<String>, attributes: A) -> Self {
        Self {
            data: RequestData {
                resource_type: resource_type.into(),
                id,
                attributes: Some(attributes),
                relationships: BTreeMap::new(),
            },
        }
    }

    pub fn to_one(mut self, name: &str, resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        self.data.relationships.insert(
            snake_to_camel(name),
            Relationship {
                data: Some(RelationshipData::One(ResourceIdentifier {
                    resource_type: resource_type.into(),
                    id: id.into(),
                })),
                links: None,
                meta: None,
            },
        );
        self
    }

    pub fn to_many<I, S>(mut self, name: &str, resource_type: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identifiers = ids
            .into_iter()
            .map(|id| ResourceIdentifier {
                resource_type: resource_type.to_string(),
                id: id.into(),
            })
            .collect();
        self.data.relationships.insert(
            snake_to_camel(name),
            Relationship {
                data: Some(RelationshipData::Many(identifiers)),
                links: None,
                meta: None,
            },
        );
        self
    }
}

impl RequestDocument<Attributes> {
    pub fn create(resource_type: impl Into<String>) -> Self {
        Self::untyped(resource_type.into(), None)
    }

    pub fn update(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::untyped(resource_type.into(), Some(id.into()))
    }

    fn untyped(resource_type: String, id: Option<String>) -> Self {
        Self {
            data: RequestData {
                resource_type,
                id,
                attributes: None,
                relationships: BTreeMap::new(),
            },
        }
    }

    /// Set an attribute by snake_case name; later calls for the same name win.
    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.data
            .attributes
            .get_or_insert_with(Attributes::new)
            .insert(snake_to_camel(name), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorRecord>,
}

/// One record of the server's error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

/// Where in the request the server located the problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_document_populates_attributes() {
        let doc: Document = serde_json::from_value(json!({
            "data": [
                {"type": "apps", "id": "1", "attributes": {"name": "One", "bundleId": "com.example.one"}},
                {"type": "apps", "id": "2", "attributes": {"name": "Two", "bundleId": "com.example.two"}}
            ],
            "links": {"self": "https://api/v1/apps", "next": "https://api/v1/apps?cursor=Mg"},
            "meta": {"paging": {"total": 5, "limit": 2}}
        }))
        .unwrap();

        let apps = doc.resources();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].attribute_str("bundle_id"), Some("com.example.one"));
        assert_eq!(apps[1].attribute_str("name"), Some("Two"));
        assert_eq!(doc.next_url(), Some("https://api/v1/apps?cursor=Mg"));
        assert_eq!(doc.total(), Some(5));
    }

    #[test]
    fn single_document_exposes_one_resource() {
        let doc: Document = serde_json::from_value(json!({
            "data": {
                "type": "builds",
                "id": "b1",
                "attributes": {"version": "42"},
                "relationships": {
                    "app": {"data": {"type": "apps", "id": "a1"}},
                    "betaGroups": {"data": [{"type": "betaGroups", "id": "g1"}, {"type": "betaGroups", "id": "g2"}]}
                }
            },
            "included": [{"type": "apps", "id": "a1", "attributes": {"name": "App"}}]
        }))
        .unwrap();

        let build = doc.resource().unwrap();
        assert_eq!(build.id, "b1");
        assert_eq!(build.relationship("app").unwrap().ids(), ["a1"]);
        assert_eq!(build.relationship("beta_groups").unwrap().ids(), ["g1", "g2"]);
        assert_eq!(doc.included_of("apps").count(), 1);
    }

    #[test]
    fn typed_attributes_deserialize() {
        #[derive(Debug, Deserialize, PartialEq)]
        #[serde(rename_all = "camelCase")]
        struct App {
            name: String,
            bundle_id: String,
        }

        let doc: Document<App> = serde_json::from_value(json!({
            "data": [{"type": "apps", "id": "1", "attributes": {"name": "One", "bundleId": "com.one", "sku": "X"}}]
        }))
        .unwrap();
        assert_eq!(
            doc.resources()[0].attributes,
            Some(App {
                name: "One".to_string(),
                bundle_id: "com.one".to_string()
            })
        );
    }

    #[test]
    fn null_data_yields_no_resources() {
        let doc: Document = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(doc.resources().is_empty());
    }

    #[test]
    fn request_document_uses_wire_names() {
        let body = RequestDocument::create("betaTesters")
            .attribute("first_name", "Ada")
            .attribute("email", "ada@example.com")
            .to_many("beta_groups", "betaGroups", ["g1"]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "data": {
                    "type": "betaTesters",
                    "attributes": {"firstName": "Ada", "email": "ada@example.com"},
                    "relationships": {
                        "betaGroups": {"data": [{"type": "betaGroups", "id": "g1"}]}
                    }
                }
            })
        );
    }

    #[test]
    fn update_document_carries_id() {
        let body = RequestDocument::update("betaGroups", "g1").attribute("public_link_enabled", true);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["data"]["id"], "g1");
        assert_eq!(value["data"]["attributes"]["publicLinkEnabled"], true);
    }

    #[test]
    fn error_document_keeps_record_order() {
        let doc: ErrorDocument = serde_json::from_value(json!({
            "errors": [
                {"status": "409", "code": "ENTITY_ERROR.ATTRIBUTE.INVALID", "title": "A", "detail": "first",
                 "source": {"pointer": "/data/attributes/email"}},
                {"status": "409", "code": "ENTITY_ERROR", "title": "B", "detail": "second"}
            ]
        }))
        .unwrap();
        assert_eq!(doc.errors.len(), 2);
        assert_eq!(doc.errors[0].detail, "first");
        assert_eq!(
            doc.errors[0].source.as_ref().unwrap().pointer.as_deref(),
            Some("/data/attributes/email")
        );
        assert_eq!(doc.errors[1].code, "ENTITY_ERROR");
    }
}
