//! Mapping of raw responses to documents or errors.
//!
//! A 2xx response is parsed as a [`Document`]. Anything else is checked for
//! the API's error envelope: when it parses and holds at least one record the
//! caller gets [`Error::Api`] with every record in server order, otherwise
//! [`Error::Http`] with the raw body.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::document::{Document, ErrorDocument};
use crate::error::{Error, Result};
use crate::http::HttpResponse;

/// Map non-success status codes to the appropriate `Error` variant.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    match serde_json::from_str::<ErrorDocument>(&response.body) {
        Ok(envelope) if !envelope.errors.is_empty() => {
            warn!(
                status = response.status,
                count = envelope.errors.len(),
                first_code = %envelope.errors[0].code,
                "API returned error envelope"
            );
            Err(Error::Api {
                status: response.status,
                errors: envelope.errors,
            })
        }
        _ => {
            warn!(status = response.status, "API returned non-success status without error envelope");
            Err(Error::Http {
                status: response.status,
                body: response.body.clone(),
            })
        }
    }
}

pub fn parse_document<A: DeserializeOwned>(response: HttpResponse) -> Result<Document<A>> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(Error::Deserialization)
}

/// Success of a call whose body carries nothing of interest (`DELETE`).
pub fn parse_empty(response: HttpResponse) -> Result<()> {
    check_status(&response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn error_envelope_becomes_api_error_in_order() {
        let body = r#"{"errors":[
            {"status":"409","code":"ENTITY_ERROR.ATTRIBUTE.INVALID","title":"An attribute value is invalid.","detail":"one"},
            {"status":"409","code":"ENTITY_ERROR.RELATIONSHIP.INVALID","title":"A relationship value is invalid.","detail":"two"}
        ]}"#;
        let err = check_status(&response(409, body)).unwrap_err();
        match err {
            Error::Api { status, errors } => {
                assert_eq!(status, 409);
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].detail, "one");
                assert_eq!(errors[1].code, "ENTITY_ERROR.RELATIONSHIP.INVALID");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_envelope_body_becomes_http_error() {
        let err = check_status(&response(502, "bad gateway")).unwrap_err();
        assert!(matches!(err, Error::Http { status: 502, ref body } if body == "bad gateway"));
    }

    #[test]
    fn empty_error_list_is_not_an_envelope() {
        let err = check_status(&response(500, r#"{"errors":[]}"#)).unwrap_err();
        assert!(matches!(err, Error::Http { status: 500, .. }));
    }

    #[test]
    fn success_body_parses() {
        let doc: Document = parse_document(response(
            200,
            r#"{"data":[{"type":"apps","id":"1","attributes":{"name":"A"}},{"type":"apps","id":"2","attributes":{"name":"B"}}]}"#,
        ))
        .unwrap();
        assert_eq!(doc.resources().len(), 2);
        assert_eq!(doc.resources()[1].attribute_str("name"), Some("B"));
    }

    #[test]
    fn malformed_success_body_is_a_deserialization_error() {
        let err = parse_document::<crate::Attributes>(response(200, "not json")).unwrap_err();
        assert!(matches!(err, Error::Deserialization(_)));
    }

    #[test]
    fn empty_delete_response_succeeds() {
        assert!(parse_empty(response(204, "")).is_ok());
    }
}
