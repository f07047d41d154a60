//! Event payload extractor.
//!
//! Accepts a JSON object or an `application/x-www-form-urlencoded` body and
//! turns either into an [`EventPayload`]. Values are not coerced: form
//! fields stay strings and the validation rules accept digit strings where
//! integers are expected.

use axum::{
    Form,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde_json::Value;
use tracekeep_persistence::types::EventPayload;

use crate::error::RestError;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// Axum extractor for a proposed event.
///
/// # Example
///
/// ```rust,ignore
/// use tracekeep_rest::extractors::EventBody;
///
/// async fn handler(EventBody(payload): EventBody) {
///     println!("event type: {:?}", payload.string("event_type"));
/// }
/// ```
#[derive(Debug)]
pub struct EventBody(pub EventPayload);

impl EventBody {
    /// Consumes the extractor and returns the payload.
    pub fn into_inner(self) -> EventPayload {
        self.0
    }
}

/// Body encodings the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Json,
    Form,
}

/// Picks the body format from a `Content-Type` value.
///
/// A missing header is read as JSON. `+json` suffixes are accepted.
fn body_format(content_type: Option<&str>) -> Option<BodyFormat> {
    let Some(content_type) = content_type else {
        return Some(BodyFormat::Json);
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == JSON || mime.ends_with("+json") {
        Some(BodyFormat::Json)
    } else if mime == FORM {
        Some(BodyFormat::Form)
    } else {
        None
    }
}

impl<S> FromRequest<S> for EventBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        match body_format(content_type.as_deref()) {
            Some(BodyFormat::Json) => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| RestError::BadRequest {
                        message: format!("Failed to read request body: {}", e),
                    })?;
                let value: Value =
                    serde_json::from_slice(&bytes).map_err(|e| RestError::BadRequest {
                        message: format!("Invalid JSON: {}", e),
                    })?;
                Ok(EventBody(EventPayload::try_from(value)?))
            }
            Some(BodyFormat::Form) => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| RestError::BadRequest {
                        message: format!("Invalid form body: {}", e),
                    })?;
                Ok(EventBody(EventPayload::from_form_fields(fields)))
            }
            None => Err(RestError::UnsupportedMediaType {
                content_type: content_type.unwrap_or_default(),
            }),
        }
    }
}
