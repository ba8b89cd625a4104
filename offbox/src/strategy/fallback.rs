//! Responses synthesized when neither the network nor a store can answer.

use http::StatusCode;
use offbox_core::{HttpResponse, RequestClass};
use serde_json::json;

/// `error` field of the offline API response.
pub const OFFLINE_ERROR: &str = "Offline";
/// `message` field of the offline API response.
pub const OFFLINE_MESSAGE: &str = "No internet connection. Please try again later.";
/// Body of the plain-text offline response.
pub const OFFLINE_TEXT: &str = "Offline";
/// Body of the Cache-First failure response.
pub const UNAVAILABLE_TEXT: &str = "Resource unavailable";

/// `503` for a request that could not reach the network and had no cached copy.
///
/// API calls get a JSON body so client code can parse it like any other API
/// error, everything else gets plain text.
pub fn offline(class: RequestClass) -> HttpResponse {
    match class {
        RequestClass::Api => HttpResponse::json(
            StatusCode::SERVICE_UNAVAILABLE,
            &json!({
                "error": OFFLINE_ERROR,
                "message": OFFLINE_MESSAGE,
            }),
        ),
        _ => HttpResponse::text(StatusCode::SERVICE_UNAVAILABLE, OFFLINE_TEXT),
    }
}

/// `404` for a cache-first resource that was neither cached nor fetchable.
pub fn unavailable() -> HttpResponse {
    HttpResponse::text(StatusCode::NOT_FOUND, UNAVAILABLE_TEXT)
}
