use anyhow::Context;
use http::StatusCode;
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Invalid(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({ "detail": msg }),
            Error::NotAuthenticated => json!({
                "detail": "Authentication credentials were not provided.",
            }),
            Error::PermissionDenied => json!({
                "detail": "You do not have permission to perform this action.",
            }),
            Error::NotFound => json!({ "detail": "Not found." }),
            Error::Invalid(msg) => json!({ "error": msg }),
        })
        .expect("serializing error contents")
    }

    /// Rebuilds an error from a rejected response
    ///
    /// The message is taken from the structured payload when there is one, and from the raw
    /// body otherwise, so that it can be shown to the user as-is.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Error {
        let message = match extract_message(body) {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                if text.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                } else {
                    text
                }
            }
            Err(err) => {
                tracing::debug!(?err, "error body is not a known error payload");
                String::from_utf8_lossy(body).trim().to_string()
            }
        };
        match status {
            StatusCode::UNAUTHORIZED => Error::NotAuthenticated,
            StatusCode::FORBIDDEN => Error::PermissionDenied,
            StatusCode::NOT_FOUND => Error::NotFound,
            s if s.is_client_error() => Error::Invalid(message),
            _ => Error::Unknown(message),
        }
    }
}

/// Ok(None) means the body is not JSON at all
fn extract_message(body: &[u8]) -> anyhow::Result<Option<String>> {
    let data: serde_json::Value = match serde_json::from_slice(body) {
        Ok(data) => data,
        Err(_) => return Ok(None),
    };
    let obj = match data {
        serde_json::Value::String(s) => return Ok(Some(s)),
        serde_json::Value::Array(items) => return Ok(Some(join_messages(&items))),
        serde_json::Value::Object(obj) => obj,
        _ => anyhow::bail!("error payload is neither an object, a list nor a string"),
    };
    for key in ["detail", "error", "message"] {
        if let Some(msg) = obj.get(key).and_then(|m| m.as_str()) {
            return Ok(Some(msg.to_string()));
        }
    }
    if let Some(errs) = obj.get("non_field_errors").and_then(|e| e.as_array()) {
        return Ok(Some(join_messages(errs)));
    }
    // per-field validation errors, eg. {"content": ["This field may not be blank."]}
    let mut fields = Vec::with_capacity(obj.len());
    for (field, errs) in obj.iter() {
        let msg = match errs {
            serde_json::Value::Array(errs) => join_messages(errs),
            serde_json::Value::String(s) => s.clone(),
            other => serde_json::to_string(other)
                .with_context(|| format!("rendering error for field {field:?}"))?,
        };
        fields.push(format!("{field}: {msg}"));
    }
    anyhow::ensure!(!fields.is_empty(), "error payload is an empty object");
    Ok(Some(fields.join("\n")))
}

fn join_messages(items: &[serde_json::Value]) -> String {
    items
        .iter()
        .map(|i| match i.as_str() {
            Some(s) => s.to_string(),
            None => i.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
