use actix_web::{dev::Payload, web::Bytes, FromRequest, HttpMessage, HttpRequest};
use anyhow::anyhow;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use common::error::{AddCode, ServiceError};

/// Request body read as JSON or as an urlencoded form, whatever the
/// `Content-Type` says. A body that cannot be read as either falls back to
/// `T::default()`, so handlers always answer with a contract payload.
pub struct IssueBody<T>(pub T);

impl<T> IssueBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned + Default + 'static> FromRequest for IssueBody<T> {
    type Error = ServiceError;

    type Future = futures_util::future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let is_form = req.content_type() == "application/x-www-form-urlencoded";
        let bytes = Bytes::from_request(req, payload);

        Box::pin(async move {
            let bytes = bytes
                .await
                .map_err(|err| anyhow!("Failed to read request body: {}", err).code(400))?;
            Ok(IssueBody(parse_body(&bytes, is_form)))
        })
    }
}

pub fn parse_body<T: DeserializeOwned + Default>(bytes: &[u8], is_form: bool) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }

    // Only a JSON object is a payload; serde would happily read an array
    // positionally into the struct.
    let json = || match serde_json::from_slice::<Value>(bytes) {
        Ok(value @ Value::Object(_)) => serde_json::from_value::<T>(value).ok(),
        _ => None,
    };
    let form = || serde_urlencoded::from_bytes::<T>(bytes).ok();
    let parsed = if is_form {
        form().or_else(json)
    } else {
        json().or_else(form)
    };

    parsed.unwrap_or_else(|| {
        log::warn!("Unreadable request body, treating it as empty");
        T::default()
    })
}

/// Strings as sent; numbers and booleans in their text form. Anything else
/// counts as not sent.
pub fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
    })
}

/// Booleans, or the strings `"true"` / `"false"` that forms send. Anything
/// else counts as not sent.
pub fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(value) => Some(value),
        Value::String(value) => value.parse().ok(),
        _ => None,
    })
}
