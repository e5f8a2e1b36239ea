//! Request and response body encodings.
//!
//! Two structured text encodings are supported, JSON and YAML. Request bodies
//! are decoded according to `Content-Type`; responses follow `Accept`. When a
//! header is absent the configured default encoding applies.
use axum::http::{HeaderMap, HeaderValue, header};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const JSON_MEDIA_TYPE: &str = "application/json";
const YAML_MEDIA_TYPE: &str = "application/yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Json,
    Yaml,
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("request body is empty")]
    EmptyBody,
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Encoding {
    pub fn media_type(&self) -> &'static str {
        match self {
            Encoding::Json => JSON_MEDIA_TYPE,
            Encoding::Yaml => YAML_MEDIA_TYPE,
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "application/json" => Some(Encoding::Json),
            "application/yaml" | "application/x-yaml" | "text/yaml" | "text/x-yaml" => {
                Some(Encoding::Yaml)
            }
            _ => None,
        }
    }

    /// Picks the decoder for an inbound body. An absent `Content-Type` falls
    /// back to `default`; anything unrecognized is an error.
    pub fn for_request(headers: &HeaderMap, default: Encoding) -> Result<Self, CodecError> {
        let Some(value) = headers.get(header::CONTENT_TYPE) else {
            return Ok(default);
        };
        let raw = value
            .to_str()
            .map_err(|_| CodecError::UnsupportedContentType("<non-ascii>".to_string()))?;
        let media_type = essence(raw);
        Self::from_media_type(&media_type).ok_or(CodecError::UnsupportedContentType(media_type))
    }

    /// Picks the encoder for a response from `Accept`, honoring q-values.
    pub fn for_response(headers: &HeaderMap, default: Encoding) -> Self {
        let Some(accept) = headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
        else {
            return default;
        };
        let mut best: Option<(f32, Encoding)> = None;
        for entry in accept.split(',') {
            let mut parts = entry.split(';');
            let media_type = essence(parts.next().unwrap_or_default());
            let quality = parts
                .filter_map(|param| param.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            let candidate = match media_type.as_str() {
                "*/*" | "application/*" => Some(default),
                other => Self::from_media_type(other),
            };
            if let Some(encoding) = candidate {
                if quality > 0.0 && best.is_none_or(|(q, _)| quality > q) {
                    best = Some((quality, encoding));
                }
            }
        }
        best.map(|(_, encoding)| encoding).unwrap_or(default)
    }

    pub fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, CodecError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(CodecError::EmptyBody);
        }
        match self {
            Encoding::Json => Ok(serde_json::from_slice(body)?),
            Encoding::Yaml => Ok(serde_yaml::from_slice(body)?),
        }
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Bytes, CodecError> {
        match self {
            Encoding::Json => Ok(Bytes::from(serde_json::to_vec(value)?)),
            Encoding::Yaml => Ok(Bytes::from(serde_yaml::to_string(value)?)),
        }
    }

    pub fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static(self.media_type())
    }
}

fn essence(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
