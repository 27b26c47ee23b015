//! Thin Firestore REST client.
//!
//! Converts between plain JSON and Firestore's typed value encoding for the
//! subset of types the domain serializes (strings, integers, booleans,
//! arrays, maps, null). Timestamps travel as RFC 3339 strings because the
//! domain writes and reads its own documents.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Map, Value};

use crate::ports::StoreError;

/// Configuration for the Firestore REST client.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the API key appended as a query parameter (emulators and
    /// key-restricted projects).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(key.into()));
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shared HTTP client for the three Firestore-backed stores.
#[derive(Clone)]
pub struct FirestoreClient {
    config: FirestoreConfig,
    http: Client,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn document_url(&self, path: &str) -> String {
        let mut url = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.config.base_url, self.config.project_id, path
        );
        if let Some(key) = &self.config.api_key {
            url.push_str(&format!("?key={}", key.expose_secret()));
        }
        url
    }

    /// Reads a document; `None` when it does not exist.
    pub async fn get_document(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .http
            .get(self.document_url(path))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc: Value = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Malformed(e.to_string()))?;
                Ok(Some(decode_fields(doc.get("fields"))?))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Unavailable(format!("{status}: {body}")))
            }
        }
    }

    /// Creates or fully replaces a document at a known path.
    pub async fn set_document(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        let body = json!({ "fields": encode_fields(value)? });
        let response = self
            .http
            .patch(self.document_url(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!("{status}: {body}")));
        }
        Ok(())
    }

    /// Appends a document to a collection and returns its assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        value: &Value,
    ) -> Result<String, StoreError> {
        let body = json!({ "fields": encode_fields(value)? });
        let response = self
            .http
            .post(self.document_url(collection))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!("{status}: {body}")));
        }

        let created: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        // The document id is the last segment of the resource name.
        created
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .map(str::to_string)
            .ok_or_else(|| StoreError::Malformed("create response missing name".to_string()))
    }
}

/// Encodes a JSON object into Firestore's `fields` map.
fn encode_fields(value: &Value) -> Result<Map<String, Value>, StoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::Malformed("document root must be an object".to_string()))?;

    object
        .iter()
        .map(|(k, v)| Ok((k.clone(), encode_value(v)?)))
        .collect()
}

fn encode_value(value: &Value) -> Result<Value, StoreError> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Result<Vec<_>, _> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values? } })
        }
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value)? } }),
    };
    Ok(encoded)
}

/// Decodes a Firestore `fields` map back into a plain JSON object.
fn decode_fields(fields: Option<&Value>) -> Result<Value, StoreError> {
    let mut out = Map::new();
    let Some(fields) = fields.and_then(Value::as_object) else {
        return Ok(Value::Object(out));
    };

    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(out))
}

fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let object = value
        .as_object()
        .ok_or_else(|| StoreError::Malformed("expected typed value object".to_string()))?;

    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| StoreError::Malformed("empty typed value".to_string()))?;

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.clone(),
        "stringValue" => inner.clone(),
        "timestampValue" => inner.clone(),
        "doubleValue" => inner.clone(),
        "integerValue" => {
            let raw = inner
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| inner.to_string());
            let parsed: i64 = raw
                .parse()
                .map_err(|_| StoreError::Malformed(format!("bad integerValue: {raw}")))?;
            json!(parsed)
        }
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let decoded: Result<Vec<_>, _> = items.iter().map(decode_value).collect();
            Value::Array(decoded?)
        }
        "mapValue" => decode_fields(inner.get("fields"))?,
        other => {
            return Err(StoreError::Malformed(format!(
                "unsupported value kind: {other}"
            )))
        }
    };
    Ok(decoded)
}
