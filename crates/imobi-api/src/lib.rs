// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Blocking HTTP client for the property-management REST API.
//!
//! One collection per resource, conventional shape: `GET /api/<resource>/`
//! lists, `POST` creates, `PUT /api/<resource>/<id>/` fully updates,
//! `DELETE /api/<resource>/<id>/` destroys. Success is any 2xx; a non-2xx
//! create/update response with a JSON object body is a structured
//! field-level validation error.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use imobi_app::{Record, RecordId, Resource};

/// Field-level errors parsed from the server's validation payload
/// (`field → message | [messages]`, the Django REST convention).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub messages: Vec<String>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .fields
            .iter()
            .map(|error| format!("{}: {}", error.field, error.messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("falha ao conectar em {base_url} -- verifique se o backend está rodando ({detail})")]
    Connection { base_url: String, detail: String },
    #[error("{method} {url} retornou HTTP {status}{}", status_detail(.detail))]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("resposta inválida de {url}: {detail}")]
    Decode { url: String, detail: String },
}

fn status_detail(detail: &Option<String>) -> String {
    match detail {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("api.base_url {base_url:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("api.base_url must use http or https, got {:?}", parsed.scheme());
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn collection_url(&self, resource: Resource) -> String {
        format!("{}/api/{}/", self.base_url, resource.path())
    }

    fn entity_url(&self, resource: Resource, id: RecordId) -> String {
        format!("{}/api/{}/{}/", self.base_url, resource.path(), id)
    }

    fn connection_error(&self, error: reqwest::Error) -> ApiError {
        ApiError::Connection {
            base_url: self.base_url.clone(),
            detail: error.to_string(),
        }
    }

    /// Fetch the full collection, in server order.
    pub fn list(&self, resource: Resource) -> Result<Vec<Record>, ApiError> {
        let url = self.collection_url(resource);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|error| self.connection_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(error_from_response("GET", &url, status, &body));
        }

        let values: Vec<Value> = response.json().map_err(|error| ApiError::Decode {
            url: url.clone(),
            detail: error.to_string(),
        })?;
        Record::from_values(values).map_err(|error| ApiError::Decode {
            url,
            detail: error.to_string(),
        })
    }

    /// Create a record: the payload carries no identifier, the server
    /// assigns one. The caller re-fetches the collection; the response body
    /// is not merged into local state.
    pub fn create(&self, resource: Resource, payload: &Map<String, Value>) -> Result<(), ApiError> {
        let url = self.collection_url(resource);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .map_err(|error| self.connection_error(error))?;
        check_mutation("POST", &url, response)
    }

    /// Full update of an existing record.
    pub fn update(
        &self,
        resource: Resource,
        id: RecordId,
        payload: &Map<String, Value>,
    ) -> Result<(), ApiError> {
        let url = self.entity_url(resource, id);
        let response = self
            .http
            .put(&url)
            .json(payload)
            .send()
            .map_err(|error| self.connection_error(error))?;
        check_mutation("PUT", &url, response)
    }

    pub fn delete(&self, resource: Resource, id: RecordId) -> Result<(), ApiError> {
        let url = self.entity_url(resource, id);
        let response = self
            .http
            .delete(&url)
            .send()
            .map_err(|error| self.connection_error(error))?;
        check_mutation("DELETE", &url, response)
    }
}

fn check_mutation(
    method: &'static str,
    url: &str,
    response: reqwest::blocking::Response,
) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().unwrap_or_default();
    Err(error_from_response(method, url, status, &body))
}

/// A JSON object body is the server's structured validation payload, except
/// for the single `detail` message some endpoints return; anything else is a
/// plain status failure.
fn error_from_response(method: &'static str, url: &str, status: StatusCode, body: &str) -> ApiError {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(detail)) = object.get("detail")
            && object.len() == 1
        {
            return ApiError::Status {
                method,
                url: url.to_owned(),
                status: status.as_u16(),
                detail: Some(detail.clone()),
            };
        }
        if !object.is_empty() {
            let fields = object
                .into_iter()
                .map(|(field, value)| FieldError {
                    field,
                    messages: error_messages(value),
                })
                .collect();
            return ApiError::Validation(ValidationErrors { fields });
        }
    }

    ApiError::Status {
        method,
        url: url.to_owned(),
        status: status.as_u16(),
        detail: None,
    }
}

fn error_messages(value: Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message],
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(message) => message,
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, error_from_response};
    use reqwest::StatusCode;

    #[test]
    fn object_bodies_become_field_level_validation_errors() {
        let error = error_from_response(
            "POST",
            "http://api/api/imoveis/",
            StatusCode::BAD_REQUEST,
            r#"{"valor_aluguel":["Este campo é obrigatório."],"endereco":"inválido"}"#,
        );
        let ApiError::Validation(errors) = error else {
            panic!("expected a validation error");
        };
        let rendered = errors.to_string();
        assert!(rendered.contains("valor_aluguel: Este campo é obrigatório."));
        assert!(rendered.contains("endereco: inválido"));
    }

    #[test]
    fn detail_only_bodies_become_status_errors_with_detail() {
        let error = error_from_response(
            "DELETE",
            "http://api/api/locadores/3/",
            StatusCode::CONFLICT,
            r#"{"detail":"Falha ao excluir."}"#,
        );
        let rendered = error.to_string();
        assert!(rendered.contains("HTTP 409"));
        assert!(rendered.contains("Falha ao excluir."));
    }

    #[test]
    fn non_json_bodies_become_plain_status_errors() {
        let error = error_from_response(
            "GET",
            "http://api/api/imoveis/",
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>boom</html>",
        );
        assert!(matches!(
            error,
            ApiError::Status {
                status: 500,
                detail: None,
                ..
            }
        ));
    }
}
