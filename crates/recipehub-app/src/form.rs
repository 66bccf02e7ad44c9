use std::fmt::Display;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;

use crate::error::ApiError;

/// Reply of the AJAX form endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<i64>,
}

impl FormResponse {
    pub fn success(message: impl Into<String>) -> Self {
        FormResponse {
            success: true,
            message: message.into(),
            redirect: None,
            recipe_id: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        FormResponse {
            success: false,
            ..FormResponse::success(message)
        }
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn with_recipe_id(mut self, recipe_id: i64) -> Self {
        self.recipe_id = Some(recipe_id);
        self
    }
}

impl IntoResponse for FormResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

pub type FormResult = Result<FormResponse, FormError>;

#[derive(Debug)]
pub struct FormError {
    status: StatusCode,
    message: String,
}

impl FormError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        FormError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Logs the cause and replies with the generic `message` only
    pub fn storage(message: impl Into<String>, cause: impl Display) -> Self {
        error!("Storage failure: {cause}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        (self.status, Json(FormResponse::failure(self.message))).into_response()
    }
}

impl From<ApiError> for FormError {
    fn from(value: ApiError) -> Self {
        let status = value.status_code();
        if status.is_server_error() {
            FormError::storage("Request failed. Please try again.", value)
        } else if status == StatusCode::FORBIDDEN {
            FormError::new(status, "Permission denied")
        } else {
            FormError::new(status, value.to_string())
        }
    }
}

impl From<recipehub_dal::Error> for FormError {
    fn from(value: recipehub_dal::Error) -> Self {
        ApiError::from(value).into()
    }
}

impl From<tower_sessions::session::Error> for FormError {
    fn from(value: tower_sessions::session::Error) -> Self {
        ApiError::from(value).into()
    }
}

impl From<anyhow::Error> for FormError {
    fn from(value: anyhow::Error) -> Self {
        ApiError::from(value).into()
    }
}

/// Reads a checkbox-like flag: JSON booleans and numbers, or form values
/// such as `1`, `on`, `true`, `yes`
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value != 0,
        Flag::Text(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "on" | "true" | "yes"
        ),
    })
}

/// Treats an empty form value as a missing one
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    match Option::<Id>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Id::Number(id)) => Ok(Some(id).filter(|id| *id > 0)),
        Some(Id::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Id::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(|id| Some(id).filter(|id| *id > 0))
            .map_err(serde::de::Error::custom),
    }
}

/// Reads an optional whole number, a blank form value counts as missing
pub fn deserialize_optional_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Number(i64),
        Text(String),
    }

    match Option::<Number>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Number::Number(n)) => Ok(Some(n)),
        Some(Number::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Number::Text(text)) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("{text:?} is not a whole number"))),
    }
}
