//! Server rendered pages. Forms and buttons on these pages talk to the
//! JSON and form endpoints through the small script in [`assets`].

use axum::{
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use http::StatusCode;
use tracing::error;

use crate::{error::ApiError, state::AppState};

pub mod account;
pub mod assets;
pub mod catalog;
pub mod html;
pub mod submit;

pub type PageResult<T = axum::response::Html<String>> = Result<T, PageError>;

/// Failure rendered as an HTML page
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        PageError {
            status,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Recipe not found.")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApiError> for PageError {
    fn from(value: ApiError) -> Self {
        let status = value.status_code();
        match status {
            StatusCode::NOT_FOUND => PageError::not_found(),
            StatusCode::UNAUTHORIZED => {
                PageError::new(status, "Please log in to see this page.")
            }
            s if s.is_server_error() => {
                error!("Page failed: {value}");
                PageError::new(status, "Internal server error")
            }
            _ => PageError::new(status, value.to_string()),
        }
    }
}

impl From<recipehub_dal::Error> for PageError {
    fn from(value: recipehub_dal::Error) -> Self {
        ApiError::from(value).into()
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let title = self
            .status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string();
        (self.status, html::message_page(&title, None, &self.message)).into_response()
    }
}

async fn home() -> Redirect {
    Redirect::to("/recipes")
}

/// Public pages, merged at the root of the application
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/recipes", get(catalog::list))
        .route("/recipes/{id}", get(catalog::detail))
        .route("/favorites", get(catalog::favorites))
        .route("/my-recipes", get(catalog::my_recipes))
        .route("/submit", get(submit::form))
        .route("/submit-recipe", post(submit::submit_recipe))
        .route("/login", get(account::login))
        .route("/register", get(account::register))
        .route("/static/style.css", get(assets::style))
        .route("/static/app.js", get(assets::script))
}
