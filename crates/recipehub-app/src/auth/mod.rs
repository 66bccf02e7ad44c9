use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json,
};
use recipehub_dal::user::{CreateUser, UserRepository, MIN_PASSWORD_LENGTH};
use recipehub_types::general::ValidEmail;
use serde::Deserialize;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, info};

use crate::{
    error::ApiResult,
    form::{deserialize_flag, FormError, FormResponse, FormResult},
    repository_from_request,
    state::AppState,
    validate::FormOrJson,
};
use garde::Validate as _;
use http::StatusCode;

pub mod session;

pub use session::{CurrentUser, MaybeUser, RequiredRolesLayer};

pub const SESSION_COOKIE_NAME: &str = "recipehub";
const SESSION_USER_KEY: &str = "user";

repository_from_request!(UserRepository);

/// Session middleware for the whole application, sessions end with the
/// browser session unless the user asks to be remembered
pub fn session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    let session_store = MemoryStore::default();
    SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(secure)
        .with_expiry(Expiry::OnSessionEnd)
}

/// Builds authentication router - must be nested on /auth path!
pub fn auth_router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Checks the form in the order the user should hear about problems
    fn into_new_user(self) -> Result<CreateUser, FormError> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(FormError::bad_request("All fields are required."));
        }
        if self.password != self.confirm_password {
            return Err(FormError::bad_request("Passwords do not match."));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(FormError::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters."
            )));
        }
        let email: ValidEmail = email
            .parse()
            .map_err(|_| FormError::bad_request("Invalid email address."))?;

        let user = CreateUser {
            username: username.to_string(),
            email,
            password: self.password,
            roles: None,
        };
        user.validate()
            .map_err(|report| FormError::bad_request(format!("Invalid registration: {report}")))?;
        Ok(user)
    }
}

pub async fn register(
    State(state): State<AppState>,
    users: UserRepository,
    session: Session,
    FormOrJson(form): FormOrJson<RegistrationForm>,
) -> FormResult {
    let new_user = form.into_new_user()?;

    if users.username_exists(&new_user.username).await? {
        return Err(FormError::new(
            StatusCode::CONFLICT,
            "Username already exists.",
        ));
    }
    if users.email_exists(new_user.email.as_ref()).await? {
        return Err(FormError::new(
            StatusCode::CONFLICT,
            "Email already registered.",
        ));
    }

    let user = users.create(new_user).await.map_err(|e| {
        if e.is_unique_violation() {
            FormError::new(StatusCode::CONFLICT, "Username or email already registered.")
        } else {
            FormError::storage("Registration failed. Please try again.", e)
        }
    })?;
    info!("Registered user {} ({})", user.username, user.id);

    session::start_session(&session, user.into(), None).await?;
    let redirect = state.build_url("recipes")?;
    Ok(FormResponse::success("Registration successful!").with_redirect(redirect))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub remember: bool,
}

pub async fn login(
    State(state): State<AppState>,
    users: UserRepository,
    session: Session,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> FormResult {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(FormError::bad_request(
            "Username and password are required.",
        ));
    }

    let user = users
        .check_password(&form.username, &form.password)
        .await
        .map_err(|e| match e {
            recipehub_dal::Error::InvalidCredentials => {
                debug!("Failed login for {}", form.username);
                FormError::new(StatusCode::UNAUTHORIZED, "Invalid username or password.")
            }
            other => FormError::storage("Login failed. Please try again.", other),
        })?;

    let remember_for = form.remember.then_some(state.config().remember_for);
    session::start_session(&session, user.into(), remember_for).await?;
    let redirect = state.build_url("recipes")?;
    Ok(FormResponse::success("Login successful!").with_redirect(redirect))
}

pub async fn logout(State(state): State<AppState>, session: Session) -> FormResult {
    session.flush().await?;
    let redirect = state.build_url("/")?;
    Ok(FormResponse::success("Logged out successfully.").with_redirect(redirect))
}

pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<impl IntoResponse> {
    Ok(Json(user))
}
