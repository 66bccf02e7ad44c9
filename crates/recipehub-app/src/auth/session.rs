use std::{
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::{FromRequestParts, Request},
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use futures::future::BoxFuture;
use http::request::Parts;
use recipehub_dal::{user::UserRepository, Pool};
use recipehub_types::claim::{Authorization, Role, UserClaim};
use tower::{Layer, Service};
use tower_sessions::{Expiry, Session};
use tracing::{debug, error};

use super::SESSION_USER_KEY;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub async fn session_user(session: &Session) -> ApiResult<Option<UserClaim>> {
    let user = session.get::<UserClaim>(SESSION_USER_KEY).await?;
    Ok(user)
}

/// Session user with roles re-read from the database, so role changes made
/// meanwhile apply to existing sessions. A session of a removed account ends.
pub async fn current_user(session: &Session, pool: &Pool) -> ApiResult<Option<UserClaim>> {
    let Some(stored) = session_user(session).await? else {
        return Ok(None);
    };
    match UserRepository::new(pool.clone()).get(stored.id).await {
        Ok(user) => {
            let user = UserClaim::from(user);
            if user != stored {
                debug!("User {} changed since login, updating session", user.id);
                session.insert(SESSION_USER_KEY, &user).await?;
            }
            Ok(Some(user))
        }
        Err(recipehub_dal::Error::RecordNotFound(_)) => {
            debug!("User {} no longer exists, ending session", stored.id);
            session.flush().await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Stores the user in a fresh session. With `remember_for` the session
/// outlives the browser session.
pub async fn start_session(
    session: &Session,
    user: UserClaim,
    remember_for: Option<time::Duration>,
) -> ApiResult<()> {
    session.cycle_id().await?;
    debug!("Starting session for user {}", user.id);
    session.insert(SESSION_USER_KEY, user).await?;
    if let Some(period) = remember_for {
        session.set_expiry(Some(Expiry::OnInactivity(period)));
    }
    Ok(())
}

async fn extract_session(parts: &mut Parts) -> ApiResult<Session> {
    parts.extract::<Session>().await.map_err(|(_, msg)| {
        error!("Cannot get session: {msg}");
        ApiError::InternalError(msg.to_string())
    })
}

/// Logged in user, rejects anonymous requests with 401
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserClaim);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = extract_session(parts).await?;
        current_user(&session, state.pool())
            .await?
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Logged in user if there is one
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserClaim>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(|u| u.is_admin())
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = extract_session(parts).await?;
        Ok(MaybeUser(current_user(&session, state.pool()).await?))
    }
}

/// Rejects requests whose session user lacks any of the roles,
/// 401 when nobody is logged in, 403 otherwise. Needs the session layer and
/// an `Extension<AppState>` further out.
#[derive(Clone)]
pub struct RequiredRolesLayer {
    roles: Arc<[Role]>,
}

impl RequiredRolesLayer {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        RequiredRolesLayer {
            roles: roles.into_iter().collect(),
        }
    }
}

impl<S> Layer<S> for RequiredRolesLayer {
    type Service = RequiredRolesService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequiredRolesService {
            inner,
            roles: self.roles.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequiredRolesService<S> {
    inner: S,
    roles: Arc<[Role]>,
}

impl<S> Service<Request> for RequiredRolesService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // the clone may not be ready, keep the one that was polled
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let roles = self.roles.clone();

        Box::pin(async move {
            let Some(session) = req.extensions().get::<Session>().cloned() else {
                error!("Session layer is not installed");
                return Ok(ApiError::InternalError("missing session".to_string()).into_response());
            };
            let Some(state) = req.extensions().get::<AppState>().cloned() else {
                error!("Application state extension is not installed");
                return Ok(ApiError::InternalError("missing state".to_string()).into_response());
            };

            match current_user(&session, state.pool()).await {
                Ok(Some(user)) if user.has_all_roles(roles.iter()) => inner.call(req).await,
                Ok(Some(user)) => {
                    debug!("User {} lacks roles {:?}", user.id, roles);
                    Ok(ApiError::Forbidden.into_response())
                }
                Ok(None) => Ok(ApiError::Unauthorized.into_response()),
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}
