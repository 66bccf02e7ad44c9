use axum::{http::StatusCode, response::IntoResponse, routing::get, Extension, Router};
use futures::FutureExt as _;
use recipehub_app::{
    admin,
    auth::{auth_router, session_layer},
    pages, rest_api,
    state::AppState,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{config::ServerConfig, Result};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state, args.secure_cookies);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;
    debug!("Server stopped");

    Ok(())
}

/// Complete application router, JSON API on /api, form endpoints on /auth
/// and /admin, pages at the root
pub fn main_router(state: AppState, secure_cookies: bool) -> Router<()> {
    Router::new()
        .nest("/api", rest_api::router())
        .nest("/auth", auth_router())
        .nest("/admin", admin::router())
        .merge(pages::router())
        .layer(Extension(state.clone()))
        .with_state(state)
        .layer(session_layer(secure_cookies))
        .layer(TraceLayer::new_for_http())
        .route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.backend.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = recipehub_dal::new_pool(&config.database_url()).await?;
    recipehub_dal::migrate(&pool).await?;
    debug!("Database ready at {}", config.database_url());

    Ok(AppState::new(config.into(), pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use recipehub_app::state::AppConfig;
    use recipehub_dal::user::{CreateUser, UserRepository};
    use tower::ServiceExt as _;
    use tracing_test::traced_test;

    async fn test_state() -> AppState {
        let pool = recipehub_dal::new_memory_pool().await.unwrap();
        recipehub_dal::migrate(&pool).await.unwrap();
        let config = AppConfig::new("http://localhost:3000".parse().unwrap());
        AppState::new(config, pool)
    }

    async fn test_router() -> Router {
        main_router(test_state().await, false)
    }

    async fn status(app: &Router, method: &str, path: &str) -> StatusCode {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        app.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_routes_wiring() {
        let app = test_router().await;
        assert_eq!(status(&app, "GET", "/health").await, StatusCode::OK);
        assert_eq!(status(&app, "GET", "/api/recipes").await, StatusCode::OK);
        assert_eq!(status(&app, "GET", "/api/categories").await, StatusCode::OK);
        assert_eq!(status(&app, "GET", "/api/recipes/1").await, StatusCode::NOT_FOUND);
        assert_eq!(status(&app, "GET", "/recipes").await, StatusCode::OK);
        assert_eq!(status(&app, "GET", "/login").await, StatusCode::OK);
        assert_eq!(status(&app, "GET", "/no-such-page").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_protected_routes() {
        let app = test_router().await;
        assert_eq!(status(&app, "GET", "/api/favorites").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(&app, "POST", "/api/recipes").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(&app, "DELETE", "/api/recipes/1").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(&app, "GET", "/admin").await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status(&app, "POST", "/admin/recipes/delete").await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status(&app, "GET", "/api/users").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_demoted_admin_loses_access() {
        let state = test_state().await;
        let users = UserRepository::new(state.pool().clone());
        users
            .create(CreateUser {
                username: "chef".to_string(),
                email: "chef@example.com".parse().unwrap(),
                password: "secret123".to_string(),
                roles: Some(vec!["admin".to_string()]),
            })
            .await
            .unwrap();
        let app = main_router(state, false);

        let login = Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=chef&password=secret123&remember=1"))
            .unwrap();
        let response = app.clone().oneshot(login).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let admin_page = |cookie: &str| {
            Request::get("/admin")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(admin_page(&cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        users.set_roles("chef", &[]).await.unwrap();
        let response = app.clone().oneshot(admin_page(&cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let delete = Request::post("/admin/recipes/delete")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("recipe_id=1"))
            .unwrap();
        let response = app.oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
