use recipehub_app::form::FormResponse;
use recipehub_e2e_tests::{
    create_user, login, new_client, prepare_env, spawn_server, TestUser, TEST_PASSWORD,
};
use recipehub_types::claim::UserClaim;
use reqwest::StatusCode;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_register_login_logout() {
    let (args, _config_guard) = prepare_env("test_register").await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let client = new_client().unwrap();

    let me_url = base_url.join("auth/me").unwrap();
    let response = client.get(me_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let register_url = base_url.join("auth/register").unwrap();
    let mismatch = [
        ("username", "julia"),
        ("email", "julia@example.com"),
        ("password", "secret1"),
        ("confirm_password", "secret2"),
    ];
    let response = client
        .post(register_url.clone())
        .form(&mismatch)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let reply: FormResponse = response.json().await.unwrap();
    assert!(!reply.success);
    assert_eq!(reply.message, "Passwords do not match.");

    let valid = [
        ("username", "julia"),
        ("email", "julia@example.com"),
        ("password", "secret1"),
        ("confirm_password", "secret1"),
    ];
    let response = client
        .post(register_url.clone())
        .form(&valid)
        .send()
        .await
        .unwrap();
    info!("Register response: {:#?}", response);
    assert!(response.status().is_success());
    let reply: FormResponse = response.json().await.unwrap();
    assert!(reply.success);
    assert!(reply.redirect.unwrap().ends_with("/recipes"));

    let user: UserClaim = client
        .get(me_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user.username, "julia");
    assert!(user.roles.is_empty());

    // second registration with the same name
    let other = new_client().unwrap();
    let response = other.post(register_url).form(&valid).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let reply: FormResponse = response.json().await.unwrap();
    assert_eq!(reply.message, "Username already exists.");

    let response = client
        .post(base_url.join("auth/logout").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let response = client.get(me_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[traced_test]
async fn test_login() {
    let (args, _config_guard) = prepare_env("test_login").await.unwrap();
    create_user(&args, TestUser::Cook).await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let client = new_client().unwrap();
    let login_url = base_url.join("auth/login").unwrap();

    let response = client
        .post(login_url.clone())
        .form(&[("username", "cook"), ("password", "wrong-password")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let reply: FormResponse = response.json().await.unwrap();
    assert_eq!(reply.message, "Invalid username or password.");

    let response = client
        .post(login_url.clone())
        .json(&serde_json::json!({"username": "", "password": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // login by email, remembered session gets a persistent cookie
    let response = client
        .post(login_url)
        .form(&[
            ("username", "cook@example.com"),
            ("password", TEST_PASSWORD),
            ("remember", "1"),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    info!("Session cookie: {cookie}");
    assert!(cookie.starts_with("recipehub="));
    assert!(cookie.contains("Max-Age") || cookie.contains("Expires"));

    let user: UserClaim = client
        .get(base_url.join("auth/me").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user.username, "cook");

    let fresh = new_client().unwrap();
    login(&fresh, &base_url, "cook").await.unwrap();
}
