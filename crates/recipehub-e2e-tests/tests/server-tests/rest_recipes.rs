use recipehub_dal::recipe::{RecipeStatus, RecipeView};
use recipehub_e2e_tests::{
    create_user, launch_env, login, new_client, prepare_env, prepare_env_with, recipe_payload,
    rest::{create_recipe, list_recipes, titles},
    spawn_server, TestUser,
};
use reqwest::StatusCode;
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_recipe_crud() {
    let (args, _config_guard) = prepare_env("test_recipe_crud").await.unwrap();
    create_user(&args, TestUser::Cook).await.unwrap();
    let (admin, base_url) = launch_env(args, TestUser::Admin).await.unwrap();

    let created = create_recipe(&admin, &base_url, &recipe_payload("Sourdough"))
        .await
        .unwrap();
    assert_eq!(created.recipe.title, "Sourdough");
    assert_eq!(created.recipe.status, RecipeStatus::Published);
    assert_eq!(created.recipe.total_time(), 40);
    assert!(!created.is_favorited);
    assert_eq!(created.rating, 0.0);

    let recipe_url = base_url
        .join(&format!("api/recipes/{}", created.recipe.id))
        .unwrap();
    let anonymous = new_client().unwrap();
    let fetched: RecipeView = anonymous
        .get(recipe_url.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.recipe.title, created.recipe.title);
    assert_eq!(fetched.recipe.ingredients, "flour\nwater\nsalt");
    assert_eq!(fetched.recipe.servings, 4);

    // invalid payload
    let response = admin
        .post(base_url.join("api/recipes").unwrap())
        .json(&json!({"title": "No steps", "ingredients": "x", "instructions": "", "servings": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // regular users cannot update or delete
    let cook = new_client().unwrap();
    login(&cook, &base_url, "cook").await.unwrap();
    let response = cook
        .put(recipe_url.clone())
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = anonymous.delete(recipe_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = admin
        .put(recipe_url.clone())
        .json(&json!({"title": "Rye sourdough", "status": "draft"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let updated: RecipeView = response.json().await.unwrap();
    assert_eq!(updated.recipe.title, "Rye sourdough");
    assert_eq!(updated.recipe.status, RecipeStatus::Draft);
    assert_eq!(updated.recipe.servings, 4);

    // drafts are not public
    let response = anonymous.get(recipe_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = admin.delete(recipe_url.clone()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = admin.delete(recipe_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[traced_test]
async fn test_status_visibility() {
    let (args, _config_guard) = prepare_env("test_visibility").await.unwrap();
    create_user(&args, TestUser::Admin).await.unwrap();
    let (cook, base_url) = launch_env(args, TestUser::Cook).await.unwrap();
    let admin = new_client().unwrap();
    login(&admin, &base_url, "admin").await.unwrap();

    create_recipe(&cook, &base_url, &recipe_payload("Published A"))
        .await
        .unwrap();
    let mut draft = recipe_payload("Draft B");
    draft["status"] = json!("draft");
    let b = create_recipe(&admin, &base_url, &draft).await.unwrap();
    assert_eq!(b.recipe.status, RecipeStatus::Draft);

    let public = list_recipes(&cook, &base_url, "api/recipes", &[])
        .await
        .unwrap();
    assert_eq!(titles(&public), vec!["Published A"]);

    let mine = list_recipes(&cook, &base_url, "api/my-recipes", &[("status", "all")])
        .await
        .unwrap();
    assert_eq!(titles(&mine), vec!["Published A"]);
    let admins = list_recipes(&admin, &base_url, "api/my-recipes", &[("status", "all")])
        .await
        .unwrap();
    assert_eq!(titles(&admins), vec!["Draft B"]);

    let all = list_recipes(&admin, &base_url, "api/recipes", &[("status", "all")])
        .await
        .unwrap();
    assert_eq!(all.total, 2);
    let drafts = list_recipes(&admin, &base_url, "api/recipes", &[("status", "draft")])
        .await
        .unwrap();
    assert_eq!(titles(&drafts), vec!["Draft B"]);

    let response = cook
        .get(base_url.join("api/recipes?status=all").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = new_client()
        .unwrap()
        .get(base_url.join("api/recipes?status=draft").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[traced_test]
async fn test_listing_options() {
    let (args, _config_guard) = prepare_env("test_listing").await.unwrap();
    let (client, base_url) = launch_env(args, TestUser::Admin).await.unwrap();

    for (title, category) in [
        ("Apple pie", "Dessert"),
        ("Banana bread", "Bread"),
        ("Carrot cake", "Dessert"),
        ("100% rye", "Bread"),
    ] {
        let mut payload = recipe_payload(title);
        payload["category"] = json!(category);
        create_recipe(&client, &base_url, &payload).await.unwrap();
    }

    let page = list_recipes(
        &client,
        &base_url,
        "api/recipes",
        &[("orderby", "title"), ("order", "ASC"), ("per_page", "3")],
    )
    .await
    .unwrap();
    assert_eq!(titles(&page), vec!["100% rye", "Apple pie", "Banana bread"]);
    assert_eq!(page.total, 4);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page_size, 3);

    let second = list_recipes(
        &client,
        &base_url,
        "api/recipes",
        &[("orderby", "title"), ("order", "asc"), ("per_page", "3"), ("page", "2")],
    )
    .await
    .unwrap();
    assert_eq!(second.page, 2);
    assert_eq!(titles(&second), vec!["Carrot cake"]);

    let desserts = list_recipes(&client, &base_url, "api/recipes", &[("category", "Dessert")])
        .await
        .unwrap();
    assert_eq!(desserts.total, 2);

    let search = list_recipes(&client, &base_url, "api/recipes", &[("search", "%")])
        .await
        .unwrap();
    assert_eq!(titles(&search), vec!["100% rye"]);

    let categories: Vec<String> = client
        .get(base_url.join("api/categories").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories, vec!["Bread", "Dessert"]);

    for query in ["orderby=password", "order=sideways", "per_page=1000"] {
        let response = client
            .get(base_url.join(&format!("api/recipes?{query}")).unwrap())
            .send()
            .await
            .unwrap();
        info!("{query}: {}", response.status());
        assert!(response.status().is_client_error(), "{query}");
    }
}

#[tokio::test]
#[traced_test]
async fn test_pending_submissions() {
    let (args, _config_guard) =
        prepare_env_with("test_pending", &["--submission-status", "pending"])
            .await
            .unwrap();
    create_user(&args, TestUser::Cook).await.unwrap();
    let base_url = args.base_url.clone();
    spawn_server(args).await.unwrap();
    let cook = new_client().unwrap();
    login(&cook, &base_url, "cook").await.unwrap();

    let mut payload = recipe_payload("Waiting soup");
    payload["status"] = json!("published");
    let created = create_recipe(&cook, &base_url, &payload).await.unwrap();
    assert_eq!(created.recipe.status, RecipeStatus::Pending);

    let public = list_recipes(&cook, &base_url, "api/recipes", &[]).await.unwrap();
    assert_eq!(public.total, 0);
    let pending = list_recipes(&cook, &base_url, "api/my-recipes", &[("status", "pending")])
        .await
        .unwrap();
    assert_eq!(titles(&pending), vec!["Waiting soup"]);
}
