use recipehub_app::rest_api::recipe::{FavoriteState, RatingState};
use recipehub_dal::recipe::RecipeView;
use recipehub_e2e_tests::{
    create_user, launch_env, login, new_client, prepare_env, recipe_payload, rest::create_recipe,
    TestUser,
};
use reqwest::StatusCode;
use serde_json::json;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_favorites() {
    let (args, _config_guard) = prepare_env("test_favorites").await.unwrap();
    let (client, base_url) = launch_env(args, TestUser::Admin).await.unwrap();

    let first = create_recipe(&client, &base_url, &recipe_payload("First"))
        .await
        .unwrap();
    let second = create_recipe(&client, &base_url, &recipe_payload("Second"))
        .await
        .unwrap();
    let mut draft = recipe_payload("Hidden");
    draft["status"] = json!("draft");
    let hidden = create_recipe(&client, &base_url, &draft).await.unwrap();

    let favorite_url =
        |id: i64| base_url.join(&format!("api/recipes/{id}/favorite")).unwrap();

    // adding twice is fine
    for _ in 0..2 {
        let state: FavoriteState = client
            .post(favorite_url(first.recipe.id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(state.is_favorited);
    }
    let response = client
        .post(favorite_url(second.recipe.id))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(favorite_url(hidden.recipe.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = client.post(favorite_url(9999)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let favorites: Vec<RecipeView> = client
        .get(base_url.join("api/favorites").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<_> = favorites.iter().map(|f| f.recipe.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);
    assert!(favorites.iter().all(|f| f.is_favorited));

    let fetched: RecipeView = client
        .get(base_url.join(&format!("api/recipes/{}", first.recipe.id)).unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(fetched.is_favorited);

    // removing twice is fine too
    for _ in 0..2 {
        let response = client
            .delete(favorite_url(first.recipe.id))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }
    let favorites: Vec<RecipeView> = client
        .get(base_url.join("api/favorites").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(favorites.len(), 1);

    let anonymous = new_client().unwrap();
    let response = anonymous
        .post(favorite_url(first.recipe.id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = anonymous
        .get(base_url.join("api/favorites").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[traced_test]
async fn test_ratings() {
    let (args, _config_guard) = prepare_env("test_ratings").await.unwrap();
    create_user(&args, TestUser::Cook).await.unwrap();
    let (admin, base_url) = launch_env(args, TestUser::Admin).await.unwrap();
    let cook = new_client().unwrap();
    login(&cook, &base_url, "cook").await.unwrap();

    let recipe = create_recipe(&admin, &base_url, &recipe_payload("Rated"))
        .await
        .unwrap();
    let rating_url = base_url
        .join(&format!("api/recipes/{}/rating", recipe.recipe.id))
        .unwrap();

    for bad in [0, 6] {
        let response = cook
            .post(rating_url.clone())
            .json(&json!({"rating": bad}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let state: RatingState = admin
        .post(rating_url.clone())
        .json(&json!({"rating": 5}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state.rating, 5.0);
    assert_eq!(state.count, 1);

    cook.post(rating_url.clone())
        .json(&json!({"rating": 2}))
        .send()
        .await
        .unwrap();
    // latest rating of the same user replaces the previous one
    let state: RatingState = cook
        .post(rating_url.clone())
        .json(&json!({"rating": 4}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state.user_rating, 4);
    assert_eq!(state.count, 2);
    assert_eq!(state.rating, 4.5);

    let fetched: RecipeView = new_client()
        .unwrap()
        .get(base_url.join(&format!("api/recipes/{}", recipe.recipe.id)).unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.rating, 4.5);
    assert!(!fetched.is_favorited);

    let response = new_client()
        .unwrap()
        .post(rating_url)
        .json(&json!({"rating": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
