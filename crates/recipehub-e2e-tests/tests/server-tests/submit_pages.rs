use recipehub_app::form::FormResponse;
use recipehub_e2e_tests::{launch_env, new_client, prepare_env, TestUser};
use reqwest::StatusCode;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_submit_and_browse() {
    let (args, _config_guard) = prepare_env("test_submit").await.unwrap();
    let (cook, base_url) = launch_env(args, TestUser::Cook).await.unwrap();

    let form_page = cook.get(base_url.join("submit").unwrap()).send().await.unwrap();
    assert_eq!(form_page.status(), StatusCode::OK);
    assert!(form_page
        .text()
        .await
        .unwrap()
        .contains(r#"data-endpoint="/submit-recipe""#));

    let response = cook
        .post(base_url.join("submit-recipe").unwrap())
        .form(&[
            ("title", "Grandma's <dumplings>"),
            ("description", ""),
            ("ingredients", "flour\n\n  potatoes  \n"),
            ("instructions", "boil"),
            ("prep_time", "20"),
            ("cook_time", "15"),
            ("servings", "2"),
            ("difficulty", "medium"),
            ("category", "Main"),
            ("image_url", ""),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let reply: FormResponse = response.json().await.unwrap();
    assert!(reply.success);
    assert_eq!(
        reply.message,
        "Recipe submitted successfully! Your recipe has been added to the collection."
    );
    let id = reply.recipe_id.unwrap();

    let response = cook
        .post(base_url.join("submit-recipe").unwrap())
        .json(&serde_json::json!({"title": " ", "ingredients": "x", "instructions": "y"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let reply: FormResponse = response.json().await.unwrap();
    assert_eq!(
        reply.message,
        "Title, ingredients, and instructions are required."
    );

    let anonymous = new_client().unwrap();
    let list = anonymous
        .get(base_url.join("recipes?search=dumplings").unwrap())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(list.contains("Grandma&#x27;s &lt;dumplings&gt;"));
    assert!(!list.contains("<dumplings>"));
    assert!(!list.contains("favorite-toggle"));

    let detail = cook
        .get(base_url.join(&format!("recipes/{id}")).unwrap())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(detail.contains("<li>flour</li><li>potatoes</li>"));
    assert!(detail.contains("favorite-toggle"));
    assert!(detail.contains("rating-star"));

    let mine = cook
        .get(base_url.join("my-recipes?status=published").unwrap())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(mine.contains("Grandma&#x27;s"));

    let response = anonymous
        .post(base_url.join("submit-recipe").unwrap())
        .form(&[("title", "x"), ("ingredients", "y"), ("instructions", "z")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = anonymous.get(base_url.join("favorites").unwrap()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
