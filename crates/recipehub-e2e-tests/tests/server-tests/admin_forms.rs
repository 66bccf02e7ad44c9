use recipehub_app::form::FormResponse;
use recipehub_dal::recipe::{RecipeStatus, RecipeView};
use recipehub_e2e_tests::{create_user, launch_env, login, new_client, prepare_env, TestUser};
use reqwest::StatusCode;
use tracing::info;
use tracing_test::traced_test;

fn recipe_form<'a>(title: &'a str, status: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("recipe_id", ""),
        ("title", title),
        ("description", "From the admin form"),
        ("ingredients", "rice\nbeans"),
        ("instructions", "soak\ncook"),
        ("prep_time", "15"),
        ("cook_time", "45"),
        ("servings", "3"),
        ("difficulty", "hard"),
        ("category", "Main"),
        ("image_url", ""),
        ("status", status),
    ]
}

#[tokio::test]
#[traced_test]
async fn test_admin_save_and_delete() {
    let (args, _config_guard) = prepare_env("test_admin_forms").await.unwrap();
    create_user(&args, TestUser::Cook).await.unwrap();
    let (admin, base_url) = launch_env(args, TestUser::Admin).await.unwrap();
    let save_url = base_url.join("admin/recipes/save").unwrap();
    let delete_url = base_url.join("admin/recipes/delete").unwrap();

    let response = admin
        .post(save_url.clone())
        .form(&recipe_form("Rice and beans", "draft"))
        .send()
        .await
        .unwrap();
    info!("Save response: {:#?}", response);
    assert!(response.status().is_success());
    let reply: FormResponse = response.json().await.unwrap();
    assert!(reply.success);
    assert_eq!(reply.message, "Recipe added successfully");
    assert_eq!(reply.redirect.as_deref(), Some("/admin"));
    let id = reply.recipe_id.unwrap();

    let id_text = id.to_string();
    let mut update = recipe_form("Rice and black beans", "published");
    update[0] = ("recipe_id", &id_text);
    let reply: FormResponse = admin
        .post(save_url.clone())
        .form(&update)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply.message, "Recipe updated successfully");

    let recipe: RecipeView = admin
        .get(base_url.join(&format!("api/recipes/{id}")).unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recipe.recipe.title, "Rice and black beans");
    assert_eq!(recipe.recipe.status, RecipeStatus::Published);
    assert_eq!(recipe.recipe.total_time(), 60);

    let response = admin
        .post(save_url.clone())
        .form(&recipe_form("", "draft"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let reply: FormResponse = response.json().await.unwrap();
    assert_eq!(
        reply.message,
        "Title, ingredients, and instructions are required."
    );

    let mut missing = recipe_form("Ghost", "draft");
    missing[0] = ("recipe_id", "9999");
    let response = admin.post(save_url.clone()).form(&missing).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // regular users get the form reply shape with permission denied
    let cook = new_client().unwrap();
    login(&cook, &base_url, "cook").await.unwrap();
    let response = cook
        .post(delete_url.clone())
        .form(&[("recipe_id", id_text.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let reply: FormResponse = response.json().await.unwrap();
    assert!(!reply.success);
    assert_eq!(reply.message, "Permission denied");

    let reply: FormResponse = admin
        .post(delete_url.clone())
        .form(&[("recipe_id", id_text.as_str())])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply.message, "Recipe deleted successfully");

    let response = admin
        .post(delete_url)
        .form(&[("recipe_id", id_text.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = admin
        .get(base_url.join(&format!("api/recipes/{id}")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[traced_test]
async fn test_admin_pages() {
    let (args, _config_guard) = prepare_env("test_admin_pages").await.unwrap();
    create_user(&args, TestUser::Cook).await.unwrap();
    let (admin, base_url) = launch_env(args, TestUser::Admin).await.unwrap();

    let response = admin
        .post(base_url.join("admin/recipes/save").unwrap())
        .form(&recipe_form("<Spicy> stew", "pending"))
        .send()
        .await
        .unwrap();
    let reply: FormResponse = response.json().await.unwrap();
    let id = reply.recipe_id.unwrap();

    let page = admin
        .get(base_url.join("admin?status=pending").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.unwrap();
    assert!(html.contains("&lt;Spicy&gt; stew"));

    let edit = admin
        .get(base_url.join(&format!("admin/recipes/{id}/edit")).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(edit.status(), StatusCode::OK);
    let html = edit.text().await.unwrap();
    assert!(html.contains(&format!(r#"name="recipe_id" value="{id}""#)));
    assert!(html.contains(r#"<option value="pending" selected>"#));

    let response = admin
        .get(base_url.join("admin/recipes/777/edit").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let cook = new_client().unwrap();
    login(&cook, &base_url, "cook").await.unwrap();
    for path in ["admin", "admin/recipes/new"] {
        let response = cook.get(base_url.join(path).unwrap()).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
    }
    let response = new_client()
        .unwrap()
        .get(base_url.join("admin").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
