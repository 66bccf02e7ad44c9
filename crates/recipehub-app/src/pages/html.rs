use std::fmt::Write as _;

use axum::response::Html;
use recipehub_dal::recipe::{Difficulty, Recipe, RecipeStatus, RecipeView};
use recipehub_types::claim::{Authorization as _, UserClaim};

/// Escapes text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Non-blank lines of a newline delimited text, trimmed
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn encode_query(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs.iter().filter(|(_, v)| !v.is_empty()) {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn nav(user: Option<&UserClaim>) -> String {
    let mut nav = String::from(
        r#"<a href="/recipes">Recipes</a> <a href="/submit">Submit a recipe</a>"#,
    );
    match user {
        Some(user) => {
            nav.push_str(r#" <a href="/favorites">Favorites</a> <a href="/my-recipes">My recipes</a>"#);
            if user.is_admin() {
                nav.push_str(r#" <a href="/admin">Admin</a>"#);
            }
            let _ = write!(
                nav,
                r##" <span class="user">{}</span> <a href="#" class="logout-link">Log out</a>"##,
                escape(&user.username)
            );
        }
        None => {
            nav.push_str(r#" <a href="/login">Log in</a> <a href="/register">Register</a>"#);
        }
    }
    nav
}

pub fn layout(title: &str, user: Option<&UserClaim>, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | RecipeHub</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header><a class="brand" href="/recipes">RecipeHub</a><nav>{nav}</nav></header>
<main>
{body}
</main>
<script src="/static/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        nav = nav(user),
    ))
}

pub fn message_page(title: &str, user: Option<&UserClaim>, message: &str) -> Html<String> {
    let body = format!(
        r#"<section class="notice"><h1>{}</h1><p>{}</p><p><a href="/recipes">Back to recipes</a></p></section>"#,
        escape(title),
        escape(message)
    );
    layout(title, user, &body)
}

pub fn rating_badge(rating: f64) -> String {
    if rating > 0.0 {
        format!(r#"<span class="rating">&#9733; {rating:.2}</span>"#)
    } else {
        r#"<span class="rating none">Not rated yet</span>"#.to_string()
    }
}

pub fn favorite_button(view: &RecipeView) -> String {
    format!(
        r#"<button type="button" class="favorite-toggle{active}" data-recipe="{id}" data-active="{state}">{label}</button>"#,
        active = if view.is_favorited { " active" } else { "" },
        id = view.recipe.id,
        state = view.is_favorited,
        label = if view.is_favorited {
            "&#9829; Favorited"
        } else {
            "&#9825; Favorite"
        },
    )
}

pub fn recipe_card(view: &RecipeView, logged_in: bool, show_status: bool) -> String {
    let recipe = &view.recipe;
    let mut card = String::from(r#"<article class="recipe-card">"#);
    if !recipe.image_url.is_empty() {
        let _ = write!(
            card,
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            escape(&recipe.image_url),
            escape(&recipe.title)
        );
    }
    let _ = write!(
        card,
        r#"<h3><a href="/recipes/{id}">{title}</a></h3>"#,
        id = recipe.id,
        title = escape(&recipe.title)
    );
    if show_status {
        let _ = write!(
            card,
            r#"<span class="status status-{0}">{0}</span>"#,
            recipe.status
        );
    }
    if !recipe.category.is_empty() {
        let _ = write!(
            card,
            r#"<span class="category">{}</span>"#,
            escape(&recipe.category)
        );
    }
    let _ = write!(
        card,
        r#"<ul class="meta"><li>{} min</li><li>Serves {}</li><li class="difficulty-{2}">{2}</li></ul>{3}"#,
        recipe.total_time(),
        recipe.servings,
        recipe.difficulty,
        rating_badge(view.rating)
    );
    if logged_in && recipe.status == RecipeStatus::Published {
        card.push_str(&favorite_button(view));
    }
    card.push_str("</article>");
    card
}

pub fn recipe_grid(views: &[RecipeView], logged_in: bool, show_status: bool, empty: &str) -> String {
    if views.is_empty() {
        return format!(r#"<p class="empty">{}</p>"#, escape(empty));
    }
    let mut grid = String::from(r#"<div class="recipe-grid">"#);
    for view in views {
        grid.push_str(&recipe_card(view, logged_in, show_status));
    }
    grid.push_str("</div>");
    grid
}

/// Page links, `query` holds the parameters to keep besides `page`
pub fn pagination(path: &str, query: &[(&str, &str)], page: u64, total_pages: u64) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let link = |target: u64| {
        let page = target.to_string();
        let mut pairs: Vec<(&str, &str)> = query.to_vec();
        pairs.push(("page", &page));
        format!("{path}?{}", escape(&encode_query(&pairs)))
    };
    let mut html = String::from(r#"<nav class="pagination">"#);
    if page > 1 {
        let _ = write!(html, r#"<a href="{}">&laquo; Previous</a>"#, link(page - 1));
    }
    for target in 1..=total_pages {
        if target == page {
            let _ = write!(html, r#"<span class="current">{target}</span>"#);
        } else {
            let _ = write!(html, r#"<a href="{}">{target}</a>"#, link(target));
        }
    }
    if page < total_pages {
        let _ = write!(html, r#"<a href="{}">Next &raquo;</a>"#, link(page + 1));
    }
    html.push_str("</nav>");
    html
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    )
}

pub fn select_options<'a>(
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
    selected: &str,
) -> String {
    options
        .into_iter()
        .map(|(value, label)| option(value, label, value == selected))
        .collect()
}

/// Recipe editor used by the submission page and the admin pages
pub fn recipe_form(endpoint: &str, recipe: Option<&Recipe>, with_status: bool, submit: &str) -> String {
    let text = |f: fn(&Recipe) -> &str| recipe.map(|r| escape(f(r))).unwrap_or_default();
    let number = |f: fn(&Recipe) -> i64, default: i64| recipe.map(f).unwrap_or(default);
    let difficulty = recipe.map(|r| r.difficulty).unwrap_or_default();
    let status = recipe.map(|r| r.status).unwrap_or_default();

    let mut form = format!(r#"<form class="recipe-form" data-endpoint="{}">"#, escape(endpoint));
    if let Some(recipe) = recipe {
        let _ = write!(
            form,
            r#"<input type="hidden" name="recipe_id" value="{}">"#,
            recipe.id
        );
    }
    let _ = write!(
        form,
        r#"<label>Title <input type="text" name="title" required maxlength="255" value="{title}"></label>
<label>Description <textarea name="description" rows="3">{description}</textarea></label>
<label>Ingredients (one per line) <textarea name="ingredients" rows="8" required>{ingredients}</textarea></label>
<label>Instructions (one step per line) <textarea name="instructions" rows="8" required>{instructions}</textarea></label>
<div class="row">
<label>Prep time (min) <input type="number" name="prep_time" min="0" value="{prep}"></label>
<label>Cook time (min) <input type="number" name="cook_time" min="0" value="{cook}"></label>
<label>Servings <input type="number" name="servings" min="1" value="{servings}"></label>
<label>Difficulty <select name="difficulty">{difficulties}</select></label>
</div>
<label>Category <input type="text" name="category" maxlength="100" value="{category}"></label>
<label>Image URL <input type="url" name="image_url" value="{image_url}"></label>
"#,
        title = text(|r| &r.title),
        description = text(|r| &r.description),
        ingredients = text(|r| &r.ingredients),
        instructions = text(|r| &r.instructions),
        prep = number(|r| r.prep_time, 0),
        cook = number(|r| r.cook_time, 0),
        servings = number(|r| r.servings, 1),
        difficulties = select_options(
            Difficulty::ALL.iter().map(|d| (d.as_str(), d.as_str())),
            difficulty.as_str()
        ),
        category = text(|r| &r.category),
        image_url = text(|r| &r.image_url),
    );
    if with_status {
        let _ = write!(
            form,
            r#"<label>Status <select name="status">{}</select></label>"#,
            select_options(
                RecipeStatus::ALL.iter().map(|s| (s.as_str(), s.as_str())),
                status.as_str()
            )
        );
    }
    let _ = write!(
        form,
        r#"<div class="form-message" role="status"></div><button type="submit">{}</button></form>"#,
        escape(submit)
    );
    form
}
