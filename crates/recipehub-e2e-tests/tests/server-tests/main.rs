mod admin_forms;
mod favorites_ratings;
mod rest_recipes;
mod server_auth;
mod server_health;
mod submit_pages;
