use axum::response::{IntoResponse, Redirect, Response};

use super::html;
use crate::auth::MaybeUser;

const LOGIN_FORM: &str = r#"<h1>Log in</h1>
<form class="auth-form" data-endpoint="/auth/login">
<label>Username or email <input type="text" name="username" required autocomplete="username"></label>
<label>Password <input type="password" name="password" required autocomplete="current-password"></label>
<label class="inline"><input type="checkbox" name="remember" value="1"> Remember me</label>
<div class="form-message" role="status"></div>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#;

const REGISTER_FORM: &str = r#"<h1>Register</h1>
<form class="auth-form" data-endpoint="/auth/register">
<label>Username <input type="text" name="username" required minlength="3" maxlength="60" autocomplete="username"></label>
<label>Email <input type="email" name="email" required autocomplete="email"></label>
<label>Password <input type="password" name="password" required minlength="6" autocomplete="new-password"></label>
<label>Confirm password <input type="password" name="confirm_password" required minlength="6" autocomplete="new-password"></label>
<div class="form-message" role="status"></div>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>"#;

pub async fn login(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/recipes").into_response();
    }
    html::layout("Log in", None, LOGIN_FORM).into_response()
}

pub async fn register(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/recipes").into_response();
    }
    html::layout("Register", None, REGISTER_FORM).into_response()
}
