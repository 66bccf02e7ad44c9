use axum::response::IntoResponse;
use http::header::{CACHE_CONTROL, CONTENT_TYPE};

const STYLE: &str = r#"
:root { --accent: #c0392b; --muted: #6b6b6b; --border: #e3e3e3; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; color: #222; background: #fafafa; }
header { display: flex; justify-content: space-between; align-items: center; padding: .75rem 1.5rem; background: #fff; border-bottom: 1px solid var(--border); }
header nav a, header nav span { margin-left: 1rem; }
a { color: var(--accent); text-decoration: none; }
.brand { font-weight: bold; font-size: 1.3rem; }
main { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }
.filters { display: flex; flex-wrap: wrap; gap: .5rem; margin-bottom: 1rem; }
.recipe-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1rem; }
.recipe-card { background: #fff; border: 1px solid var(--border); border-radius: 6px; padding: 1rem; }
.recipe-card img, .recipe-detail img { width: 100%; max-height: 320px; object-fit: cover; border-radius: 4px; }
.meta { display: flex; gap: .75rem; padding: 0; list-style: none; color: var(--muted); }
.category, .status { display: inline-block; font-size: .8rem; padding: .1rem .5rem; border-radius: 3px; background: #eee; margin-right: .3rem; }
.status-pending { background: #fff3cd; }
.status-draft { background: #e2e3e5; }
.rating { color: #d4a017; }
.rating.none { color: var(--muted); }
.favorite-toggle.active { color: var(--accent); }
.rating-star { background: none; border: none; font-size: 1.4rem; cursor: pointer; color: #ccc; }
.rating-star.active { color: #d4a017; }
.tabs a { margin-right: 1rem; }
.tabs a.current { font-weight: bold; }
.pagination { margin: 1.5rem 0; display: flex; gap: .5rem; }
.pagination .current { font-weight: bold; }
form.recipe-form, form.auth-form { display: flex; flex-direction: column; gap: .75rem; max-width: 640px; }
form .row { display: flex; gap: .75rem; flex-wrap: wrap; }
label { display: flex; flex-direction: column; gap: .25rem; }
label.inline { flex-direction: row; align-items: center; }
input, textarea, select, button { font: inherit; padding: .4rem; }
button { cursor: pointer; }
.form-message.success { color: #1e7e34; }
.form-message.error { color: var(--accent); }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: .5rem; border-bottom: 1px solid var(--border); }
.empty { color: var(--muted); }
"#;

const SCRIPT: &str = r#"
(function () {
  'use strict';

  async function send(url, method, params) {
    const options = { method: method, credentials: 'same-origin', headers: {} };
    if (params) {
      options.headers['Content-Type'] = 'application/x-www-form-urlencoded';
      options.body = params;
    }
    const response = await fetch(url, options);
    let data = {};
    try { data = await response.json(); } catch (e) { data = {}; }
    return { ok: response.ok, data: data };
  }

  async function sendJson(url, method, payload) {
    const response = await fetch(url, {
      method: method,
      credentials: 'same-origin',
      headers: { 'Content-Type': 'application/json' },
      body: payload ? JSON.stringify(payload) : undefined
    });
    let data = {};
    try { data = await response.json(); } catch (e) { data = {}; }
    return { ok: response.ok, data: data };
  }

  document.addEventListener('submit', async function (event) {
    const form = event.target.closest('form[data-endpoint]');
    if (!form) { return; }
    event.preventDefault();
    const box = form.querySelector('.form-message');
    const result = await send(form.dataset.endpoint, 'POST', new URLSearchParams(new FormData(form)));
    const ok = result.ok && result.data.success;
    if (box) {
      box.textContent = result.data.message || result.data.error || 'Request failed';
      box.className = 'form-message ' + (ok ? 'success' : 'error');
    }
    if (ok && result.data.redirect) {
      setTimeout(function () { window.location.href = result.data.redirect; }, 600);
    }
  });

  document.addEventListener('click', async function (event) {
    const favorite = event.target.closest('.favorite-toggle');
    if (favorite) {
      const active = favorite.dataset.active === 'true';
      const url = '/api/recipes/' + favorite.dataset.recipe + '/favorite';
      const result = await sendJson(url, active ? 'DELETE' : 'POST');
      if (result.ok) {
        const now = result.data.is_favorited;
        favorite.dataset.active = String(now);
        favorite.classList.toggle('active', now);
        favorite.innerHTML = now ? '&#9829; Favorited' : '&#9825; Favorite';
      } else if (result.data.error) {
        alert(result.data.error);
      }
      return;
    }

    const star = event.target.closest('.rating-star');
    if (star) {
      const box = star.closest('.rating-stars');
      const url = '/api/recipes/' + box.dataset.recipe + '/rating';
      const result = await sendJson(url, 'POST', { rating: Number(star.dataset.value) });
      if (result.ok) {
        box.querySelectorAll('.rating-star').forEach(function (s) {
          s.classList.toggle('active', Number(s.dataset.value) <= result.data.user_rating);
        });
        const summary = document.querySelector('.rating-summary');
        if (summary) {
          summary.textContent = result.data.rating.toFixed(2) + ' (' + result.data.count + ' ratings)';
        }
      } else if (result.data.error) {
        alert(result.data.error);
      }
      return;
    }

    const logout = event.target.closest('.logout-link');
    if (logout) {
      event.preventDefault();
      const result = await send('/auth/logout', 'POST');
      window.location.href = (result.data && result.data.redirect) || '/';
      return;
    }

    const remove = event.target.closest('.admin-delete');
    if (remove) {
      if (!confirm('Delete this recipe?')) { return; }
      const params = new URLSearchParams({ recipe_id: remove.dataset.recipe });
      const result = await send('/admin/recipes/delete', 'POST', params);
      if (result.ok && result.data.success) {
        const row = remove.closest('tr');
        if (row) { row.remove(); }
      } else {
        alert(result.data.message || result.data.error || 'Request failed');
      }
    }
  });
})();
"#;

pub async fn style() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/css; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        STYLE,
    )
}

pub async fn script() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        SCRIPT,
    )
}
