use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use http::{HeaderMap, StatusCode};
use serde::Deserialize;

use oidc_flow_axum::{InMemorySessionStore, OIDC_ROUTE_PREFIX};

pub(crate) async fn index(
    State(sessions): State<InMemorySessionStore>,
    headers: HeaderMap,
) -> Result<Html<String>, (StatusCode, String)> {
    let user = sessions
        .user_id_from_headers(&headers)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let body = match user {
        Some(user_id) => format!(
            r#"<p>Hey {}!</p><p><a href="/logout">Logout</a></p>"#,
            escape_html(user_id.as_str())
        ),
        None => r#"<p>Hey Anonymous User!</p><p><a href="/login">Login</a></p>"#.to_string(),
    };

    Ok(Html(page("Home", &body)))
}

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    error: Option<String>,
}

pub(crate) async fn login(Query(query): Query<LoginQuery>) -> Html<String> {
    let message = match query.error.as_deref() {
        Some("oidc_failed") => r#"<p class="error">Login failed. Please try again.</p>"#,
        Some(_) => r#"<p class="error">Something went wrong.</p>"#,
        None => "",
    };

    // The login endpoint returns the authorization URL as data; the page navigates to it
    let body = format!(
        r#"{message}
<button id="oidc" disabled>Login with OIDC</button>
<script>
const prefix = "{OIDC_ROUTE_PREFIX}";
const button = document.getElementById("oidc");
fetch(`${{prefix}}/enabled`)
  .then((r) => r.json())
  .then((data) => {{ button.disabled = !data.enabled; }});
button.addEventListener("click", async () => {{
  const r = await fetch(`${{prefix}}/login`);
  if (!r.ok) {{ alert(await r.text()); return; }}
  const data = await r.json();
  window.location.href = data.auth_url;
}});
</script>"#
    );

    Html(page("Login", &body))
}

pub(crate) async fn logout(
    State(sessions): State<InMemorySessionStore>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let headers = sessions
        .remove_session(&headers)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok((headers, Redirect::to("/")))
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{title}</title></head>\
         <body><h1>{title}</h1>{body}</body></html>"
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
