use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::get,
};
use serde::Serialize;

use oidc_flow::{AuthorizationRequest, CallbackOutcome, CallbackParameters, OidcFlow};

use super::error::IntoResponseError;
use super::transport::Transport;

pub(super) fn router(flow: OidcFlow) -> Router {
    Router::new()
        .route("/enabled", get(enabled))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .with_state(flow)
}

#[derive(Serialize)]
struct EnabledResponse {
    enabled: bool,
}

async fn enabled(State(flow): State<OidcFlow>) -> Json<EnabledResponse> {
    Json(EnabledResponse {
        enabled: flow.is_enabled(),
    })
}

async fn login(
    State(flow): State<OidcFlow>,
    Transport(transport): Transport,
) -> Result<Json<AuthorizationRequest>, (StatusCode, String)> {
    let request = flow.start_login(&transport).await.into_response_error()?;
    Ok(Json(request))
}

async fn callback(
    State(flow): State<OidcFlow>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    // Repeated keys keep their first value; an unparsable query is handled
    // like one missing state and code
    let params = match query {
        Ok(Query(pairs)) => CallbackParameters::from_query_pairs(pairs),
        Err(e) => {
            tracing::debug!("Invalid callback query: {}", e);
            CallbackParameters::default()
        }
    };

    let outcome = flow.complete_callback(&params).await.into_response_error()?;
    let target = outcome.redirect_target();

    let headers = match outcome {
        CallbackOutcome::Succeeded {
            session_headers, ..
        } => session_headers,
        CallbackOutcome::Failed(_) => HeaderMap::new(),
    };

    Ok((headers, Redirect::temporary(target)))
}
