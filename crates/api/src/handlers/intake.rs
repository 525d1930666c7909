//! Intake form handler: validate, sanitize, and bind the intention to a
//! session token.

use arcana_core::intent::{self, CardCount, StoredIntent};
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::sessions;
use crate::state::AppState;

/// `POST /process_form` request body.
#[derive(Debug, Deserialize)]
pub struct ProcessFormRequest {
    pub intention: String,
    #[serde(rename = "selectedCards")]
    pub selected_cards: String,
}

/// `POST /process_form` success body: where the page navigates next.
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub redirect: &'static str,
}

/// POST /process_form
///
/// Validates the card count and intention length, sanitizes the
/// intention, and stores the binding under the caller's session token
/// (issuing a fresh one if the request carried no cookie). Re-submitting
/// replaces the previous binding; it never queues a second reading.
pub async fn process_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ProcessFormRequest>,
) -> AppResult<impl IntoResponse> {
    let card_count = CardCount::parse(&input.selected_cards)?;
    intent::validate_intention(&input.intention)?;
    let intention = intent::sanitize_intention(&input.intention);

    let token = sessions::token_from_headers(&headers)
        .unwrap_or_else(|| state.sessions.issue_token());

    state
        .sessions
        .insert(token.clone(), StoredIntent { intention, card_count })
        .await;
    tracing::debug!(%card_count, "Stored intent for session");

    let cookie = sessions::session_cookie(&token, state.config.session_ttl_secs);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(RedirectResponse { redirect: "/cartas" }),
    ))
}
