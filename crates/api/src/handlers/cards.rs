//! Card-draw and results-shell handlers.
//!
//! Both resolve the caller's session binding without consuming it; the
//! binding is only taken when generation starts over the push channel.

use arcana_core::deck::{self, DrawnCard};
use arcana_core::error::CoreError;
use arcana_core::intent::{CardCount, StoredIntent};
use arcana_core::reading::{validate_chosen_cards, ChosenCard};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::sessions;
use crate::state::AppState;

/// `GET /cartas` response: a fresh spread partitioned into the three
/// display groups, plus how many cards the user may turn over.
#[derive(Debug, Serialize)]
pub struct CardsPageResponse {
    pub groups: [Vec<DrawnCard>; 3],
    pub selected_cards: CardCount,
}

/// Body of `POST /cartas` and `POST /results`.
#[derive(Debug, Deserialize)]
pub struct ChosenCardsRequest {
    pub choosed_cards: Vec<ChosenCard>,
}

/// `POST /cartas` acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `POST /results` response: the shell the results page renders before
/// resolving the reading over the push channel.
#[derive(Debug, Serialize)]
pub struct ResultsShellResponse {
    pub intencao: String,
    pub selected_cards: CardCount,
    pub choosed_cards: Vec<ChosenCard>,
}

/// Resolve the caller's stored intent or fail with `SESSION_EXPIRED`.
async fn resolve_intent(state: &AppState, headers: &HeaderMap) -> AppResult<StoredIntent> {
    let token =
        sessions::token_from_headers(headers).ok_or(AppError::Core(CoreError::SessionExpired))?;
    state
        .sessions
        .peek(&token)
        .await
        .ok_or(AppError::Core(CoreError::SessionExpired))
}

/// GET /cartas
///
/// Draws a spread for the card-draw page. Drawing is pure; nothing in the
/// session changes, so a page refresh simply deals a new permutation.
pub async fn get_cartas(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let intent = resolve_intent(&state, &headers).await?;
    let spread = deck::draw_spread();

    Ok(Json(CardsPageResponse {
        groups: spread.groups,
        selected_cards: intent.card_count,
    }))
}

/// POST /cartas
///
/// Acknowledges the cards the user turned over, after checking them
/// against the stored card count.
pub async fn post_cartas(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ChosenCardsRequest>,
) -> AppResult<impl IntoResponse> {
    let intent = resolve_intent(&state, &headers).await?;
    validate_chosen_cards(&input.choosed_cards, intent.card_count)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /results
///
/// Returns the results shell (intention, count, chosen cards). Peeks the
/// binding without consuming it -- the shell must render before the push
/// channel exchange takes the session.
pub async fn post_results(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ChosenCardsRequest>,
) -> AppResult<impl IntoResponse> {
    let intent = resolve_intent(&state, &headers).await?;
    validate_chosen_cards(&input.choosed_cards, intent.card_count)?;

    Ok(Json(ResultsShellResponse {
        intencao: intent.intention,
        selected_cards: intent.card_count,
        choosed_cards: input.choosed_cards,
    }))
}
