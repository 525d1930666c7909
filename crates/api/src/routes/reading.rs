//! Routes for the reading flow.
//!
//! ```text
//! POST /process_form     intention intake
//! GET  /cartas           card-draw page data
//! POST /cartas           chosen-card acknowledgement
//! POST /results          results shell
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{cards, intake};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process_form", post(intake::process_form))
        .route("/cartas", get(cards::get_cartas).post(cards::post_cartas))
        .route("/results", post(cards::post_results))
}
