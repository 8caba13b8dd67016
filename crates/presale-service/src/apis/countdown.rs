//! Countdown API.

use crate::server::AppState;
use axum::{extract::State, Json};
use presale_types::CountdownSnapshot;

/// Handles GET /api/countdown requests.
///
/// Returns the values last written by the countdown monitor. Before the
/// first successful poll the snapshot has no current block.
pub async fn get_countdown(State(state): State<AppState>) -> Json<CountdownSnapshot> {
	Json(state.countdown.snapshot().await)
}
