//! Address autocomplete proxy route handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::warn;

use crate::error::AppError;
use crate::places::{PlaceDetails, PlacesError};
use crate::types::{ApiMessage, AutocompleteParams, AutocompleteResponse, DetailsParams};

use super::AppState;

/// GET /api/v1/places/autocomplete?input=...
///
/// Address suggestions for the listing form. The form stays usable when the
/// upstream misbehaves: failures come back as an error message beside an
/// empty prediction list, not as an HTTP error.
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> Json<AutocompleteResponse> {
    let Some(input) = params.input.filter(|i| !i.is_empty()) else {
        return Json(AutocompleteResponse {
            error: None,
            predictions: Vec::new(),
        });
    };

    match state.places.autocomplete(&input).await {
        Ok(predictions) => Json(AutocompleteResponse {
            error: None,
            predictions,
        }),
        Err(e) => {
            warn!(error = %e, "address autocomplete failed");
            Json(AutocompleteResponse {
                error: Some(ApiMessage {
                    message: "Failed to fetch suggestions".to_string(),
                }),
                predictions: Vec::new(),
            })
        }
    }
}

/// GET /api/v1/places/details?place_id=...
pub async fn details(
    State(state): State<AppState>,
    Query(params): Query<DetailsParams>,
) -> Result<Json<PlaceDetails>, AppError> {
    let Some(place_id) = params.place_id.filter(|p| !p.is_empty()) else {
        return Err(AppError::BadRequest("place_id is required".to_string()));
    };

    let details = state
        .places
        .details(&place_id)
        .await
        .map_err(|e| match e {
            PlacesError::MissingKey => AppError::Internal(e.to_string()),
            _ => AppError::Upstream("Failed to fetch place details".to_string()),
        })?;

    Ok(Json(details))
}
