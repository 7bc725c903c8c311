use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::geocoding::dtos::{ReverseGeocodeQuery, ReverseGeocodeResponseDto};
use crate::features::geocoding::services::GeocodingService;
use crate::shared::types::ApiResponse;

/// Address for a point picked on the map
///
/// If the lookup fails the response still succeeds, with the coordinates as
/// `location_text` and `resolved: false`.
#[utoipa::path(
    get,
    path = "/api/geocode/reverse",
    params(ReverseGeocodeQuery),
    responses(
        (status = 200, description = "Address (or coordinate fallback)", body = ApiResponse<ReverseGeocodeResponseDto>),
        (status = 400, description = "Coordinates out of range")
    ),
    tag = "geocoding"
)]
pub async fn reverse_geocode(
    State(service): State<Arc<GeocodingService>>,
    AppQuery(query): AppQuery<ReverseGeocodeQuery>,
) -> Result<Json<ApiResponse<ReverseGeocodeResponseDto>>> {
    query.check()?;

    let dto = match service.reverse(query.lat, query.lon).await {
        Ok(Some(place)) => ReverseGeocodeResponseDto::resolved(query.lat, query.lon, place),
        Ok(None) => ReverseGeocodeResponseDto::unresolved(query.lat, query.lon),
        Err(e) => {
            tracing::warn!(
                "Reverse geocoding ({}, {}) failed, using coordinates: {}",
                query.lat,
                query.lon,
                e
            );
            ReverseGeocodeResponseDto::unresolved(query.lat, query.lon)
        }
    };

    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}
