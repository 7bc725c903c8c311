use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::core::error::AppError;
use crate::features::geocoding::services::NominatimResponse;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReverseGeocodeQuery {
    /// Latitude, -90 to 90
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    /// Longitude, -180 to 180
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lon: f64,
}

impl ReverseGeocodeQuery {
    /// Range check plus a finiteness check the range rule lets through
    pub fn check(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();
        if !self.lat.is_finite() {
            errors.push("lat: Latitude must be a number".to_string());
        }
        if !self.lon.is_finite() {
            errors.push("lon: Longitude must be a number".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }
        self.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReverseGeocodeResponseDto {
    pub latitude: f64,
    pub longitude: f64,
    /// Suggested value for a report's location text
    pub location_text: String,
    /// False when the lookup failed and `location_text` holds the coordinates
    pub resolved: bool,
    pub display_name: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country_code: Option<String>,
}

impl ReverseGeocodeResponseDto {
    pub fn resolved(lat: f64, lon: f64, place: NominatimResponse) -> Self {
        let address = place.address.unwrap_or_default();
        let location_text = address
            .location_text()
            .unwrap_or_else(|| place.display_name.clone());

        Self {
            latitude: lat,
            longitude: lon,
            location_text,
            resolved: true,
            display_name: Some(place.display_name),
            city: address.get_city(),
            suburb: address.suburb.or(address.neighbourhood),
            road: address.road,
            state: address.state,
            postcode: address.postcode,
            country_code: address.country_code,
        }
    }

    /// Coordinates only, for when no address is available
    pub fn unresolved(lat: f64, lon: f64) -> Self {
        Self {
            latitude: lat,
            longitude: lon,
            location_text: crate::features::geocoding::services::coordinate_label(lat, lon),
            resolved: false,
            display_name: None,
            road: None,
            suburb: None,
            city: None,
            state: None,
            postcode: None,
            country_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::geocoding::services::NominatimAddress;

    #[test]
    fn test_query_rejects_out_of_range_and_nan() {
        assert!(ReverseGeocodeQuery { lat: 90.0, lon: -180.0 }.check().is_ok());
        assert!(ReverseGeocodeQuery { lat: 90.5, lon: 0.0 }.check().is_err());

        let Err(AppError::InvalidFields(errors)) =
            (ReverseGeocodeQuery { lat: f64::NAN, lon: 0.0 }).check()
        else {
            panic!("expected field errors");
        };
        assert_eq!(errors, vec!["lat: Latitude must be a number".to_string()]);
    }

    #[test]
    fn test_resolved_falls_back_to_display_name() {
        let place = NominatimResponse {
            place_id: 7,
            display_name: "Monas, Gambir, Jakarta".to_string(),
            address: None,
        };
        let dto = ReverseGeocodeResponseDto::resolved(-6.1754, 106.8272, place);
        assert!(dto.resolved);
        assert_eq!(dto.location_text, "Monas, Gambir, Jakarta");
    }

    #[test]
    fn test_resolved_prefers_short_label() {
        let place = NominatimResponse {
            place_id: 7,
            display_name: "long display name".to_string(),
            address: Some(NominatimAddress {
                neighbourhood: Some("Kemang".to_string()),
                city: Some("Jakarta Selatan".to_string()),
                ..Default::default()
            }),
        };
        let dto = ReverseGeocodeResponseDto::resolved(-6.26, 106.81, place);
        assert_eq!(dto.location_text, "Kemang, Jakarta Selatan");
        assert_eq!(dto.suburb.as_deref(), Some("Kemang"));
    }
}
