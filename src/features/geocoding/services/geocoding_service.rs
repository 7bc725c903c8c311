use serde::Deserialize;
use std::time::Duration;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};

/// Nominatim reverse lookup response
#[derive(Debug, Deserialize)]
pub struct NominatimResponse {
    #[allow(dead_code)]
    pub place_id: i64,
    pub display_name: String,
    pub address: Option<NominatimAddress>,
}

/// Nominatim address components
#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub road: Option<String>,
    pub neighbourhood: Option<String>,
    pub suburb: Option<String>,
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country_code: Option<String>,
}

impl NominatimAddress {
    /// Get city, falling back to town, village or regency
    pub fn get_city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
            .or_else(|| self.county.clone())
    }

    /// Short label for a report: road, area, city and province
    ///
    /// Empty parts and consecutive repeats are skipped.
    pub fn location_text(&self) -> Option<String> {
        let area = self.suburb.clone().or_else(|| self.neighbourhood.clone());
        let mut parts: Vec<String> = Vec::new();
        for part in [self.road.clone(), area, self.get_city(), self.state.clone()]
            .into_iter()
            .flatten()
        {
            let part = part.trim().to_string();
            if !part.is_empty() && parts.last() != Some(&part) {
                parts.push(part);
            }
        }
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Nominatim answers 200 with `{"error": ...}` when nothing is found
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResult {
    Found(NominatimResponse),
    NotFound { error: String },
}

/// Text used when a point cannot be resolved to an address
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    format!("{:.6}, {:.6}", lat, lon)
}

/// Reverse geocoding through Nominatim
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    accept_language: String,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            accept_language: config.accept_language.clone(),
        })
    }

    fn reverse_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}&addressdetails=1&accept-language={}",
            self.base_url,
            lat,
            lon,
            urlencoding::encode(&self.accept_language)
        )
    }

    /// Resolve a point to an address; `Ok(None)` when Nominatim knows nothing there
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<NominatimResponse>> {
        let url = self.reverse_url(lat, lon);
        tracing::debug!("Reverse geocoding ({}, {}) -> {}", lat, lon, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("Nominatim request failed: {:?}", e);
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            tracing::warn!("Nominatim returned status: {}", response.status());
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim returned status {}",
                response.status()
            )));
        }

        let result: ReverseResult = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Nominatim response: {:?}", e);
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        match result {
            ReverseResult::Found(place) => Ok(Some(place)),
            ReverseResult::NotFound { error } => {
                tracing::debug!("No address at ({}, {}): {}", lat, lon, error);
                Ok(None)
            }
        }
    }
}
