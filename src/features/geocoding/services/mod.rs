mod geocoding_service;

pub use geocoding_service::{
    coordinate_label, GeocodingService, NominatimAddress, NominatimResponse,
};
