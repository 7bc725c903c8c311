mod breed_service;

pub use breed_service::{BreedFeatures, BreedService, NO_BREED_MESSAGE};
