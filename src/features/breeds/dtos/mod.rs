mod breed_dto;

pub use breed_dto::*;
