mod geocode_handler;

pub use geocode_handler::*;
