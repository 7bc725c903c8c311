mod breed_handler;

pub use breed_handler::*;
