//! Tolerant parsing of generative model output

mod parser;
mod response;

pub use parser::{parse_string_list, parse_with_fallback};
pub use response::LlmResponse;
