// Sensor feed endpoint: HTTP client plus top-level payload resolution.

mod client;
mod payload;

pub use client::{CACHE_BUST_PARAM, FeedClient};
pub use payload::{Payload, PayloadShape, is_present, shape_of};
