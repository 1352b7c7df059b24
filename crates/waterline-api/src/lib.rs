// waterline-api: Async client for the water-level sensor feed

pub mod error;
pub mod feed;
pub mod transport;

pub use error::Error;
pub use feed::{FeedClient, Payload, PayloadShape};
pub use transport::{TlsMode, TransportConfig};
