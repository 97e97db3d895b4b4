// mistly-api: Async Rust client for the Juniper Mist cloud API

pub mod client;
pub mod error;
pub mod models;
pub mod paginate;
pub mod transport;

pub use client::{MistClient, NacQuery};
pub use error::Error;
pub use models::{NacClient, RawSite, UserMac};
pub use transport::TransportConfig;
