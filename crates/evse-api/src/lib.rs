// evse-api: Async Rust client for the EVSE controller's local HTTP API

pub mod alarms;
pub mod cards;
pub mod client;
pub mod error;
pub mod models;
pub mod settings;
pub mod system;
pub mod transport;

pub use client::EvseClient;
pub use error::Error;
pub use models::{Ack, AlarmEntry, CardEntry, ConfigPayload, ConfigResponse, StatusResponse};
pub use transport::TransportConfig;
