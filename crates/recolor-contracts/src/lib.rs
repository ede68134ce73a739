pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use config::{ColorizeConfig, TransportTimeouts};
pub use error::{ColorizeError, ErrorKind};
