//! bistro-hex: ordering workflow core (config, validation, checkout service,
//! inbound HTTP adapter)

pub mod config;
pub mod errors;
pub mod validation;

pub mod application;

pub use bistro_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
