//! bistro-types: domain types and ports for the restaurant ordering workflow

pub mod domain;
pub mod ports;
