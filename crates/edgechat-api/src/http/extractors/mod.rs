//! Custom request extractors.

pub mod client;
