//! Core data model: recipients, backup artifacts, and destination settings.

pub mod address;
pub mod artifact;
pub mod destination;
