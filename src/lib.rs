//! `backupmail` — deliver backup files as email attachments.
//!
//! This crate provides an email destination for backup pipelines: it
//! validates recipients, gates attachments on size, optionally wraps them
//! in an AES-256 encrypted ZIP, sends one message per recipient and always
//! removes the temporary attachment file afterwards.

pub mod archive;
pub mod config;
pub mod destination;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod size;
pub mod store;
pub mod transport;
