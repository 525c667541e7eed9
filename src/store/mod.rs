//! Temporary storage for outgoing attachments.

pub mod temp;
