//! Wire-level request/response types and sequence transfer formats.

pub mod messages;
pub mod transfer;
