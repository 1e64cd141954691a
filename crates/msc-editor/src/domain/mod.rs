//! Editor-local domain types (configuration).  The shared protocol
//! entities live in `msc-core`.

pub mod config;
