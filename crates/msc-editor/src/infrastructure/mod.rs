//! Infrastructure adapters: the HTTP backend client and the local
//! snapshot store.

pub mod api;
pub mod store;
