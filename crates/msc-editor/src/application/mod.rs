//! Application services: the sequence editor and its supporting
//! policies (optimistic commit classification, decode fallback chain).

pub mod editor;
pub mod fallback;
pub mod optimistic;
