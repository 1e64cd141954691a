//! Pure domain state for the MSC editor: the sequence aggregate and the
//! undo/redo history ring.  No I/O, no async, no framework types.

pub mod history;
pub mod sequence;
