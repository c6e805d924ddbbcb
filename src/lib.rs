//! Table-cell annotation editing engine
//!
//! Cells are axis-aligned rectangles over a document image. The engine keeps
//! them rectangular through every move and resize, snaps edges to neighbours,
//! reports overlaps and disagreeing borders, and records bounded undo history.

pub mod config;
pub mod domain;
pub mod interaction;
pub mod overlap;
pub mod report;
pub mod session;
pub mod snap;

pub use config::EditorConfig;
pub use session::EditorSession;
