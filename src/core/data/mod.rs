//! Core data types shared by every pipeline stage.
//!
//! ## Module Structure
//!
//! - `qualified_name`: Segment and QualifiedName (paths from the global root)
//! - `message`: CandidateMessage, the unit handed to the catalog merge step

pub mod message;
pub mod qualified_name;

pub use message::{CandidateMessage, MessageExtras, MessageKind};
pub use qualified_name::{QualifiedName, SEPARATOR, Segment, join_contexts, join_segments};
