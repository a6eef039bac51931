//! Scope tracking data.
//!
//! ## Module Structure
//!
//! - `arena`: Scope nodes, aliases and the definition relation
//! - `state`: ParserSnapshot, the saved/restored scope state
//! - `result`: ParseResult, the per-file artifact shared through includes

pub mod arena;
pub mod result;
pub mod state;

pub use arena::{Alias, DefinitionRef, Scope, ScopeId, ScopeTree};
pub use result::{FileId, ParseResult};
pub use state::ParserSnapshot;
