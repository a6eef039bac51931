//! Include handling shared across files.
//!
//! ## Module Structure
//!
//! - `cache`: IncludeCache (detached results, cycle groups, blacklist, messages)
//! - `paths`: Path cleaning, the header heuristic and include lookup

pub mod cache;
pub mod paths;

pub use cache::{CacheKey, IncludeCache};
pub use paths::{clean_path, is_header, resolve_include};
