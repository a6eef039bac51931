//! Extraction engine.
//!
//! # Pipeline
//!
//! 1. **Scan**: `file_scanner` finds the inputs
//! 2. **Tokenize**: `tokenize` turns each file into tokens, handling
//!    comments, literals and preprocessor branches
//! 3. **Extract**: `extract` tracks open scopes, follows includes through
//!    the `include` cache and resolves each call's context with `resolve`
//!
//! `context` ties the stages together for one project.
//!
//! ## Module Structure
//!
//! - `data`: Qualified names and candidate messages
//! - `tokenize`: Tokenizer, escape decoding, magic comments
//! - `scope`: Scope arena, parser snapshot, per-file results
//! - `resolve`: Qualification of written names against visible scopes
//! - `include`: Include path resolution and the shared result cache
//! - `extract`: Localization-call table, parser, call handlers
//! - `context`: Project-level orchestration
//! - `file_scanner`: Source tree walking

pub mod context;
pub mod data;
pub mod extract;
pub mod file_scanner;
pub mod include;
pub mod resolve;
pub mod scope;
pub mod tokenize;

pub use context::ExtractContext;
pub use data::{CandidateMessage, MessageKind, QualifiedName};
pub use extract::{ExtractOptions, ExtractionReport, Extractor};
