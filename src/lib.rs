//! trscan - translatable string extractor for C++ sources
//!
//! trscan scans C++ sources for localization calls (`tr()`, `translate()`,
//! `qtTrId()` and their no-op marker variants) and produces candidate
//! messages carrying the fully qualified class or namespace context each
//! call resolves to, together with translator metadata from magic comments.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, report printing)
//! - `config`: Configuration file loading and validation
//! - `core`: Extraction engine (tokenizer, scope tracking, context resolution)
//! - `issues`: Diagnostic vocabulary

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
