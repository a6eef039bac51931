//! Phase 1: Tokenization.
//!
//! ## Module Structure
//!
//! - `token`: Token enum and keyword classification
//! - `lexer`: The tokenizer and the [`ScanHooks`] callback trait
//! - `escape`: Escape-sequence decoding for string literal bodies
//! - `comment`: Metadata comment parsing

pub mod comment;
pub mod escape;
pub mod lexer;
pub mod token;

pub use comment::{MetaComment, simplified};
pub use escape::transcode;
pub use lexer::{ScanHooks, Tokenizer};
pub use token::Token;
