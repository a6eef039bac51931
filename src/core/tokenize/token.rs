/// Coarse lexical token.
///
/// Only the shapes the scope tracker and the call extractor care about are
/// distinguished; every other character is skipped by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Eof,
    /// `class` or `struct`.
    Class,
    Enum,
    Friend,
    Namespace,
    Using,
    Return,
    Decltype,
    /// The class-level `Q_OBJECT` marker.
    TrMarker,
    /// An access specifier (`public`, `slots`, `Q_SIGNALS`, ...).
    Access,
    /// Emitted at the end of a `#define` body to abort any construct in progress.
    Cancel,
    Ident(String),
    /// Literal body with escape sequences still encoded.
    String(String),
    /// Raw literal body, delimiter removed.
    RawString(String),
    Arrow,
    Colon,
    ColonColon,
    Equals,
    LeftBracket,
    RightBracket,
    AngleBracket,
    QuestionMark,
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    /// `NULL`, `nullptr`, `Q_NULLPTR` or a lone `0`.
    Null,
    Integer,
    QuotedInclude(String),
    AngledInclude(String),
}

impl Token {
    pub fn is_string(&self) -> bool {
        matches!(self, Token::String(_) | Token::RawString(_))
    }

    /// The identifier text, if this is an identifier.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Token::Ident(word) => Some(word),
            _ => None,
        }
    }
}

/// Classify an identifier against the fixed keyword set.
pub(super) fn keyword(word: &str) -> Option<Token> {
    let token = match word {
        "NULL" | "Q_NULLPTR" | "nullptr" => Token::Null,
        "Q_OBJECT" => Token::TrMarker,
        "class" | "struct" => Token::Class,
        "decltype" => Token::Decltype,
        "enum" => Token::Enum,
        "friend" => Token::Friend,
        "namespace" => Token::Namespace,
        "return" => Token::Return,
        "using" => Token::Using,
        "public" | "protected" | "private" | "slots" | "signals" | "Q_SLOTS" | "Q_SIGNALS" => {
            Token::Access
        }
        _ => return None,
    };
    Some(token)
}

/// `L`, `U`, `u` and `u8` may directly precede an ordinary string literal.
pub(super) fn is_string_literal_prefix(word: &str) -> bool {
    matches!(word, "L" | "U" | "u" | "u8")
}

/// A raw literal prefix is an optional string prefix followed by `R`.
pub(super) fn is_raw_string_literal_prefix(word: &str) -> bool {
    word.strip_suffix('R')
        .is_some_and(|rest| rest.is_empty() || is_string_literal_prefix(rest))
}
