//! The tokenizer.
//!
//! Produces one [`Token`] per call. Comments, preprocessor lines and most of
//! the language are consumed as side effects: comment bodies and problems are
//! handed to a [`ScanHooks`] implementation, and conditional-compilation
//! directives save and restore the caller's state through the same hooks.

use crate::issues::DiagnosticKind;

use super::token::{Token, is_raw_string_literal_prefix, is_string_literal_prefix, keyword};

/// Callbacks from the tokenizer into its consumer.
pub trait ScanHooks {
    /// Consumer state captured around `#define` bodies and `#if` branches.
    type State;

    fn save_state(&self) -> Self::State;
    fn restore_state(&mut self, state: Self::State);
    /// A `#define` body ended; `restore_state` has already been applied.
    fn define_ended(&mut self);
    /// A comment body, without its delimiters.
    fn comment(&mut self, body: &str, line: usize);
    fn diagnostic(&mut self, line: usize, kind: DiagnosticKind, message: String);
}

/// Delimiter depths recorded at `#if`, and at the first `#else`/`#elif`.
struct IfdefState<S> {
    at_if: Depths,
    first_branch: Option<(Depths, S)>,
    else_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Depths {
    bracket: usize,
    brace: usize,
    paren: usize,
}

enum Step {
    Char(char),
    Newline,
    Eof,
}

pub struct Tokenizer<S> {
    input: Vec<char>,
    pos: usize,
    ch: Option<char>,
    at_newline: bool,
    cur_line: usize,
    line: usize,

    depths: Depths,
    bracket_line: usize,
    brace_line: usize,
    paren_line: usize,
    min_brace_depth: usize,

    in_define: bool,
    define_state: Option<S>,
    ifdefs: Vec<IfdefState<S>>,
}

impl<S> Tokenizer<S> {
    pub fn new(text: &str) -> Self {
        let mut tokenizer = Self {
            input: text.chars().collect(),
            pos: 0,
            ch: None,
            at_newline: true,
            cur_line: 1,
            line: 1,
            depths: Depths::default(),
            bracket_line: 1,
            brace_line: 1,
            paren_line: 1,
            min_brace_depth: 0,
            in_define: false,
            define_state: None,
            ifdefs: Vec::new(),
        };
        tokenizer.ch = tokenizer.get_char();
        tokenizer
    }

    /// Line on which the most recent token started.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn brace_depth(&self) -> usize {
        self.depths.brace
    }

    pub fn paren_depth(&self) -> usize {
        self.depths.paren
    }

    pub fn bracket_depth(&self) -> usize {
        self.depths.bracket
    }

    /// Scan the raw input after the current character for `;` or `{`,
    /// whichever comes first. Used to tell bitfield colons apart.
    pub fn look_ahead_to_semicolon_or_left_brace(&self) -> Token {
        if self.pos >= self.input.len() {
            return Token::Eof;
        }
        for &c in &self.input[self.pos + 1..] {
            match c {
                ';' => return Token::Semicolon,
                '{' => return Token::LeftBrace,
                _ => {}
            }
        }
        Token::Eof
    }

    /// Report a delimiter still open at end of input.
    pub fn report_unbalanced<H: ScanHooks<State = S>>(&self, hooks: &mut H) {
        let open = if self.depths.brace != 0 {
            Some(("brace", self.brace_line))
        } else if self.depths.paren != 0 {
            Some(("parenthesis", self.paren_line))
        } else if self.depths.bracket != 0 {
            Some(("bracket", self.bracket_line))
        } else {
            None
        };
        if let Some((what, line)) = open {
            hooks.diagnostic(
                line,
                DiagnosticKind::UnbalancedOpeningDelimiter,
                format!(
                    "Unbalanced opening {} in C++ code (or abuse of the C++ preprocessor)",
                    what
                ),
            );
        }
    }

    /// Read one character, folding line continuations and `\r\n`.
    fn get_char(&mut self) -> Option<char> {
        loop {
            let c = *self.input.get(self.pos)?;
            self.pos += 1;
            if c == '\\' {
                match self.input.get(self.pos) {
                    Some('\n') => {
                        self.cur_line += 1;
                        self.pos += 1;
                        continue;
                    }
                    Some('\r') => {
                        self.cur_line += 1;
                        self.pos += 1;
                        if self.input.get(self.pos) == Some(&'\n') {
                            self.pos += 1;
                        }
                        continue;
                    }
                    _ => {}
                }
            }
            let c = match c {
                '\r' => {
                    if self.input.get(self.pos) == Some(&'\n') {
                        self.pos += 1;
                    }
                    self.cur_line += 1;
                    self.at_newline = true;
                    '\n'
                }
                '\n' => {
                    self.cur_line += 1;
                    self.at_newline = true;
                    '\n'
                }
                ' ' | '\t' | '#' => c,
                _ => {
                    self.at_newline = false;
                    c
                }
            };
            return Some(c);
        }
    }

    fn advance(&mut self) {
        self.ch = self.get_char();
    }

    fn step(&mut self) -> Step {
        self.advance();
        match self.ch {
            None => Step::Eof,
            Some('\n') => Step::Newline,
            Some(c) => Step::Char(c),
        }
    }

    fn diagnostic<H: ScanHooks<State = S>>(
        &self,
        hooks: &mut H,
        line: usize,
        kind: DiagnosticKind,
        message: &str,
    ) {
        hooks.diagnostic(line, kind, message.to_string());
    }

    pub fn next_token<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) -> Token {
        while let Some(c) = self.ch {
            self.line = self.cur_line;

            if c == '#' && self.at_newline {
                match self.directive(hooks) {
                    Some(token) => return token,
                    None => continue,
                }
            }
            if c.is_ascii_alphabetic() || c == '_' {
                match self.word(hooks) {
                    Some(token) => return token,
                    None => continue,
                }
            }
            if let Some(token) = self.punctuation(c, hooks) {
                return token;
            }
        }
        Token::Eof
    }

    // ============================================================
    // Preprocessor
    // ============================================================

    /// Handle a line starting with `#`. Returns a token for includes and
    /// end of input, None when scanning should simply continue.
    fn directive<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) -> Option<Token> {
        loop {
            self.advance();
            if !matches!(self.ch, Some(c) if is_space(c) && c != '\n') {
                break;
            }
        }

        match self.ch {
            Some('d') => return self.define(hooks),
            Some('i') => {
                self.advance();
                if self.ch == Some('f') {
                    self.ifdefs.push(IfdefState {
                        at_if: self.depths,
                        first_branch: None,
                        else_line: 0,
                    });
                    self.advance();
                } else if self.ch == Some('n') {
                    if let Some(token) = self.include() {
                        return Some(token);
                    }
                }
            }
            Some('e') => {
                self.advance();
                if self.ch == Some('l') {
                    self.else_branch(hooks);
                    self.advance();
                } else if self.ch == Some('n') {
                    self.endif(hooks);
                    self.advance();
                }
            }
            _ => {}
        }

        self.skip_directive_line(hooks);
        None
    }

    /// Skip `#define NAME` or `#define NAME(args)`; if a body follows,
    /// remember the caller's state so the body cannot disturb it.
    fn define<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) -> Option<Token> {
        // Rest of the directive word.
        loop {
            match self.step() {
                Step::Eof => return Some(Token::Eof),
                Step::Newline => return None,
                Step::Char(c) if is_space(c) => break,
                Step::Char(_) => {}
            }
        }
        // Space before the macro name.
        loop {
            match self.step() {
                Step::Eof => return Some(Token::Eof),
                Step::Newline => return None,
                Step::Char(c) if is_space(c) => {}
                Step::Char(_) => break,
            }
        }
        // Macro name, possibly with an argument list attached.
        loop {
            if self.ch == Some('(') {
                loop {
                    match self.step() {
                        Step::Eof => return Some(Token::Eof),
                        Step::Newline => return None,
                        Step::Char(')') => break,
                        Step::Char(_) => {}
                    }
                }
                break;
            }
            match self.step() {
                Step::Eof => return Some(Token::Eof),
                Step::Newline => return None,
                Step::Char(c) if is_space(c) => break,
                Step::Char(_) => {}
            }
        }
        // Nothing but blanks: no body.
        loop {
            match self.step() {
                Step::Eof => return Some(Token::Eof),
                Step::Newline => return None,
                Step::Char(c) if is_space(c) => {}
                Step::Char(_) => break,
            }
        }

        self.define_state = Some(hooks.save_state());
        self.min_brace_depth = self.depths.brace;
        self.in_define = true;
        None
    }

    /// Read the path of an `#include`. The current character is the `n`.
    fn include(&mut self) -> Option<Token> {
        loop {
            self.advance();
            match self.ch {
                Some(c) if !is_space(c) && c != '"' && c != '<' => {}
                _ => break,
            }
        }
        while matches!(self.ch, Some(c) if is_space(c)) {
            self.advance();
        }
        let terminator = match self.ch {
            Some('"') => '"',
            Some('<') => '>',
            _ => return None,
        };
        let mut path = String::new();
        loop {
            self.advance();
            match self.ch {
                None | Some('\n') => break,
                Some(c) if c == terminator => {
                    self.advance();
                    break;
                }
                Some(c) => path.push(c),
            }
        }
        Some(if terminator == '"' {
            Token::QuotedInclude(path)
        } else {
            Token::AngledInclude(path)
        })
    }

    fn else_branch<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        let line = self.line;
        let current = self.depths;
        let Some(state) = self.ifdefs.last_mut() else {
            return;
        };
        match state.first_branch.as_ref().map(|(first, _)| *first != current) {
            Some(true) => hooks.diagnostic(
                state.else_line,
                DiagnosticKind::BranchMismatch,
                "Parenthesis/bracket/brace mismatch between #if and #else branches; using #if branch"
                    .to_string(),
            ),
            Some(false) => {}
            None => state.first_branch = Some((current, hooks.save_state())),
        }
        state.else_line = line;
        self.depths = state.at_if;
    }

    fn endif<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        let Some(state) = self.ifdefs.pop() else {
            return;
        };
        if let Some((first, saved)) = state.first_branch {
            if first != self.depths {
                hooks.diagnostic(
                    state.else_line,
                    DiagnosticKind::BranchMismatch,
                    "Parenthesis/brace mismatch between #if and #else branches; using #if branch"
                        .to_string(),
                );
            }
            self.depths = first;
            hooks.restore_state(saved);
        }
    }

    /// Skip to the end of a directive line, including trailing comments.
    fn skip_directive_line<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        loop {
            match self.ch {
                None | Some('\n') => break,
                Some('/') => {
                    self.advance();
                    if self.ch == Some('/') {
                        while !matches!(self.ch, None | Some('\n')) {
                            self.advance();
                        }
                        break;
                    } else if self.ch == Some('*') {
                        self.skip_block_comment(hooks);
                    }
                }
                Some(_) => self.advance(),
            }
        }
        self.advance();
    }

    fn skip_block_comment<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        let mut met_aster = false;
        loop {
            self.advance();
            match self.ch {
                None => {
                    self.diagnostic(
                        hooks,
                        self.line,
                        DiagnosticKind::UnterminatedComment,
                        "Unterminated C++ comment",
                    );
                    break;
                }
                Some('*') => met_aster = true,
                Some('/') if met_aster => {
                    self.advance();
                    break;
                }
                Some(_) => met_aster = false,
            }
        }
    }

    // ============================================================
    // Identifiers and literals
    // ============================================================

    /// Lex an identifier, keyword or prefixed literal. Returns None when the
    /// word was a plain string prefix and scanning should continue.
    fn word<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) -> Option<Token> {
        let mut word = String::new();
        while let Some(c) = self.ch {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            word.push(c);
            self.advance();
        }

        if self.ch == Some('"') && is_string_literal_prefix(&word) {
            return None;
        }
        if let Some(token) = keyword(&word) {
            return Some(token);
        }
        if word == "operator" {
            self.skip_operator_symbol();
        }
        if self.ch == Some('"') && is_raw_string_literal_prefix(&word) {
            return Some(self.raw_string(hooks));
        }
        Some(Token::Ident(word))
    }

    fn skip_operator_symbol(&mut self) {
        while matches!(self.ch, Some(c) if is_space(c)) {
            self.advance();
        }
        while matches!(
            self.ch,
            Some(
                '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '~' | '^' | '['
                    | ']'
            )
        ) {
            self.advance();
        }
    }

    /// `prefix"delim(body)delim"`; the current character is the opening quote.
    fn raw_string<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) -> Token {
        let mut delimiter = Vec::new();
        self.advance();
        while let Some(c) = self.ch {
            if c == '(' {
                break;
            }
            delimiter.push(c);
            self.advance();
        }
        if self.ch.is_some() {
            self.advance();
        }

        let mut body: Vec<char> = Vec::new();
        let mut past_close: Option<usize> = None;
        let mut is_end = false;
        while let Some(c) = self.ch {
            if is_end {
                break;
            }
            body.push(c);
            if let Some(start) = past_close {
                if body[start..] == delimiter[..] {
                    self.advance();
                    if self.ch == Some('"') {
                        is_end = true;
                    } else {
                        past_close = None;
                    }
                    continue;
                }
            }
            if c == ')' {
                past_close = Some(body.len());
                if delimiter.is_empty() {
                    self.advance();
                    if self.ch == Some('"') {
                        is_end = true;
                    } else {
                        past_close = None;
                    }
                    continue;
                }
            }
            self.advance();
        }

        if is_end {
            if let Some(start) = past_close {
                body.truncate(start - 1);
            }
        }
        if self.ch == Some('"') {
            self.advance();
        } else {
            self.diagnostic(
                hooks,
                self.line,
                DiagnosticKind::UnterminatedRawString,
                "Unterminated/mismatched C++ Raw string",
            );
        }
        Token::RawString(body.into_iter().collect())
    }

    fn string<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) -> Token {
        let mut text = String::new();
        self.advance();
        while let Some(c) = self.ch {
            if c == '\n' || c == '"' {
                break;
            }
            if c == '\\' {
                self.advance();
                match self.ch {
                    None | Some('\n') => break,
                    Some(escaped) => {
                        text.push('\\');
                        text.push(escaped);
                    }
                }
            } else {
                text.push(c);
            }
            self.advance();
        }
        if self.ch == Some('"') {
            self.advance();
        } else {
            self.diagnostic(
                hooks,
                self.line,
                DiagnosticKind::UnterminatedString,
                "Unterminated C++ string",
            );
        }
        Token::String(text)
    }

    fn character<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        self.advance();
        if self.ch == Some('\\') {
            self.advance();
        }
        loop {
            if matches!(self.ch, None | Some('\n')) {
                self.diagnostic(
                    hooks,
                    self.line,
                    DiagnosticKind::UnterminatedCharacter,
                    "Unterminated C++ character",
                );
                break;
            }
            self.advance();
            if self.ch == Some('\'') {
                self.advance();
                break;
            }
        }
    }

    /// Line comment; the body keeps its newline, which stays current.
    fn line_comment<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        let mut body = String::new();
        loop {
            self.advance();
            let Some(c) = self.ch else {
                break;
            };
            body.push(c);
            if c == '\n' {
                break;
            }
        }
        hooks.comment(&body, self.line);
    }

    fn block_comment<H: ScanHooks<State = S>>(&mut self, hooks: &mut H) {
        let mut body = String::new();
        let mut met_aster = false;
        let mut terminated = false;
        loop {
            self.advance();
            let Some(c) = self.ch else {
                self.diagnostic(
                    hooks,
                    self.line,
                    DiagnosticKind::UnterminatedComment,
                    "Unterminated C++ comment",
                );
                break;
            };
            body.push(c);
            if c == '*' {
                met_aster = true;
            } else if met_aster && c == '/' {
                terminated = true;
                break;
            } else {
                met_aster = false;
            }
        }
        if terminated {
            body.truncate(body.len() - 2);
        }
        hooks.comment(&body, self.line);
        self.advance();
    }

    // ============================================================
    // Punctuation
    // ============================================================

    fn punctuation<H: ScanHooks<State = S>>(&mut self, c: char, hooks: &mut H) -> Option<Token> {
        let token = match c {
            '\n' => {
                self.advance();
                if !self.in_define {
                    return None;
                }
                if let Some(state) = self.define_state.take() {
                    hooks.restore_state(state);
                }
                hooks.define_ended();
                self.depths.brace = self.min_brace_depth;
                self.min_brace_depth = 0;
                self.in_define = false;
                Token::Cancel
            }
            '/' => {
                self.advance();
                match self.ch {
                    Some('/') => self.line_comment(hooks),
                    Some('*') => self.block_comment(hooks),
                    _ => {}
                }
                return None;
            }
            '"' => return Some(self.string(hooks)),
            '-' => {
                self.advance();
                if self.ch != Some('>') {
                    return None;
                }
                self.advance();
                Token::Arrow
            }
            ':' => {
                self.advance();
                if self.ch == Some(':') {
                    self.advance();
                    Token::ColonColon
                } else {
                    Token::Colon
                }
            }
            '=' => {
                self.advance();
                Token::Equals
            }
            '<' | '>' => {
                self.advance();
                Token::AngleBracket
            }
            '\'' => {
                self.character(hooks);
                return None;
            }
            '{' => {
                if self.depths.brace == 0 {
                    self.brace_line = self.cur_line;
                }
                self.depths.brace += 1;
                self.advance();
                Token::LeftBrace
            }
            '}' => {
                if self.depths.brace == self.min_brace_depth {
                    if !self.in_define {
                        self.diagnostic(
                            hooks,
                            self.cur_line,
                            DiagnosticKind::ExcessClosingDelimiter,
                            "Excess closing brace in C++ code (or abuse of the C++ preprocessor)",
                        );
                    }
                    self.advance();
                    return Some(Token::Semicolon);
                }
                self.depths.brace -= 1;
                self.advance();
                Token::RightBrace
            }
            '(' => {
                if self.depths.paren == 0 {
                    self.paren_line = self.cur_line;
                }
                self.depths.paren += 1;
                self.advance();
                Token::LeftParen
            }
            ')' => {
                if self.depths.paren == 0 {
                    self.diagnostic(
                        hooks,
                        self.cur_line,
                        DiagnosticKind::ExcessClosingDelimiter,
                        "Excess closing parenthesis in C++ code (or abuse of the C++ preprocessor)",
                    );
                } else {
                    self.depths.paren -= 1;
                }
                self.advance();
                Token::RightParen
            }
            '[' => {
                if self.depths.bracket == 0 {
                    self.bracket_line = self.cur_line;
                }
                self.depths.bracket += 1;
                self.advance();
                Token::LeftBracket
            }
            ']' => {
                if self.depths.bracket == 0 {
                    self.diagnostic(
                        hooks,
                        self.cur_line,
                        DiagnosticKind::ExcessClosingDelimiter,
                        "Excess closing bracket in C++ code (or abuse of the C++ preprocessor)",
                    );
                } else {
                    self.depths.bracket -= 1;
                }
                self.advance();
                Token::RightBracket
            }
            ',' => {
                self.advance();
                Token::Comma
            }
            ';' => {
                self.advance();
                Token::Semicolon
            }
            '?' => {
                self.advance();
                Token::QuestionMark
            }
            '0' => {
                self.advance();
                match self.ch {
                    Some('x' | 'X') => {
                        self.advance();
                        while matches!(self.ch, Some(c) if c.is_ascii_hexdigit() || c == '\'') {
                            self.advance();
                        }
                        Token::Integer
                    }
                    Some(c) if c.is_ascii_digit() => self.number(),
                    _ => Token::Null,
                }
            }
            '1'..='9' => {
                self.advance();
                self.number()
            }
            _ => {
                self.advance();
                return None;
            }
        };
        Some(token)
    }

    /// Digits and digit separators, after the first digit.
    fn number(&mut self) -> Token {
        while matches!(self.ch, Some(c) if c.is_ascii_digit() || c == '\'') {
            self.advance();
        }
        Token::Integer
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Records everything the tokenizer reports; the state is a counter so
    /// restores are observable.
    #[derive(Default)]
    struct Recorder {
        state: u32,
        restored: Vec<u32>,
        comments: Vec<(String, usize)>,
        diagnostics: Vec<(usize, DiagnosticKind)>,
        defines_ended: usize,
    }

    impl ScanHooks for Recorder {
        type State = u32;

        fn save_state(&self) -> u32 {
            self.state
        }

        fn restore_state(&mut self, state: u32) {
            self.restored.push(state);
            self.state = state;
        }

        fn define_ended(&mut self) {
            self.defines_ended += 1;
        }

        fn comment(&mut self, body: &str, line: usize) {
            self.comments.push((body.to_string(), line));
        }

        fn diagnostic(&mut self, line: usize, kind: DiagnosticKind, _message: String) {
            self.diagnostics.push((line, kind));
        }
    }

    fn tokens(text: &str) -> (Vec<Token>, Recorder) {
        let mut hooks = Recorder::default();
        let mut lexer = Tokenizer::new(text);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token(&mut hooks);
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        lexer.report_unbalanced(&mut hooks);
        (out, hooks)
    }

    fn ident(word: &str) -> Token {
        Token::Ident(word.to_string())
    }

    #[test]
    fn test_basic_call() {
        let (toks, hooks) = tokens("QObject::tr(\"Hello\", 0);");
        assert_eq!(
            toks,
            vec![
                ident("QObject"),
                Token::ColonColon,
                ident("tr"),
                Token::LeftParen,
                Token::String("Hello".to_string()),
                Token::Comma,
                Token::Null,
                Token::RightParen,
                Token::Semicolon,
            ]
        );
        assert!(hooks.diagnostics.is_empty());
    }

    #[test]
    fn test_keywords_and_markers() {
        let (toks, _) = tokens("struct S { Q_OBJECT public slots: int x = 42; };");
        assert_eq!(
            toks,
            vec![
                Token::Class,
                ident("S"),
                Token::LeftBrace,
                Token::TrMarker,
                Token::Access,
                Token::Access,
                Token::Colon,
                ident("int"),
                ident("x"),
                Token::Equals,
                Token::Integer,
                Token::Semicolon,
                Token::RightBrace,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_string_keeps_escapes_and_prefixes() {
        let (toks, _) = tokens(r#"u8"a\"b" L"c""#);
        assert_eq!(
            toks,
            vec![
                Token::String("a\\\"b".to_string()),
                Token::String("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_string_with_delimiter() {
        let (toks, hooks) = tokens(r#"R"delim(a)not-delim)delim""#);
        assert_eq!(toks, vec![Token::RawString("a)not-delim".to_string())]);
        assert!(hooks.diagnostics.is_empty());
    }

    #[test]
    fn test_raw_string_without_delimiter() {
        let (toks, _) = tokens(r#"u8R"(x) ")" y"#);
        assert_eq!(toks, vec![Token::RawString("x) \"".to_string()), ident("y")]);
    }

    #[test]
    fn test_unterminated_raw_string() {
        let (toks, hooks) = tokens("R\"x(abc");
        assert_eq!(toks, vec![Token::RawString("abc".to_string())]);
        assert_eq!(
            hooks.diagnostics,
            vec![(1, DiagnosticKind::UnterminatedRawString)]
        );
    }

    #[test]
    fn test_comments_are_reported_with_bodies() {
        let (toks, hooks) = tokens("//: extra\n/* TRANSLATOR Ctx text */ a");
        assert_eq!(toks, vec![ident("a")]);
        assert_eq!(
            hooks.comments,
            vec![
                (": extra\n".to_string(), 1),
                (" TRANSLATOR Ctx text ".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_unterminated_literals() {
        let (_, hooks) = tokens("\"open\nx = 'a\n/* never closed");
        assert_eq!(
            hooks.diagnostics,
            vec![
                (1, DiagnosticKind::UnterminatedString),
                (2, DiagnosticKind::UnterminatedCharacter),
                (3, DiagnosticKind::UnterminatedComment),
            ]
        );
    }

    #[test]
    fn test_character_literals_are_skipped() {
        let (toks, hooks) = tokens("c = '\\'' ; d = '{';");
        assert_eq!(
            toks,
            vec![
                ident("c"),
                Token::Equals,
                Token::Semicolon,
                ident("d"),
                Token::Equals,
                Token::Semicolon,
            ]
        );
        assert!(hooks.diagnostics.is_empty());
    }

    #[test]
    fn test_includes() {
        let (toks, _) = tokens("#include \"a.h\"\n#  include <b/c.h>\n");
        assert_eq!(
            toks,
            vec![
                Token::QuotedInclude("a.h".to_string()),
                Token::AngledInclude("b/c.h".to_string()),
            ]
        );
    }

    #[test]
    fn test_other_directives_are_skipped() {
        let (toks, _) = tokens("#pragma once /* { */\n#error \"x\" // (\nint");
        assert_eq!(toks, vec![ident("int")]);
    }

    #[test]
    fn test_define_body_cancels_and_restores() {
        let mut hooks = Recorder::default();
        let mut lexer = Tokenizer::new("#define OPEN(x) {\n}\nz");
        hooks.state = 7;
        assert_eq!(lexer.next_token(&mut hooks), Token::LeftBrace);
        hooks.state = 9;
        assert_eq!(lexer.next_token(&mut hooks), Token::Cancel);
        assert_eq!(hooks.restored, vec![7]);
        assert_eq!(hooks.defines_ended, 1);
        assert_eq!(lexer.brace_depth(), 0);
        // The closing brace after the macro is in excess.
        assert_eq!(lexer.next_token(&mut hooks), Token::Semicolon);
        assert_eq!(
            hooks.diagnostics,
            vec![(2, DiagnosticKind::ExcessClosingDelimiter)]
        );
        assert_eq!(lexer.next_token(&mut hooks), ident("z"));
    }

    #[test]
    fn test_define_without_body() {
        let (toks, hooks) = tokens("#define GUARD\n#define F(a, b)\nx");
        assert_eq!(toks, vec![ident("x")]);
        assert_eq!(hooks.defines_ended, 0);
    }

    #[test]
    fn test_line_continuation_in_define() {
        let (toks, _) = tokens("#define M a \\\n b\nc");
        assert_eq!(toks, vec![ident("a"), ident("b"), Token::Cancel, ident("c")]);
    }

    #[test]
    fn test_ifdef_branches_with_different_depths() {
        let source = "#ifdef A\nif (x) {\n#else\nif (y) {\n#endif\n}\n";
        let (toks, hooks) = tokens(source);
        assert_eq!(
            toks.iter().filter(|t| **t == Token::LeftBrace).count(),
            2
        );
        assert_eq!(toks.last(), Some(&Token::RightBrace));
        // Both branches open one brace, so they agree.
        assert!(hooks.diagnostics.is_empty());
    }

    #[test]
    fn test_ifdef_branch_mismatch_reported_once() {
        let source = "#ifdef A\n{\n{\n#else\n{\n#endif\n}\n}\n";
        let (_, hooks) = tokens(source);
        assert_eq!(hooks.diagnostics, vec![(4, DiagnosticKind::BranchMismatch)]);
        // The state captured at #else is restored at #endif.
        assert_eq!(hooks.restored.len(), 1);
    }

    #[test]
    fn test_numbers() {
        let (toks, _) = tokens("0 0x1F 1'000 07");
        assert_eq!(
            toks,
            vec![Token::Null, Token::Integer, Token::Integer, Token::Integer]
        );
    }

    #[test]
    fn test_operator_symbols_are_eaten() {
        let (toks, _) = tokens("operator<=(a) operator[]");
        assert_eq!(
            toks,
            vec![
                ident("operator"),
                Token::LeftParen,
                ident("a"),
                Token::RightParen,
                ident("operator"),
            ]
        );
    }

    #[test]
    fn test_excess_and_unbalanced_delimiters() {
        let (_, hooks) = tokens(")\n]\n{\n");
        assert_eq!(
            hooks.diagnostics,
            vec![
                (1, DiagnosticKind::ExcessClosingDelimiter),
                (2, DiagnosticKind::ExcessClosingDelimiter),
                (3, DiagnosticKind::UnbalancedOpeningDelimiter),
            ]
        );
    }

    #[test]
    fn test_crlf_line_counting() {
        let mut hooks = Recorder::default();
        let mut lexer = Tokenizer::new("a\r\nb\r\n\r\nc");
        lexer.next_token(&mut hooks);
        lexer.next_token(&mut hooks);
        assert_eq!(lexer.line(), 2);
        lexer.next_token(&mut hooks);
        assert_eq!(lexer.line(), 4);
    }

    #[test]
    fn test_look_ahead_for_bitfield() {
        let mut hooks = Recorder::default();
        let mut lexer = Tokenizer::new("x : 3; y");
        assert_eq!(lexer.next_token(&mut hooks), ident("x"));
        assert_eq!(lexer.next_token(&mut hooks), Token::Colon);
        assert_eq!(lexer.look_ahead_to_semicolon_or_left_brace(), Token::Semicolon);
    }

    #[test]
    fn test_every_truncation_reaches_eof() {
        let sample = concat!(
            "#include <a.h>\n",
            "#define M(x) { x \\\n",
            " }\n",
            "#if A\n{\n#elif B\n#else\n#endif\n",
            "/* block */ // line\n",
            "namespace N { struct S { int a : 3; }; }\n",
            "auto s = R\"d(raw )\" text)d\" u8\"s\\\"q\" L'c' '\\'' 0x1f 1.5e3;\n",
            "QObject::tr(\"x\", \"c\", 2) [i] <<= ->* ...;\n",
        );

        let boundaries: Vec<usize> = sample
            .char_indices()
            .map(|(i, _)| i)
            .chain([sample.len()])
            .collect();
        for &i in &boundaries {
            for text in [&sample[..i], &sample[i..]] {
                let mut hooks = Recorder::default();
                let mut lexer = Tokenizer::new(text);
                let mut count = 0;
                while lexer.next_token(&mut hooks) != Token::Eof {
                    count += 1;
                    assert!(count <= 2 * text.len() + 2, "no EOF for {:?}", text);
                }
                lexer.report_unbalanced(&mut hooks);
            }
        }
    }
}
