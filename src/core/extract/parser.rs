//! The scope-tracking parser.
//!
//! Consumes tokens one at a time, maintaining the stack of open namespaces
//! and classes in its [`ParserSnapshot`], and hands localization calls to
//! the handlers in `handlers.rs`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use regex::Regex;

use crate::{
    core::{
        data::{CandidateMessage, MessageExtras, MessageKind, QualifiedName, Segment},
        include::{CacheKey, IncludeCache, clean_path, is_header, resolve_include},
        resolve::Resolver,
        scope::{Alias, ParseResult, ParserSnapshot, ScopeId},
        tokenize::{MetaComment, ScanHooks, Token, Tokenizer, comment, simplified, transcode},
    },
    issues::{Diagnostic, DiagnosticKind},
};

use super::tr_functions::{CallShape, TrFunction, TrFunctionTable};

/// Inputs that stay fixed for a whole extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Searched in order for angled includes, and for quoted includes not
    /// found next to the including file.
    pub include_paths: Vec<PathBuf>,
    /// Include paths matching any of these are not followed.
    pub excludes: Vec<Regex>,
    pub functions: TrFunctionTable,
}

#[derive(Clone, Copy)]
pub(super) struct Env<'a> {
    pub options: &'a ExtractOptions,
    pub cache: &'a IncludeCache,
}

/// Metadata collected from comments for the next message.
#[derive(Debug, Default)]
pub(super) struct PendingMeta {
    pub source_text: String,
    pub extra_comment: String,
    pub id: String,
    pub extras: MessageExtras,
}

impl PendingMeta {
    fn is_empty(&self) -> bool {
        self.source_text.is_empty()
            && self.extra_comment.is_empty()
            && self.id.is_empty()
            && self.extras.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Parser state reachable from the tokenizer callbacks.
pub(super) struct ParserCore<'a> {
    pub file: PathBuf,
    pub results: &'a mut ParseResult,
    pub state: ParserSnapshot,
    pub meta: PendingMeta,
    pub meta_expected: bool,
    pub prospective_context: String,
    /// Parsing an include inline, on behalf of the includer.
    pub direct_include: bool,
    pub messages: &'a mut Vec<CandidateMessage>,
    pub diagnostics: &'a mut Vec<Diagnostic>,
}

impl ParserCore<'_> {
    pub fn report(&mut self, line: usize, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(self.file.clone(), line, kind, message));
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&*self.results)
    }

    /// The local scope for the current namespace stack, creating missing
    /// scopes on the way. New scopes share the definition of an equally
    /// named scope from an include; with `have_last` unset the innermost
    /// one defines itself.
    pub fn modify_namespace(&mut self, have_last: bool) -> ScopeId {
        let namespaces = self.state.namespaces.clone();
        let segments = namespaces.segments();
        let mut id = ScopeId::ROOT;
        for i in 1..segments.len() {
            if let Some(child) = self.results.tree.child(id, &segments[i]) {
                id = child;
                continue;
            }
            for j in i..segments.len() {
                let class_def = if have_last || j + 1 < segments.len() {
                    Resolver::new(&*self.results)
                        .find_namespace(segments, j + 1)
                        .map(|scope| scope.definition())
                } else {
                    None
                };
                id = self.results.tree.add_child(id, segments[j].clone(), class_def);
            }
            break;
        }
        id
    }

    pub fn enter_namespace(&mut self, segment: Segment) {
        self.state.namespaces.push(segment);
        let namespaces = &self.state.namespaces;
        let known = Resolver::new(&*self.results)
            .find_namespace(namespaces.segments(), namespaces.len())
            .is_some();
        if !known {
            self.modify_namespace(false);
        }
    }

    /// An alias on the current scope, resolved now when possible.
    fn add_alias(&mut self, name: Segment, written: QualifiedName) {
        let namespaces = &self.state.namespaces;
        let alias = match self.resolver().fully_qualify(
            namespaces.segments(),
            namespaces.len(),
            written.segments(),
            false,
        ) {
            Ok(target) => Alias::resolved(target),
            Err(_) => Alias::pending(written),
        };
        let id = self.modify_namespace(true);
        self.results.tree.get_mut(id).aliases.insert(name, alias);
    }

    fn translator_comment(&mut self, context: String, comment: String, line: usize) {
        let message = CandidateMessage {
            context: transcode(&context),
            source_text: String::new(),
            comment: transcode(&comment),
            extra_comment: transcode(&simplified(&self.meta.extra_comment)),
            id: String::new(),
            extras: std::mem::take(&mut self.meta.extras),
            plural: false,
            kind: MessageKind::ContextComment,
            file: self.file.clone(),
            line,
        };
        self.meta.extra_comment.clear();
        self.messages.push(message);
    }
}

impl ScanHooks for ParserCore<'_> {
    type State = ParserSnapshot;

    fn save_state(&self) -> ParserSnapshot {
        self.state.clone()
    }

    fn restore_state(&mut self, state: ParserSnapshot) {
        self.state = state;
    }

    fn define_ended(&mut self) {
        self.prospective_context.clear();
        self.meta_expected = true;
    }

    fn comment(&mut self, body: &str, line: usize) {
        if !self.meta_expected {
            return;
        }
        match MetaComment::parse(body) {
            None => {}
            Some(MetaComment::ExtraComment(text)) => self.meta.extra_comment.push_str(&text),
            Some(MetaComment::Id(id)) => self.meta.id = id,
            Some(MetaComment::Extra { key, value }) => {
                self.meta.extras.insert(key, value);
            }
            Some(MetaComment::SourceText { text, errors }) => {
                self.meta.source_text.push_str(&text);
                for kind in errors {
                    self.report(line, kind, comment::describe(kind));
                }
            }
            Some(MetaComment::Translator { context, comment }) => {
                self.translator_comment(context, comment, line)
            }
        }
    }

    fn diagnostic(&mut self, line: usize, kind: DiagnosticKind, message: String) {
        self.report(line, kind, message);
    }
}

enum ClassHead {
    Done,
    Cancelled,
    Eof,
}

pub(super) struct CppParser<'a> {
    pub env: Env<'a>,
    pub lexer: Tokenizer<ParserSnapshot>,
    pub tok: Token,
    include_stack: Vec<PathBuf>,
    pub core: ParserCore<'a>,
}

impl<'a> CppParser<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        env: Env<'a>,
        file: &Path,
        source: &str,
        results: &'a mut ParseResult,
        messages: &'a mut Vec<CandidateMessage>,
        diagnostics: &'a mut Vec<Diagnostic>,
        include_stack: Vec<PathBuf>,
        direct_include: bool,
    ) -> Self {
        Self {
            env,
            lexer: Tokenizer::new(source),
            tok: Token::Eof,
            include_stack,
            core: ParserCore {
                file: file.to_path_buf(),
                results,
                state: ParserSnapshot::default(),
                meta: PendingMeta::default(),
                meta_expected: true,
                prospective_context: String::new(),
                direct_include,
                messages,
                diagnostics,
            },
        }
    }

    /// Parse a whole file from the global scope.
    pub fn parse(&mut self) {
        self.core.state.namespaces = QualifiedName::root();
        self.core.state.function_context = QualifiedName::root();
        self.core.state.function_context_unresolved.clear();
        self.parse_internal();
    }

    pub fn into_state(self) -> ParserSnapshot {
        self.core.state
    }

    pub fn advance(&mut self) {
        self.tok = self.lexer.next_token(&mut self.core);
    }

    /// Advance past `token` if it is the current one.
    pub fn eat(&mut self, token: &Token) -> bool {
        let matches = self.tok == *token;
        if matches {
            self.advance();
        }
        matches
    }

    /// Report at the line of the current token.
    pub fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let line = self.lexer.line();
        self.core.report(line, kind, message);
    }

    fn at_namespace_level(&self) -> bool {
        self.lexer.brace_depth() == self.core.state.namespace_depths.len()
    }

    fn functions(&self) -> &'a TrFunctionTable {
        &self.env.options.functions
    }

    /// `A::B::C` or `::A`, possibly empty. Stops at the first other token.
    fn read_written_name(&mut self) -> QualifiedName {
        let mut written = QualifiedName::default();
        if self.tok == Token::ColonColon {
            written.push(Segment::root());
        }
        loop {
            match &self.tok {
                Token::ColonColon => {}
                Token::Ident(word) => written.push(Segment::from(word.as_str())),
                _ => break,
            }
            self.advance();
        }
        written
    }

    pub(super) fn parse_internal(&mut self) {
        let mut prefix = String::new();
        // Start of a constructor's initializer list.
        let mut colon_seen = false;
        // Start of an initializer (member or base class).
        let mut ident_seen = false;
        let mut maybe_in_trailing_return_type = false;

        self.core.meta_expected = true;
        self.core.prospective_context.clear();
        self.core.state.pending_context.clear();
        self.advance();

        while self.tok != Token::Eof {
            // Array indexing at namespace level, e.g. in static initializers.
            if self.lexer.bracket_depth() > 0 && self.at_namespace_level() {
                self.advance();
                continue;
            }

            match &self.tok {
                Token::QuotedInclude(word) | Token::AngledInclude(word) => {
                    let quoted = matches!(self.tok, Token::QuotedInclude(_));
                    let found = resolve_include(
                        &self.core.file,
                        word,
                        quoted,
                        &self.env.options.include_paths,
                    );
                    if let Some(path) = found {
                        self.process_include(&path);
                    }
                    self.advance();
                }
                Token::Friend => {
                    self.advance();
                    // Forward declarations.
                    if self.tok == Token::Class {
                        self.advance();
                    }
                }
                Token::Class => {
                    self.advance();
                    if self.at_namespace_level() && self.lexer.paren_depth() == 0 {
                        match self.class_head() {
                            ClassHead::Done => {}
                            ClassHead::Cancelled => self.advance(),
                            ClassHead::Eof => break,
                        }
                    }
                }
                Token::Namespace => self.namespace(),
                Token::Using => self.using(),
                Token::TrMarker => {
                    let id = self.core.modify_namespace(true);
                    self.core.results.tree.get_mut(id).has_tr_functions = true;
                    self.advance();
                }
                Token::Ident(word) => {
                    let word = word.clone();
                    if colon_seen && self.at_namespace_level() && self.lexer.paren_depth() == 0 {
                        ident_seen = true;
                    }
                    self.advance();
                    if self.tok == Token::LeftParen {
                        if let Some(function) = self.functions().lookup(&word) {
                            self.dispatch(function, &mut prefix);
                            self.advance();
                            continue;
                        }
                        prefix.clear();
                    } else if self.tok == Token::ColonColon && !maybe_in_trailing_return_type {
                        prefix.push_str(&word);
                    } else {
                        prefix.clear();
                    }
                    self.core.meta_expected = false;
                }
                Token::Arrow => {
                    if self.lexer.paren_depth() == 0 && self.at_namespace_level() {
                        maybe_in_trailing_return_type = true;
                    }
                    self.advance();
                    let invoked = self
                        .tok
                        .ident()
                        .and_then(|word| self.functions().lookup(word));
                    if matches!(invoked, Some(TrFunction::Tr | TrFunction::TrUtf8)) {
                        self.report(
                            DiagnosticKind::InvalidTrInvocation,
                            "Cannot invoke tr() like this",
                        );
                    }
                }
                Token::ColonColon => {
                    if ident_seen || maybe_in_trailing_return_type {
                        // Member or base class identifier.
                        self.advance();
                        continue;
                    }
                    if self.at_namespace_level() && self.lexer.paren_depth() == 0 && !colon_seen {
                        self.core.prospective_context = prefix.clone();
                    }
                    prefix.push_str("::");
                    self.advance();
                }
                Token::RightBrace | Token::Semicolon => {
                    if self.tok == Token::RightBrace && !colon_seen {
                        self.close_brace();
                    }
                    maybe_in_trailing_return_type = false;
                    self.core.prospective_context.clear();
                    prefix.clear();
                    if !self.core.meta.is_empty() {
                        self.report(
                            DiagnosticKind::DiscardedMetaData,
                            "Discarding unconsumed meta data",
                        );
                        self.core.meta.clear();
                    }
                    self.core.meta_expected = true;
                    self.advance();
                }
                Token::Access => {
                    // Keep the colon of `public slots:` from looking like an
                    // initializer list.
                    loop {
                        self.advance();
                        if self.tok != Token::Access {
                            break;
                        }
                    }
                    self.core.meta_expected = true;
                    if self.tok == Token::Colon {
                        self.advance();
                    }
                }
                Token::Colon | Token::Equals => {
                    if self.at_namespace_level() && self.lexer.paren_depth() == 0 {
                        self.promote_prospective_context();
                        // Bitfield colons are usually followed by a semicolon.
                        if self.tok == Token::Colon
                            && self.lexer.look_ahead_to_semicolon_or_left_brace()
                                != Token::Semicolon
                        {
                            colon_seen = true;
                        }
                    }
                    self.core.meta_expected = true;
                    self.advance();
                }
                Token::LeftBrace => {
                    if self.lexer.brace_depth() == self.core.state.namespace_depths.len() + 1
                        && self.lexer.paren_depth() == 0
                    {
                        self.promote_prospective_context();
                        if !ident_seen {
                            // Function body.
                            colon_seen = false;
                        }
                    }
                    maybe_in_trailing_return_type = false;
                    ident_seen = false;
                    self.core.meta_expected = true;
                    self.advance();
                }
                Token::LeftParen => {
                    if !colon_seen && self.at_namespace_level() && self.lexer.paren_depth() == 1 {
                        self.promote_prospective_context();
                    }
                    ident_seen = false;
                    self.core.meta_expected = true;
                    self.advance();
                }
                Token::Comma | Token::QuestionMark => {
                    self.core.meta_expected = true;
                    self.advance();
                }
                Token::RightParen => {
                    if self.lexer.paren_depth() == 0 {
                        if !colon_seen
                            && !self.core.state.pending_context.is_empty()
                            && self.at_namespace_level()
                        {
                            // Demote back; this was not a definition.
                            self.core.prospective_context =
                                std::mem::take(&mut self.core.state.pending_context);
                        }
                        self.core.meta_expected = true;
                    } else {
                        self.core.meta_expected = false;
                    }
                    self.advance();
                }
                Token::Decltype => {
                    let outer = self.lexer.paren_depth();
                    self.advance();
                    while self.lexer.paren_depth() != outer && self.tok != Token::Eof {
                        self.advance();
                    }
                }
                Token::Enum => {
                    self.advance();
                    if self.tok == Token::Class {
                        self.advance();
                    }
                }
                Token::RightBracket => self.advance(),
                _ => {
                    if self.lexer.paren_depth() == 0 && !maybe_in_trailing_return_type {
                        self.core.prospective_context.clear();
                    }
                    self.advance();
                }
            }
        }

        self.lexer.report_unbalanced(&mut self.core);
    }

    fn promote_prospective_context(&mut self) {
        if !self.core.prospective_context.is_empty() {
            self.core.state.pending_context = std::mem::take(&mut self.core.prospective_context);
        }
    }

    fn close_brace(&mut self) {
        let depth = self.lexer.brace_depth();
        let state = &mut self.core.state;
        if depth + 1 == state.namespace_depths.len()
            && let Some(len) = state.namespace_depths.pop()
        {
            state.namespaces.truncate(len);
        }
        if depth == state.namespace_depths.len() {
            if depth == 0 && !self.core.direct_include {
                state.function_context.truncate(1);
            } else {
                state.function_context = state.namespaces.clone();
            }
            state.function_context_unresolved.clear();
            state.pending_context.clear();
        }
    }

    fn dispatch(&mut self, function: TrFunction, prefix: &mut String) {
        let plural = function.forces_plural();
        match function.shape() {
            CallShape::Declare => self.handle_declare_tr_functions(),
            CallShape::Tr => self.handle_tr(prefix, plural),
            CallShape::Translate => self.handle_translate(plural),
            CallShape::TrId => self.handle_trid(plural),
        }
    }

    // ============================================================
    // Declarations
    // ============================================================

    /// Everything after `class`/`struct` up to the body. The current token
    /// is the one following the keyword.
    fn class_head(&mut self) -> ClassHead {
        let Some(first) = self.tok.ident() else {
            if self.tok == Token::LeftBrace {
                // Anonymous class: track the brace only.
                let len = self.core.state.namespaces.len();
                self.core.state.namespace_depths.push(len);
                self.core.meta_expected = true;
                self.advance();
            }
            return ClassHead::Done;
        };

        let mut name = Segment::from(first);
        let mut qualifier: Vec<Segment> = Vec::new();
        self.advance();
        loop {
            match &self.tok {
                Token::ColonColon => {
                    self.advance();
                    let Some(word) = self.tok.ident() else {
                        break;
                    };
                    let next = Segment::from(word);
                    qualifier.push(std::mem::replace(&mut name, next));
                    self.advance();
                }
                Token::Ident(word) if word == "final" => {
                    self.advance();
                    break;
                }
                Token::Ident(word) => {
                    // `class EXPORT_MACRO Name`: the last identifier wins.
                    qualifier.clear();
                    name = Segment::from(word.as_str());
                    self.advance();
                }
                _ => break,
            }
        }

        let mut bases = Vec::new();
        match self.tok {
            Token::Colon | Token::AngleBracket => {
                let mut collecting = self.tok == Token::Colon;
                let mut current = String::new();
                loop {
                    self.advance();
                    match &self.tok {
                        Token::Eof => return ClassHead::Eof,
                        Token::Cancel => return ClassHead::Cancelled,
                        Token::LeftBrace | Token::Semicolon => break,
                        Token::Ident(word) if collecting => {
                            // `virtual Base`: a new word without `::` replaces.
                            if !current.is_empty() && !current.ends_with("::") {
                                current.clear();
                            }
                            current.push_str(word);
                        }
                        Token::ColonColon if collecting => current.push_str("::"),
                        Token::Comma if collecting && !current.is_empty() => {
                            bases.push(std::mem::take(&mut current));
                        }
                        Token::AngleBracket => {
                            if collecting && !current.is_empty() {
                                bases.push(std::mem::take(&mut current));
                            }
                            collecting = false;
                        }
                        _ => {}
                    }
                }
                if collecting && !current.is_empty() {
                    bases.push(current);
                }
                if self.tok == Token::Semicolon {
                    return ClassHead::Done;
                }
            }
            // Forward declarations do not create usable scopes.
            Token::LeftBrace => {}
            _ => return ClassHead::Done,
        }

        let enclosing = if qualifier.is_empty() {
            self.core.state.namespaces.clone()
        } else {
            let namespaces = &self.core.state.namespaces;
            match self.core.resolver().fully_qualify(
                namespaces.segments(),
                namespaces.len(),
                &qualifier,
                true,
            ) {
                Ok(resolved) => resolved,
                Err(_) => {
                    self.report(
                        DiagnosticKind::UndeclaredQualifiedClass,
                        "Ignoring definition of undeclared qualified class",
                    );
                    return ClassHead::Done;
                }
            }
        };

        let resolved_bases: Vec<QualifiedName> = {
            let resolver = self.core.resolver();
            bases
                .iter()
                .filter_map(|base| resolver.fully_qualify_str(&enclosing, base, false).ok())
                .collect()
        };

        let len = self.core.state.namespaces.len();
        self.core.state.namespace_depths.push(len);
        self.core.state.namespaces = enclosing;
        self.core.enter_namespace(name);
        if !resolved_bases.is_empty() {
            let id = self.core.modify_namespace(true);
            self.core.results.tree.get_mut(id).bases = resolved_bases;
        }

        let state = &mut self.core.state;
        state.function_context = state.namespaces.clone();
        state.function_context_unresolved.clear();
        state.pending_context.clear();
        self.core.prospective_context.clear();
        self.core.meta_expected = true;
        self.advance();
        ClassHead::Done
    }

    fn namespace(&mut self) {
        self.advance();
        match &self.tok {
            Token::Ident(word) => {
                let mut name = Segment::from(word.as_str());
                let mut nested = Vec::new();
                loop {
                    self.advance();
                    if self.tok != Token::ColonColon {
                        break;
                    }
                    self.advance();
                    let Some(word) = self.tok.ident() else {
                        break;
                    };
                    let next = Segment::from(word);
                    nested.push(std::mem::replace(&mut name, next));
                }
                match self.tok {
                    Token::LeftBrace => {
                        let len = self.core.state.namespaces.len();
                        self.core.state.namespace_depths.push(len);
                        for segment in nested {
                            self.core.enter_namespace(segment);
                        }
                        self.core.enter_namespace(name);

                        let state = &mut self.core.state;
                        state.function_context = state.namespaces.clone();
                        state.function_context_unresolved.clear();
                        state.pending_context.clear();
                        self.core.prospective_context.clear();
                        self.core.meta_expected = true;
                        self.advance();
                    }
                    Token::Equals => {
                        // namespace Short = Outer::Inner;
                        self.advance();
                        let written = self.read_written_name();
                        if !written.is_empty() {
                            self.core.add_alias(name, written);
                        }
                    }
                    _ => {}
                }
            }
            Token::LeftBrace => {
                // Anonymous namespace.
                let len = self.core.state.namespaces.len();
                self.core.state.namespace_depths.push(len);
                self.core.meta_expected = true;
                self.advance();
            }
            _ => {}
        }
    }

    fn using(&mut self) {
        self.advance();
        if self.tok == Token::Namespace {
            self.advance();
            let written = self.read_written_name();
            let namespaces = &self.core.state.namespaces;
            let target = self.core.resolver().fully_qualify(
                namespaces.segments(),
                namespaces.len(),
                written.segments(),
                false,
            );
            if let Ok(target) = target {
                let id = self.core.modify_namespace(true);
                self.core.results.tree.get_mut(id).usings.push(target);
            }
        } else {
            let written = self.read_written_name();
            // The last segment names the alias.
            if let Some(name) = written.last().filter(|s| !s.is_empty()).cloned() {
                self.core.add_alias(name, written);
            }
        }
    }

    // ============================================================
    // Includes
    // ============================================================

    fn process_include(&mut self, file: &Path) {
        let clean = clean_path(file);
        let shown = clean.to_string_lossy();
        if self.env.options.excludes.iter().any(|rx| rx.is_match(&shown)) {
            tracing::debug!(path = %shown, "include excluded");
            return;
        }

        if let Some(index) = self.include_stack.iter().position(|p| *p == clean) {
            self.env
                .cache
                .add_include_cycle(&self.include_stack[index..], &self.core.state);
            return;
        }

        let cache = self.env.cache;
        let mut detached = false;
        if !cache.is_blacklisted(&clean) && is_header(&clean) {
            let cached = cache.get_results(&CacheKey::new(clean.clone(), self.core.state.clone()));
            if !cached.is_empty() {
                tracing::debug!(path = %shown, results = cached.len(), "include cache hit");
                for result in cached {
                    self.core.results.add_include(result);
                }
                return;
            }
            detached = true;
        }

        let source = match fs::read(&clean) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                let message = format!("Cannot open {}: {}", clean.display(), err);
                self.report(DiagnosticKind::UnreadableInclude, message);
                return;
            }
        };

        let mut stack = self.include_stack.clone();
        stack.push(clean.clone());
        if detached {
            tracing::debug!(path = %clean.display(), "parsing header detached");
            let outcome = parse_detached(self.env, &clean, &source, stack, self.core.diagnostics);
            if let Some(result) = record_results(self.env.cache, &clean, outcome, true) {
                self.core.results.add_include(result);
            }
        } else {
            tracing::debug!(path = %clean.display(), "parsing include inline");
            let state = &self.core.state;
            let (namespaces, function_context, unresolved) = (
                state.namespaces.clone(),
                state.function_context.clone(),
                state.function_context_unresolved.clone(),
            );
            let mut parser = CppParser::new(
                self.env,
                &clean,
                &source,
                self.core.results,
                self.core.messages,
                self.core.diagnostics,
                stack,
                true,
            );
            parser.core.state.namespaces = namespaces;
            parser.core.state.function_context = function_context;
            parser.core.state.function_context_unresolved = unresolved;
            parser.parse_internal();
            // Results of an inline parse depend on the includer's state.
            cache.set_blacklisted(&clean);
        }

        self.core.prospective_context.clear();
        self.core.state.pending_context.clear();
    }
}

/// What parsing one file on its own produced.
pub(super) struct Detached {
    pub results: ParseResult,
    pub messages: Vec<CandidateMessage>,
    pub end_state: ParserSnapshot,
}

pub(super) fn parse_detached(
    env: Env<'_>,
    file: &Path,
    source: &str,
    include_stack: Vec<PathBuf>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Detached {
    let mut results = ParseResult::new(env.cache.next_file_id());
    let mut messages = Vec::new();
    let end_state = {
        let mut parser = CppParser::new(
            env,
            file,
            source,
            &mut results,
            &mut messages,
            diagnostics,
            include_stack,
            false,
        );
        parser.parse();
        parser.into_state()
    };
    Detached {
        results,
        messages,
        end_state,
    }
}

/// Store messages and, for headers, the scope results of a detached parse.
///
/// Results are keyed by the parser state at the end of the file. A header
/// that only forwards to a single include is replaced by that include.
pub(super) fn record_results(
    cache: &IncludeCache,
    file: &Path,
    detached: Detached,
    header: bool,
) -> Option<Arc<ParseResult>> {
    let Detached {
        mut results,
        messages,
        end_state,
    } = detached;
    let has_messages = !messages.is_empty();
    cache.set_messages(file, messages);
    if !header {
        return None;
    }

    let forwarded = if !has_messages && results.is_forwarding() {
        results.includes.pop_first().map(|(_, include)| include)
    } else {
        None
    };
    let result = forwarded.unwrap_or_else(|| Arc::new(results));
    cache.set_results(CacheKey::new(file, end_state), Arc::clone(&result));
    Some(result)
}
