//! Localization call handlers.
//!
//! Each handler starts with the `(` of a recognized call as the current
//! token and leaves the last consumed argument token current; the main
//! loop then moves past it.

use std::collections::HashSet;

use crate::{
    core::{
        data::{CandidateMessage, MessageKind, QualifiedName, join_contexts, join_segments},
        resolve::{Resolver, ScopeRef},
        tokenize::{Token, simplified, transcode},
    },
    issues::DiagnosticKind,
};

use super::parser::CppParser;

const LEGACY_APPLICATIONS: [&str; 2] = ["QApplication", "QCoreApplication"];
const UNSUPPORTED_ENCODINGS: [&str; 3] = ["Latin1", "DefaultCodec", "CodecForTr"];

/// A resolved context plus the class to complain about, if any.
struct Resolved {
    context: String,
    lacks_tr_support: bool,
}

impl CppParser<'_> {
    // ============================================================
    // Argument matching
    // ============================================================

    /// Adjacent string literals, decoded and concatenated.
    fn match_string(&mut self) -> Option<String> {
        let mut text: Option<String> = None;
        loop {
            match &self.tok {
                Token::String(body) => text.get_or_insert_default().push_str(&transcode(body)),
                Token::RawString(body) => text.get_or_insert_default().push_str(body),
                _ => return text,
            }
            self.advance();
        }
    }

    /// A string, or a null literal standing for the empty comment.
    fn match_string_or_null(&mut self) -> Option<String> {
        self.match_string()
            .or_else(|| self.eat(&Token::Null).then(String::new))
    }

    /// The legacy `[QCoreApplication::]UnicodeUTF8` encoding argument.
    fn match_encoding(&mut self) -> bool {
        let Some(word) = self.tok.ident() else {
            return false;
        };
        if LEGACY_APPLICATIONS.contains(&word) {
            self.advance();
            if self.tok == Token::ColonColon {
                self.advance();
            }
        }
        match self.tok.ident() {
            Some("UnicodeUTF8") => {
                self.advance();
                true
            }
            Some(word) if UNSUPPORTED_ENCODINGS.contains(&word) => {
                self.report(
                    DiagnosticKind::UnsupportedEncoding,
                    "Unsupported encoding Latin1/DefaultCodec/CodecForTr",
                );
                false
            }
            _ => false,
        }
    }

    /// A simple numeric expression: a literal, an identifier, a call, or a
    /// member call through `.` or `->`.
    fn match_expression(&mut self) -> bool {
        if self.eat(&Token::Null) || self.eat(&Token::Integer) {
            return true;
        }

        let mut level = 0usize;
        loop {
            let ident = matches!(self.tok, Token::Ident(_));
            if ident {
                self.advance();
            }
            if !ident && level == 0 {
                break;
            }
            match self.tok {
                Token::RightParen => {
                    if level == 0 {
                        break;
                    }
                    level -= 1;
                    self.advance();
                }
                Token::LeftParen => {
                    self.advance();
                    if self.tok == Token::RightParen {
                        self.advance();
                    } else {
                        level += 1;
                    }
                }
                Token::Ident(_) => {}
                Token::Arrow => self.advance(),
                Token::Eof | Token::Cancel => return false,
                _ if level == 0 => return false,
                _ => self.advance(),
            }
        }
        true
    }

    // ============================================================
    // Handlers
    // ============================================================

    pub(super) fn handle_tr(&mut self, prefix: &mut String, mut plural: bool) {
        if !self.core.meta.source_text.is_empty() {
            self.report(
                DiagnosticKind::IgnoredAnnotation,
                "//% cannot be used with tr() / QT_TR_NOOP(). Ignoring",
            );
        }
        let line = self.lexer.line();
        self.advance();

        if let Some(text) = self.match_string()
            && !text.is_empty()
        {
            let mut comment = String::new();
            if self.tok != Token::RightParen
                && self.eat(&Token::Comma)
                && let Some(found) = self.match_string_or_null()
            {
                comment = found;
                if self.tok != Token::RightParen && self.eat(&Token::Comma) {
                    plural = true;
                }
            }

            if !self.core.state.pending_context.is_empty() && !prefix.starts_with("::") {
                self.resolve_pending_context();
            }

            let resolved = if prefix.is_empty() {
                let state = &self.core.state;
                if !state.function_context_unresolved.is_empty() {
                    Resolved {
                        context: join_contexts(
                            &state.function_context.to_string(),
                            &state.function_context_unresolved,
                        ),
                        lacks_tr_support: false,
                    }
                } else if state.function_context.len() < 2 {
                    self.report(
                        DiagnosticKind::MissingContext,
                        "tr() cannot be called without context",
                    );
                    return;
                } else {
                    let function_context = state.function_context.clone();
                    unqualified_context(&self.core.resolver(), &function_context)
                }
            } else {
                let written = prefix.strip_suffix("::").unwrap_or(prefix.as_str());
                let resolved = qualified_context(
                    &self.core.resolver(),
                    &self.core.state.function_context,
                    written,
                );
                prefix.clear();
                resolved
            };

            if resolved.lacks_tr_support {
                self.report(
                    DiagnosticKind::MissingTrSupport,
                    format!("Class '{}' lacks Q_OBJECT macro", resolved.context),
                );
            }
            self.record_message(line, resolved.context, text, comment, plural);
        }
        self.core.meta.clear();
        self.core.meta_expected = false;
    }

    /// Qualify the owner of an out-of-line member definition.
    fn resolve_pending_context(&mut self) {
        let state = &self.core.state;
        let outcome =
            self.core
                .resolver()
                .fully_qualify_str(&state.namespaces, &state.pending_context, true);
        match outcome {
            Ok(owner) => self.core.state.function_context = owner,
            Err(partial) => {
                let first = partial
                    .unresolved
                    .first()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default();
                let message = format!(
                    "Qualifying with unknown namespace/class {}::{}",
                    partial.resolved, first
                );
                self.core.state.function_context = partial.resolved;
                self.core.state.function_context_unresolved = join_segments(&partial.unresolved);
                self.report(DiagnosticKind::UnknownQualifier, message);
            }
        }
        self.core.state.pending_context.clear();
    }

    pub(super) fn handle_translate(&mut self, mut plural: bool) {
        if !self.core.meta.source_text.is_empty() {
            self.report(
                DiagnosticKind::IgnoredAnnotation,
                "//% cannot be used with translate() / QT_TRANSLATE_NOOP(). Ignoring",
            );
        }
        let line = self.lexer.line();
        self.advance();

        if let Some(context) = self.match_string()
            && self.eat(&Token::Comma)
            && let Some(text) = self.match_string()
            && !text.is_empty()
        {
            let mut comment = String::new();
            if self.tok != Token::RightParen {
                // Malformed trailing arguments drop the call and keep the
                // collected metadata.
                if !self.eat(&Token::Comma) {
                    return;
                }
                let Some(found) = self.match_string_or_null() else {
                    return;
                };
                comment = found;
                if self.tok != Token::RightParen {
                    if !self.eat(&Token::Comma) {
                        return;
                    }
                    if self.match_encoding() {
                        if self.tok != Token::RightParen {
                            plural |= self.eat(&Token::Comma);
                        }
                    } else if self.match_expression() && self.tok == Token::RightParen {
                        // translate("ctx", "text", "comment", n)
                        plural = true;
                    } else {
                        return;
                    }
                }
            }
            self.record_message(line, context, text, comment, plural);
        }
        self.core.meta.clear();
        self.core.meta_expected = false;
    }

    pub(super) fn handle_trid(&mut self, mut plural: bool) {
        if !self.core.meta.id.is_empty() {
            self.report(
                DiagnosticKind::IgnoredAnnotation,
                "//= cannot be used with qtTrId() / QT_TRID_NOOP(). Ignoring",
            );
        }
        let line = self.lexer.line();
        self.advance();

        if let Some(id) = self.match_string()
            && !id.is_empty()
        {
            plural |= self.eat(&Token::Comma);
            self.core.meta.id = id;
            let text = transcode(&self.core.meta.source_text);
            self.record_message(line, String::new(), text, String::new(), plural);
        }
        self.core.meta.clear();
        self.core.meta_expected = false;
    }

    /// `Q_DECLARE_TR_FUNCTIONS(A::B)` gives the current class localization
    /// support under the named context.
    pub(super) fn handle_declare_tr_functions(&mut self) {
        let mut name = String::new();
        loop {
            self.advance();
            let Some(word) = self.tok.ident() else {
                return;
            };
            name.push_str(word);
            self.advance();
            match self.tok {
                Token::RightParen => break,
                Token::ColonColon => name.push_str("::"),
                _ => return,
            }
        }
        let id = self.core.modify_namespace(true);
        let scope = self.core.results.tree.get_mut(id);
        scope.has_tr_functions = true;
        scope.set_tr_qualification(name);
    }

    fn record_message(
        &mut self,
        line: usize,
        context: String,
        source_text: String,
        comment: String,
        plural: bool,
    ) {
        let meta = &mut self.core.meta;
        let message = CandidateMessage {
            context,
            source_text,
            comment,
            extra_comment: transcode(&simplified(&meta.extra_comment)),
            id: std::mem::take(&mut meta.id),
            extras: std::mem::take(&mut meta.extras),
            plural,
            kind: MessageKind::Translation,
            file: self.core.file.clone(),
            line,
        };
        self.core.messages.push(message);
    }
}

/// Context of a `tr()` call written without qualifier.
///
/// The innermost enclosing scope with localization support wins. A class
/// without support of its own defers to its first supporting base.
fn unqualified_context(resolver: &Resolver<'_>, function_context: &QualifiedName) -> Resolved {
    let segments = function_context.segments();
    let mut visited = HashSet::new();
    let mut idx = function_context.len();
    loop {
        if let Some(scope) = resolver.find_namespace(segments, idx) {
            let definition = scope.definition_scope();
            if definition.has_tr_functions {
                return Resolved {
                    context: definition.tr_qualification(|| join_segments(&segments[1..idx])),
                    lacks_tr_support: false,
                };
            }
            if let Some(context) = base_context(resolver, scope, &mut visited) {
                return Resolved {
                    context,
                    lacks_tr_support: false,
                };
            }
        }
        if idx <= 1 {
            let context = function_context.to_string();
            let lacks_tr_support = resolver
                .find_namespace(segments, segments.len())
                .is_some_and(|scope| scope.definition_scope().complain_once());
            return Resolved {
                context,
                lacks_tr_support,
            };
        }
        idx -= 1;
    }
}

/// Depth-first search through the resolved bases of `scope`.
fn base_context(
    resolver: &Resolver<'_>,
    scope: ScopeRef<'_>,
    visited: &mut HashSet<QualifiedName>,
) -> Option<String> {
    let own = &scope.scope().bases;
    let defined = &scope.definition_scope().bases;
    for base in own.iter().chain(defined) {
        if !visited.insert(base.clone()) {
            continue;
        }
        let Some(found) = resolver.find_namespace(base.segments(), base.len()) else {
            continue;
        };
        let definition = found.definition_scope();
        if definition.has_tr_functions {
            return Some(definition.tr_qualification(|| base.to_string()));
        }
        if let Some(context) = base_context(resolver, found, visited) {
            return Some(context);
        }
    }
    None
}

/// Context of `Prefix::tr()`, resolved from the call site.
fn qualified_context(
    resolver: &Resolver<'_>,
    function_context: &QualifiedName,
    written: &str,
) -> Resolved {
    match resolver.fully_qualify_str(function_context, written, false) {
        Ok(owner) => match resolver.find_namespace(owner.segments(), owner.len()) {
            Some(scope) => {
                let definition = scope.definition_scope();
                let context = definition.tr_qualification(|| owner.to_string());
                let lacks_tr_support =
                    !definition.has_tr_functions && definition.complain_once();
                Resolved {
                    context,
                    lacks_tr_support,
                }
            }
            None => Resolved {
                context: owner.to_string(),
                lacks_tr_support: false,
            },
        },
        Err(partial) => Resolved {
            context: join_contexts(
                &partial.resolved.to_string(),
                &join_segments(&partial.unresolved),
            ),
            lacks_tr_support: false,
        },
    }
}
