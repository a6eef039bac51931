//! The table of recognized localization functions and their spellings.

use std::{collections::HashMap, fmt};

use thiserror::Error;

/// A recognized localization function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrFunction {
    DeclareTrFunctions,
    TrNNoop,
    TrIdNNoop,
    TranslateNNoop,
    TranslateNNoop3,
    TrNoop,
    TrIdNoop,
    TranslateNoop,
    TranslateNoop3,
    TrNoopUtf8,
    TranslateNoopUtf8,
    TranslateNoop3Utf8,
    FindMessage,
    QtTrId,
    Tr,
    TrUtf8,
    Translate,
}

/// How a call's arguments are read and its context determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// `Q_DECLARE_TR_FUNCTIONS(Ctx)`
    Declare,
    /// Context from the call site: `tr(text[, comment[, n]])`.
    Tr,
    /// Explicit context argument: `translate(ctx, text, ...)`.
    Translate,
    /// Message id: `qtTrId(id[, n])`.
    TrId,
}

impl TrFunction {
    pub const ALL: [TrFunction; 17] = [
        TrFunction::DeclareTrFunctions,
        TrFunction::TrNNoop,
        TrFunction::TrIdNNoop,
        TrFunction::TranslateNNoop,
        TrFunction::TranslateNNoop3,
        TrFunction::TrNoop,
        TrFunction::TrIdNoop,
        TrFunction::TranslateNoop,
        TrFunction::TranslateNoop3,
        TrFunction::TrNoopUtf8,
        TrFunction::TranslateNoopUtf8,
        TrFunction::TranslateNoop3Utf8,
        TrFunction::FindMessage,
        TrFunction::QtTrId,
        TrFunction::Tr,
        TrFunction::TrUtf8,
        TrFunction::Translate,
    ];

    pub fn default_name(self) -> &'static str {
        match self {
            TrFunction::DeclareTrFunctions => "Q_DECLARE_TR_FUNCTIONS",
            TrFunction::TrNNoop => "QT_TR_N_NOOP",
            TrFunction::TrIdNNoop => "QT_TRID_N_NOOP",
            TrFunction::TranslateNNoop => "QT_TRANSLATE_N_NOOP",
            TrFunction::TranslateNNoop3 => "QT_TRANSLATE_N_NOOP3",
            TrFunction::TrNoop => "QT_TR_NOOP",
            TrFunction::TrIdNoop => "QT_TRID_NOOP",
            TrFunction::TranslateNoop => "QT_TRANSLATE_NOOP",
            TrFunction::TranslateNoop3 => "QT_TRANSLATE_NOOP3",
            TrFunction::TrNoopUtf8 => "QT_TR_NOOP_UTF8",
            TrFunction::TranslateNoopUtf8 => "QT_TRANSLATE_NOOP_UTF8",
            TrFunction::TranslateNoop3Utf8 => "QT_TRANSLATE_NOOP3_UTF8",
            TrFunction::FindMessage => "findMessage",
            TrFunction::QtTrId => "qtTrId",
            TrFunction::Tr => "tr",
            TrFunction::TrUtf8 => "trUtf8",
            TrFunction::Translate => "translate",
        }
    }

    pub fn shape(self) -> CallShape {
        match self {
            TrFunction::DeclareTrFunctions => CallShape::Declare,
            TrFunction::Tr
            | TrFunction::TrUtf8
            | TrFunction::TrNoop
            | TrFunction::TrNoopUtf8
            | TrFunction::TrNNoop => CallShape::Tr,
            TrFunction::Translate
            | TrFunction::FindMessage
            | TrFunction::TranslateNoop
            | TrFunction::TranslateNoop3
            | TrFunction::TranslateNoopUtf8
            | TrFunction::TranslateNoop3Utf8
            | TrFunction::TranslateNNoop
            | TrFunction::TranslateNNoop3 => CallShape::Translate,
            TrFunction::QtTrId | TrFunction::TrIdNoop | TrFunction::TrIdNNoop => CallShape::TrId,
        }
    }

    /// Whether the function always yields a plural message.
    pub fn forces_plural(self) -> bool {
        matches!(
            self,
            TrFunction::TrNNoop
                | TrFunction::TrIdNNoop
                | TrFunction::TranslateNNoop
                | TrFunction::TranslateNNoop3
        )
    }

    fn by_default_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.default_name() == name)
    }
}

impl fmt::Display for TrFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("tr-function mapping '{0}' is missing the '='")]
    MissingEquals(String),
    #[error("unknown tr-function '{name}'; available tr-functions are: {available}")]
    UnknownFunction { name: String, available: String },
    #[error("empty alias for tr-function '{0}'")]
    EmptyAlias(String),
}

/// Spellings recognized for each function.
#[derive(Debug, Clone)]
pub struct TrFunctionTable {
    spellings: HashMap<TrFunction, Vec<String>>,
    by_name: HashMap<String, TrFunction>,
}

impl Default for TrFunctionTable {
    fn default() -> Self {
        let spellings = TrFunction::ALL
            .into_iter()
            .map(|f| (f, vec![f.default_name().to_string()]))
            .collect();
        let mut table = Self {
            spellings,
            by_name: HashMap::new(),
        };
        table.rebuild();
        table
    }
}

impl TrFunctionTable {
    pub fn lookup(&self, name: &str) -> Option<TrFunction> {
        self.by_name.get(name).copied()
    }

    /// Apply a comma separated list of `FUNCTION=alias` (replace all
    /// spellings) and `FUNCTION+=alias` (add a spelling) items.
    pub fn apply_alias_spec(&mut self, spec: &str) -> Result<(), AliasError> {
        for pair in spec.split(',').filter(|p| !p.is_empty()) {
            let Some(equals) = pair.find('=') else {
                return Err(AliasError::MissingEquals(pair.to_string()));
            };
            let (head, alias) = (&pair[..equals], pair[equals + 1..].trim());
            let (name, add) = match head.strip_suffix('+') {
                Some(name) => (name.trim(), true),
                None => (head.trim(), false),
            };
            let function =
                TrFunction::by_default_name(name).ok_or_else(|| AliasError::UnknownFunction {
                    name: name.to_string(),
                    available: TrFunction::ALL
                        .iter()
                        .map(|f| f.default_name())
                        .collect::<Vec<_>>()
                        .join(","),
                })?;
            if alias.is_empty() {
                return Err(AliasError::EmptyAlias(name.to_string()));
            }
            let list = self.spellings.entry(function).or_default();
            if !add {
                list.clear();
            }
            list.push(alias.to_string());
        }
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        self.by_name.clear();
        for function in TrFunction::ALL {
            for name in self.spellings.get(&function).into_iter().flatten() {
                self.by_name.insert(name.clone(), function);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_spellings() {
        let table = TrFunctionTable::default();
        assert_eq!(table.lookup("tr"), Some(TrFunction::Tr));
        assert_eq!(table.lookup("QT_TRANSLATE_N_NOOP3"), Some(TrFunction::TranslateNNoop3));
        assert_eq!(table.lookup("qsTr"), None);
        assert!(TrFunction::QtTrId.shape() == CallShape::TrId);
        assert!(TrFunction::TrNNoop.forces_plural());
        assert!(!TrFunction::TranslateNoop3.forces_plural());
    }

    #[test]
    fn test_set_and_add_aliases() {
        let mut table = TrFunctionTable::default();
        table.apply_alias_spec("tr=myTr, translate += i18n").unwrap();
        assert_eq!(table.lookup("tr"), None);
        assert_eq!(table.lookup("myTr"), Some(TrFunction::Tr));
        assert_eq!(table.lookup("translate"), Some(TrFunction::Translate));
        assert_eq!(table.lookup("i18n"), Some(TrFunction::Translate));
    }

    #[test]
    fn test_alias_errors() {
        let mut table = TrFunctionTable::default();
        assert_eq!(
            table.apply_alias_spec("tr"),
            Err(AliasError::MissingEquals("tr".to_string()))
        );
        assert_eq!(
            table.apply_alias_spec("tr= "),
            Err(AliasError::EmptyAlias("tr".to_string()))
        );
        assert!(matches!(
            table.apply_alias_spec("nope=x"),
            Err(AliasError::UnknownFunction { name, .. }) if name == "nope"
        ));
    }
}
