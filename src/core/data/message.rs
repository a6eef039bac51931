use std::{collections::BTreeMap, fmt, path::PathBuf};

use serde::Serialize;

/// Free-form `//~ key value` annotations attached to a message.
pub type MessageExtras = BTreeMap<String, String>;

/// What a candidate message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    /// A translatable string found in a localization call.
    Translation,
    /// A `TRANSLATOR <context> <comment>` annotation describing a context.
    /// Has no source text.
    ContextComment,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Translation => write!(f, "translation"),
            MessageKind::ContextComment => write!(f, "context-comment"),
        }
    }
}

/// One extracted string, ready for the catalog merge step.
///
/// `context` is either a fully resolved qualification (`N::C`) or, when a
/// qualifier could not be resolved, the resolved prefix joined to the
/// literal unresolved remainder (`N::Unknown`). Id-based messages carry an
/// empty context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMessage {
    pub context: String,
    pub source_text: String,
    pub comment: String,
    /// Collected from `//:` comments.
    pub extra_comment: String,
    /// Collected from `//=` comments or the id-based call argument.
    pub id: String,
    pub extras: MessageExtras,
    pub plural: bool,
    pub kind: MessageKind,
    pub file: PathBuf,
    /// 1-indexed line of the call.
    pub line: usize,
}

impl fmt::Display for CandidateMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: ", self.file.display(), self.line)?;
        match self.kind {
            MessageKind::ContextComment => write!(f, "{} (context comment)", self.context)?,
            MessageKind::Translation => {
                if self.context.is_empty() {
                    write!(f, "<id {:?}>", self.id)?;
                } else {
                    write!(f, "{}", self.context)?;
                }
                write!(f, " {:?}", self.source_text)?;
            }
        }
        if !self.comment.is_empty() {
            write!(f, " ({:?})", self.comment)?;
        }
        if self.plural {
            write!(f, " [plural]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(context: &str, text: &str) -> CandidateMessage {
        CandidateMessage {
            context: context.to_string(),
            source_text: text.to_string(),
            comment: String::new(),
            extra_comment: String::new(),
            id: String::new(),
            extras: MessageExtras::new(),
            plural: false,
            kind: MessageKind::Translation,
            file: PathBuf::from("src/main.cpp"),
            line: 12,
        }
    }

    #[test]
    fn test_display_translation() {
        let mut msg = message("N::C", "Open");
        msg.plural = true;
        insta::assert_snapshot!(msg.to_string(), @r#"src/main.cpp:12: N::C "Open" [plural]"#);
    }

    #[test]
    fn test_display_id_based() {
        let mut msg = message("", "");
        msg.id = "app-title".to_string();
        insta::assert_snapshot!(msg.to_string(), @r#"src/main.cpp:12: <id "app-title"> """#);
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_string(&message("C", "Hi")).unwrap();
        assert!(json.contains("\"sourceText\":\"Hi\""));
        assert!(json.contains("\"kind\":\"translation\""));
    }
}
