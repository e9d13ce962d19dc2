use crate::driver::traits::SelectorCandidates;
use serde::Serialize;
use std::fmt;

/// Name given to steps that appear before any heading
pub const DEFAULT_GROUP: &str = "Geral";

/// A named, ordered run of steps taken from one heading of the flow
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub steps: Vec<RawStep>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }
}

/// One ordinal-prefixed line of the flow, kept as authored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawStep {
    /// The ordinal written by the author ("2." -> 2)
    pub ordinal: u32,
    /// The trimmed source line, ordinal included
    pub line: String,
}

impl RawStep {
    /// The sentence with its leading ordinal marker removed
    pub fn sentence(&self) -> &str {
        strip_ordinal(&self.line)
    }
}

/// Remove a leading `N.` marker and the whitespace after it
pub fn strip_ordinal(line: &str) -> &str {
    let trimmed = line.trim();
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && trimmed[digits..].starts_with('.') {
        trimmed[digits + 1..].trim_start()
    } else {
        trimmed
    }
}

/// Semantic action produced by classifying a step sentence
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate { url: String },
    GoBack,
    Reload,
    Wait { ms: u64 },
    Click { target: SelectorCandidates },
    Fill { field: SelectorCandidates, value: String },
    Select { field: SelectorCandidates, value: String },
    Check { target: SelectorCandidates },
    Uncheck { target: SelectorCandidates },
    KeyPress { key: String },
    /// `None` scrolls to the bottom of the page
    Scroll { target: Option<SelectorCandidates> },
    Verify(Verification),
    Screenshot,
    CaptureLogs,
    Extract {
        description: String,
        target: Option<SelectorCandidates>,
    },
}

/// Discriminant of [`Action`], used for logging and the `parse` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Navigate,
    GoBack,
    Reload,
    Wait,
    Click,
    Fill,
    Select,
    Check,
    Uncheck,
    KeyPress,
    Scroll,
    Verify,
    Screenshot,
    CaptureLogs,
    Extract,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Navigate { .. } => ActionKind::Navigate,
            Action::GoBack => ActionKind::GoBack,
            Action::Reload => ActionKind::Reload,
            Action::Wait { .. } => ActionKind::Wait,
            Action::Click { .. } => ActionKind::Click,
            Action::Fill { .. } => ActionKind::Fill,
            Action::Select { .. } => ActionKind::Select,
            Action::Check { .. } => ActionKind::Check,
            Action::Uncheck { .. } => ActionKind::Uncheck,
            Action::KeyPress { .. } => ActionKind::KeyPress,
            Action::Scroll { .. } => ActionKind::Scroll,
            Action::Verify(_) => ActionKind::Verify,
            Action::Screenshot => ActionKind::Screenshot,
            Action::CaptureLogs => ActionKind::CaptureLogs,
            Action::Extract { .. } => ActionKind::Extract,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Navigate { url } => write!(f, "navigate {}", url),
            Action::GoBack => write!(f, "go back"),
            Action::Reload => write!(f, "reload"),
            Action::Wait { ms } => write!(f, "wait {}ms", ms),
            Action::Click { target } => write!(f, "click {}", target),
            Action::Fill { field, value } => write!(f, "fill {} with {:?}", field, value),
            Action::Select { field, value } => write!(f, "select {:?} in {}", value, field),
            Action::Check { target } => write!(f, "check {}", target),
            Action::Uncheck { target } => write!(f, "uncheck {}", target),
            Action::KeyPress { key } => write!(f, "press {}", key),
            Action::Scroll { target: Some(t) } => write!(f, "scroll to {}", t),
            Action::Scroll { target: None } => write!(f, "scroll to bottom"),
            Action::Verify(v) => write!(f, "verify {}", v),
            Action::Screenshot => write!(f, "screenshot"),
            Action::CaptureLogs => write!(f, "capture logs"),
            Action::Extract {
                target: Some(t), ..
            } => write!(f, "extract text of {}", t),
            Action::Extract { description, .. } => write!(f, "extract {:?}", description),
        }
    }
}

/// How an expected string is compared against the actual one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Equals,
    Contains,
}

impl TextMatch {
    pub fn matches(&self, actual: &str, expected: &str) -> bool {
        match self {
            TextMatch::Equals => actual == expected,
            TextMatch::Contains => actual.contains(expected),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Equals => write!(f, "equals"),
            TextMatch::Contains => write!(f, "contains"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementCheck {
    Visible,
    Exists,
    ContainsText(String),
}

/// Assertion sub-kinds of `Verifique ...`
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Title {
        mode: TextMatch,
        expected: String,
    },
    Element {
        target: SelectorCandidates,
        check: ElementCheck,
    },
    Url {
        mode: TextMatch,
        expected: String,
    },
    Log {
        expected: String,
    },
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verification::Title { mode, expected } => write!(f, "title {} {:?}", mode, expected),
            Verification::Element { target, check } => match check {
                ElementCheck::Visible => write!(f, "{} is visible", target),
                ElementCheck::Exists => write!(f, "{} exists", target),
                ElementCheck::ContainsText(t) => write!(f, "{} contains {:?}", target, t),
            },
            Verification::Url { mode, expected } => write!(f, "url {} {:?}", mode, expected),
            Verification::Log { expected } => write!(f, "console log contains {:?}", expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ordinal() {
        assert_eq!(strip_ordinal("1. Clique"), "Clique");
        assert_eq!(strip_ordinal("12.Volte"), "Volte");
        assert_eq!(strip_ordinal("  3.   Aguarde 2 segundos "), "Aguarde 2 segundos");
        assert_eq!(strip_ordinal("Sem ordinal"), "Sem ordinal");
        assert_eq!(strip_ordinal("4 sem ponto"), "4 sem ponto");
    }

    #[test]
    fn test_text_match() {
        assert!(TextMatch::Contains.matches("GitHub - repo", "repo"));
        assert!(!TextMatch::Equals.matches("GitHub - repo", "repo"));
        assert!(TextMatch::Equals.matches("repo", "repo"));
    }
}
