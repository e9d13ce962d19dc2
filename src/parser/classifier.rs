//! Maps one step sentence to an [`Action`].
//!
//! Dispatch is a fixed, ordered table of `(prefix, extractor)` rules. The
//! first rule whose prefix starts the sentence wins and its extractor pulls
//! the quoted labels or numbers out with a regular expression. Matching is
//! case- and accent-sensitive.

use super::types::{Action, ElementCheck, TextMatch, Verification};
use crate::driver::selector::{synthesize, synthesize_field};
use crate::error::StepError;
use regex::{Captures, Regex};
use std::sync::OnceLock;

type Extractor = fn(&str) -> Result<Action, StepError>;

struct Rule {
    prefix: &'static str,
    extract: Extractor,
}

/// Ordered rule table; add new verbs here
static RULES: &[Rule] = &[
    Rule { prefix: "Vá para", extract: navigate },
    Rule { prefix: "Volte", extract: go_back },
    Rule { prefix: "Atualize", extract: reload },
    Rule { prefix: "Aguarde", extract: wait },
    Rule { prefix: "Clique", extract: click },
    Rule { prefix: "Digite", extract: fill },
    Rule { prefix: "Selecione", extract: select },
    Rule { prefix: "Marque", extract: check },
    Rule { prefix: "Desmarque", extract: uncheck },
    Rule { prefix: "Pressione", extract: key_press },
    Rule { prefix: "Role", extract: scroll },
    Rule { prefix: "Verifique", extract: verify },
    Rule { prefix: "Capture screenshot", extract: screenshot },
    Rule { prefix: "Capture os logs", extract: capture_logs },
    Rule { prefix: "Extraia", extract: extract },
];

/// Verification sub-kinds, tested in this order: a sentence mentioning
/// several keywords resolves to the first one listed.
static VERIFY_RULES: &[(&[&str], Extractor)] = &[
    (&["título", "title"], verify_title),
    (&["elemento", "element"], verify_element),
    (&["URL"], verify_url),
    (&["log"], verify_log),
];

/// Classify a step sentence (ordinal already stripped)
pub fn classify(sentence: &str) -> Result<Action, StepError> {
    let sentence = sentence.trim();
    let rule = RULES
        .iter()
        .find(|rule| sentence.starts_with(rule.prefix))
        .ok_or_else(|| StepError::UnrecognizedCommand(sentence.to_string()))?;

    let action = (rule.extract)(sentence)?;
    log::debug!("Classified {:?} as {}", sentence, action);
    Ok(action)
}

macro_rules! pattern {
    ($re:literal) => {{
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new($re).expect("invalid step pattern"))
    }};
}

fn captures<'s>(re: &Regex, sentence: &'s str) -> Result<Captures<'s>, StepError> {
    re.captures(sentence)
        .ok_or_else(|| StepError::PatternExtraction(sentence.to_string()))
}

/// Text after the rule prefix, with surrounding quotes removed
fn remainder<'s>(sentence: &'s str, prefix: &str) -> &'s str {
    sentence[prefix.len()..].trim().trim_matches('"').trim()
}

fn go_back(_: &str) -> Result<Action, StepError> {
    Ok(Action::GoBack)
}

fn reload(_: &str) -> Result<Action, StepError> {
    Ok(Action::Reload)
}

fn screenshot(_: &str) -> Result<Action, StepError> {
    Ok(Action::Screenshot)
}

fn capture_logs(_: &str) -> Result<Action, StepError> {
    Ok(Action::CaptureLogs)
}

fn navigate(sentence: &str) -> Result<Action, StepError> {
    let url = remainder(sentence, "Vá para");
    if url.is_empty() {
        return Err(StepError::PatternExtraction(sentence.to_string()));
    }
    Ok(Action::Navigate {
        url: url.to_string(),
    })
}

/// First integer in the sentence, in seconds; 1 second when there is none
fn wait(sentence: &str) -> Result<Action, StepError> {
    let seconds: u64 = match pattern!(r"\d+").find(sentence) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| StepError::PatternExtraction(sentence.to_string()))?,
        None => 1,
    };
    Ok(Action::Wait {
        ms: seconds.saturating_mul(1000),
    })
}

fn click(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(r#"^Clique (?:no|na|em) (?:botão|link|aba|elemento|checkbox) "([^"]+)""#),
        sentence,
    )?;
    Ok(Action::Click {
        target: synthesize(&caps[1]),
    })
}

fn fill(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(r#"^Digite "([^"]+)" (?:no|na|em) (?:campo|input|textarea|caixa) "([^"]+)""#),
        sentence,
    )?;
    Ok(Action::Fill {
        value: caps[1].to_string(),
        field: synthesize_field(&caps[2]),
    })
}

fn select(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(
            r#"^Selecione "([^"]+)" (?:no|na|em|do) (?:dropdown|select|campo|seletor) "([^"]+)""#
        ),
        sentence,
    )?;
    Ok(Action::Select {
        value: caps[1].to_string(),
        field: synthesize_field(&caps[2]),
    })
}

fn checkbox_label(sentence: &str) -> Result<String, StepError> {
    let caps = captures(
        pattern!(r#"^(?:Marque|Desmarque) (?:a|o) (?:checkbox|caixa) "([^"]+)""#),
        sentence,
    )?;
    Ok(caps[1].to_string())
}

fn check(sentence: &str) -> Result<Action, StepError> {
    Ok(Action::Check {
        target: synthesize(&checkbox_label(sentence)?),
    })
}

fn uncheck(sentence: &str) -> Result<Action, StepError> {
    Ok(Action::Uncheck {
        target: synthesize(&checkbox_label(sentence)?),
    })
}

fn key_press(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(r#"^Pressione\s+(?:a tecla\s+)?"?([^"]+?)"?\s*$"#),
        sentence,
    )?;
    Ok(Action::KeyPress {
        key: caps[1].to_string(),
    })
}

fn scroll(sentence: &str) -> Result<Action, StepError> {
    if !sentence.contains("até") {
        return Ok(Action::Scroll { target: None });
    }
    let caps = captures(
        pattern!(r#"^Role até (?:o|a) (?:elemento|seção|secção|div|tabela) "([^"]+)""#),
        sentence,
    )?;
    Ok(Action::Scroll {
        target: Some(synthesize(&caps[1])),
    })
}

fn verify(sentence: &str) -> Result<Action, StepError> {
    let (_, extract) = VERIFY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| sentence.contains(k)))
        .ok_or_else(|| StepError::PatternExtraction(sentence.to_string()))?;
    extract(sentence)
}

fn text_match(verb: &str) -> TextMatch {
    if verb == "contém" {
        TextMatch::Contains
    } else {
        TextMatch::Equals
    }
}

fn verify_title(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(r#"^Verifique se o (?:título|title) (é|contém) "([^"]+)""#),
        sentence,
    )?;
    Ok(Action::Verify(Verification::Title {
        mode: text_match(&caps[1]),
        expected: caps[2].to_string(),
    }))
}

fn verify_element(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(
            r#"^Verifique se (?:o|a) (?:elemento|element) "([^"]+)" (?:(está visível)|(existe)|contém "([^"]+)")"#
        ),
        sentence,
    )?;
    let check = if caps.get(2).is_some() {
        ElementCheck::Visible
    } else if caps.get(3).is_some() {
        ElementCheck::Exists
    } else {
        ElementCheck::ContainsText(caps[4].to_string())
    };
    Ok(Action::Verify(Verification::Element {
        target: synthesize(&caps[1]),
        check,
    }))
}

fn verify_url(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(r#"^Verifique se a URL (é|contém) "([^"]+)""#),
        sentence,
    )?;
    Ok(Action::Verify(Verification::Url {
        mode: text_match(&caps[1]),
        expected: caps[2].to_string(),
    }))
}

fn verify_log(sentence: &str) -> Result<Action, StepError> {
    let caps = captures(
        pattern!(r#"^Verifique se existe (?:o|um) log "([^"]+)""#),
        sentence,
    )?;
    Ok(Action::Verify(Verification::Log {
        expected: caps[1].to_string(),
    }))
}

fn extract(sentence: &str) -> Result<Action, StepError> {
    let target = pattern!(r#"^Extraia o texto d[oa] elemento "([^"]+)""#)
        .captures(sentence)
        .map(|caps| synthesize(&caps[1]));
    Ok(Action::Extract {
        description: remainder(sentence, "Extraia").to_string(),
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::traits::Locator;
    use crate::parser::types::ActionKind;

    #[test]
    fn test_wait_seconds() {
        assert_eq!(classify("Aguarde 2 segundos").unwrap(), Action::Wait { ms: 2000 });
        assert_eq!(classify("Aguarde 1 segundo").unwrap(), Action::Wait { ms: 1000 });
    }

    #[test]
    fn test_wait_without_digit_defaults_to_one_second() {
        assert_eq!(classify("Aguarde").unwrap(), Action::Wait { ms: 1000 });
        assert_eq!(classify("Aguarde um pouco").unwrap(), Action::Wait { ms: 1000 });
    }

    #[test]
    fn test_click_first_candidate_is_exact_text() {
        match classify(r#"Clique no elemento "Repositories""#).unwrap() {
            Action::Click { target } => {
                assert_eq!(target.first(), Some(&Locator::Text("Repositories".into())));
                assert_eq!(target.label, "Repositories");
            }
            other => panic!("expected Click, got {:?}", other),
        }
    }

    #[test]
    fn test_click_ignores_trailing_words() {
        let action = classify(r#"Clique no elemento "PGBL vs CDB" no menu"#).unwrap();
        assert_eq!(action.kind(), ActionKind::Click);
    }

    #[test]
    fn test_fill_and_select_extract_value_then_field() {
        match classify(r#"Digite "1000" no campo "Valor Inicial""#).unwrap() {
            Action::Fill { field, value } => {
                assert_eq!(value, "1000");
                assert_eq!(field.label, "Valor Inicial");
                assert!(field
                    .iter()
                    .any(|l| *l == Locator::Placeholder("Valor Inicial".into())));
            }
            other => panic!("expected Fill, got {:?}", other),
        }
        match classify(r#"Selecione "Mensal" no dropdown "Periodicidade""#).unwrap() {
            Action::Select { field, value } => {
                assert_eq!(value, "Mensal");
                assert_eq!(field.label, "Periodicidade");
            }
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn test_check_and_uncheck() {
        assert_eq!(
            classify(r#"Marque a checkbox "Aceito""#).unwrap().kind(),
            ActionKind::Check
        );
        assert_eq!(
            classify(r#"Desmarque o caixa "Newsletter""#).unwrap().kind(),
            ActionKind::Uncheck
        );
    }

    #[test]
    fn test_navigation_verbs() {
        assert_eq!(
            classify("Vá para https://github.com").unwrap(),
            Action::Navigate {
                url: "https://github.com".into()
            }
        );
        assert_eq!(classify("Volte para a página anterior").unwrap(), Action::GoBack);
        assert_eq!(classify("Atualize a página").unwrap(), Action::Reload);
        assert!(matches!(
            classify("Vá para"),
            Err(StepError::PatternExtraction(_))
        ));
    }

    #[test]
    fn test_key_press() {
        assert_eq!(
            classify("Pressione Enter").unwrap(),
            Action::KeyPress { key: "Enter".into() }
        );
        assert_eq!(
            classify(r#"Pressione a tecla "Tab""#).unwrap(),
            Action::KeyPress { key: "Tab".into() }
        );
    }

    #[test]
    fn test_scroll() {
        assert_eq!(
            classify("Role a página para baixo").unwrap(),
            Action::Scroll { target: None }
        );
        match classify(r#"Role até a tabela "Resultados""#).unwrap() {
            Action::Scroll { target: Some(t) } => assert_eq!(t.label, "Resultados"),
            other => panic!("expected Scroll to element, got {:?}", other),
        }
        assert!(matches!(
            classify("Role até o fim"),
            Err(StepError::PatternExtraction(_))
        ));
    }

    #[test]
    fn test_verify_subkinds() {
        assert_eq!(
            classify(r#"Verifique se o título contém "Simulador""#).unwrap(),
            Action::Verify(Verification::Title {
                mode: TextMatch::Contains,
                expected: "Simulador".into()
            })
        );
        assert_eq!(
            classify(r#"Verifique se a URL é "https://x.dev/""#).unwrap(),
            Action::Verify(Verification::Url {
                mode: TextMatch::Equals,
                expected: "https://x.dev/".into()
            })
        );
        assert_eq!(
            classify(r#"Verifique se existe um log "pronto""#).unwrap(),
            Action::Verify(Verification::Log {
                expected: "pronto".into()
            })
        );
    }

    #[test]
    fn test_verify_element_checks() {
        let checks: Vec<ElementCheck> = [
            r#"Verifique se o elemento "Valor Final" está visível"#,
            r#"Verifique se o elemento "class FrameworkIA" existe"#,
            r#"Verifique se o elemento "Saldo" contém "R$ 1.000""#,
        ]
        .iter()
        .map(|s| match classify(s).unwrap() {
            Action::Verify(Verification::Element { check, .. }) => check,
            other => panic!("expected element verification, got {:?}", other),
        })
        .collect();
        assert_eq!(
            checks,
            vec![
                ElementCheck::Visible,
                ElementCheck::Exists,
                ElementCheck::ContainsText("R$ 1.000".into())
            ]
        );
    }

    #[test]
    fn test_verify_keyword_order_prefers_title() {
        // Mentions both "título" and "URL"; the title rule is tested first
        let result = classify(r#"Verifique se a URL contém "título""#);
        assert!(matches!(result, Err(StepError::PatternExtraction(_))));
    }

    #[test]
    fn test_verify_without_keyword_is_extraction_error() {
        match classify("Verifique se está tudo certo") {
            Err(StepError::PatternExtraction(sentence)) => {
                assert_eq!(sentence, "Verifique se está tudo certo")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_and_malformed() {
        assert!(matches!(
            classify("Faça login no sistema"),
            Err(StepError::UnrecognizedCommand(_))
        ));
        // Case-sensitive prefixes
        assert!(matches!(
            classify(r#"clique no botão "OK""#),
            Err(StepError::UnrecognizedCommand(_))
        ));
        match classify("Clique em OK") {
            Err(StepError::PatternExtraction(sentence)) => assert_eq!(sentence, "Clique em OK"),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_capture_and_extract() {
        assert_eq!(classify("Capture screenshot").unwrap(), Action::Screenshot);
        assert_eq!(classify("Capture os logs do console").unwrap(), Action::CaptureLogs);
        assert!(matches!(
            classify("Capture a tela"),
            Err(StepError::UnrecognizedCommand(_))
        ));
        match classify(r#"Extraia o texto do elemento "Valor Final""#).unwrap() {
            Action::Extract {
                target: Some(t), ..
            } => assert_eq!(t.label, "Valor Final"),
            other => panic!("expected Extract with target, got {:?}", other),
        }
        assert_eq!(
            classify("Extraia os dados da tabela").unwrap(),
            Action::Extract {
                description: "os dados da tabela".into(),
                target: None
            }
        );
    }
}
