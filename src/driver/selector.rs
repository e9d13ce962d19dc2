//! Turns a human-readable label into the ordered list of element-location
//! strategies the driver tries one after another.

use super::traits::{Locator, SelectorCandidates};

/// Tags tried after a matching `<label>` for form fields
const LABELLED_CONTROLS: [&str; 3] = ["input", "select", "textarea"];

/// Build the candidate list for `label`.
///
/// Order: exact text, placeholder, aria-label, name, slugified id. Never
/// empty: the id fallback is always present.
pub fn synthesize(label: &str) -> SelectorCandidates {
    let label = label.trim();
    SelectorCandidates {
        label: label.to_string(),
        candidates: vec![
            Locator::Text(label.to_string()),
            Locator::Placeholder(label.to_string()),
            Locator::AriaLabel(label.to_string()),
            Locator::Name(label.to_string()),
            Locator::Id(slugify(label)),
        ],
    }
}

/// Candidates for a form field: the generic list followed by controls
/// placed right after a `<label>` carrying the text.
pub fn synthesize_field(label: &str) -> SelectorCandidates {
    let mut selectors = synthesize(label);
    let text = selectors.label.clone();
    selectors
        .candidates
        .extend(LABELLED_CONTROLS.iter().map(|control| Locator::LabelledControl {
            label: text.clone(),
            control: control.to_string(),
        }));
    selectors
}

/// Lowercase, with each run of whitespace replaced by a single hyphen
pub fn slugify(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
