//! Derives the on-disk identity of a scenario: which file must exist and
//! which title that file must carry.

/// Suffix every generated fixture file ends with.
pub const FIXTURE_SUFFIX: &str = ".spec.js";

/// Separator between axis labels in a fixture title.
pub const TITLE_SEPARATOR: &str = " > ";

/// One dimension's contribution to a scenario: a human-readable label and,
/// optionally, a filename segment. Axes without a segment show up in the
/// title but not in the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisChoice {
    pub label: String,
    pub segment: Option<String>,
}

impl AxisChoice {
    pub fn new(label: impl Into<String>, segment: Option<String>) -> Self {
        AxisChoice {
            label: label.into(),
            segment,
        }
    }
}

/// The (relative path, title) pair a scenario must resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedIdentity {
    pub path: String,
    pub title: String,
}

/// Derive the expected identity from an ordered list of axis choices.
///
/// The path takes only the choices that carry a segment, in REVERSE order,
/// joined with `.` — so the most specific axis ends up leftmost in the
/// filename. The title takes every label, in declaration order, joined with
/// ` > `. Two scenarios with the same present-segment sequence collide on
/// path; the registry resolves that by letting the last registration win.
pub fn derive_identity(choices: &[AxisChoice]) -> ExpectedIdentity {
    let mut segments: Vec<&str> = choices
        .iter()
        .filter_map(|c| c.segment.as_deref())
        .collect();
    segments.reverse();

    let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();

    ExpectedIdentity {
        path: format!("{}{}", segments.join("."), FIXTURE_SUFFIX),
        title: labels.join(TITLE_SEPARATOR),
    }
}
