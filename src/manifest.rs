//! JSON manifest describing the scenario matrix.
//!
//! Scenario enumeration lives outside the reconciliation core: the manifest
//! is where test authors declare, per suite (domain + kind), either explicit
//! scenarios or a combinatorial matrix of axis variants, and optionally a
//! suite-level template override.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::identity::AxisChoice;

fn default_fixture_root() -> String {
    "test/fixtures".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Directory fixtures live under, relative to the project root.
    #[serde(default = "default_fixture_root")]
    pub fixture_root: String,
    pub suites: Vec<Suite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    pub domain: String,
    pub kind: String,
    /// Explicit scenarios: ordered axis-choice lists.
    #[serde(default)]
    pub scenarios: Vec<Vec<ChoiceSpec>>,
    /// Combinatorial form: one inner list per axis, `null` meaning the axis
    /// is skipped for that combination. Expanded left axis slowest, appended
    /// after the explicit scenarios.
    #[serde(default)]
    pub matrix: Vec<Vec<Option<ChoiceSpec>>>,
    /// Template override with `{{title}}`, `{{view}}`, `{{context}}`
    /// placeholders. Suites without one get the built-in stub.
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceSpec {
    pub label: String,
    #[serde(default)]
    pub segment: Option<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read manifest {:?}: {}", path, e))?;
        let manifest: Manifest = serde_json::from_str(&data)
            .map_err(|e| format!("Cannot parse manifest {:?}: {}", path, e))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Labels must never be empty — an empty label would leave a hole in the
    /// derived title.
    fn validate(&self) -> Result<(), String> {
        for suite in &self.suites {
            if suite.domain.is_empty() || suite.kind.is_empty() {
                return Err("Suite domain and kind must be non-empty".to_string());
            }
            let explicit = suite.scenarios.iter().flatten();
            let combinatorial = suite.matrix.iter().flatten().flatten();
            for choice in explicit.chain(combinatorial) {
                if choice.label.is_empty() {
                    return Err(format!(
                        "Empty axis label in suite {}/{}",
                        suite.domain, suite.kind
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Suite {
    /// Fixture directory for this suite, relative to the fixture root.
    pub fn directory(&self) -> PathBuf {
        PathBuf::from(&self.domain).join(&self.kind)
    }

    /// All scenarios this suite declares: the explicit ones first, then the
    /// expanded matrix.
    pub fn enumerate(&self) -> Vec<Vec<AxisChoice>> {
        let mut scenarios: Vec<Vec<AxisChoice>> = self
            .scenarios
            .iter()
            .map(|s| s.iter().map(ChoiceSpec::to_choice).collect())
            .collect();
        scenarios.extend(expand_matrix(&self.matrix));
        scenarios
    }
}

impl ChoiceSpec {
    fn to_choice(&self) -> AxisChoice {
        AxisChoice::new(self.label.clone(), self.segment.clone())
    }
}

/// Cartesian product over the axes, left axis varying slowest. A `None`
/// variant drops the axis from that combination entirely.
fn expand_matrix(matrix: &[Vec<Option<ChoiceSpec>>]) -> Vec<Vec<AxisChoice>> {
    if matrix.is_empty() {
        return Vec::new();
    }
    let mut combos: Vec<Vec<AxisChoice>> = vec![Vec::new()];
    for axis in matrix {
        let mut next = Vec::with_capacity(combos.len() * axis.len());
        for combo in &combos {
            for variant in axis {
                let mut extended = combo.clone();
                if let Some(choice) = variant {
                    extended.push(choice.to_choice());
                }
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}
