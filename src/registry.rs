//! Accumulates expected identities per target directory and hands complete
//! sets to the reconciler.
//!
//! A scenario matrix may be enumerated across many registration calls, and
//! across several output directories. Relocation decisions need the COMPLETE
//! expected set for a directory, so nothing touches disk during registration:
//! the registry only accumulates, and [`Registry::finalize`] runs one
//! reconciliation pass per directory once every caller is done.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};

use crate::cli::Verbosity;
use crate::reconcile::{self, Mode};
use crate::stats::Stats;

/// Logical target of the view-module require in generated stubs,
/// relative to the project root.
pub const VIEW_MODULE: &str = "src/view.js";

/// Logical target of the context-module require in generated stubs,
/// relative to the project root.
pub const CONTEXT_MODULE: &str = "src/context.js";

/// What a template closure gets to work with: the resolved title and a way
/// to turn a root-relative logical target into a require path relative to
/// the fixture's own directory.
pub struct TemplateContext<'a> {
    pub title: &'a str,
    fixture_dir: &'a Path,
    project_root: &'a Path,
}

impl<'a> TemplateContext<'a> {
    pub(crate) fn new(title: &'a str, fixture_dir: &'a Path, project_root: &'a Path) -> Self {
        TemplateContext {
            title,
            fixture_dir,
            project_root,
        }
    }

    /// Relative require path from the fixture's directory to a root-relative
    /// logical target, e.g. `src/view.js` -> `../../../src/view.js`.
    pub fn require_path(&self, logical: &str) -> String {
        relative_path(self.fixture_dir, &self.project_root.join(logical))
    }
}

/// Produces the content of a freshly created fixture file.
pub type Template = Box<dyn Fn(&TemplateContext) -> String>;

/// Stub used when a suite declares no template of its own.
pub fn default_template(ctx: &TemplateContext) -> String {
    format!(
        "const {{ render }} = require(\"{}\");\n\
         const {{ describe }} = require(\"{}\");\n\
         \n\
         describe(\"{}\", () => {{\n\
         \x20   render(__dirname);\n\
         }});\n",
        ctx.require_path(VIEW_MODULE),
        ctx.require_path(CONTEXT_MODULE),
        ctx.title,
    )
}

/// Wrap a template source string into a closure, substituting `{{title}}`,
/// `{{view}}`, and `{{context}}` placeholders.
pub fn template_from_source(source: String) -> Template {
    Box::new(move |ctx| {
        source
            .replace("{{title}}", ctx.title)
            .replace("{{view}}", &ctx.require_path(VIEW_MODULE))
            .replace("{{context}}", &ctx.require_path(CONTEXT_MODULE))
    })
}

/// One registered expected identity plus the template that can create it.
pub(crate) struct Entry {
    pub path: String,
    pub title: String,
    pub template: Template,
}

/// Expected-identity accumulator for a single target directory.
pub struct Aggregator {
    dir: PathBuf,
    project_root: PathBuf,
    entries: Vec<Entry>,
    by_path: HashMap<String, usize>,
}

impl Aggregator {
    fn new(dir: PathBuf, project_root: PathBuf) -> Self {
        Aggregator {
            dir,
            project_root,
            entries: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Record an expected identity. A repeated path keeps its original
    /// position but takes the newest title and template: the last
    /// registration for a path wins.
    pub fn add(&mut self, title: impl Into<String>, path: impl Into<String>, template: Template) {
        let path = path.into();
        let entry = Entry {
            path: path.clone(),
            title: title.into(),
            template,
        };
        match self.by_path.get(&path) {
            Some(&idx) => self.entries[idx] = entry,
            None => {
                self.by_path.insert(path, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// All aggregators for a run, keyed by target directory.
pub struct Registry {
    project_root: PathBuf,
    aggregators: BTreeMap<PathBuf, Aggregator>,
}

impl Registry {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Registry {
            project_root: project_root.into(),
            aggregators: BTreeMap::new(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// The aggregator for a directory (relative to the project root),
    /// created on first use.
    pub fn aggregator(&mut self, dir: impl AsRef<Path>) -> &mut Aggregator {
        let key = self.project_root.join(dir.as_ref());
        let root = self.project_root.clone();
        self.aggregators
            .entry(key.clone())
            .or_insert_with(|| Aggregator::new(key, root))
    }

    /// Run one reconciliation pass per directory, in path order. Directories
    /// touch disjoint subtrees, so pass order only affects output ordering.
    pub fn finalize(&self, mode: Mode, verbosity: Verbosity, stats: &Stats) {
        for aggregator in self.aggregators.values() {
            reconcile::run_pass(aggregator, mode, verbosity, stats);
        }
    }
}

/// Relative path from `from_dir` to `to`, with a leading `./` when the target
/// does not go through a parent directory (CommonJS requires demand one).
fn relative_path(from_dir: &Path, to: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        return ".".to_string();
    }
    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}
