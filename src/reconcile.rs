//! Converges a fixture directory onto its expected identity set.
//!
//! Two passes share the same inputs. The check pass is read-only and prints
//! what a create pass would do, including best-effort rename suggestions with
//! a character-level diff. The create pass relocates the closest stale file
//! onto each missing expected path (greedy, highest similarity first — a
//! heuristic, not a minimum-cost assignment), creates what is still missing
//! from templates, rewrites drifted titles in place, and finally prunes every
//! fixture-suffixed file the expected set does not name.
//!
//! Individual file operations that fail are reported on an `ERROR:` line and
//! counted; nothing in here aborts a pass.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use crate::cli::Verbosity;
use crate::identity::FIXTURE_SUFFIX;
use crate::registry::{Aggregator, TemplateContext};
use crate::rewrite::rewrite_title;
use crate::scan::scan_title;
use crate::stats::Stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report required changes without touching disk.
    Check,
    /// Create, relocate, retitle, and prune fixture files.
    Create,
}

/// Run one reconciliation pass over a single directory's aggregator.
pub fn run_pass(aggregator: &Aggregator, mode: Mode, verbosity: Verbosity, stats: &Stats) {
    for _ in aggregator.entries() {
        stats.inc_expected();
    }
    match mode {
        Mode::Check => check_pass(aggregator, verbosity, stats),
        Mode::Create => create_pass(aggregator, verbosity, stats),
    }
}

// ── Diagnostic (check) pass ─────────────────────────────────────────────────

fn check_pass(aggregator: &Aggregator, verbosity: Verbosity, stats: &Stats) {
    let dir = aggregator.dir();
    if verbosity >= Verbosity::Passes {
        println!(
            "DEBUG: Checking {} ({} expected)",
            dir.display(),
            aggregator.len()
        );
    }

    let files = list_fixture_files(dir);

    // Candidate index: reverse map from embedded title to current filename.
    // Files are scanned in sorted order, so a duplicated title deterministically
    // maps to the last filename carrying it.
    let mut index: HashMap<String, String> = HashMap::new();
    for file in &files {
        let path = dir.join(file);
        if verbosity >= Verbosity::Files {
            println!("DEBUG: Scanning {}", path.display());
        }
        match scan_title(&path) {
            Some(title) => {
                index.insert(title, file.clone());
            }
            None => {
                println!("NO-DECLARATION: {}", path.display());
                stats.inc_undeclared();
            }
        }
    }

    let expected_titles: HashSet<&str> = aggregator
        .entries()
        .iter()
        .map(|e| e.title.as_str())
        .collect();

    // Stale: titled files whose title no expected entry wants.
    let mut stale: Vec<(&String, &String)> = index
        .iter()
        .filter(|(title, _)| !expected_titles.contains(title.as_str()))
        .map(|(title, file)| (file, title))
        .collect();
    stale.sort();
    for (file, title) in &stale {
        println!("STALE: {} (\"{}\")", dir.join(file).display(), title);
        stats.inc_stale();
    }

    // To create: expected entries with neither a file at their path nor a
    // title match anywhere in the index. Each gets the closest not-yet-used
    // stale file suggested as a rename source.
    let mut suggested: HashSet<&str> = HashSet::new();
    for entry in aggregator.entries() {
        if dir.join(&entry.path).exists() || index.contains_key(&entry.title) {
            stats.inc_up_to_date();
            continue;
        }
        println!("WOULD-CREATE: {}", dir.join(&entry.path).display());
        stats.inc_would_create();

        let mut best: Option<(&str, f64)> = None;
        for (file, _) in &stale {
            if suggested.contains(file.as_str()) {
                continue;
            }
            let score = similarity(file.as_str(), &entry.path);
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((file.as_str(), score)),
            }
        }
        if let Some((file, score)) = best {
            suggested.insert(file);
            println!(
                "SUGGEST-RENAME: {} -> {} ({:.0}% similar)",
                file,
                entry.path,
                score * 100.0
            );
            println!("    {}", render_char_diff(file, &entry.path));
        }
    }
}

// ── Mutating (create) pass ──────────────────────────────────────────────────

fn create_pass(aggregator: &Aggregator, verbosity: Verbosity, stats: &Stats) {
    let dir = aggregator.dir();
    if verbosity >= Verbosity::Passes {
        println!(
            "DEBUG: Reconciling {} ({} expected)",
            dir.display(),
            aggregator.len()
        );
    }

    let expected_paths: HashSet<&str> = aggregator
        .entries()
        .iter()
        .map(|e| e.path.as_str())
        .collect();

    // Candidate pool: on-disk fixture files not already at an expected path.
    // Consumed greedily during relocation, discarded afterwards.
    let mut pool: Vec<Candidate> = list_fixture_files(dir)
        .into_iter()
        .filter(|f| !expected_paths.contains(f.as_str()))
        .map(|file| Candidate { file, used: false })
        .collect();

    // Entries whose file was created or relocated this pass; they are
    // converged by construction and not counted as previously up-to-date.
    let mut touched: HashSet<usize> = HashSet::new();

    // Step 1: relocation. For each missing expected path, move the most
    // similar unused candidate into place and stamp the registered title.
    for (idx, entry) in aggregator.entries().iter().enumerate() {
        let target = dir.join(&entry.path);
        if target.exists() {
            continue;
        }
        let Some(candidate_idx) = best_candidate(&pool, &entry.path) else {
            continue; // no candidate: falls through to creation
        };
        let source = dir.join(&pool[candidate_idx].file);

        if let Some(parent) = target.parent() {
            // Best-effort: a failed mkdir surfaces through the rename below.
            let _ = fs::create_dir_all(parent);
        }
        match fs::rename(&source, &target) {
            Ok(()) => {
                // Consumed only on success; a candidate that failed to move
                // stays available for the next missing path.
                pool[candidate_idx].used = true;
                println!(
                    "RELOCATE: {} -> {}",
                    source.display(),
                    target.display()
                );
                stats.inc_relocated();
                touched.insert(idx);
                stamp_title(&target, &entry.title, stats);
            }
            Err(e) => {
                println!(
                    "ERROR: Cannot move {} to {}: {}",
                    source.display(),
                    target.display(),
                    e
                );
                stats.inc_errors();
            }
        }
    }

    // Step 2: creation from templates.
    for (idx, entry) in aggregator.entries().iter().enumerate() {
        let target = dir.join(&entry.path);
        if target.exists() {
            continue;
        }
        if let Some(parent) = target.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let fixture_dir = target.parent().unwrap_or(dir);
        let ctx = TemplateContext::new(&entry.title, fixture_dir, aggregator.project_root());
        let content = (entry.template)(&ctx);
        match fs::write(&target, content) {
            Ok(()) => {
                println!("CREATE: {}", target.display());
                stats.inc_created();
                touched.insert(idx);
                // Defensive double-write: template output and recorded title
                // must never diverge.
                stamp_title(&target, &entry.title, stats);
            }
            Err(e) => {
                println!("ERROR: Cannot write {}: {}", target.display(), e);
                stats.inc_errors();
            }
        }
    }

    // Step 3: title sync for files steps 1/2 never touched.
    for (idx, entry) in aggregator.entries().iter().enumerate() {
        let target = dir.join(&entry.path);
        if !target.exists() {
            continue; // creation failed; already reported
        }
        if touched.contains(&idx) {
            continue;
        }
        if verbosity >= Verbosity::Files {
            println!("DEBUG: Scanning {}", target.display());
        }
        match scan_title(&target) {
            Some(ref title) if *title == entry.title => stats.inc_up_to_date(),
            Some(_) => match rewrite_title(&target, &entry.title) {
                Ok(true) => {
                    println!("RETITLE: {}", target.display());
                    stats.inc_retitled();
                }
                Ok(false) => {
                    println!("NO-DECLARATION: {}", target.display());
                    stats.inc_undeclared();
                }
                Err(e) => {
                    println!("ERROR: Cannot rewrite {}: {}", target.display(), e);
                    stats.inc_errors();
                }
            },
            None => {
                println!("NO-DECLARATION: {}", target.display());
                stats.inc_undeclared();
            }
        }
    }

    // Step 4: prune every fixture-suffixed file the expected set does not
    // name, however it got there.
    for file in list_fixture_files(dir) {
        if expected_paths.contains(file.as_str()) {
            continue;
        }
        let path = dir.join(&file);
        match fs::remove_file(&path) {
            Ok(()) => {
                println!("PRUNE: {}", path.display());
                stats.inc_pruned();
            }
            Err(e) => {
                println!("ERROR: Cannot delete {}: {}", path.display(), e);
                stats.inc_errors();
            }
        }
    }
}

struct Candidate {
    file: String,
    used: bool,
}

/// Index of the unused pool entry most similar to `target`. Ties keep the
/// first-seen candidate.
fn best_candidate(pool: &[Candidate], target: &str) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in pool.iter().enumerate() {
        if candidate.used {
            continue;
        }
        let score = similarity(&candidate.file, target);
        match best {
            Some((_, s)) if s >= score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Write `title` into the file's declaration, reporting rather than failing
/// when the file has none or cannot be rewritten.
fn stamp_title(path: &Path, title: &str, stats: &Stats) {
    match rewrite_title(path, title) {
        Ok(true) => {}
        Ok(false) => {
            println!("NO-DECLARATION: {}", path.display());
            stats.inc_undeclared();
        }
        Err(e) => {
            println!("ERROR: Cannot rewrite {}: {}", path.display(), e);
            stats.inc_errors();
        }
    }
}

// ── Similarity ──────────────────────────────────────────────────────────────

/// Normalized, case-folded edit-distance similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Character-level diff between a stale filename and an expected path:
/// removed spans red, added spans green. `colored` disables itself when
/// stdout is not a terminal, so piped output stays plain.
fn render_char_diff(old: &str, new: &str) -> String {
    let diff = TextDiff::from_chars(old, new);
    let mut out = String::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => out.push_str(&change.value().red().to_string()),
            ChangeTag::Insert => out.push_str(&change.value().green().to_string()),
            ChangeTag::Equal => out.push_str(change.value()),
        }
    }
    out
}

// ── Directory listing ───────────────────────────────────────────────────────

/// Fixture-suffixed files under `dir`, as sorted relative paths. A missing
/// or unreadable directory lists as empty: the pass then sees nothing to
/// relocate or prune and creation proceeds.
fn list_fixture_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    collect_fixture_files(dir, "", &mut files);
    files.sort();
    files
}

fn collect_fixture_files(dir: &Path, prefix: &str, out: &mut Vec<String>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        let path = entry.path();
        if path.is_dir() {
            collect_fixture_files(&path, &rel, out);
        } else if name.ends_with(FIXTURE_SUFFIX) {
            out.push(rel);
        }
    }
}
