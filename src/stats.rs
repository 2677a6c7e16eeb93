use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters accumulated across every reconciliation pass in a run.
///
/// Shared with the ctrl-c handler through an `Arc`, hence the relaxed
/// atomics; the passes themselves run sequentially.
pub struct Stats {
    expected: AtomicU64,
    created: AtomicU64,
    relocated: AtomicU64,
    retitled: AtomicU64,
    pruned: AtomicU64,
    up_to_date: AtomicU64,
    would_create: AtomicU64,
    stale: AtomicU64,
    undeclared: AtomicU64,
    errors: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Stats {
            expected: AtomicU64::new(0),
            created: AtomicU64::new(0),
            relocated: AtomicU64::new(0),
            retitled: AtomicU64::new(0),
            pruned: AtomicU64::new(0),
            up_to_date: AtomicU64::new(0),
            would_create: AtomicU64::new(0),
            stale: AtomicU64::new(0),
            undeclared: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn inc_expected(&self) {
        self.expected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_created(&self) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_relocated(&self) {
        self.relocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_retitled(&self) {
        self.retitled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_pruned(&self) {
        self.pruned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_up_to_date(&self) {
        self.up_to_date.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_would_create(&self) {
        self.would_create.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_undeclared(&self) {
        self.undeclared.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn format_summary(&self) -> String {
        format!(
            "SUMMARY:\n\
             \x20   Expected fixtures: {}\n\
             \x20   Created: {}\n\
             \x20   Relocated: {}\n\
             \x20   Retitled: {}\n\
             \x20   Pruned: {}\n\
             \x20   Up-to-date: {}\n\
             \x20   Would create: {}\n\
             \x20   Stale: {}\n\
             \x20   Missing declaration: {}\n\
             \x20   Errors: {}",
            self.expected.load(Ordering::Relaxed),
            self.created.load(Ordering::Relaxed),
            self.relocated.load(Ordering::Relaxed),
            self.retitled.load(Ordering::Relaxed),
            self.pruned.load(Ordering::Relaxed),
            self.up_to_date.load(Ordering::Relaxed),
            self.would_create.load(Ordering::Relaxed),
            self.stale.load(Ordering::Relaxed),
            self.undeclared.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
        )
    }

    pub fn print_summary(&self) {
        println!("{}", self.format_summary());
    }

    /// Print summary to stderr (for the ctrl-c handler when stdout may be broken).
    pub fn eprint_summary(&self) {
        eprintln!("{}", self.format_summary());
    }

    /// A check pass found work that a create pass would perform.
    pub fn has_pending_changes(&self) -> bool {
        self.would_create.load(Ordering::Relaxed) > 0 || self.stale.load(Ordering::Relaxed) > 0
    }

    pub fn has_errors(&self) -> bool {
        self.errors.load(Ordering::Relaxed) > 0
    }
}

impl Default for Stats {
    fn default() -> Self {
        Stats::new()
    }
}

impl fmt::Debug for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_summary())
    }
}
