//! specsync keeps a directory of generated `.spec.js` test fixtures in sync
//! with a declared scenario matrix: it derives, for every scenario, the file
//! that must exist and the title it must carry, then converges the file
//! system — creating stubs from templates, relocating the closest stale file
//! onto each missing path, rewriting embedded titles in place, and pruning
//! fixtures nothing declares anymore. A read-only check mode reports the same
//! work without touching disk.

pub mod cli;
pub mod identity;
pub mod manifest;
pub mod reconcile;
pub mod registry;
pub mod rewrite;
pub mod scan;
pub mod stats;
