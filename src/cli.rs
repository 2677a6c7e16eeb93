use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::reconcile::Mode;

#[derive(Parser, Debug)]
#[command(
    name = "specsync",
    about = "Keep generated spec fixtures in sync with a declared scenario matrix",
    arg_required_else_help = true,
    after_help = "\
Output prefixes (grep-friendly):
  CREATE:          Fixture created from its template
  RELOCATE:        Stale fixture moved onto a missing expected path
  RETITLE:         Embedded title rewritten in place
  PRUNE:           Fixture not in the expected set deleted
  WOULD-CREATE:    (check) Expected fixture with no file and no title match
  SUGGEST-RENAME:  (check) Closest stale file for a missing fixture, with a
                   char-level diff on the following indented line
  STALE:           (check) Fixture whose title no expected entry wants
  NO-DECLARATION:  File without a recognizable describe(...) declaration
  ERROR:           I/O or permission error (pass continues)
  DEBUG:           Verbose logging (-v passes, -vv per-file scans)
  SUMMARY:         Final counts

Exit codes:
  check:  1 when any change would be required, 0 when converged
  create: 1 when individual file operations errored, 0 otherwise
  2 on usage or manifest errors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project root (defaults to the manifest's directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Verbose output (-v for per-directory passes, -vv for per-file scans)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report required changes without touching disk
    Check {
        /// Scenario manifest (JSON)
        manifest: PathBuf,
    },
    /// Create, relocate, retitle, and prune fixture files
    Create {
        /// Scenario manifest (JSON)
        manifest: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Passes,
    Files,
}

pub struct Config {
    pub mode: Mode,
    pub manifest: PathBuf,
    pub project_root: PathBuf,
    pub verbosity: Verbosity,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, String> {
        let (mode, manifest) = match cli.command {
            Command::Check { manifest } => (Mode::Check, manifest),
            Command::Create { manifest } => (Mode::Create, manifest),
        };

        let manifest = manifest
            .canonicalize()
            .map_err(|e| format!("Cannot resolve manifest {:?}: {}", manifest, e))?;

        // Default root: the directory the manifest sits in, so manifests can
        // be invoked from anywhere in the tree.
        let project_root = match cli.root {
            Some(root) => root
                .canonicalize()
                .map_err(|e| format!("Cannot resolve project root {:?}: {}", root, e))?,
            None => manifest
                .parent()
                .ok_or_else(|| format!("Manifest {:?} has no parent directory", manifest))?
                .to_path_buf(),
        };

        if !project_root.is_dir() {
            return Err(format!("{:?} is not a directory", project_root));
        }

        let verbosity = match cli.verbose {
            0 => Verbosity::Quiet,
            1 => Verbosity::Passes,
            2 => Verbosity::Files,
            n => {
                return Err(format!(
                    "-v can be specified at most twice, but was specified {} times",
                    n
                ))
            }
        };

        Ok(Config {
            mode,
            manifest,
            project_root,
            verbosity,
        })
    }
}
