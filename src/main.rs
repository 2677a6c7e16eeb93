use std::process;
use std::sync::Arc;

use clap::Parser;

use specsync::cli::{Cli, Config};
use specsync::identity::derive_identity;
use specsync::manifest::Manifest;
use specsync::reconcile::Mode;
use specsync::registry::{self, Registry, Template};
use specsync::stats::Stats;

fn main() {
    // Replace the default panic hook to handle broken pipes cleanly.
    // Rust ignores SIGPIPE, so writing to a broken pipe (e.g. piping to
    // `head` or `grep`) causes println! to panic. Catch that and exit
    // with a visible message instead of a traceback.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe") {
            eprintln!("Broken pipe: output was truncated");
            process::exit(141); // 128 + SIGPIPE(13)
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let config = match Config::from_cli(cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let manifest = match Manifest::load(&config.manifest) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    // Accumulate the COMPLETE expected set before any pass runs; relocation
    // decisions need both sides of the matching problem in full.
    let mut registry = Registry::new(&config.project_root);
    for suite in &manifest.suites {
        let dir = std::path::Path::new(&manifest.fixture_root).join(suite.directory());
        let aggregator = registry.aggregator(&dir);
        for scenario in suite.enumerate() {
            let identity = derive_identity(&scenario);
            let template: Template = match &suite.template {
                Some(source) => registry::template_from_source(source.clone()),
                None => Box::new(registry::default_template),
            };
            aggregator.add(identity.title, identity.path, template);
        }
    }

    let stats = Arc::new(Stats::new());
    let stats_ctrlc = Arc::clone(&stats);

    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted!");
        stats_ctrlc.eprint_summary();
        eprintln!("WARNING: EXITING BEFORE THE PASS WAS COMPLETE! Re-run to converge.");
        process::exit(130);
    })
    .expect("Error setting Ctrl-C handler");

    registry.finalize(config.mode, config.verbosity, &stats);

    stats.print_summary();

    let failed = match config.mode {
        Mode::Check => stats.has_pending_changes(),
        Mode::Create => stats.has_errors(),
    };
    if failed {
        process::exit(1);
    }
}
