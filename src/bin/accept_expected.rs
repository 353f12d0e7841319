//! Binary to generate/update .expected.html files for tests/cases
//!
//! Usage:
//!   cargo run --bin accept_expected            # Update all
//!   cargo run --bin accept_expected -- nav     # Update only cases matching "nav"

use imitation_scss::compile;
use std::fs;
use std::path::Path;

fn main() {
    let filter: Option<String> = std::env::args().nth(1);
    let cases_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases");

    let entries = match fs::read_dir(&cases_dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Failed to read {}: {}", cases_dir.display(), e);
            std::process::exit(1);
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|s| s == "iscss").unwrap_or(false))
        .collect();
    paths.sort();

    let mut updated = 0;
    let mut skipped = 0;

    for path in paths {
        if let Some(ref f) = filter {
            if !path.to_string_lossy().contains(f) {
                skipped += 1;
                continue;
            }
        }

        if process_file(&path) {
            updated += 1;
        }
    }

    println!("Updated {} files, skipped {}", updated, skipped);
}

fn process_file(path: &Path) -> bool {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            return false;
        }
    };

    match compile(&source) {
        Ok(html) => {
            let expected = path.with_extension("expected.html");
            match fs::write(&expected, html) {
                Ok(()) => {
                    println!("  wrote {}", expected.display());
                    true
                }
                Err(e) => {
                    eprintln!("Failed to write {:?}: {}", expected, e);
                    false
                }
            }
        }
        Err(e) => {
            let filename = path.file_name().and_then(|s| s.to_str()).unwrap_or("unknown");
            eprintln!(
                "ERROR: {:?} failed to compile; error cases belong in tests/errors/\n{}",
                path,
                e.render(&source, filename)
            );
            false
        }
    }
}
