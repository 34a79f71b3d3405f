//! Build script for gaussparse - embeds git commit hash and build date
//!
//! When the `release` feature is NOT set (default dev builds):
//! - Emits `VERGEN_GIT_SHA` with the commit hash (or `unknown`)
//! - Emits `GAUSSPARSE_BUILD_DATE` with the build date
//!
//! When the `release` feature IS set (CI/official builds):
//! - Emits build date only (clean version string without git hash)

use std::process::Command;

/// Get the current date in YYYY-MM-DD format
fn get_build_date() -> String {
    if let Ok(output) = Command::new("date").args(["+%Y-%m-%d"]).output() {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
    }
    "unknown".to_string()
}

fn main() {
    println!("cargo:rustc-env=GAUSSPARSE_BUILD_DATE={}", get_build_date());

    #[cfg(not(feature = "release"))]
    {
        use vergen_gitcl::{Emitter, GitclBuilder};

        let emit_result = match GitclBuilder::default().sha(true).build() {
            Ok(git) => Emitter::default()
                .add_instructions(&git)
                .and_then(|emitter| emitter.emit()),
            Err(e) => {
                println!("cargo:warning=Failed to configure git info: {}", e);
                println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
                return;
            }
        };

        if let Err(e) = emit_result {
            // Not a git checkout (e.g. a source tarball)
            println!("cargo:warning=Failed to get git info: {}", e);
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        }
    }
}
