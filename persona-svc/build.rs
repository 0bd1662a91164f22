//! Stamps persona-svc with its source revision and build time
//!
//! Read back through `env!` by the startup banner and `GET /health`.

use std::process::Command;

fn main() {
    let revision = git(&["describe", "--always", "--dirty=-modified"])
        .unwrap_or_else(|| "unknown".to_string());
    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=PERSONA_GIT_REV={}", revision);
    println!("cargo:rustc-env=PERSONA_BUILD_TIME={}", built_at);
    println!("cargo:rustc-env=PERSONA_BUILD_PROFILE={}", profile);
}

/// Trimmed stdout of a git command; `None` outside a checkout or without git
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
