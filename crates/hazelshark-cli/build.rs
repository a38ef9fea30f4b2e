use std::env;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let commit = env::var("GITHUB_SHA")
        .ok()
        .filter(|sha| !sha.is_empty())
        .or_else(|| git(&["rev-parse", "HEAD"]))
        .map(|sha| match git(&["status", "--porcelain"]) {
            Some(_) => format!("{sha}-dirty"),
            None => sha,
        })
        .unwrap_or_else(|| UNKNOWN.to_string());
    let date = git(&["log", "-1", "--format=%cI"]).unwrap_or_else(|| UNKNOWN.to_string());

    println!("cargo:rustc-env=HAZELSHARK_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=HAZELSHARK_BUILD_DATE={date}");
}

/// Trimmed stdout of a successful git command, `None` when empty or failing.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
