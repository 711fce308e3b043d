use std::process::Command;

/// Stamps the binary with the short commit it was built from, so every JSON
/// response can report its build. `VLIST_BUILD` overrides the lookup for
/// packaged builds that have no git checkout.
fn main() {
    println!("cargo::rerun-if-changed=../../.git/HEAD");
    println!("cargo::rerun-if-env-changed=VLIST_BUILD");

    let build = std::env::var("VLIST_BUILD")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(short_commit)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo::rustc-env=GIT_COMMIT_HASH={}", build.trim());
}

fn short_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|hash| hash.trim().to_string())
}
