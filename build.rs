use std::process::Command;

/// Short hash of the commit this binary was built from, if git is available
fn source_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let revision = source_revision().unwrap_or_else(|| "unknown".to_string());

    // Consumed by the CLI's long version string
    println!(
        "cargo:rustc-env=REPO_CLIENT_BUILD_INFO={} (built {})",
        revision, built_at
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
