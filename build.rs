use std::env;
use std::process::Command;

/// `SDAC_NIGHTLY=1|true` marks a nightly build
fn nightly() -> bool {
    env::var("SDAC_NIGHTLY")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Short commit id, from `GIT_SHA` in CI or from the checkout
fn commit() -> Option<String> {
    if let Ok(sha) = env::var("GIT_SHA") {
        let sha = sha.trim();
        if !sha.is_empty() {
            return Some(sha.chars().take(7).collect());
        }
    }
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let base = env!("CARGO_PKG_VERSION");
    let version = match (nightly(), commit()) {
        (true, Some(sha)) => format!("{base}-nightly+{sha}"),
        (true, None) => format!("{base}-nightly"),
        (false, _) => base.to_string(),
    };

    println!("cargo:rustc-env=APP_VERSION={version}");
    for var in ["SDAC_NIGHTLY", "GIT_SHA"] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
}
