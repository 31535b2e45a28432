use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());
    let is_release = profile == "release";

    // VERSION file wins over the manifest version
    let version = fs::read_to_string(Path::new("VERSION"))
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let build = std::env::var("KEYHOP_BUILD_NUMBER").unwrap_or_else(|_| "0".to_string());

    println!("cargo:rustc-env=KEYHOP_VERSION={}", version);
    println!("cargo:rustc-env=KEYHOP_BUILD={}", build);
    println!(
        "cargo:rustc-env=KEYHOP_PROFILE={}",
        if is_release { "release" } else { "development" }
    );
    println!("cargo:rustc-env=KEYHOP_GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-env-changed=PROFILE");
    println!("cargo:rerun-if-env-changed=KEYHOP_BUILD_NUMBER");
}
