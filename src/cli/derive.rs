use crate::digest::digest;
use crate::error::Result;
use crate::keys::DerivedParams;
use crate::scheme::{HashAlgorithm, StepFold};
use serde::Serialize;

/// Options for the derive command
#[derive(Debug, Clone, Default)]
pub struct DeriveOptions {
    pub password: String,
    pub hash: HashAlgorithm,
    pub fold: StepFold,
}

#[derive(Debug, Serialize)]
struct DeriveReport {
    hash: HashAlgorithm,
    fold: StepFold,
    digest: String,
    #[serde(flatten)]
    params: DerivedParams,
}

/// Show the digest and traversal parameters a password derives
pub fn show_derived(options: &DeriveOptions, json: bool) -> Result<String> {
    let d = digest(options.password.as_bytes(), options.hash);
    let params = DerivedParams::derive(&d, options.fold)?;

    if json {
        let report = DeriveReport {
            hash: options.hash,
            fold: options.fold,
            digest: d.to_string(),
            params,
        };
        return Ok(serde_json::to_string_pretty(&report)? + "\n");
    }

    let mut output = String::new();
    output.push_str(&format!("Hash: {:?}\n", options.hash));
    output.push_str(&format!("Digest: {}\n", d));
    output.push_str(&format!("Offset (X): {}\n", params.offset));
    output.push_str(&format!("Hop (Y): {}\n", params.hop));
    output.push_str(&format!("Step ({:?}): {}\n", options.fold, params.step));
    output.push_str(&format!("Seed: {:#018x}\n", params.seed));
    Ok(output)
}
