use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where an artifact came from: code revision, call site, parameters, inputs.
#[derive(Debug, Serialize)]
pub struct Sidecar {
    pub code_rev: String,
    pub version: &'static str,
    pub callsite: Callsite,
    pub params: Value,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Callsite {
    pub file: &'static str,
    pub line: u32,
}

impl Sidecar {
    /// Sidecar for the current build, recorded at the caller's location.
    #[track_caller]
    pub fn new(params: Value) -> Self {
        let here = Location::caller();
        Self {
            code_rev: current_git_rev(),
            version: plangeom::VERSION,
            callsite: Callsite {
                file: here.file(),
                line: here.line(),
            },
            params,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input<P: AsRef<Path>>(mut self, input: P) -> Self {
        self.inputs.push(input.as_ref().to_string_lossy().into_owned());
        self
    }
}

/// Write `<stem>.provenance.json` next to `artifact` and return its path.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, mut sidecar: Sidecar) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }
    sidecar.outputs.push(artifact.to_string_lossy().into_owned());
    fs::write(&path, serde_json::to_vec_pretty(&sidecar)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("outline"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit hash from `GIT_COMMIT` (build time, then run time) or `git`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn sidecar_path_replaces_extension() {
        let derived = sidecar_path(Path::new("/tmp/plans/room.json"));
        assert_eq!(derived, Path::new("/tmp/plans/room.provenance.json"));
    }

    #[test]
    fn write_sidecar_records_inputs_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested").join("room.json");
        let sidecar = Sidecar::new(json!({"raster": 400})).with_input("in.json");
        let path = write_sidecar(&artifact, sidecar).unwrap();
        assert!(path.exists());

        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["params"]["raster"], 400);
        assert_eq!(parsed["inputs"][0], "in.json");
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["version"], plangeom::VERSION);
        assert!(parsed["callsite"]["line"].as_u64().unwrap() > 0);
    }
}
