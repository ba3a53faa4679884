//! Input fingerprinting for incremental build skips.
//!
//! The fingerprint is a SHA-256 over every declared input file (lockfile,
//! generator config, each file under the source tree), each contributing its
//! project-relative path and content hash, in sorted path order.
//!
//! Signal precedence:
//! 1. `NeverBuilt` (no stored fingerprint)
//! 2. `MissingOutputs` (a declared output directory is gone)
//! 3. `Stale` (inputs hash differently from the stored fingerprint)
//! 4. `UpToDate`

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use sitepub_core::state;

use crate::error::{io_err, BuildError};
use crate::plan::SitePlan;

/// Marker hashed in place of content for a declared input that does not exist.
const MISSING: &str = "<missing>";

/// Stored fingerprint of the inputs of the last successful build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fingerprint {
    pub digest: String,
    pub files: usize,
    pub built_at: DateTime<Utc>,
}

/// Whether the build has to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staleness {
    NeverBuilt,
    MissingOutputs { paths: Vec<PathBuf> },
    Stale { reason: String },
    UpToDate,
}

impl Staleness {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Staleness::UpToDate)
    }
}

/// Hash the declared inputs of `plan`, relative to `project_root`.
pub fn compute(plan: &SitePlan, project_root: &Path) -> Result<Fingerprint, BuildError> {
    let mut entries = BTreeMap::new();

    for file in [&plan.lockfile, &plan.config_file] {
        let key = relative_key(file, project_root);
        entries.insert(key, hash_optional_file(file)?);
    }

    if plan.source_dir.is_dir() {
        for entry in WalkDir::new(&plan.source_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| BuildError::Walk {
                path: plan.source_dir.clone(),
                source: e,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let key = relative_key(entry.path(), project_root);
            entries.insert(key, hash_file(entry.path())?);
        }
    } else {
        entries.insert(relative_key(&plan.source_dir, project_root), MISSING.to_string());
    }

    let mut hasher = Sha256::new();
    for (path, digest) in &entries {
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update(digest.as_bytes());
        hasher.update(b"\n");
    }

    Ok(Fingerprint {
        digest: hex::encode(hasher.finalize()),
        files: entries.len(),
        built_at: Utc::now(),
    })
}

/// Compare the current inputs and outputs against the stored fingerprint.
pub fn check(plan: &SitePlan, current: &Fingerprint) -> Result<Staleness, BuildError> {
    let Some(stored) = load(plan)? else {
        return Ok(Staleness::NeverBuilt);
    };

    let missing: Vec<PathBuf> = plan
        .outputs()
        .into_iter()
        .filter(|p| !p.is_dir())
        .map(Path::to_path_buf)
        .collect();
    if !missing.is_empty() {
        return Ok(Staleness::MissingOutputs { paths: missing });
    }

    if stored.digest != current.digest {
        return Ok(Staleness::Stale {
            reason: format!(
                "inputs changed since build at {} ({} -> {} files)",
                stored.built_at.to_rfc3339(),
                stored.files,
                current.files
            ),
        });
    }

    Ok(Staleness::UpToDate)
}

pub fn load(plan: &SitePlan) -> Result<Option<Fingerprint>, BuildError> {
    Ok(state::load_at(&plan.fingerprint_path)?)
}

pub fn save(plan: &SitePlan, fingerprint: &Fingerprint) -> Result<(), BuildError> {
    state::save_at(&plan.fingerprint_path, fingerprint)?;
    Ok(())
}

/// Forget the stored fingerprint so the next build runs unconditionally.
pub fn invalidate(plan: &SitePlan) -> Result<(), BuildError> {
    state::remove_at(&plan.fingerprint_path)?;
    Ok(())
}

fn hash_file(path: &Path) -> Result<String, BuildError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn hash_optional_file(path: &Path) -> Result<String, BuildError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(hex::encode(Sha256::digest(&bytes))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(MISSING.to_string()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn relative_key(path: &Path, project_root: &Path) -> String {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
