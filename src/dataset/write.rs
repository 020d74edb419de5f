//! Serialization of derived datasets and replace-on-success file writes

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::pipeline::PipelineOutput;
use crate::dataset::StoreError;

/// A file's complete new contents, ready to be swapped in
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Serialize records to CSV in memory
pub fn to_csv<T: Serialize>(name: &str, records: &[T]) -> Result<PendingFile, StoreError> {
    let serialize_err = |message: String| StoreError::Serialize {
        name: name.to_string(),
        message,
    };

    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)
            .map_err(|e| serialize_err(format!("CSV serialization error: {}", e)))?;
    }
    let contents = wtr
        .into_inner()
        .map_err(|e| serialize_err(format!("CSV writer error: {}", e)))?;

    Ok(PendingFile {
        name: name.to_string(),
        contents,
    })
}

/// Summary of one committed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub fingerprint: String,
    pub as_of: NaiveDate,
    pub consumption_records: usize,
    pub forecasts: usize,
    pub recommendations: usize,
    pub findings: usize,
}

impl Manifest {
    pub fn from_output(output: &PipelineOutput) -> Self {
        Self {
            fingerprint: output.fingerprint.clone(),
            as_of: output.as_of,
            consumption_records: output.consumption.len(),
            forecasts: output.forecasts.len(),
            recommendations: output.recommendations.len(),
            findings: output.findings.len(),
        }
    }
}

pub fn to_json<T: Serialize>(name: &str, value: &T) -> Result<PendingFile, StoreError> {
    let mut contents = serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialize {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    contents.push(b'\n');
    Ok(PendingFile {
        name: name.to_string(),
        contents,
    })
}

/// Write every file to a temporary sibling, then rename them all into place
///
/// Nothing in `dir` changes unless every temporary file was written.
pub fn replace_files(dir: &Path, files: Vec<PendingFile>) -> Result<Vec<PathBuf>, StoreError> {
    std::fs::create_dir_all(dir)?;

    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let target = dir.join(&file.name);
        let write_err = |source: std::io::Error| StoreError::Write {
            path: target.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&file.contents).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        staged.push((tmp, target));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, target) in staged {
        tmp.persist(&target).map_err(|e| StoreError::Write {
            path: target.clone(),
            source: e.error,
        })?;
        tracing::debug!(path = %target.display(), "replaced");
        written.push(target);
    }
    Ok(written)
}
