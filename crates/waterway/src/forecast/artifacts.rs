use super::domain::ScenarioProjection;
use super::model::ModelBundle;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV artifact: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported projection file format: {0} (expected .json or .csv)")]
    UnsupportedFormat(PathBuf),
}

pub fn load_model_bundle<P: AsRef<Path>>(path: P) -> Result<ModelBundle, ArtifactError> {
    let file = open(path.as_ref())?;
    read_model_bundle(BufReader::new(file))
}

pub fn read_model_bundle<R: Read>(reader: R) -> Result<ModelBundle, ArtifactError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Loads a precomputed projection set, picking the reader from the file extension.
pub fn load_projections<P: AsRef<Path>>(path: P) -> Result<Vec<ScenarioProjection>, ArtifactError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => read_projections_json(BufReader::new(open(path)?)),
        Some("csv") => read_projections_csv(open(path)?),
        _ => Err(ArtifactError::UnsupportedFormat(path.to_path_buf())),
    }
}

pub fn read_projections_json<R: Read>(reader: R) -> Result<Vec<ScenarioProjection>, ArtifactError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_projections_csv<R: Read>(reader: R) -> Result<Vec<ScenarioProjection>, ArtifactError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut projections = Vec::new();

    for record in csv_reader.deserialize::<ScenarioProjection>() {
        projections.push(record?);
    }

    Ok(projections)
}

fn open(path: &Path) -> Result<File, ArtifactError> {
    File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
