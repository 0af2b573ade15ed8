//! Output table layout & manifest sidecar.
//!
//! The hosting runner expects the merged table as a directory of CSV slices
//! under `out/tables/<name>/` with a `<name>.manifest` JSON sidecar next to
//! it describing columns, primary key and the incremental-load flag.
//!

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::PipelineError;

/// The sidecar consumed by the runner
///
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub columns: Vec<String>,
    pub primary_key: Vec<String>,
    pub incremental: bool,
}

/// Where raw report payloads are staged
///
pub fn staging_dir(datadir: &Path) -> PathBuf {
    datadir.join("out").join("files")
}

/// Where the merged table slices go
///
pub fn table_dir(datadir: &Path, table_name: &str) -> PathBuf {
    datadir.join("out").join("tables").join(table_name)
}

/// Write the manifest sidecar next to the table directory.
///
#[tracing::instrument(skip(manifest))]
pub fn write_manifest(
    datadir: &Path,
    table_name: &str,
    manifest: &Manifest,
) -> Result<(), PipelineError> {
    let path = datadir
        .join("out")
        .join("tables")
        .join(format!("{table_name}.manifest"));
    let data = serde_json::to_string_pretty(manifest)?;
    fs::write(path, data)?;
    Ok(())
}
