//! Result retrieval.
//!

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::trace;

use crate::PipelineError;

/// Raw payloads can be large, keep a generous but bounded request timeout.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(180);

/// Stream the payload at `url` into `dest`.
///
/// The transfer is streamed to keep memory use bounded regardless of report
/// size; a non-success status or an interrupted transfer fails the run.
///
#[tracing::instrument]
pub fn download_report(url: &str, dest: &Path) -> Result<(), PipelineError> {
    trace!("downloading {url} into {dest:?}");

    let wrap = |e: reqwest::Error| PipelineError::Download(url.to_string(), e);

    let client = Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(wrap)?;
    let mut resp = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(wrap)?;

    let mut out = File::create(dest)?;
    resp.copy_to(&mut out).map_err(wrap)?;
    Ok(())
}
