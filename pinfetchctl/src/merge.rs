//! Schema validation & merge.
//!
//! Every staged report must carry the exact same header (same columns, same
//! order) or the run fails before anything is written.  The primary-key set
//! is the intersection of that header with a fixed list of dimension columns.
//! Merging rewrites every data row prefixed with the owning account id, one
//! output slice per job, values passed through untouched.
//!

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::{JobState, PipelineError, ReportJob};

/// Column names treated as row-identifying when present in a report header
const DIMENSION_KEYS: [&str; 9] = [
    "Ad ID",
    "Ad group ID",
    "Advertiser",
    "Campaign ID",
    "Date",
    "Keyword ID",
    "Organic pin ID",
    "Product group ID",
    "Targeting Type",
];

/// The column every merged row is prefixed with
pub const ACCOUNT_ID_COLUMN: &str = "Account ID";

/// Select the primary-key subset out of a column list.
///
/// Returns exactly the columns present in the fixed dimension set, in the
/// original column order.
///
pub fn retrieve_keys(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| DIMENSION_KEYS.contains(&c.as_str()))
        .cloned()
        .collect()
}

/// Normalize one column name into its canonical identifier form.
///
fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Normalize a whole header.  Applied identically to the key list and the
/// full column list so they stay index-aligned.
///
pub fn normalize_header(columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| normalize_name(c)).collect()
}

/// Check consistency of the staged reports.
///
/// Steps through every finished job's staged file, reads only its header row
/// and compares it against the first one seen.  The first mismatching column
/// pair is reported as `current/reference`.  On success, returns the derived
/// primary keys and the common header; `Account ID` is prepended by the
/// caller, not here.
///
#[tracing::instrument(skip(jobs))]
pub fn check_headers(
    staging: &Path,
    jobs: &[ReportJob],
) -> Result<(Vec<String>, Vec<String>), PipelineError> {
    let mut header: Option<Vec<String>> = None;

    for job in jobs.iter().filter(|j| j.state == JobState::Finished) {
        let mut rdr = ReaderBuilder::new().from_path(job.staged_file(staging))?;
        let fields: Vec<String> = rdr.headers()?.iter().map(|s| s.to_string()).collect();
        match &header {
            None => header = Some(fields),
            Some(reference) => {
                if &fields != reference {
                    let mm = fields
                        .iter()
                        .zip(reference.iter())
                        .find(|(a, b)| a != b)
                        .map(|(a, b)| format!("{a}/{b}"))
                        .unwrap_or_else(|| {
                            format!("{} vs {} columns", fields.len(), reference.len())
                        });
                    return Err(PipelineError::HeaderMismatch(mm));
                }
            }
        }
    }

    let header = header.ok_or(PipelineError::NothingToMerge)?;
    let keys = retrieve_keys(&header);
    Ok((keys, header))
}

/// Merge every finished job's staged file into the output table directory.
///
/// One `<key>.csv` slice per job, header skipped, every data row prefixed
/// with the job's account id.  Returns the total number of data rows written.
///
#[tracing::instrument(skip(jobs))]
pub fn combine(
    staging: &Path,
    out_dir: &Path,
    jobs: &[ReportJob],
) -> Result<u64, PipelineError> {
    let mut total = 0u64;

    for job in jobs.iter().filter(|j| j.state == JobState::Finished) {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_path(job.staged_file(staging))?;
        let dest = out_dir.join(format!("{}.csv", job.key));
        let mut wtr = WriterBuilder::new().flexible(true).from_path(&dest)?;

        let mut rows = 0u64;
        for record in rdr.records() {
            let record = record?;
            let mut row = Vec::with_capacity(record.len() + 1);
            row.push(job.account_id.as_str());
            row.extend(record.iter());
            wtr.write_record(&row)?;
            rows += 1;
        }
        wtr.flush()?;
        debug!("{} rows for report {}", rows, job.key);
        total += rows;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::tempdir;

    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn finished_job(key: &str, account_id: &str) -> ReportJob {
        let mut job = ReportJob::new(key, account_id, "tok".to_string());
        job.state = JobState::Finished;
        job
    }

    fn stage(dir: &Path, job: &ReportJob, content: &str) {
        fs::write(job.staged_file(dir), content).unwrap();
    }

    #[rstest]
    #[case(&["Date", "Spend"], &["Date"])]
    #[case(&["Spend", "Clicks"], &[])]
    #[case(
        &["Campaign ID", "Date", "Spend", "Ad group ID"],
        &["Campaign ID", "Date", "Ad group ID"]
    )]
    fn test_retrieve_keys(#[case] columns: &[&str], #[case] expected: &[&str]) {
        assert_eq!(strings(expected), retrieve_keys(&strings(columns)));
    }

    #[test]
    fn test_retrieve_keys_idempotent() {
        let columns = strings(&["Campaign ID", "Spend", "Date"]);
        let keys = retrieve_keys(&columns);
        let mut union = keys.clone();
        union.extend(columns.clone());
        assert_eq!(keys, retrieve_keys(&union)[..keys.len()].to_vec());
        assert_eq!(keys, retrieve_keys(&keys));
    }

    #[rstest]
    #[case("Account ID", "Account_ID")]
    #[case("  Spend  ", "Spend")]
    #[case("Spend (in dollars)", "Spend__in_dollars_")]
    #[case("CLICKS", "CLICKS")]
    fn test_normalize_name(#[case] inp: &str, #[case] out: &str) {
        assert_eq!(out, normalize_name(inp));
    }

    #[test]
    fn test_check_headers_identical() {
        let dir = tempdir().unwrap();
        let a = finished_job("123", "123");
        let b = finished_job("456", "456");
        stage(dir.path(), &a, "Date,Campaign ID,Spend\n2024-02-01,c1,1.0\n");
        stage(dir.path(), &b, "Date,Campaign ID,Spend\n2024-02-01,c2,2.0\n");

        let (keys, columns) = check_headers(dir.path(), &[a, b]).unwrap();
        assert_eq!(strings(&["Date", "Campaign ID"]), keys);
        assert_eq!(strings(&["Date", "Campaign ID", "Spend"]), columns);
    }

    #[test]
    fn test_check_headers_mismatch() {
        let dir = tempdir().unwrap();
        let a = finished_job("123", "123");
        let b = finished_job("456", "456");
        stage(dir.path(), &a, "Date,Spend\n2024-02-01,1.0\n");
        stage(dir.path(), &b, "Date,Clicks,Spend\n2024-02-01,3,2.0\n");

        match check_headers(dir.path(), &[a, b]) {
            Err(PipelineError::HeaderMismatch(mm)) => assert_eq!("Clicks/Spend", mm),
            _ => panic!("expected a header mismatch"),
        }
    }

    #[test]
    fn test_check_headers_skips_failed_jobs() {
        let dir = tempdir().unwrap();
        let a = finished_job("123", "123");
        let mut b = ReportJob::new("456", "456", "tok".to_string());
        b.state = JobState::FailedTerminal;
        // No staged file for the failed job.
        stage(dir.path(), &a, "Date,Spend\n2024-02-01,1.0\n");

        let (keys, columns) = check_headers(dir.path(), &[a, b]).unwrap();
        assert_eq!(strings(&["Date"]), keys);
        assert_eq!(strings(&["Date", "Spend"]), columns);
    }

    #[test]
    fn test_combine() {
        let staging = tempdir().unwrap();
        let out = tempdir().unwrap();
        let a = finished_job("123", "123");
        let b = finished_job("456", "456");
        let mut failed = ReportJob::new("789", "789", "tok".to_string());
        failed.state = JobState::FailedTerminal;
        stage(
            staging.path(),
            &a,
            "Date,Spend\n2024-02-01,1.0\n2024-02-02,2.0\n",
        );
        stage(
            staging.path(),
            &b,
            "Date,Spend\n2024-02-01,3.0\n2024-02-02,4.0\n",
        );

        let total = combine(staging.path(), out.path(), &[a, b, failed]).unwrap();
        assert_eq!(4, total);

        let s1 = fs::read_to_string(out.path().join("123.csv")).unwrap();
        assert_eq!("123,2024-02-01,1.0\n123,2024-02-02,2.0\n", s1);
        let s2 = fs::read_to_string(out.path().join("456.csv")).unwrap();
        assert_eq!("456,2024-02-01,3.0\n456,2024-02-02,4.0\n", s2);
        assert!(!out.path().join("789.csv").exists());
    }
}
