//! Report jobs and their submission.
//!
//! One `ReportJob` is created per account (explicit specification) or per
//! `account:template` reference.  The job's `key` doubles as the staging
//! filename and as the name of its slice of the output table.  Jobs live for
//! one run only, nothing about them is persisted.
//!

use std::path::{Path, PathBuf};

use tracing::info;

use pinfetch_common::resolve_bounds;
use pinfetch_sources::{Pinterest, ReportBody, TimeRangeBody, REPORT_FORMAT};

use crate::{Configuration, InputVariant, PipelineError};

/// Local job state, derived from the remote report states
///
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum JobState {
    /// Submitted, remote side still working
    #[default]
    Pending,
    /// Done, payload staged locally
    Finished,
    /// Remote side gave up, the job is dropped from the merge
    FailedTerminal,
}

/// One outstanding or completed report request
///
#[derive(Clone, Debug)]
pub struct ReportJob {
    /// Caller-assigned identifier, unique per run
    pub key: String,
    /// Owning ad account
    pub account_id: String,
    /// Opaque token used to poll status
    pub token: String,
    pub state: JobState,
    /// Populated once the remote state becomes FINISHED
    pub url: Option<String>,
}

impl ReportJob {
    pub fn new(key: &str, account_id: &str, token: String) -> Self {
        ReportJob {
            key: key.to_string(),
            account_id: account_id.to_string(),
            token,
            state: JobState::Pending,
            url: None,
        }
    }

    /// Staging location of the raw downloaded payload
    ///
    pub fn staged_file(&self, staging: &Path) -> PathBuf {
        staging.join(format!("{}.raw.csv", self.key))
    }
}

/// Submit every report request for this run, sequentially, before any polling
/// starts.
///
#[tracing::instrument(skip(client, cfg))]
pub fn submit_all(
    client: &Pinterest,
    cfg: &Configuration,
) -> Result<Vec<ReportJob>, PipelineError> {
    let (start_date, end_date) = resolve_bounds(&cfg.time_range.date_from, &cfg.time_range.date_to)
        .map_err(|e| PipelineError::Dates(e.to_string()))?;

    let mut jobs = vec![];
    match &cfg.input {
        InputVariant::Specification(spec) => {
            let (click, engagement, view) = spec.windows()?;
            let body = ReportBody {
                start_date,
                end_date,
                granularity: cfg.time_range.granularity,
                click_window_days: click,
                engagement_window_days: engagement,
                view_window_days: view,
                conversion_report_time: spec.conversion_report_time,
                columns: spec.columns.clone(),
                level: spec.level,
                report_format: REPORT_FORMAT.to_string(),
            };
            for account_id in &cfg.accounts {
                info!(
                    "Creating custom report {} in account {}.",
                    cfg.destination.table_name, account_id
                );
                let token = client.create_report(account_id, &body)?;
                jobs.push(ReportJob::new(account_id, account_id, token));
            }
        }
        InputVariant::Templates(refs) => {
            let body = TimeRangeBody {
                start_date,
                end_date,
                granularity: cfg.time_range.granularity,
            };
            for r in refs {
                info!(
                    "Creating report from template {} in account {}.",
                    r.template_id, r.account_id
                );
                let token =
                    client.create_report_from_template(&r.account_id, &r.template_id, &body)?;
                // The key has to be unique per run even when the same
                // template is pulled from several accounts.
                let key = format!("{}_{}", r.account_id, r.template_id);
                jobs.push(ReportJob::new(&key, &r.account_id, token));
            }
        }
    }
    Ok(jobs)
}
