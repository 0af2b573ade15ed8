//! The polling scheduler.
//!
//! States per job: `PENDING -> {FINISHED, FAILED_TERMINAL}`, nothing else.
//! Every iteration checks all still-pending jobs before sleeping, so jobs
//! settle at different times but are observed at the same cadence.  Finished
//! payloads are fetched as soon as their completion URL is known; terminal
//! failures are dropped from the working set without aborting the run.
//!

use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, trace, warn};

use pinfetch_sources::{Pinterest, ReportStatus};

use crate::{download_report, JobState, PipelineError, PollOpts, ReportJob};

/// Drive every submitted job to a terminal state.
///
#[tracing::instrument(skip(client, jobs))]
pub fn wait_for_reports(
    client: &Pinterest,
    jobs: &mut [ReportJob],
    staging: &Path,
    poll: &PollOpts,
) -> Result<(), PipelineError> {
    let mut pending: Vec<usize> = (0..jobs.len()).collect();
    let mut checks = 0u64;

    while !pending.is_empty() {
        let mut next = Vec::with_capacity(pending.len());
        for idx in pending {
            let job = &mut jobs[idx];
            let resp = client.report_status(&job.account_id, &job.token)?;
            trace!("report {} is {}", job.key, resp.report_status);
            match resp.report_status {
                ReportStatus::InProgress => next.push(idx),
                ReportStatus::Finished => {
                    let url = resp
                        .url
                        .ok_or_else(|| PipelineError::MissingUrl(job.key.clone()))?;
                    debug!("report {} finished, fetching it", job.key);
                    download_report(&url, &job.staged_file(staging))?;
                    job.url = Some(url);
                    job.state = JobState::Finished;
                }
                status => {
                    warn!(
                        "report {} for account {} ended as {}, dropping it",
                        job.key, job.account_id, status
                    );
                    job.state = JobState::FailedTerminal;
                }
            }
        }
        pending = next;

        if !pending.is_empty() {
            checks += 1;
            if let Some(max) = poll.max_checks {
                if checks >= max {
                    let left = pending
                        .iter()
                        .map(|&i| jobs[i].key.clone())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(PipelineError::PollBudgetExceeded(checks, left));
                }
            }
            sleep(Duration::from_secs(poll.interval_secs));
        }
    }
    Ok(())
}
