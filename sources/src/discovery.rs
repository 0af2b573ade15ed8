//! Column discovery via a deliberate validation error.
//!
//! The API does not expose the list of valid report columns.  The trick used
//! here is to submit a report request with a column name that can not exist
//! and parse the valid set out of the rejection message.  This is best-effort
//! by nature: the parsing is kept behind this narrow module so the remote
//! message format can change without touching the pipeline.
//!

use chrono::{Days, Utc};

use crate::{ConversionReportTime, Granularity, Level, ReportBody, REPORT_FORMAT};

/// The column name that forces a rejection
pub const PROBE_COLUMN: &str = "NONSENSE_XXXXXX";

/// Marker preceding the enumeration of valid columns in the error payload
const KEY: &str = "is not one of ['";

/// Extract the valid column set from a rejection message.
///
/// The payload pattern is `'<column>' is not one of ['A', 'B', ...]`.
/// Returns `None` when the message does not match, the caller then treats the
/// response as a plain HTTP error.
///
pub fn parse_valid_columns(message: &str) -> Option<Vec<String>> {
    let start = message.find(KEY)?;
    let rest = &message[start + KEY.len()..];
    let end = rest.find("']")?;
    Some(
        rest[..end]
            .split("', '")
            .map(|s| s.to_string())
            .collect(),
    )
}

/// A report body guaranteed to be rejected, used to trigger the enumeration.
///
/// Dates cover the last 30 to 2 days, the rest are innocuous defaults.
///
pub fn probe_body() -> ReportBody {
    let today = Utc::now().date_naive();
    let start = (today - Days::new(30)).format("%Y-%m-%d").to_string();
    let end = (today - Days::new(2)).format("%Y-%m-%d").to_string();
    ReportBody {
        start_date: start,
        end_date: end,
        granularity: Granularity::Day,
        click_window_days: 7,
        engagement_window_days: 7,
        view_window_days: 7,
        conversion_report_time: ConversionReportTime::TimeOfAdAction,
        columns: vec![PROBE_COLUMN.to_string()],
        level: Level::Campaign,
        report_format: REPORT_FORMAT.to_string(),
    }
}
