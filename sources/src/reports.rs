//! Report request/status plumbing.
//!
//! Reports follow a two-step lifecycle: a creation request returns an opaque
//! token, the token is then polled until the remote side reports a terminal
//! state.  `FINISHED` carries the temporary URL the raw CSV payload can be
//! fetched from.
//!

use clap::{crate_name, crate_version};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::{http_post_auth, parse_valid_columns, Pinterest, SourceError};

/// The only format we ever ask for
pub const REPORT_FORMAT: &str = "CSV";

/// Entity granularity of a report
///
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, PartialEq, Serialize,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    #[default]
    Advertiser,
    AdvertiserTargeting,
    Campaign,
    CampaignTargeting,
    AdGroup,
    AdGroupTargeting,
    PinPromotion,
    PinPromotionTargeting,
    Keyword,
    ProductGroup,
    ProductGroupTargeting,
    ProductItem,
}

/// Time granularity of a report
///
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, PartialEq, Serialize, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Granularity {
    Total,
    Day,
    Hour,
    Week,
    Month,
}

/// Which timestamp conversions are attributed to
///
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, Eq, PartialEq, Serialize,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionReportTime {
    #[default]
    TimeOfAdAction,
    TimeOfConversion,
}

/// Remote report states.  `IN_PROGRESS` is the only non-terminal one and
/// everything but `FINISHED` is a terminal failure.
///
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    InProgress,
    Finished,
    DoesNotExist,
    Expired,
    Failed,
    Cancelled,
}

impl ReportStatus {
    /// True for every state a report can never leave, except success.
    ///
    pub fn is_terminal_failure(&self) -> bool {
        !matches!(self, ReportStatus::InProgress | ReportStatus::Finished)
    }
}

/// Full report specification, submitted as the creation request body
///
#[derive(Clone, Debug, Serialize)]
pub struct ReportBody {
    pub start_date: String,
    pub end_date: String,
    pub granularity: Granularity,
    pub click_window_days: u32,
    pub engagement_window_days: u32,
    pub view_window_days: u32,
    pub conversion_report_time: ConversionReportTime,
    pub columns: Vec<String>,
    pub level: Level,
    pub report_format: String,
}

/// Body for template-based creation, the column set is implied by the template
///
#[derive(Clone, Debug, Serialize)]
pub struct TimeRangeBody {
    pub start_date: String,
    pub end_date: String,
    pub granularity: Granularity,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    token: String,
}

/// Status poll answer, `url` shows up only once the report is `FINISHED`
///
#[derive(Clone, Debug, Deserialize)]
pub struct ReportStatusResponse {
    pub report_status: ReportStatus,
    #[serde(default)]
    pub url: Option<String>,
}

impl Pinterest {
    /// Submit a report creation request, return the poll token.
    ///
    /// A rejection of the requested column/metric/level combination is
    /// recognised from the error payload and surfaced with the valid column
    /// set; anything else non-2xx is a plain HTTP error.
    ///
    #[tracing::instrument(skip(self, body))]
    pub fn create_report(
        &self,
        account_id: &str,
        body: &ReportBody,
    ) -> Result<String, SourceError> {
        let ep = format!("ad_accounts/{account_id}/reports");
        self.post_report(&ep, body, "creating a report request")
    }

    /// Submit a report creation request from a stored template.
    ///
    #[tracing::instrument(skip(self, time_range))]
    pub fn create_report_from_template(
        &self,
        account_id: &str,
        template_id: &str,
        time_range: &TimeRangeBody,
    ) -> Result<String, SourceError> {
        let ep = format!("ad_accounts/{account_id}/templates/{template_id}/reports");
        self.post_report(&ep, time_range, "creating a report request using a template")
    }

    /// Poll the status of a submitted report.
    ///
    #[tracing::instrument(skip(self))]
    pub fn report_status(
        &self,
        account_id: &str,
        token: &str,
    ) -> Result<ReportStatusResponse, SourceError> {
        let ep = format!("ad_accounts/{account_id}/reports");
        let params = vec![("token".to_string(), token.to_string())];
        self.get_json(&ep, &params, "reading report status")
    }

    fn post_report<B: Serialize + ?Sized>(
        &self,
        ep: &str,
        body: &B,
        what: &str,
    ) -> Result<String, SourceError> {
        let url = format!("{}/{}", self.base_url, ep);
        let resp = http_post_auth!(self, url, body)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            if let Some(columns) = parse_valid_columns(&text) {
                return Err(SourceError::InvalidColumns { columns });
            }
            return Err(SourceError::Http {
                status,
                what: what.to_string(),
                endpoint: ep.to_string(),
                body: text,
            });
        }
        let resp: CreateResponse = resp
            .json()
            .map_err(|_| SourceError::Decoding(ep.to_string()))?;
        Ok(resp.token)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::Auth;

    use super::*;

    fn setup_pinterest(server: &MockServer) -> Pinterest {
        let auth = Auth::Token {
            api_token: "FOOBAR".to_string(),
        };
        Pinterest::with_base_url(&auth, &server.base_url()).unwrap()
    }

    fn sample_body() -> ReportBody {
        ReportBody {
            start_date: "2024-02-01".to_string(),
            end_date: "2024-02-28".to_string(),
            granularity: Granularity::Day,
            click_window_days: 30,
            engagement_window_days: 30,
            view_window_days: 30,
            conversion_report_time: ConversionReportTime::TimeOfAdAction,
            columns: vec!["SPEND_IN_DOLLAR".to_string()],
            level: Level::Campaign,
            report_format: REPORT_FORMAT.to_string(),
        }
    }

    #[test]
    fn test_create_report() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/ad_accounts/123/reports")
                .header("authorization", "Bearer FOOBAR")
                .json_body_partial(r#"{"level": "CAMPAIGN", "report_format": "CSV"}"#);
            then.status(200).json_body(json!({"token": "tok-123"}));
        });

        let site = setup_pinterest(&server);
        let token = site.create_report("123", &sample_body()).unwrap();
        m.assert();
        assert_eq!("tok-123", token);
    }

    #[test]
    fn test_create_report_invalid_columns() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/ad_accounts/123/reports");
            then.status(400)
                .body("'SPEND_IN_DOLLAR' is not one of ['COL_A', 'COL_B']");
        });

        let site = setup_pinterest(&server);
        match site.create_report("123", &sample_body()) {
            Err(SourceError::InvalidColumns { columns }) => {
                assert_eq!(vec!["COL_A", "COL_B"], columns);
            }
            _ => panic!("expected an InvalidColumns error"),
        }
    }

    #[test]
    fn test_create_report_http_error() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/ad_accounts/123/reports");
            then.status(500).body("server melted");
        });

        let site = setup_pinterest(&server);
        match site.create_report("123", &sample_body()) {
            Err(SourceError::Http { status, endpoint, .. }) => {
                assert_eq!(500, status.as_u16());
                assert_eq!("ad_accounts/123/reports", endpoint);
            }
            _ => panic!("expected an HTTP error"),
        }
    }

    #[test]
    fn test_create_report_from_template() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/ad_accounts/123/templates/777/reports")
                .json_body_partial(r#"{"start_date": "2024-02-01"}"#);
            then.status(200).json_body(json!({"token": "tok-777"}));
        });

        let site = setup_pinterest(&server);
        let body = TimeRangeBody {
            start_date: "2024-02-01".to_string(),
            end_date: "2024-02-28".to_string(),
            granularity: Granularity::Day,
        };
        let token = site.create_report_from_template("123", "777", &body).unwrap();
        m.assert();
        assert_eq!("tok-777", token);
    }

    #[test]
    fn test_report_status_in_progress() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/ad_accounts/123/reports")
                .query_param("token", "tok-123");
            then.status(200)
                .json_body(json!({"report_status": "IN_PROGRESS"}));
        });

        let site = setup_pinterest(&server);
        let resp = site.report_status("123", "tok-123").unwrap();
        m.assert();
        assert_eq!(ReportStatus::InProgress, resp.report_status);
        assert!(resp.url.is_none());
    }

    #[test]
    fn test_report_status_finished() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET)
                .path("/ad_accounts/123/reports")
                .query_param("token", "tok-123");
            then.status(200).json_body(
                json!({"report_status": "FINISHED", "url": "https://storage.example.net/r.csv"}),
            );
        });

        let site = setup_pinterest(&server);
        let resp = site.report_status("123", "tok-123").unwrap();
        assert_eq!(ReportStatus::Finished, resp.report_status);
        assert_eq!(
            Some("https://storage.example.net/r.csv".to_string()),
            resp.url
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ReportStatus::InProgress.is_terminal_failure());
        assert!(!ReportStatus::Finished.is_terminal_failure());
        assert!(ReportStatus::DoesNotExist.is_terminal_failure());
        assert!(ReportStatus::Expired.is_terminal_failure());
        assert!(ReportStatus::Failed.is_terminal_failure());
        assert!(ReportStatus::Cancelled.is_terminal_failure());
    }
}
