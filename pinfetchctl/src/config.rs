//! Typed run configuration.
//!
//! The hosting runner drops a `config.json` in the data directory.  Parsing is
//! lenient (the discovery sub-commands work off a partially filled file) but
//! `Configuration::try_from` performs the strict validation the pipeline
//! needs: exactly one input variant, non-empty accounts, non-empty columns or
//! report references depending on the variant.
//!

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use pinfetch_sources::{Auth, ConversionReportTime, Granularity, Level};

/// Config filename inside the data directory
const CONFIG: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration {0:?}: {1}")]
    Unreadable(PathBuf, #[source] std::io::Error),
    #[error("Cannot parse configuration: {0}")]
    Parsing(#[from] serde_json::Error),
    #[error("No accounts for reporting specified")]
    NoAccounts,
    #[error("No report specification provided")]
    NoSpecification,
    #[error("No columns selected in report specification")]
    NoColumns,
    #[error("No report IDs specified")]
    NoReportIds,
    #[error("Unknown input variant {0}")]
    UnknownVariant(String),
    #[error("No time range specified")]
    NoTimeRange,
    #[error("Malformed report reference {0}, expected account_id:template_id")]
    BadTemplateRef(String),
    #[error("Malformed conversion window {0}, expected click/engagement/view day counts")]
    BadConversionWindow(String),
}

/// The file as the runner writes it
///
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub parameters: Parameters,
    #[serde(default)]
    pub authorization: Option<OauthCredentials>,
}

/// OAuth material injected by the runner next to the parameters
///
#[derive(Clone, Debug, Deserialize)]
pub struct OauthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub input_variant: String,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub destination: Destination,
    #[serde(default)]
    pub time_range: Option<TimeRange>,
    #[serde(default)]
    pub report_specification: Option<ReportSettings>,
    #[serde(default)]
    pub existing_report_ids: Vec<String>,
    /// Direct bearer token, takes precedence over the OAuth credentials
    #[serde(rename = "#api_token", default)]
    pub api_token: Option<String>,
    /// Endpoint override, tests point this at a mock server
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub poll: PollOpts,
    /// Same effect as `-D` on the command line
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
pub struct Destination {
    pub table_name: String,
    #[serde(default = "default_incremental")]
    pub incremental_loading: bool,
}

impl Default for Destination {
    fn default() -> Self {
        Destination {
            table_name: String::new(),
            incremental_loading: true,
        }
    }
}

fn default_incremental() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct TimeRange {
    pub granularity: Granularity,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub columns: Vec<String>,
    /// Click/engagement/view attribution windows as one `a/b/c` string
    #[serde(default = "default_window")]
    pub conversion_window: String,
    #[serde(default)]
    pub conversion_report_time: ConversionReportTime,
}

fn default_window() -> String {
    "30/30/30".to_string()
}

impl ReportSettings {
    /// Split the conversion window into its three day counts.
    ///
    pub fn windows(&self) -> Result<(u32, u32, u32), ConfigError> {
        let bad = || ConfigError::BadConversionWindow(self.conversion_window.clone());
        let parts: Vec<&str> = self.conversion_window.split('/').collect();
        if parts.len() != 3 {
            return Err(bad());
        }
        let parse = |s: &str| s.trim().parse::<u32>().map_err(|_| bad());
        Ok((parse(parts[0])?, parse(parts[1])?, parse(parts[2])?))
    }
}

/// Polling knobs.  The default matches the historical behaviour: 10 s between
/// iterations and no upper bound on the number of checks.
///
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PollOpts {
    pub interval_secs: u64,
    pub max_checks: Option<u64>,
}

impl Default for PollOpts {
    fn default() -> Self {
        PollOpts {
            interval_secs: 10,
            max_checks: None,
        }
    }
}

/// One `account_id:template_id` reference, split exactly once on the first colon
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateRef {
    pub account_id: String,
    pub template_id: String,
}

impl FromStr for TemplateRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((account_id, template_id))
                if !account_id.is_empty() && !template_id.is_empty() =>
            {
                Ok(TemplateRef {
                    account_id: account_id.to_string(),
                    template_id: template_id.to_string(),
                })
            }
            _ => Err(ConfigError::BadTemplateRef(s.to_string())),
        }
    }
}

/// The active input variant, exactly one per run
///
#[derive(Clone, Debug)]
pub enum InputVariant {
    /// Explicit column/metric specification, one job per configured account
    Specification(ReportSettings),
    /// Stored template references, one job per `account:template` pair
    Templates(Vec<TemplateRef>),
}

/// The validated configuration the pipeline runs from
///
#[derive(Debug)]
pub struct Configuration {
    pub accounts: Vec<String>,
    pub destination: Destination,
    pub time_range: TimeRange,
    pub input: InputVariant,
    pub poll: PollOpts,
    pub api_url: Option<String>,
    auth: Auth,
}

impl ConfigFile {
    /// Read and parse `config.json` from the data directory.
    ///
    #[tracing::instrument]
    pub fn load(datadir: &Path) -> Result<ConfigFile, ConfigError> {
        let path = datadir.join(CONFIG);
        let data =
            fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable(path.clone(), e))?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Derive the credentials: direct token first, OAuth material else.
    ///
    pub fn auth(&self) -> Auth {
        match (&self.parameters.api_token, &self.authorization) {
            (Some(token), _) if !token.is_empty() => Auth::Token {
                api_token: token.clone(),
            },
            (_, Some(oauth)) => Auth::Refresh {
                refresh_token: oauth.refresh_token.clone(),
                client_id: oauth.client_id.clone(),
                client_secret: oauth.client_secret.clone(),
            },
            _ => Auth::Anon,
        }
    }
}

impl TryFrom<ConfigFile> for Configuration {
    type Error = ConfigError;

    /// Strict validation, performed before any remote call.
    ///
    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let auth = file.auth();
        let p = file.parameters;

        if p.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }

        let input = match p.input_variant.as_str() {
            "report_specification" => {
                let spec = p.report_specification.ok_or(ConfigError::NoSpecification)?;
                if spec.columns.is_empty() {
                    return Err(ConfigError::NoColumns);
                }
                // Validate the window triple early, the builder relies on it
                spec.windows()?;
                InputVariant::Specification(spec)
            }
            "existing_report_ids" => {
                if p.existing_report_ids.is_empty() {
                    return Err(ConfigError::NoReportIds);
                }
                let refs = p
                    .existing_report_ids
                    .iter()
                    .map(|s| s.parse())
                    .collect::<Result<Vec<TemplateRef>, _>>()?;
                InputVariant::Templates(refs)
            }
            other => return Err(ConfigError::UnknownVariant(other.to_string())),
        };

        let time_range = p.time_range.ok_or(ConfigError::NoTimeRange)?;

        Ok(Configuration {
            accounts: p.accounts,
            destination: p.destination,
            time_range,
            input,
            poll: p.poll,
            api_url: p.api_url,
            auth,
        })
    }
}

impl Configuration {
    pub fn auth(&self) -> &Auth {
        &self.auth
    }
}
