//! The Pinterest client itself.
//!
//! One instance is built per run.  Construction resolves the credentials into a
//! bearer token (either supplied directly or obtained through the OAuth
//! refresh-token exchange) and the token then stays fixed for the lifetime of
//! the client.
//!

use clap::{crate_name, crate_version};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::trace;

use crate::{http_get_auth, Auth, SourceError, BASE_URL};

/// Page size used on every list endpoint
const PAGE_SIZE: &str = "50";

/// What the OAuth exchange gives us back
///
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    message: Option<String>,
}

/// One page of a list endpoint, continuation through the opaque `bookmark`
///
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    bookmark: Option<String>,
}

/// An advertising account as the API lists it
///
#[derive(Clone, Debug, Deserialize, Serialize, Tabled)]
pub struct AdAccount {
    pub id: String,
    pub name: String,
}

/// A server-stored report template
///
#[derive(Clone, Debug, Deserialize, Serialize, Tabled)]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    pub ad_account_id: String,
}

/// Pinterest represents what is needed to connect, auth and request reports
/// from the API.
///
#[derive(Clone, Debug)]
pub struct Pinterest {
    /// Base site url, default is [BASE_URL]
    pub base_url: String,
    /// Bearer token, fixed for the lifetime of the client
    pub(crate) token: String,
    /// reqwest blocking client
    pub(crate) client: Client,
}

impl Pinterest {
    /// Build a client against the production endpoint.
    ///
    pub fn new(auth: &Auth) -> Result<Self, SourceError> {
        Self::with_base_url(auth, BASE_URL)
    }

    /// Build a client against the given endpoint (tests use a mock server).
    ///
    #[tracing::instrument(skip(auth))]
    pub fn with_base_url(auth: &Auth, base_url: &str) -> Result<Self, SourceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::new();
        let token = match auth {
            Auth::Token { api_token } => api_token.clone(),
            Auth::Refresh {
                refresh_token,
                client_id,
                client_secret,
            } => exchange_token(&client, &base_url, refresh_token, client_id, client_secret)?,
            Auth::Anon => return Err(SourceError::NoCredentials),
        };
        Ok(Pinterest {
            base_url,
            token,
            client,
        })
    }

    /// List every accessible ad account.
    ///
    #[tracing::instrument(skip(self))]
    pub fn list_accounts(&self) -> Result<Vec<AdAccount>, SourceError> {
        self.fetch_all_pages("ad_accounts", &[], "listing accounts")
    }

    /// List every report template stored in the given account.
    ///
    #[tracing::instrument(skip(self))]
    pub fn list_templates(&self, account_id: &str) -> Result<Vec<ReportTemplate>, SourceError> {
        let ep = format!("ad_accounts/{account_id}/templates");
        self.fetch_all_pages(&ep, &[("order", "DESCENDING")], "listing templates")
    }

    /// Accumulate every page of a list endpoint.
    ///
    /// The API paginates through an opaque `bookmark` cursor: keep requesting
    /// subsequent pages while one is returned, stop once it is omitted.
    ///
    fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        ep: &str,
        extra: &[(&str, &str)],
        what: &str,
    ) -> Result<Vec<T>, SourceError> {
        let mut params: Vec<(String, String)> = vec![("page_size".to_string(), PAGE_SIZE.to_string())];
        extra
            .iter()
            .for_each(|(k, v)| params.push((k.to_string(), v.to_string())));

        let mut total = vec![];
        loop {
            let page: Page<T> = self.get_json(ep, &params, what)?;
            total.extend(page.items);
            match page.bookmark {
                Some(bookmark) if !bookmark.is_empty() => {
                    params.retain(|(k, _)| k != "bookmark");
                    params.push(("bookmark".to_string(), bookmark));
                }
                _ => break,
            }
        }
        Ok(total)
    }

    /// One authenticated GET, decoded into the expected type.
    ///
    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        ep: &str,
        params: &[(String, String)],
        what: &str,
    ) -> Result<T, SourceError> {
        let url = format!("{}/{}", self.base_url, ep);
        trace!("GET {url} ({what})");

        let resp = http_get_auth!(self, url, params)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SourceError::Http {
                status,
                what: what.to_string(),
                endpoint: ep.to_string(),
                body,
            });
        }
        resp.json().map_err(|_| SourceError::Decoding(ep.to_string()))
    }
}

/// Exchange a refresh token for an access token, client-credentials style.
///
#[tracing::instrument(skip_all)]
fn exchange_token(
    client: &Client,
    base_url: &str,
    refresh_token: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, SourceError> {
    let url = format!("{base_url}/oauth/token");
    trace!("Fetching access token through {url}…");

    let resp = client
        .clone()
        .post(url)
        .header(
            "user-agent",
            format!("{}/{}", crate_name!(), crate_version!()),
        )
        .basic_auth(client_id, Some(client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("scope", "ads:read"),
        ])
        .send()?;

    let body = resp.text().unwrap_or_default();
    let resp: TokenResponse = serde_json::from_str(&body)
        .map_err(|_| SourceError::TokenExchange(body.clone()))?;
    match resp.access_token {
        Some(token) => Ok(token),
        None => Err(SourceError::TokenExchange(
            resp.message.unwrap_or(body),
        )),
    }
}
