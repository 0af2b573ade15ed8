//! Module to deal with the Pinterest v5 reporting API.
//!
//! The submodules deal with the different concerns of the access layer:
//!
//! - authentication (direct token or refresh-token exchange)
//! - paginated list endpoints (accounts, report templates)
//! - asynchronous report requests (submit, poll status)
//! - the column-discovery trick (parsing the API's validation payload).
//!

pub use auth::*;
pub use client::*;
pub use discovery::*;
pub use error::*;
pub use reports::*;

mod auth;
mod client;
mod discovery;
mod error;
mod reports;

#[macro_use]
mod macros;

/// Default API endpoint
pub const BASE_URL: &str = "https://api.pinterest.com/v5";

pub fn version() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
