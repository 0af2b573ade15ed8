use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Describe the possible ways to authenticate oneself
///
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Auth {
    /// Nothing available, the client can not be built
    #[default]
    Anon,
    /// Using a bearer token directly
    Token { api_token: String },
    /// Exchanging a refresh token for an access token at construction time
    Refresh {
        refresh_token: String,
        client_id: String,
        client_secret: String,
    },
}

impl Display for Auth {
    /// Obfuscate the tokens & secrets
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Hide secrets
        //
        let auth = match self.clone() {
            Auth::Token { .. } => Auth::Token {
                api_token: "HIDDEN".to_string(),
            },
            Auth::Refresh { client_id, .. } => Auth::Refresh {
                client_id,
                client_secret: "HIDDEN".to_string(),
                refresh_token: "HIDDEN".to_string(),
            },
            _ => Auth::Anon,
        };
        write!(f, "{:?}", auth)
    }
}
