//! Define our own macros to simplify the code
//!

/// Call the HTTP client with the proper arguments
///
/// - auth call to fetch data, with query parameters
/// - auth call to fetch data
///
#[macro_export]
macro_rules! http_get_auth {
    ($self:ident, $url:ident, $params:expr) => {
        $self
            .client
            .clone()
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("content-type", "application/json")
            .bearer_auth(&$self.token)
            .query($params)
            .send()
    };
    ($self:ident, $url:ident) => {
        $self
            .client
            .clone()
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("content-type", "application/json")
            .bearer_auth(&$self.token)
            .send()
    };
}

/// Call the HTTP client with the proper arguments
///
/// - auth call to submit a report request with a JSON body
///
#[macro_export]
macro_rules! http_post_auth {
    ($self:ident, $url:ident, $data:expr) => {
        $self
            .client
            .clone()
            .post($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("content-type", "application/json")
            .bearer_auth(&$self.token)
            .json($data)
            .send()
    };
}
