//! OAuth 2.0 implicit flow for Google APIs.
//!
//! The user is sent to the authorization endpoint with
//! `response_type=token`. After consent the browser is redirected to the
//! registered redirect URI carrying the access token in the URL fragment:
//!
//! ```text
//! http://localhost/#access_token=ya29...&token_type=Bearer&expires_in=3599
//! ```
//!
//! The interactive part (opening a browser and capturing the redirect) is
//! abstracted behind [`AuthorizationFlow`]; parsing the redirect is the pure
//! [`extract_access_token`].

use url::Url;

use super::config::GoogleConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::source::BoxFuture;

/// Builds the authorization URL the user must visit.
pub fn build_auth_url(config: &GoogleConfig) -> ProviderResult<String> {
    let mut url = Url::parse(&config.auth_url).map_err(|e| {
        ProviderError::configuration(format!("invalid auth_url {:?}", config.auth_url))
            .with_source(e)
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("response_type", "token")
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &config.scopes.join(" "));

    Ok(url.into())
}

/// Extracts the access token from the redirect URL's fragment.
///
/// Fails with `AuthenticationFailed` when the fragment is missing, carries
/// an `error` parameter, or has no non-empty `access_token`.
pub fn extract_access_token(redirect_url: &str) -> ProviderResult<String> {
    let (_, fragment) = redirect_url
        .trim()
        .split_once('#')
        .ok_or_else(|| ProviderError::authentication("redirect URL has no fragment"))?;

    let mut token = None;
    for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "error" => {
                return Err(ProviderError::authentication(format!(
                    "authorization denied: {}",
                    value
                )));
            }
            "access_token" if !value.is_empty() => token = Some(value.into_owned()),
            _ => {}
        }
    }

    token.ok_or_else(|| ProviderError::authentication("no access_token in redirect URL"))
}

/// The interactive half of the implicit flow.
pub trait AuthorizationFlow: Send + Sync {
    /// Presents `auth_url` to the user and returns the URL they were
    /// redirected to, or `None` if they cancelled.
    fn authorize<'a>(&'a self, auth_url: &'a str) -> BoxFuture<'a, ProviderResult<Option<String>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn auth_url_carries_implicit_flow_parameters() {
        let config = GoogleConfig::new("1234-abc.apps.googleusercontent.com")
            .with_redirect_uri("https://example.test/cb");
        let url = Url::parse(&build_auth_url(&config).unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(url.path(), "/o/oauth2/auth");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "client_id".to_string(),
                    "1234-abc.apps.googleusercontent.com".to_string()
                ),
                ("response_type".to_string(), "token".to_string()),
                (
                    "redirect_uri".to_string(),
                    "https://example.test/cb".to_string()
                ),
                (
                    "scope".to_string(),
                    "https://www.googleapis.com/auth/calendar.events".to_string()
                ),
            ]
        );
    }

    #[test]
    fn extracts_token_from_fragment() {
        let token = extract_access_token(
            "http://localhost/#access_token=ya29.a0AfH6&token_type=Bearer&expires_in=3599",
        )
        .unwrap();
        assert_eq!(token, "ya29.a0AfH6");
    }

    #[test]
    fn token_is_percent_decoded() {
        let token = extract_access_token("http://localhost/#state=x&access_token=a%2Fb").unwrap();
        assert_eq!(token, "a/b");
    }

    #[test]
    fn missing_fragment_fails() {
        let err = extract_access_token("http://localhost/?access_token=abc").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[test]
    fn error_parameter_fails() {
        let err = extract_access_token("http://localhost/#error=access_denied").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("access_denied"));
    }

    #[test]
    fn empty_token_fails() {
        let err = extract_access_token("http://localhost/#access_token=&expires_in=1").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }
}
