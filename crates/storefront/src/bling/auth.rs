//! Bling OAuth token endpoint.
//!
//! Handles both grants the storefront uses against `POST /oauth/token`:
//! `refresh_token` (on every expired access token) and `authorization_code`
//! (once, when an operator connects the store).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{BlingError, truncate_body};
use super::token::TokenRecord;
use crate::config::BlingConfig;

/// Token endpoint path, relative to the API base URL.
pub const TOKEN_ENDPOINT: &str = "/oauth/token";

/// Response body from the token endpoint.
///
/// Every field is optional so that a malformed response is reported as a
/// missing token rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Build a token record issued at `issued_at_ms`.
    ///
    /// Bling does not always rotate the refresh token; when the response
    /// omits it, `prior_refresh` is carried over.
    pub(crate) fn into_record(
        self,
        prior_refresh: Option<&SecretString>,
        issued_at_ms: i64,
    ) -> Result<TokenRecord, BlingError> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(BlingError::MissingAccessToken)?;

        let refresh_token = match self.refresh_token.filter(|t| !t.is_empty()) {
            Some(token) => SecretString::from(token),
            None => prior_refresh.cloned().ok_or(BlingError::MissingRefreshToken)?,
        };

        let expires_in = self.expires_in.unwrap_or(0);

        Ok(TokenRecord {
            access_token: SecretString::from(access_token),
            refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: self.scope,
            expires_in,
            expires_at: TokenRecord::expiry_from(issued_at_ms, expires_in),
        })
    }
}

/// Build the HTTP Basic credential from the app's client id and secret.
#[must_use]
pub fn basic_auth_value(client_id: &str, client_secret: &SecretString) -> String {
    let raw = format!("{client_id}:{}", client_secret.expose_secret());
    format!("Basic {}", STANDARD.encode(raw))
}

/// Exchange a refresh token for a new token pair.
///
/// # Errors
///
/// Returns `BlingError::MissingRefreshToken` without touching the network if
/// `refresh_token` is empty, `BlingError::AuthExpired` if Bling rejects the
/// refresh, `BlingError::MissingAccessToken` if the response carries no
/// access token, and `BlingError::Http` on network failures.
#[instrument(skip(http, config, refresh_token))]
pub async fn refresh_access_token(
    http: &reqwest::Client,
    config: &BlingConfig,
    refresh_token: &SecretString,
) -> Result<TokenRecord, BlingError> {
    if refresh_token.expose_secret().is_empty() {
        return Err(BlingError::MissingRefreshToken);
    }

    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token.expose_secret()),
    ];
    request_token(http, config, &form, Some(refresh_token)).await
}

/// Exchange an authorization code from the Bling consent screen for the
/// first token pair.
///
/// # Errors
///
/// Returns `BlingError::InvalidInput` for an empty code, otherwise the same
/// errors as [`refresh_access_token`].
#[instrument(skip(http, config, code))]
pub async fn exchange_authorization_code(
    http: &reqwest::Client,
    config: &BlingConfig,
    code: &str,
) -> Result<TokenRecord, BlingError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(BlingError::InvalidInput(
            "authorization code is empty".to_string(),
        ));
    }

    let form = [("grant_type", "authorization_code"), ("code", code)];
    request_token(http, config, &form, None).await
}

async fn request_token(
    http: &reqwest::Client,
    config: &BlingConfig,
    form: &[(&str, &str)],
    prior_refresh: Option<&SecretString>,
) -> Result<TokenRecord, BlingError> {
    let issued_at = chrono::Utc::now().timestamp_millis();

    let response = http
        .post(config.endpoint(TOKEN_ENDPOINT))
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_value(&config.client_id, &config.client_secret),
        )
        .header(reqwest::header::ACCEPT, "application/json")
        .form(form)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %truncate_body(&body),
            "Bling token endpoint rejected the request"
        );
        return Err(BlingError::AuthExpired(format!(
            "token endpoint returned HTTP {status}: {}",
            body.chars().take(200).collect::<String>()
        )));
    }

    // A body that is not JSON at all is treated like one without a token
    let token_response: TokenResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            body = %truncate_body(&body),
            "Bling token endpoint returned an unreadable body"
        );
        TokenResponse::default()
    });
    let record = token_response.into_record(prior_refresh, issued_at)?;

    tracing::info!(
        expires_at = record.expires_at,
        scope = record.scope.as_deref().unwrap_or(""),
        "Obtained Bling access token"
    );

    Ok(record)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> TokenResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_record_from_full_response() {
        let record = response(serde_json::json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "token_type": "Bearer",
            "scope": "98309 5990556",
            "expires_in": 21600
        }))
        .into_record(None, 1_700_000_000_000)
        .unwrap();

        assert!(record.has_access_token("new-access"));
        assert_eq!(record.refresh_token.expose_secret(), "new-refresh");
        assert_eq!(record.expires_in, 21_600);
        assert_eq!(record.expires_at, 1_700_000_000_000 + 21_600_000);
        assert_eq!(record.scope.as_deref(), Some("98309 5990556"));
    }

    #[test]
    fn test_missing_refresh_token_keeps_prior() {
        let prior = SecretString::from("old-refresh");
        let record = response(serde_json::json!({
            "access_token": "new-access",
            "expires_in": 60
        }))
        .into_record(Some(&prior), 0)
        .unwrap();

        assert_eq!(record.refresh_token.expose_secret(), "old-refresh");
        assert_eq!(record.token_type, "Bearer");
    }

    #[test]
    fn test_missing_access_token_is_hard_failure() {
        let prior = SecretString::from("old-refresh");
        let err = response(serde_json::json!({ "refresh_token": "r", "expires_in": 60 }))
            .into_record(Some(&prior), 0)
            .unwrap_err();
        assert!(matches!(err, BlingError::MissingAccessToken));
        assert_eq!(err.to_string(), "missing access token");

        let err = response(serde_json::json!({ "access_token": "" }))
            .into_record(Some(&prior), 0)
            .unwrap_err();
        assert!(matches!(err, BlingError::MissingAccessToken));
    }

    #[test]
    fn test_code_exchange_requires_refresh_token() {
        let err = response(serde_json::json!({ "access_token": "a", "expires_in": 60 }))
            .into_record(None, 0)
            .unwrap_err();
        assert!(matches!(err, BlingError::MissingRefreshToken));
    }

    #[tokio::test]
    async fn test_unreadable_body_is_missing_token() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let config = BlingConfig::new(server.uri(), "client", SecretString::from("secret"));
        let err = refresh_access_token(
            &reqwest::Client::new(),
            &config,
            &SecretString::from("r1"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BlingError::MissingAccessToken), "got {err:?}");
    }

    #[test]
    fn test_basic_auth_value() {
        let value = basic_auth_value("client", &SecretString::from("secret"));
        assert_eq!(value, "Basic Y2xpZW50OnNlY3JldA==");
    }
}
