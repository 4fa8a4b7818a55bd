use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use scheduler_types::MemberKey;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::LtmError;

/// Login credentials for the LTM control API (the `f5` config block).
#[derive(Debug, Clone)]
pub struct F5Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Re-login this long before actual expiry so a slow fetch never races a
/// token that expires mid-request.
const REFRESH_MARGIN: chrono::Duration = chrono::Duration::seconds(30);

/// The membership-discovery surface the Fetcher depends on. Exists as a
/// trait so the Fetcher is testable against a mock without network I/O,
/// following the teacher's `mockall::automock` seam for its liquidity
/// fetcher traits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LtmClient: Send + Sync {
    async fn list_members(
        &self,
        partition: &str,
        pool_name: &str,
    ) -> Result<HashSet<MemberKey>, LtmError>;

    /// Delete the cached token from the LTM side, best-effort (§5
    /// shutdown sequence). Never returns an error: a failed revoke just
    /// means the token expires on its own later.
    async fn logout(&self);
}

#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn needs_refresh(&self) -> bool {
        self.expires_at - Utc::now() <= REFRESH_MARGIN
    }
}

/// `reqwest`-backed `LtmClient`. Models the LTM login/member-list wire shape
/// as name/value/expiry and a flat member list; the real LTM's exact JSON
/// schema is out of this crate's scope (§1 "Out of scope: the LTM control
/// API ... treated as an opaque token-authenticated REST service") so this
/// is a documented assumption, not a contract under test.
pub struct LtmHttpClient {
    http: Client,
    credentials: F5Credentials,
    token: RwLock<Option<CachedToken>>,
}

impl LtmHttpClient {
    pub fn new(credentials: F5Credentials) -> Self {
        Self {
            http: Client::new(),
            credentials,
            token: RwLock::new(None),
        }
    }

    fn base_url(&self) -> String {
        format!("https://{}:{}", self.credentials.host, self.credentials.port)
    }

    /// Return a valid bearer token, logging in if none is cached or the
    /// cached one is within the refresh margin of expiry (§4.1).
    async fn ensure_token(&self) -> Result<String, LtmError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if !cached.needs_refresh() {
                return Ok(cached.value.clone());
            }
        }
        self.login().await
    }

    async fn login(&self) -> Result<String, LtmError> {
        let url = format!("{}/mgmt/shared/authn/login", self.base_url());
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest {
                username: &self.credentials.username,
                password: &self.credentials.password,
                login_provider_name: "tmos",
            })
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| LtmError::AuthError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LtmError::AuthError(format!(
                "login returned status {}",
                response.status()
            )));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| LtmError::AuthError(e.to_string()))?;

        let token = CachedToken {
            value: body.token.token,
            expires_at: Utc::now() + chrono::Duration::seconds(body.token.timeout.max(0)),
        };
        *self.token.write().await = Some(token.clone());
        Ok(token.value)
    }

    async fn drop_token(&self) {
        *self.token.write().await = None;
    }

    /// Best-effort DELETE against the LTM's token endpoint, then forget
    /// the cached value locally regardless of outcome.
    async fn revoke_remote(&self, token: &str) {
        let url = format!("{}/mgmt/shared/authz/tokens/{}", self.base_url(), token);
        if let Err(err) = self
            .http
            .delete(&url)
            .header("X-F5-Auth-Token", token)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            tracing::debug!(error = %err, "best-effort LTM token revoke failed");
        }
    }

    async fn get_members(
        &self,
        partition: &str,
        pool_name: &str,
        token: &str,
    ) -> Result<reqwest::Response, LtmError> {
        let url = format!(
            "{}/mgmt/tm/ltm/pool/~{}~{}/members",
            self.base_url(),
            partition,
            pool_name
        );
        self.http
            .get(&url)
            .header("X-F5-Auth-Token", token)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| LtmError::ApiError(e.to_string()))
    }
}

#[async_trait]
impl LtmClient for LtmHttpClient {
    async fn list_members(
        &self,
        partition: &str,
        pool_name: &str,
    ) -> Result<HashSet<MemberKey>, LtmError> {
        let token = self.ensure_token().await?;
        let mut response = self.get_members(partition, pool_name, &token).await?;

        // §4.1: on 401, drop the token and retry exactly once.
        if response.status() == StatusCode::UNAUTHORIZED {
            self.drop_token().await;
            let token = self.ensure_token().await?;
            response = self.get_members(partition, pool_name, &token).await?;
        }

        if !response.status().is_success() {
            return Err(LtmError::ApiError(format!(
                "pool member list returned status {}",
                response.status()
            )));
        }

        let body: MembersResponse = response
            .json()
            .await
            .map_err(|e| LtmError::ApiError(e.to_string()))?;

        body.items
            .into_iter()
            .map(|item| {
                MemberKey::parse(&item.name)
                    .ok_or_else(|| LtmError::ApiError(format!("malformed member name {:?}", item.name)))
            })
            .collect()
    }

    async fn logout(&self) {
        if let Some(token) = self.token.write().await.take() {
            self.revoke_remote(&token.value).await;
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(rename = "loginProviderName")]
    login_provider_name: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: LoginToken,
}

#[derive(Deserialize)]
struct LoginToken {
    token: String,
    timeout: i64,
}

#[derive(Deserialize)]
struct MembersResponse {
    items: Vec<MemberItem>,
}

#[derive(Deserialize)]
struct MemberItem {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn client_for(server: &MockServer) -> LtmHttpClient {
        let url = url::Url::parse(&server.uri()).unwrap();
        LtmHttpClient::new(F5Credentials {
            host: url.host_str().unwrap().to_string(),
            port: url.port().unwrap(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        })
    }

    #[tokio::test]
    async fn list_members_logs_in_then_fetches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mgmt/shared/authn/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": {"token": "tok-1", "timeout": 1200}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mgmt/tm/ltm/pool/~prod~chat/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "10.0.0.1:8000"}, {"name": "10.0.0.2:8000"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let members = client.list_members("prod", "chat").await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&MemberKey::new("10.0.0.1", 8000)));
    }

    #[tokio::test]
    async fn unauthorized_triggers_one_relogin_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mgmt/shared/authn/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": {"token": "tok-stale", "timeout": 1200}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mgmt/shared/authn/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": {"token": "tok-fresh", "timeout": 1200}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mgmt/tm/ltm/pool/~prod~chat/members"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mgmt/tm/ltm/pool/~prod~chat/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "10.0.0.1:8000"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let members = client.list_members("prod", "chat").await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn malformed_member_name_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mgmt/shared/authn/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": {"token": "tok-1", "timeout": 1200}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mgmt/tm/ltm/pool/~prod~chat/members"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "not-a-valid-endpoint"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.list_members("prod", "chat").await.is_err());
    }
}
