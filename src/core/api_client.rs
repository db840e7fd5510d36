use crate::config::toml_config::ClientConfig;
use crate::domain::ports::TokenStore;
use crate::domain::token::is_token_expired_with_skew;
use crate::utils::error::{extract_api_message, ClientError, Result};
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Public,
}

/// Thin REST client: base URL handling, bearer attachment, envelope
/// unwrapping and error translation.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
    expiry_skew: chrono::Duration,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let mut api = Self::with_timeout(&config.api.base_url, tokens, config.request_timeout())?;
        api.expiry_skew = chrono::Duration::seconds(config.auth.expiry_skew_seconds);
        Ok(api)
    }

    pub fn with_timeout(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        timeout: Duration,
    ) -> Result<Self> {
        // 確保 join 時不會吃掉最後一段路徑 (例如 /api)
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("elevator-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            tokens,
            expiry_skew: chrono::Duration::zero(),
        })
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Access token for an authenticated call, checked locally before any request.
    fn bearer_token(&self) -> Result<String> {
        let token = self
            .tokens
            .access_token()?
            .ok_or(ClientError::NotAuthenticated)?;

        if is_token_expired_with_skew(&token, Utc::now(), self.expiry_skew) {
            tracing::info!("Access token expired locally, login required");
            return Err(ClientError::SessionExpired);
        }
        Ok(token)
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        tracing::debug!("➡️  {} {}", method, url);
        let mut builder = self.client.request(method, url);
        if auth == Auth::Bearer {
            builder = builder.bearer_auth(self.bearer_token()?);
        }
        Ok(builder)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path, Auth::Bearer)?;
        self.send(builder, Auth::Bearer).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let builder = self.request(Method::GET, path, Auth::Bearer)?.query(query);
        self.send(builder, Auth::Bearer).await
    }

    /// GET a collection, accepting bare arrays and `{ "content": [...] }` pages.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>> {
        let value: Value = self.get_query(path, query).await?;
        let items = match value {
            Value::Object(mut obj) if obj.get("content").is_some_and(Value::is_array) => {
                obj.remove("content").unwrap_or(Value::Null)
            }
            Value::Null => Value::Array(Vec::new()),
            other => other,
        };
        Ok(serde_json::from_value(items)?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, Auth::Bearer)?.json(body);
        self.send(builder, Auth::Bearer).await
    }

    /// POST without bearer token (login).
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path, Auth::Public)?.json(body);
        self.send(builder, Auth::Public).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path, Auth::Bearer)?.json(body);
        self.send(builder, Auth::Bearer).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PATCH, path, Auth::Bearer)?.json(body);
        self.send(builder, Auth::Bearer).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path, Auth::Bearer)?;
        let _: Value = self.send(builder, Auth::Bearer).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, auth: Auth) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("⬅️  {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(self.error_for(status, &body, auth));
        }

        let value: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };

        let value = unwrap_envelope(value).map_err(|message| ClientError::ApiError {
            status: status.as_u16(),
            message,
        })?;
        Ok(serde_json::from_value(value)?)
    }

    fn error_for(&self, status: StatusCode, body: &str, auth: Auth) -> ClientError {
        let message = extract_api_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        tracing::debug!("API error {}: {}", status, message);

        match status {
            // 登入以外的 401 代表 token 已失效，清掉以便重新登入
            StatusCode::UNAUTHORIZED if auth == Auth::Bearer => {
                if let Err(e) = self.tokens.clear() {
                    tracing::warn!("Failed to clear stored tokens: {}", e);
                }
                ClientError::Unauthorized { message }
            }
            StatusCode::FORBIDDEN => ClientError::Forbidden { message },
            _ => ClientError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Strip `{ success, data, message }` envelopes; `success: false` is an error.
fn unwrap_envelope(value: Value) -> std::result::Result<Value, String> {
    match value {
        Value::Object(mut obj) => {
            if obj.get("success").and_then(Value::as_bool) == Some(false) {
                let message = extract_api_message(&Value::Object(obj).to_string())
                    .unwrap_or_else(|| "Request was not successful".to_string());
                return Err(message);
            }
            if obj.contains_key("data") {
                Ok(obj.remove("data").unwrap_or(Value::Null))
            } else {
                Ok(Value::Object(obj))
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryTokenStore;
    use crate::domain::token::make_test_token;
    use serde_json::json;

    fn client(base: &str, store: MemoryTokenStore) -> ApiClient {
        ApiClient::with_timeout(base, Arc::new(store), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let api = client("http://localhost:8080/api", MemoryTokenStore::new());
        assert_eq!(
            api.url("/elevators/3").unwrap().as_str(),
            "http://localhost:8080/api/elevators/3"
        );
        assert_eq!(
            api.url("qr/validate").unwrap().as_str(),
            "http://localhost:8080/api/qr/validate"
        );
    }

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(
            unwrap_envelope(json!({"success": true, "data": [1, 2]})).unwrap(),
            json!([1, 2])
        );
        assert_eq!(
            unwrap_envelope(json!({"id": 1})).unwrap(),
            json!({"id": 1})
        );
        assert_eq!(
            unwrap_envelope(json!({"success": false, "message": "Kayıt yok"})).unwrap_err(),
            "Kayıt yok"
        );
    }

    #[test]
    fn test_bearer_token_checks() {
        let api = client("http://localhost", MemoryTokenStore::new());
        assert!(matches!(api.bearer_token(), Err(ClientError::NotAuthenticated)));

        let expired = make_test_token(json!({"exp": 1}));
        let api = client("http://localhost", MemoryTokenStore::with_access_token(expired));
        assert!(matches!(api.bearer_token(), Err(ClientError::SessionExpired)));

        let valid = make_test_token(json!({"exp": Utc::now().timestamp() + 3600}));
        let api = client(
            "http://localhost",
            MemoryTokenStore::with_access_token(valid.clone()),
        );
        assert_eq!(api.bearer_token().unwrap(), valid);
    }
}
