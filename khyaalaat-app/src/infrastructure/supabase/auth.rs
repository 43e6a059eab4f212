use super::types::{GoTrueUser, PasswordCredentials, RefreshGrant, SignUpResponse, TokenResponse};
use super::{error_from_response, http_client, AuthSession};
use crate::domain::UserIdentity;
use khyaalaat_errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpResult {
    Session(AuthSession),
    ConfirmationSent,
}

/// Client for the Supabase Auth (GoTrue) REST API.
#[derive(Clone)]
pub struct SupabaseAuth {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            http_client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.endpoint(path))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Supabase auth request failed: {}", e);
            AppError::Backend(e.to_string())
        })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response("auth", response).await)
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("unexpected auth response: {e}")))
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let request = self
            .request(reqwest::Method::POST, "token?grant_type=password", &self.anon_key)
            .json(&PasswordCredentials { email, password });
        let token: TokenResponse = Self::decode(self.send(request).await?).await?;
        tracing::info!(user = %token.user.id, "Signed in with password");
        Ok(token.into_session())
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResult, AppError> {
        let request = self
            .request(reqwest::Method::POST, "signup", &self.anon_key)
            .json(&PasswordCredentials { email, password });
        let response: SignUpResponse = Self::decode(self.send(request).await?).await?;
        Ok(match response {
            SignUpResponse::Session(token) => SignUpResult::Session(token.into_session()),
            SignUpResponse::User(user) => {
                tracing::info!(user = %user.id, "Sign-up awaiting email confirmation");
                SignUpResult::ConfirmationSent
            }
        })
    }

    pub async fn sign_in_anonymously(&self) -> Result<AuthSession, AppError> {
        let request = self
            .request(reqwest::Method::POST, "signup", &self.anon_key)
            .json(&serde_json::json!({ "data": {} }));
        let token: TokenResponse = Self::decode(self.send(request).await?).await?;
        tracing::info!(user = %token.user.id, "Signed in anonymously");
        Ok(token.into_session())
    }

    /// Trades a refresh token for a new access token. The provider rotates
    /// the refresh token as well.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AppError> {
        let request = self
            .request(reqwest::Method::POST, "token?grant_type=refresh_token", &self.anon_key)
            .json(&RefreshGrant { refresh_token });
        let token: TokenResponse = Self::decode(self.send(request).await?).await?;
        tracing::debug!(user = %token.user.id, "Refreshed access token");
        Ok(token.into_session())
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let request = self.request(reqwest::Method::POST, "logout", access_token);
        self.send(request).await?;
        Ok(())
    }

    pub async fn get_user(&self, access_token: &str) -> Result<UserIdentity, AppError> {
        let request = self.request(reqwest::Method::GET, "user", access_token);
        let user: GoTrueUser = Self::decode(self.send(request).await?).await?;
        Ok(user.into_identity())
    }
}
