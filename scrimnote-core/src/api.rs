//! Comment and roster API client using reqwest.
//!
//! The server exposes comments under `{base}/comments` and the mention roster
//! at `{base}/user-mappings`. Every write answers with a `{success, ...}`
//! envelope; a non-2xx status or `success: false` becomes
//! [`Error::Rejected`] carrying the server's message when it sent one.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Comment, CommentId, CommentPatch, MentionUser, NewComment, ScrimId};

/// Tracing target for API client operations.
pub const TRACING_TARGET: &str = "scrimnote_core::api";

/// Default timeout for HTTP requests: 15 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Comment CRUD as offered by the server.
#[async_trait::async_trait]
pub trait CommentApi: Send + Sync {
    async fn list(&self, scrim_id: &ScrimId) -> Result<Vec<Comment>>;
    async fn create(&self, comment: &NewComment) -> Result<Comment>;
    async fn update(&self, id: CommentId, patch: &CommentPatch) -> Result<Comment>;
    async fn remove(&self, id: CommentId) -> Result<()>;
}

/// Source of the names offered by the mention composer.
#[async_trait::async_trait]
pub trait RosterSource: Send + Sync {
    async fn user_mappings(&self) -> Result<Vec<MentionUser>>;
}

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("scrimnote/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    success: bool,
    #[serde(default)]
    comments: Vec<Comment>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentEnvelope {
    success: bool,
    comment: Option<Comment>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: bool,
    message: Option<String>,
}

/// Common view over the `{success, message}` part of every envelope.
trait Envelope {
    fn success(&self) -> bool;
    fn message(&mut self) -> Option<String>;
}

macro_rules! impl_envelope {
    ($($ty:ty),*) => {$(
        impl Envelope for $ty {
            fn success(&self) -> bool {
                self.success
            }
            fn message(&mut self) -> Option<String> {
                self.message.take()
            }
        }
    )*};
}

impl_envelope!(ListEnvelope, CommentEnvelope, AckEnvelope);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

struct HttpApiInner {
    http: Client,
    config: ApiConfig,
}

impl std::fmt::Debug for HttpApiInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiInner")
            .field("base_url", &self.config.base_url.as_str())
            .field("has_token", &self.config.token.is_some())
            .finish_non_exhaustive()
    }
}

/// reqwest implementation of [`CommentApi`] and [`RosterSource`].
#[derive(Clone, Debug)]
pub struct HttpApi {
    inner: Arc<HttpApiInner>,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ApiConfig) -> Result<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            timeout_ms = config.timeout.as_millis(),
            "Creating API client"
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { inner: Arc::new(HttpApiInner { http, config }) })
    }

    /// `base` with `segments` appended as path segments (percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.inner.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T>(&self, operation: &'static str, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.authorize(request).send().await.inspect_err(|err| {
            tracing::warn!(target: TRACING_TARGET, operation, error = %err, "Request failed");
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!(target: TRACING_TARGET, operation, status = status.as_u16(), %message, "Server rejected request");
            return Err(Error::Rejected { operation, message });
        }

        Ok(response.json::<T>().await?)
    }

    async fn send_envelope<T>(&self, operation: &'static str, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned + Envelope,
    {
        let mut envelope: T = self.send(operation, request).await?;
        if !envelope.success() {
            let message = envelope
                .message()
                .unwrap_or_else(|| "server reported failure".to_owned());
            tracing::warn!(target: TRACING_TARGET, operation, %message, "Server returned success=false");
            return Err(Error::Rejected { operation, message });
        }
        Ok(envelope)
    }
}

#[async_trait::async_trait]
impl CommentApi for HttpApi {
    async fn list(&self, scrim_id: &ScrimId) -> Result<Vec<Comment>> {
        let url = self.endpoint(&["comments", "scrim", scrim_id.as_str()])?;
        let envelope: ListEnvelope = self
            .send_envelope("load comments", self.inner.http.get(url))
            .await?;
        tracing::debug!(target: TRACING_TARGET, scrim_id = %scrim_id, count = envelope.comments.len(), "Fetched comments");
        Ok(envelope.comments)
    }

    async fn create(&self, comment: &NewComment) -> Result<Comment> {
        let url = self.endpoint(&["comments", ""])?;
        let envelope: CommentEnvelope = self
            .send_envelope("create comment", self.inner.http.post(url).json(comment))
            .await?;
        envelope.comment.ok_or_else(|| Error::Rejected {
            operation: "create comment",
            message: "response carried no comment".to_owned(),
        })
    }

    async fn update(&self, id: CommentId, patch: &CommentPatch) -> Result<Comment> {
        let url = self.endpoint(&["comments", &id.to_string()])?;
        let envelope: CommentEnvelope = self
            .send_envelope("update comment", self.inner.http.put(url).json(patch))
            .await?;
        envelope.comment.ok_or_else(|| Error::Rejected {
            operation: "update comment",
            message: "response carried no comment".to_owned(),
        })
    }

    async fn remove(&self, id: CommentId) -> Result<()> {
        let url = self.endpoint(&["comments", &id.to_string()])?;
        let _: AckEnvelope = self
            .send_envelope("delete comment", self.inner.http.delete(url))
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RosterSource for HttpApi {
    async fn user_mappings(&self) -> Result<Vec<MentionUser>> {
        let url = self.endpoint(&["user-mappings"])?;
        let users: Vec<MentionUser> = self.send("load roster", self.inner.http.get(url)).await?;
        tracing::debug!(target: TRACING_TARGET, count = users.len(), "Fetched roster");
        Ok(users)
    }
}
