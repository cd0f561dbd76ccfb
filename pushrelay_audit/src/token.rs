use anyhow::Result;
use log::debug;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use typed_builder::TypedBuilder;

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

/// Where the bearer token for store requests comes from.
#[derive(Debug)]
pub enum AccessTokenSource {
    Anonymous,
    Static(String),
    Metadata(MetadataTokenSource),
}

impl AccessTokenSource {
    pub async fn token(&self) -> Result<Option<String>> {
        match self {
            AccessTokenSource::Anonymous => Ok(None),
            AccessTokenSource::Static(token) => Ok(Some(token.clone())),
            AccessTokenSource::Metadata(source) => Ok(Some(source.token().await?)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Service-account token fetched from the instance metadata server and
/// cached until shortly before it expires.
#[derive(Debug, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct MetadataTokenSource {
    metadata_url: String,
    #[builder(default)]
    client: reqwest::Client,
    #[builder(setter(skip), default = RwLock::new(None))]
    cached: RwLock<Option<CachedToken>>,
}

impl MetadataTokenSource {
    pub async fn token(&self) -> Result<String> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.access_token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }
        let response = self
            .client
            .get(format!("{}{}", self.metadata_url.trim_end_matches('/'), METADATA_TOKEN_PATH))
            .header(METADATA_FLAVOR_HEADER, "Google")
            .send()
            .await?
            .error_for_status()?
            .json::<MetadataTokenResponse>()
            .await?;
        debug!("fetched access token from metadata server, expires in {}s", response.expires_in);
        let lifetime = response.expires_in.saturating_sub(TOKEN_REFRESH_MARGIN_SECS);
        *cached = Some(CachedToken {
            access_token: response.access_token.clone(),
            refresh_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(response.access_token)
    }
}
