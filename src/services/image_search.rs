//! 图片搜索与下载 - 业务能力层
//!
//! 只负责“给出候选图片地址”和“下载单张图片”两种能力

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ImageSearchSettings;
use crate::error::MediaError;

/// 图片搜索：按排名顺序返回候选图片地址
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn candidates(&self, query: &str) -> Result<Vec<String>, MediaError>;
}

/// 图片下载：返回原始字节
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaError>;
}

/// SerpApi 图片搜索
pub struct SerpApiSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    engine: String,
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    images_results: Vec<SerpApiImage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpApiImage {
    #[serde(default)]
    original: Option<String>,
}

impl SerpApiSearch {
    pub fn new(settings: &ImageSearchSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            engine: settings.engine.clone(),
        }
    }

    fn search_error(query: &str, reason: impl ToString) -> MediaError {
        MediaError::Search {
            query: query.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ImageSearch for SerpApiSearch {
    async fn candidates(&self, query: &str) -> Result<Vec<String>, MediaError> {
        debug!("图片搜索: {}", query);

        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("engine", self.engine.as_str()),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Self::search_error(query, e))?;

        let status = response.status();
        let body: SerpApiResponse = response
            .json()
            .await
            .map_err(|e| Self::search_error(query, e))?;

        interpret_response(query, status, body)
    }
}

/// SerpApi 在没有结果时也返回 2xx 和 `error` 字段，这种情况是空候选列表而不是搜索失败
fn interpret_response(
    query: &str,
    status: reqwest::StatusCode,
    body: SerpApiResponse,
) -> Result<Vec<String>, MediaError> {
    if !status.is_success() {
        let reason = body
            .error
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(SerpApiSearch::search_error(query, reason));
    }
    if let Some(error) = &body.error {
        if body.images_results.is_empty() {
            debug!("图片搜索无结果 (查询: `{}`): {}", query, error);
            return Ok(Vec::new());
        }
    }
    Ok(extract_candidates(body))
}

fn extract_candidates(body: SerpApiResponse) -> Vec<String> {
    body.images_results
        .into_iter()
        .filter_map(|image| image.original)
        .filter(|url| !url.is_empty())
        .collect()
}

/// 基于 HTTP 的图片下载
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::Fetch {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let fetch_error = |reason: String| MediaError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
