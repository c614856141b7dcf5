//! 图片解析服务 - 业务能力层
//!
//! 把一段文字查询变成一个本地 JPEG 文件：按排名依次尝试候选图片，
//! 第一个成功下载并解码的候选被转换为 RGB 并写入新的临时文件。
//! 调用之间没有共享状态，相同的查询会重新完整搜索一次。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat};
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::error::MediaError;
use crate::services::image_search::{ImageFetcher, ImageSearch};

const JPEG_QUALITY: u8 = 90;

/// 临时图片文件，随 drop 删除
#[derive(Debug)]
pub struct ImageAsset {
    path: TempPath,
    source_url: String,
}

impl ImageAsset {
    pub fn new(path: TempPath, source_url: impl Into<String>) -> Self {
        Self {
            path,
            source_url: source_url.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

/// 图片解析能力
#[async_trait]
pub trait ImageResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<ImageAsset, MediaError>;
}

pub struct MediaResolver {
    search: Arc<dyn ImageSearch>,
    fetcher: Arc<dyn ImageFetcher>,
    temp_dir: PathBuf,
}

impl MediaResolver {
    pub fn new(
        search: Arc<dyn ImageSearch>,
        fetcher: Arc<dyn ImageFetcher>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            search,
            fetcher,
            temp_dir: temp_dir.into(),
        }
    }

    /// 下载并解码单个候选
    async fn try_candidate(&self, url: &str) -> Result<DynamicImage, MediaError> {
        let bytes = self.fetcher.fetch(url).await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    /// 转为 RGB 并编码为 JPEG
    fn store(&self, image: DynamicImage, source_url: &str) -> Result<ImageAsset, MediaError> {
        let normalized = DynamicImage::ImageRgb8(image.to_rgb8());

        let mut file = tempfile::Builder::new()
            .prefix("quiz-image-")
            .suffix(".jpg")
            .tempfile_in(&self.temp_dir)?;
        normalized.write_to(file.as_file_mut(), ImageOutputFormat::Jpeg(JPEG_QUALITY))?;

        Ok(ImageAsset::new(file.into_temp_path(), source_url))
    }
}

#[async_trait]
impl ImageResolver for MediaResolver {
    async fn resolve(&self, query: &str) -> Result<ImageAsset, MediaError> {
        let candidates = self.search.candidates(query).await?;
        debug!("查询 `{}` 共 {} 个候选图片", query, candidates.len());

        let mut attempts = 0;
        for url in &candidates {
            attempts += 1;
            match self.try_candidate(url).await {
                Ok(image) => {
                    let asset = self.store(image, url)?;
                    info!(
                        "🖼️ 图片就绪 (第 {}/{} 个候选): {}",
                        attempts,
                        candidates.len(),
                        asset.path().display()
                    );
                    return Ok(asset);
                }
                Err(e) => {
                    debug!("候选图片不可用，尝试下一个: {}", e);
                }
            }
        }

        warn!("⚠️ 查询 `{}` 的 {} 个候选图片全部失败", query, attempts);
        Err(MediaError::NoImageAvailable {
            query: query.to_string(),
            attempts,
        })
    }
}
