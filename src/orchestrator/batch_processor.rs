//! 批量测验发布器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：读取凭据、创建图片解析服务、初始化结果文件
//! 2. **批量加载**：扫描并加载所有待发布的测验
//! 3. **依次发布**：每个测验使用一个新的浏览器会话，同一时间只有一个会话
//! 4. **全局统计**：汇总所有测验的发布结果

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{PublicationFailure, PublishError, RemoteState};
use crate::models::{Credentials, QuizFile};
use crate::orchestrator::publisher::Publisher;
use crate::services::{HttpImageFetcher, MediaResolver, ResultWriter, SerpApiSearch};
use crate::utils::logging::{
    log_quiz_complete, log_quiz_start, log_quizzes_loaded, log_startup, print_final_stats,
};

/// 应用主结构
pub struct App {
    config: Config,
    credentials: Credentials,
    publisher: Publisher,
    writer: ResultWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.quiz_path, config.browser.headless);

        let credentials = Credentials::from_env()?;

        let search = Arc::new(SerpApiSearch::new(&config.image_search));
        let fetcher = Arc::new(HttpImageFetcher::new(Duration::from_millis(
            config.image_search.fetch_timeout_ms,
        ))?);
        let resolver = Arc::new(MediaResolver::new(
            search,
            fetcher,
            config.image_search.temp_dir(),
        ));

        let writer = ResultWriter::new(config.output_log_file.clone());
        writer.init()?;

        let publisher = Publisher::new(config.clone(), resolver);

        Ok(Self {
            config,
            credentials,
            publisher,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let quizzes = self.load_quizzes().await?;

        if quizzes.is_empty() {
            warn!("⚠️ 没有找到待发布的测验文件，程序结束");
            return Ok(());
        }
        log_quizzes_loaded(quizzes.len());

        let stats = self.publish_all(&quizzes).await;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.partial_drafts,
            stats.total,
            self.writer.path(),
        );

        // 有失败时以非零状态退出
        if stats.failed > 0 {
            anyhow::bail!(
                "{} 个测验发布失败，其中 {} 个可能在账户中残留草稿",
                stats.failed,
                stats.partial_drafts
            );
        }
        Ok(())
    }

    async fn load_quizzes(&self) -> Result<Vec<QuizFile>> {
        info!("\n📁 正在扫描待发布的测验...");
        crate::models::load_quiz_files(&self.config.quiz_path).await
    }

    /// 依次发布所有测验；单个测验失败不影响后续测验
    async fn publish_all(&self, quizzes: &[QuizFile]) -> PublishingStats {
        let mut stats = PublishingStats {
            total: quizzes.len(),
            ..Default::default()
        };

        for (idx, quiz) in quizzes.iter().enumerate() {
            let quiz_index = idx + 1;
            let document = &quiz.document;
            log_quiz_start(quiz_index, stats.total, &document.title, document.questions.len());

            let result = match browser::launch_session(&self.config.browser).await {
                Ok(session) => {
                    self.publisher
                        .publish(session, &self.credentials, document, quiz_index)
                        .await
                }
                Err(e) => {
                    error!("[测验 {}] ❌ 无法启动浏览器会话: {:#}", quiz_index, e);
                    Err(PublicationFailure::new(
                        PublishError::Unclassified(e),
                        RemoteState::Untouched,
                    ))
                }
            };

            let written = match &result {
                Ok(link) => {
                    stats.success += 1;
                    log_quiz_complete(quiz_index, link);
                    self.writer.write_success(&document.title, link)
                }
                Err(failure) => {
                    stats.failed += 1;
                    if failure.left_partial_draft() {
                        stats.partial_drafts += 1;
                    }
                    self.writer.write_failure(&document.title, failure)
                }
            };
            if let Err(e) = written {
                error!("[测验 {}] 写入结果文件失败: {}", quiz_index, e);
            }
        }

        stats
    }
}

/// 发布统计
#[derive(Debug, Default)]
struct PublishingStats {
    success: usize,
    failed: usize,
    partial_drafts: usize,
    total: usize,
}
