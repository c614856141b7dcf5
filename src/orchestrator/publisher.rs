//! 单个测验发布器 - 编排层
//!
//! 一次发布运行：校验 → 登录 → 录入 → 保存并读取分享链接 → 释放会话。
//!
//! 会话在任何结果下都只释放一次；运行中的 panic 在边界处被捕获并作为
//! 未分类错误上报，不会跨过释放步骤。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{PublicationFailure, PublishError, RemoteState};
use crate::infrastructure::{Navigator, SessionHandle};
use crate::models::{Credentials, QuizDocument};
use crate::services::{ImageResolver, SessionController};
use crate::workflow::{PublicationFinalizer, QuizTranscriber};

pub struct Publisher {
    config: Config,
    resolver: Arc<dyn ImageResolver>,
}

impl Publisher {
    pub fn new(config: Config, resolver: Arc<dyn ImageResolver>) -> Self {
        Self { config, resolver }
    }

    /// 发布一份测验，成功时返回分享链接
    ///
    /// `session` 被消耗，返回前一定已经释放。
    pub async fn publish(
        &self,
        session: SessionHandle,
        credentials: &Credentials,
        document: &QuizDocument,
        quiz_index: usize,
    ) -> Result<String, PublicationFailure> {
        // 校验失败不接触外部系统
        if let Err(e) = document.validate() {
            warn!("[测验 {}] ❌ 测验文档无效: {}", quiz_index, e);
            PublicationFinalizer::teardown(session).await;
            return Err(PublicationFailure::new(e.into(), RemoteState::Untouched));
        }

        let navigator = Navigator::from_config(session.driver(), &self.config);
        let mut transcriber = QuizTranscriber::new(
            navigator.clone(),
            Arc::clone(&self.resolver),
            self.config.timeouts.clone(),
            quiz_index,
        );

        let run = self.run(&navigator, &mut transcriber, credentials, document, quiz_index);
        let outcome = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("[测验 {}] 💥 发布过程中发生 panic: {}", quiz_index, message);
                Err(PublishError::Unclassified(anyhow::anyhow!(
                    "发布过程中发生 panic: {}",
                    message
                )))
            }
        };
        let remote_state = transcriber.progress().remote_state();

        PublicationFinalizer::teardown(session).await;

        outcome.map_err(|e| {
            error!("[测验 {}] ❌ 发布失败: {}", quiz_index, e);
            if let RemoteState::PartialDraft { questions_entered } = remote_state {
                warn!(
                    "[测验 {}] ⚠️ 账户中可能残留未完成的草稿 (已录入 {} 题)",
                    quiz_index, questions_entered
                );
            }
            PublicationFailure::new(e, remote_state)
        })
    }

    async fn run(
        &self,
        navigator: &Navigator,
        transcriber: &mut QuizTranscriber,
        credentials: &Credentials,
        document: &QuizDocument,
        quiz_index: usize,
    ) -> Result<String, PublishError> {
        let mut controller = SessionController::new(
            navigator.clone(),
            self.config.login_url.clone(),
            self.config.timeouts.clone(),
        );
        controller.authenticate(credentials).await?;

        transcriber.transcribe(document).await?;
        info!(
            "[测验 {}] ✓ 已录入 {} 道题目",
            quiz_index,
            transcriber.progress().questions_entered
        );

        PublicationFinalizer::new(navigator.clone(), self.config.timeouts.clone())
            .finalize()
            .await
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知 panic".to_string()
    }
}
