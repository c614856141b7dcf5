//! 测验录入 - 流程层
//!
//! 按固定顺序把一份 `QuizDocument` 录入到创建页：
//! 新建空白测验 → 设置（标题、描述、封面）→ 逐题录入。
//! 顺序即保证，不会重排题目或步骤。

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Timeouts;
use crate::error::{PublishError, RemoteState};
use crate::infrastructure::{anchors, Navigator};
use crate::models::QuizDocument;
use crate::services::ImageResolver;
use crate::workflow::media_step::upload_image;
use crate::workflow::question_ctx::QuestionCtx;
use crate::workflow::question_flow::QuestionFlow;

/// 录入阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionStage {
    NotStarted,
    CanvasOpen,
    MetadataEntered,
    /// 正在录入第 `position` 题（从1开始）
    Question { position: usize },
    Completed,
}

/// 外部系统上已经发生的改动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptionProgress {
    pub stage: TranscriptionStage,
    pub questions_entered: usize,
    pub add_question_triggers: usize,
}

impl Default for TranscriptionProgress {
    fn default() -> Self {
        Self {
            stage: TranscriptionStage::NotStarted,
            questions_entered: 0,
            add_question_triggers: 0,
        }
    }
}

impl TranscriptionProgress {
    /// 空白测验一旦打开，创建页就会逐步保存改动
    pub fn remote_state(&self) -> RemoteState {
        match self.stage {
            TranscriptionStage::NotStarted => RemoteState::Untouched,
            _ => RemoteState::PartialDraft {
                questions_entered: self.questions_entered,
            },
        }
    }
}

pub struct QuizTranscriber {
    navigator: Navigator,
    resolver: Arc<dyn ImageResolver>,
    timeouts: Timeouts,
    question_flow: QuestionFlow,
    progress: TranscriptionProgress,
    quiz_index: usize,
}

impl QuizTranscriber {
    pub fn new(
        navigator: Navigator,
        resolver: Arc<dyn ImageResolver>,
        timeouts: Timeouts,
        quiz_index: usize,
    ) -> Self {
        let question_flow =
            QuestionFlow::new(navigator.clone(), Arc::clone(&resolver), timeouts.clone());
        Self {
            navigator,
            resolver,
            timeouts,
            question_flow,
            progress: TranscriptionProgress::default(),
            quiz_index,
        }
    }

    pub fn progress(&self) -> TranscriptionProgress {
        self.progress
    }

    fn enter_stage(&mut self, stage: TranscriptionStage) {
        debug!(
            "[测验 {}] 阶段: {:?} → {:?}",
            self.quiz_index, self.progress.stage, stage
        );
        self.progress.stage = stage;
    }

    /// 完整录入
    pub async fn transcribe(&mut self, document: &QuizDocument) -> Result<(), PublishError> {
        self.open_blank_canvas().await?;
        self.enter_metadata(document).await?;
        self.enter_questions(document).await?;
        self.enter_stage(TranscriptionStage::Completed);
        Ok(())
    }

    /// 新建空白测验
    async fn open_blank_canvas(&mut self) -> Result<(), PublishError> {
        let wait = self.timeouts.default_wait();

        // 订阅推广弹窗出现时刷新页面即可关闭
        if self
            .navigator
            .appears_within(&anchors::promo_frame(), self.timeouts.promo_frame())
            .await?
        {
            info!("[测验 {}] 检测到推广弹窗，刷新页面", self.quiz_index);
            self.navigator.reload().await?;
        }

        self.navigator
            .wait_and_click(&anchors::create_menu(), wait)
            .await?;
        self.navigator
            .wait_and_click(&anchors::create_kahoot(), wait)
            .await?;
        self.navigator
            .wait_and_click(&anchors::blank_canvas(), wait)
            .await?;

        self.enter_stage(TranscriptionStage::CanvasOpen);
        info!("[测验 {}] ✓ 已新建空白测验", self.quiz_index);
        Ok(())
    }

    /// 标题、描述、封面
    async fn enter_metadata(&mut self, document: &QuizDocument) -> Result<(), PublishError> {
        let wait = self.timeouts.default_wait();
        info!("[测验 {}] 📝 正在填写测验设置...", self.quiz_index);

        self.navigator
            .wait_and_click(&anchors::settings_button(), wait)
            .await?;
        self.navigator
            .wait_and_type(&anchors::settings_title(), document.title.trim(), wait)
            .await?;
        if !document.description.trim().is_empty() {
            self.navigator
                .wait_and_type(
                    &anchors::settings_description(),
                    document.description.trim(),
                    wait,
                )
                .await?;
        }

        self.navigator
            .wait_and_click(&anchors::cover_image_library(), wait)
            .await?;
        self.navigator
            .wait_and_click(&anchors::open_upload_dialog(), wait)
            .await?;
        upload_image(
            &self.navigator,
            self.resolver.as_ref(),
            &document.cover_image_query,
            &anchors::cover_attached(),
            wait,
            self.timeouts.upload(),
        )
        .await?;

        self.navigator
            .wait_and_click(&anchors::settings_done(), wait)
            .await?;

        self.enter_stage(TranscriptionStage::MetadataEntered);
        info!("[测验 {}] ✓ 测验设置完成", self.quiz_index);
        Ok(())
    }

    /// 逐题录入；每题之后（最后一题除外）新建下一个题目块
    async fn enter_questions(&mut self, document: &QuizDocument) -> Result<(), PublishError> {
        for (index, question) in document.questions.iter().enumerate() {
            let Some(ctx) = QuestionCtx::for_index(document, index, self.quiz_index) else {
                break;
            };
            self.enter_stage(TranscriptionStage::Question {
                position: ctx.position,
            });

            self.question_flow.enter(question, &ctx).await?;
            self.progress.questions_entered += 1;

            if let Some(next_kind) = ctx.next_kind {
                self.progress.add_question_triggers += 1;
                self.question_flow.add_block(next_kind, &ctx).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_state_follows_stage() {
        let mut progress = TranscriptionProgress::default();
        assert_eq!(progress.remote_state(), RemoteState::Untouched);

        progress.stage = TranscriptionStage::CanvasOpen;
        assert_eq!(
            progress.remote_state(),
            RemoteState::PartialDraft {
                questions_entered: 0
            }
        );

        progress.stage = TranscriptionStage::Question { position: 3 };
        progress.questions_entered = 2;
        assert_eq!(
            progress.remote_state(),
            RemoteState::PartialDraft {
                questions_entered: 2
            }
        );
    }
}
