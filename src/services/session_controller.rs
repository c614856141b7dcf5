//! 登录服务 - 业务能力层
//!
//! 状态机：`Unauthenticated → PendingAuthResult → {Authenticated | CredentialRejected}`
//!
//! 登录页没有明确的成功标志，只能在时限内没有出现错误提示时视为登录成功。

use tracing::{debug, info, warn};

use crate::config::Timeouts;
use crate::error::{NavResult, PublishError};
use crate::infrastructure::{anchors, Navigator};
use crate::models::Credentials;

/// 错误提示没有文字时使用的原因
pub const DEFAULT_REJECTION_REASON: &str = "Invalid username, email, or password.";

/// 登录状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    PendingAuthResult,
    Authenticated,
    CredentialRejected { reason: String },
}

pub struct SessionController {
    navigator: Navigator,
    login_url: String,
    timeouts: Timeouts,
    state: AuthState,
}

impl SessionController {
    pub fn new(navigator: Navigator, login_url: impl Into<String>, timeouts: Timeouts) -> Self {
        Self {
            navigator,
            login_url: login_url.into(),
            timeouts,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// 登录
    ///
    /// 凭据被拒绝时返回 `PublishError::CredentialRejected`
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<(), PublishError> {
        info!("🔐 正在登录...");
        self.navigator.navigate(&self.login_url).await?;

        self.dismiss_consent().await?;
        self.submit(credentials).await?;
        self.state = AuthState::PendingAuthResult;

        let outcome = self.await_auth_result().await?;
        self.state = outcome.clone();

        match outcome {
            AuthState::CredentialRejected { reason } => {
                warn!("❌ 登录被拒绝: {}", reason);
                Err(PublishError::CredentialRejected { reason })
            }
            _ => {
                info!("✓ 登录完成");
                Ok(())
            }
        }
    }

    /// Cookie 同意弹窗不一定出现
    async fn dismiss_consent(&self) -> NavResult<()> {
        let dismissed = self
            .navigator
            .click_if_present(&anchors::consent_reject(), self.timeouts.consent())
            .await?;
        debug!("同意弹窗: {}", if dismissed { "已拒绝" } else { "未出现" });
        Ok(())
    }

    async fn submit(&self, credentials: &Credentials) -> NavResult<()> {
        let wait = self.timeouts.default_wait();
        self.navigator
            .wait_and_type(&anchors::login_identity(), &credentials.identity, wait)
            .await?;
        self.navigator
            .wait_and_type(&anchors::login_secret(), &credentials.secret, wait)
            .await?;
        self.navigator
            .wait_and_click(&anchors::login_submit(), wait)
            .await
    }

    /// 在时限内等待错误提示；超时即视为登录成功
    async fn await_auth_result(&self) -> NavResult<AuthState> {
        let error_anchor = anchors::login_error();
        if !self
            .navigator
            .appears_within(&error_anchor, self.timeouts.auth_error())
            .await?
        {
            return Ok(AuthState::Authenticated);
        }

        let reason = self
            .navigator
            .read_text(&error_anchor)
            .await
            .ok()
            .flatten()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
        Ok(AuthState::CredentialRejected { reason })
    }
}
