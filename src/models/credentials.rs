use std::fmt;

use anyhow::{Context, Result};

/// 登录凭据
///
/// 只在一次发布运行内存在，从不写入磁盘或日志。
#[derive(Clone)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// 从运行时环境读取（`KAHOOT_EMAIL` / `KAHOOT_PASSWORD`）
    pub fn from_env() -> Result<Self> {
        let identity = std::env::var("KAHOOT_EMAIL").context("缺少环境变量 KAHOOT_EMAIL")?;
        let secret = std::env::var("KAHOOT_PASSWORD").context("缺少环境变量 KAHOOT_PASSWORD")?;
        if identity.trim().is_empty() || secret.is_empty() {
            anyhow::bail!("登录邮箱和密码不能为空");
        }
        Ok(Self::new(identity.trim(), secret))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"***")
            .finish()
    }
}
