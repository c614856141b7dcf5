//! 发布结果写入服务 - 业务能力层
//!
//! 只负责把每次发布的结果追加到结果文件，不关心流程

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::debug;

use crate::error::{PublicationFailure, RemoteState};

/// 发布结果写入服务
pub struct ResultWriter {
    file_path: String,
}

impl ResultWriter {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.file_path
    }

    /// 新建结果文件并写入表头
    pub fn init(&self) -> Result<()> {
        let header = format!(
            "{}\n测验发布日志 - {}\n{}\n\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.file_path, header)?;
        Ok(())
    }

    pub fn write_success(&self, title: &str, share_link: &str) -> Result<()> {
        self.append(&format!("✅ {} | {}", title, share_link))
    }

    /// 失败时区分“外部残留草稿”和“未创建任何测验”
    pub fn write_failure(&self, title: &str, failure: &PublicationFailure) -> Result<()> {
        let remote = match failure.remote_state {
            RemoteState::Untouched => "未创建测验".to_string(),
            RemoteState::PartialDraft { questions_entered } => {
                format!("⚠️ 账户中可能残留未完成的草稿 (已录入 {} 题)", questions_entered)
            }
        };
        self.append(&format!(
            "❌ {} | {:?} | {} | {}",
            title,
            failure.kind(),
            remote,
            failure
        ))
    }

    fn append(&self, line: &str) -> Result<()> {
        debug!("写入结果: {}", line);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            line
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;

    #[test]
    fn test_lines_distinguish_remote_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let writer = ResultWriter::new(path.to_string_lossy());

        writer.init().unwrap();
        writer
            .write_success("Planets", "https://create.kahoot.it/share/abc")
            .unwrap();
        writer
            .write_failure(
                "Rivers",
                &PublicationFailure::new(
                    PublishError::ShareLinkMissing,
                    RemoteState::PartialDraft {
                        questions_entered: 3,
                    },
                ),
            )
            .unwrap();
        writer
            .write_failure(
                "Lakes",
                &PublicationFailure::new(
                    PublishError::CredentialRejected {
                        reason: "bad password".into(),
                    },
                    RemoteState::Untouched,
                ),
            )
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("测验发布日志"));
        assert!(content.contains("Planets | https://create.kahoot.it/share/abc"));
        assert!(content.contains("Rivers | ShareLinkMissing | ⚠️ 账户中可能残留未完成的草稿 (已录入 3 题)"));
        assert!(content.contains("Lakes | CredentialRejected | 未创建测验 | 登录被拒绝: bad password"));
    }
}
