//! 日志工具模块
//!
//! 提供批量发布过程中的日志格式化辅助函数

use tracing::info;

/// 记录程序启动信息
pub fn log_startup(quiz_source: &str, headless: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验批量发布模式");
    info!("📁 测验来源: {}", quiz_source);
    info!("🖥️ 浏览器模式: {}", if headless { "无头" } else { "有界面" });
    info!("{}", "=".repeat(60));
}

/// 记录测验加载信息
pub fn log_quizzes_loaded(total: usize) {
    info!("✓ 找到 {} 个待发布的测验", total);
    info!("💡 每个测验使用独立的浏览器会话，依次发布\n");
}

/// 记录单个测验开始
///
/// # 参数
/// - `quiz_index`: 测验编号（从1开始）
/// - `total`: 测验总数
/// - `title`: 测验标题
/// - `question_count`: 题目数量
pub fn log_quiz_start(quiz_index: usize, total: usize, title: &str, question_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始发布第 {}/{} 个测验", quiz_index, total);
    info!("[测验 {}] 标题: {}", quiz_index, truncate_text(title, 60));
    info!("[测验 {}] 题目总数: {}", quiz_index, question_count);
    info!("{}", "=".repeat(60));
}

pub fn log_quiz_complete(quiz_index: usize, share_link: &str) {
    info!("\n{}", "─".repeat(60));
    info!("[测验 {}] ✅ 发布成功: {}", quiz_index, share_link);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    success: usize,
    failed: usize,
    partial_drafts: usize,
    total: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部发布完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    if partial_drafts > 0 {
        info!("⚠️ 可能残留草稿: {}", partial_drafts);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("太阳系有几颗行星", 4), "太阳系有...");
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exact", 5), "exact");
    }
}
