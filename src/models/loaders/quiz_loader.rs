use crate::models::quiz::QuizDocument;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 测验文件（路径 + 文档）
#[derive(Debug, Clone)]
pub struct QuizFile {
    pub path: PathBuf,
    pub document: QuizDocument,
}

/// 从文件加载测验文档
///
/// `.toml` 按 TOML 解析，其余按 JSON 解析（允许外层包裹 Markdown 代码块）
pub async fn load_quiz_file(path: &Path) -> Result<QuizDocument> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取测验文件: {}", path.display()))?;

    if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&content)
            .with_context(|| format!("无法解析TOML测验文件: {}", path.display()))
    } else {
        parse_quiz_json(&content)
            .with_context(|| format!("无法解析JSON测验文件: {}", path.display()))
    }
}

/// 解析生成器输出的 JSON
pub fn parse_quiz_json(raw: &str) -> Result<QuizDocument> {
    let document = serde_json::from_str(strip_code_fence(raw))?;
    Ok(document)
}

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n?(.*?)\s*```\s*$").expect("代码块正则无效")
});

/// 去掉 ```json ... ``` 包裹
fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => raw.trim(),
    }
}

/// 加载测验：单个文件，或目录下所有 `.json` / `.toml` 文件（按文件名排序）
pub async fn load_quiz_files(quiz_path: &str) -> Result<Vec<QuizFile>> {
    let path = PathBuf::from(quiz_path);

    if !path.exists() {
        anyhow::bail!("测验路径不存在: {}", quiz_path);
    }

    if path.is_file() {
        let document = load_quiz_file(&path).await?;
        return Ok(vec![QuizFile { path, document }]);
    }

    let mut candidates = Vec::new();
    let mut entries = fs::read_dir(&path)
        .await
        .with_context(|| format!("无法读取文件夹: {}", quiz_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        if matches!(
            entry_path.extension().and_then(|s| s.to_str()),
            Some("json") | Some("toml")
        ) {
            candidates.push(entry_path);
        }
    }
    candidates.sort();

    let mut quizzes = Vec::new();
    for candidate in candidates {
        tracing::info!(
            "正在加载: {}",
            candidate.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_quiz_file(&candidate).await {
            Ok(document) => {
                tracing::info!("成功加载 {} 道题目", document.questions.len());
                quizzes.push(QuizFile {
                    path: candidate,
                    document,
                });
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", candidate.display(), e);
            }
        }
    }

    Ok(quizzes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIZ_JSON: &str = r#"{
        "title": "Modal verbs",
        "description": "Präteritum",
        "cover_image": "german grammar",
        "questions": [
            {"type": "multiple_choice", "question": "Ich ___ gestern arbeiten.",
             "choices": ["musste", "muss", "müssen", "musst"], "answer": 0, "image": null}
        ]
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let quiz = parse_quiz_json(QUIZ_JSON).unwrap();
        assert_eq!(quiz.title, "Modal verbs");
        assert_eq!(quiz.questions.len(), 1);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```\n", QUIZ_JSON);
        let quiz = parse_quiz_json(&fenced).unwrap();
        assert_eq!(quiz.cover_image_query, "german grammar");
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert!(CODE_FENCE_RE.is_match("```\n{}\n```"));
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```JSON\n[]```  "), "[]");
        assert_eq!(strip_code_fence("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_load_folder_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), QUIZ_JSON).unwrap();
        std::fs::write(dir.path().join("b.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(
            dir.path().join("c.toml"),
            r#"
            title = "TOML quiz"
            cover_image = "books"

            [[questions]]
            type = "true_or_false"
            question = "Rust has a borrow checker."
            choices = ["True", "False"]
            answer = 0
            "#,
        )
        .unwrap();

        let quizzes = load_quiz_files(dir.path().to_str().unwrap()).await.unwrap();
        let titles: Vec<_> = quizzes.iter().map(|q| q.document.title.as_str()).collect();
        assert_eq!(titles, vec!["Modal verbs", "TOML quiz"]);
    }

    #[tokio::test]
    async fn test_missing_path_is_error() {
        assert!(load_quiz_files("/definitely/not/here").await.is_err());
    }
}
