use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DocumentError;

/// 标题最大长度（与创建页输入框一致）
pub const MAX_TITLE_CHARS: usize = 95;
/// 描述最大长度
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuestionKind {
    #[serde(rename = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "true_or_false")]
    TrueFalse,
}

impl QuestionKind {
    /// 该类型要求的选项数量
    pub fn choice_slots(self) -> usize {
        match self {
            QuestionKind::MultipleChoice => 4,
            QuestionKind::TrueFalse => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::TrueFalse => "true_or_false",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 生成器输出的大小写不固定
impl<'de> Deserialize<'de> for QuestionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_lowercase().as_str() {
            "multiple_choice" => Ok(QuestionKind::MultipleChoice),
            "true_or_false" => Ok(QuestionKind::TrueFalse),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["multiple_choice", "true_or_false"],
            )),
        }
    }
}

/// 单道题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub text: String,
    pub choices: Vec<String>,
    #[serde(rename = "answer")]
    pub correct_index: usize,
    #[serde(
        rename = "image",
        default,
        deserialize_with = "deserialize_optional_query",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_query: Option<String>,
}

/// 测验文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizDocument {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "cover_image")]
    pub cover_image_query: String,
    pub questions: Vec<Question>,
}

impl QuizDocument {
    /// 第 `index` 题实际使用的模板类型
    ///
    /// 第一题始终按单选题创建，这是目标站点的硬性要求。
    pub fn effective_kind(&self, index: usize) -> Option<QuestionKind> {
        let question = self.questions.get(index)?;
        if index == 0 {
            Some(QuestionKind::MultipleChoice)
        } else {
            Some(question.kind)
        }
    }

    /// 在任何浏览器操作之前校验文档
    pub fn validate(&self) -> Result<(), DocumentError> {
        let title_len = self.title.trim().chars().count();
        if title_len == 0 {
            return Err(DocumentError::EmptyTitle);
        }
        if title_len > MAX_TITLE_CHARS {
            return Err(DocumentError::TitleTooLong {
                len: title_len,
                max: MAX_TITLE_CHARS,
            });
        }

        let description_len = self.description.chars().count();
        if description_len > MAX_DESCRIPTION_CHARS {
            return Err(DocumentError::DescriptionTooLong {
                len: description_len,
                max: MAX_DESCRIPTION_CHARS,
            });
        }

        if self.questions.is_empty() {
            return Err(DocumentError::NoQuestions);
        }

        for (index, question) in self.questions.iter().enumerate() {
            let position = index + 1;

            if question.text.trim().is_empty() {
                return Err(DocumentError::EmptyQuestionText { position });
            }

            let expected = question.kind.choice_slots();
            if question.choices.len() != expected {
                return Err(DocumentError::ChoiceCount {
                    position,
                    kind: question.kind.as_str(),
                    expected,
                    found: question.choices.len(),
                });
            }

            if question.correct_index >= question.choices.len() {
                return Err(DocumentError::CorrectIndexOutOfRange {
                    position,
                    index: question.correct_index,
                    max: question.choices.len() - 1,
                });
            }
        }

        Ok(())
    }
}

fn deserialize_optional_query<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(text: &str, correct: usize) -> Question {
        Question {
            kind: QuestionKind::MultipleChoice,
            text: text.to_string(),
            choices: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: correct,
            image_query: None,
        }
    }

    fn tf(text: &str, correct: usize) -> Question {
        Question {
            kind: QuestionKind::TrueFalse,
            text: text.to_string(),
            choices: vec!["True".into(), "False".into()],
            correct_index: correct,
            image_query: None,
        }
    }

    fn doc(questions: Vec<Question>) -> QuizDocument {
        QuizDocument {
            title: "Planets".into(),
            description: String::new(),
            cover_image_query: "solar system".into(),
            questions,
        }
    }

    #[test]
    fn test_first_question_is_always_multiple_choice() {
        let quiz = doc(vec![tf("Q1", 0), tf("Q2", 1)]);
        assert_eq!(quiz.effective_kind(0), Some(QuestionKind::MultipleChoice));
        assert_eq!(quiz.effective_kind(1), Some(QuestionKind::TrueFalse));
        assert_eq!(quiz.effective_kind(2), None);
    }

    #[test]
    fn test_valid_document_passes() {
        assert!(doc(vec![mc("Q1", 0), tf("Q2", 1), mc("Q3", 3)]).validate().is_ok());
    }

    #[test]
    fn test_choice_count_is_checked_against_declared_kind() {
        let mut bad = tf("Q2", 0);
        bad.choices.push("Maybe".into());
        let err = doc(vec![mc("Q1", 0), bad]).validate().unwrap_err();
        assert_eq!(
            err,
            DocumentError::ChoiceCount {
                position: 2,
                kind: "true_or_false",
                expected: 2,
                found: 3
            }
        );

        let mut short = mc("Q1", 0);
        short.choices.truncate(3);
        assert!(matches!(
            doc(vec![short]).validate(),
            Err(DocumentError::ChoiceCount { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_correct_index_out_of_range() {
        let err = doc(vec![tf("Q1", 2)]).validate().unwrap_err();
        assert_eq!(
            err,
            DocumentError::CorrectIndexOutOfRange {
                position: 1,
                index: 2,
                max: 1
            }
        );
    }

    #[test]
    fn test_empty_and_oversized_metadata() {
        assert_eq!(doc(vec![]).validate(), Err(DocumentError::NoQuestions));

        let mut untitled = doc(vec![mc("Q1", 0)]);
        untitled.title = "   ".into();
        assert_eq!(untitled.validate(), Err(DocumentError::EmptyTitle));

        let mut long = doc(vec![mc("Q1", 0)]);
        long.title = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(matches!(
            long.validate(),
            Err(DocumentError::TitleTooLong { .. })
        ));
    }

    #[test]
    fn test_generator_json_shape() {
        let json = r#"{
            "title": "Deutsch",
            "cover_image": "german flag",
            "questions": [
                {"type": "Multiple_Choice", "question": "Was ist das?",
                 "choices": ["Ball", "Auto", "Haus", "Baum"], "answer": 1, "image": "toy car"},
                {"type": "true_or_false", "question": "Der Hund ist ein Tier.",
                 "choices": ["Richtig", "Falsch"], "answer": 0, "image": null},
                {"type": "true_or_false", "question": "Blank image",
                 "choices": ["Richtig", "Falsch"], "answer": 0, "image": "  "}
            ]
        }"#;
        let quiz: QuizDocument = serde_json::from_str(json).unwrap();
        assert_eq!(quiz.description, "");
        assert_eq!(quiz.questions[0].kind, QuestionKind::MultipleChoice);
        assert_eq!(quiz.questions[0].image_query.as_deref(), Some("toy car"));
        assert_eq!(quiz.questions[1].image_query, None);
        assert_eq!(quiz.questions[2].image_query, None);
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"type": "open_ended", "question": "?", "choices": [], "answer": 0}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }
}
