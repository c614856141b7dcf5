//! Kahoot 创建页锚点目录
//!
//! 外部站点改名或删除其中任何一个锚点，都属于本系统之外的破坏性变更。

use crate::infrastructure::ui_driver::Anchor;
use crate::models::QuestionKind;

fn functional(name: &str, tag: &str, selector: &str) -> Anchor {
    Anchor::css(
        name,
        format!("{}[data-functional-selector='{}']", tag, selector),
    )
}

// ========== 登录 ==========

pub fn consent_reject() -> Anchor {
    Anchor::css("login.consent_reject", "#onetrust-reject-all-handler")
}

pub fn login_identity() -> Anchor {
    Anchor::css("login.identity", "#username")
}

pub fn login_secret() -> Anchor {
    Anchor::css("login.secret", "#password")
}

pub fn login_submit() -> Anchor {
    Anchor::css("login.submit", "#login-submit-btn")
}

pub fn login_error() -> Anchor {
    Anchor::css(
        "login.error",
        "span.error-message__ErrorMessageComponent-sc-sut6rh-0",
    )
}

// ========== 新建测验 ==========

pub fn promo_frame() -> Anchor {
    Anchor::css("create.promo_frame", "iframe[name='ipm-frame']")
}

pub fn create_menu() -> Anchor {
    functional("create.menu", "button", "top-bar__create")
}

pub fn create_kahoot() -> Anchor {
    functional("create.kahoot", "button", "top-bar__create-kahoot")
}

pub fn blank_canvas() -> Anchor {
    Anchor::xpath(
        "create.blank_canvas",
        "//div[text()='Blank canvas']/ancestor::button",
    )
}

// ========== 测验设置 ==========

pub fn settings_button() -> Anchor {
    functional("settings.open", "button", "top-bar__kahoot-summary-button")
}

pub fn settings_title() -> Anchor {
    Anchor::css("settings.title", "#kahoot-title")
}

pub fn settings_description() -> Anchor {
    Anchor::css("settings.description", "#description")
}

pub fn cover_image_library() -> Anchor {
    functional(
        "settings.cover_library",
        "button",
        "dialog-information-kahoot__image_library_btn",
    )
}

pub fn cover_attached() -> Anchor {
    Anchor::css("settings.cover_attached", "#cover-image")
}

pub fn settings_done() -> Anchor {
    functional(
        "settings.done",
        "button",
        "dialog-information-kahoot__done-button",
    )
}

// ========== 媒体上传 ==========

pub fn open_upload_dialog() -> Anchor {
    functional("media.open_upload", "button", "open-upload-media-dialog-button")
}

pub fn upload_input() -> Anchor {
    Anchor::css(
        "media.upload_input",
        "[data-functional-selector='media-upload-dialog__upload-media-input']",
    )
}

// ========== 题目 ==========

pub fn question_title() -> Anchor {
    Anchor::css(
        "question.title",
        "div[data-functional-selector='question-title__input'][contenteditable='true']",
    )
}

pub fn question_image_picker() -> Anchor {
    Anchor::css("question.image_picker", ".MUmzd")
}

pub fn question_image_attached() -> Anchor {
    functional("question.image_attached", "img", "media-details__media-image")
}

/// 第 `index` 个选项（从 0 开始）
pub fn choice(index: usize) -> Anchor {
    Anchor::css(
        format!("question.choice_{}", index),
        format!("#question-choice-{}", index),
    )
}

/// 将第 `index` 个选项标为正确答案（页面上的标签从 1 开始）
pub fn correct_toggle(index: usize) -> Anchor {
    Anchor::css(
        format!("question.correct_{}", index),
        format!(
            "button[data-functional-selector=\"question-answer__toggle-button\"][aria-label=\"Toggle answer {} correct.\"]",
            index + 1
        ),
    )
}

pub fn add_question() -> Anchor {
    functional("question.add", "button", "add-question-button")
}

pub fn template_chooser() -> Anchor {
    Anchor::css(
        "question.template_chooser",
        "section.create-block__Section-sc-1rs5jsh-2",
    )
}

pub fn template(kind: QuestionKind) -> Anchor {
    match kind {
        QuestionKind::MultipleChoice => {
            functional("question.template_quiz", "button", "create-button__quiz")
        }
        QuestionKind::TrueFalse => functional(
            "question.template_true_false",
            "button",
            "create-button__true-false",
        ),
    }
}

// ========== 保存与分享 ==========

pub fn save_button() -> Anchor {
    functional("finish.save", "button", "top-bar__save-button")
}

pub fn share_button() -> Anchor {
    functional(
        "finish.share",
        "button",
        "dialog-complete-kahoot__share_kahoot",
    )
}

pub fn share_link() -> Anchor {
    Anchor::css("finish.share_link", "#share-kahoot-link")
}

pub fn share_close() -> Anchor {
    Anchor::css("finish.share_close", ".styles__1g5agrwi")
}

pub fn finish_button() -> Anchor {
    functional(
        "finish.done",
        "button",
        "dialog-complete-kahoot__finish-button",
    )
}
