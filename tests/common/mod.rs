//! 集成测试共用的脚本化站点
//!
//! `ScriptedSite` 按锚点名称模拟创建页：默认所有锚点都可交互，
//! 可以配置为缺失、连续失效若干次、或在提交登录后出现错误提示。

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_publisher::config::Config;
use quiz_publisher::error::{DriverError, DriverResult, MediaError};
use quiz_publisher::infrastructure::{Anchor, AnchorState, SessionHandle, UiDriver};
use quiz_publisher::models::{Question, QuestionKind, QuizDocument};
use quiz_publisher::services::{ImageAsset, ImageResolver};

/// 站点上发生过的交互
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Navigate(String),
    Reload,
    Click(String),
    Type(String, String),
    Attach(String),
}

#[derive(Default)]
struct SiteState {
    absent: HashSet<String>,
    broken: HashSet<String>,
    stale_remaining: HashMap<String, u32>,
    rejection: Option<String>,
    login_submitted: bool,
    promo_visible: bool,
    share_link: Option<String>,
    events: Vec<Event>,
    shutdowns: usize,
}

pub struct ScriptedSite {
    state: Mutex<SiteState>,
}

impl ScriptedSite {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SiteState {
                share_link: Some("https://create.kahoot.it/share/scripted/0001".into()),
                ..Default::default()
            }),
        })
    }

    pub fn make_absent(&self, anchor: &str) {
        self.state.lock().unwrap().absent.insert(anchor.to_string());
    }

    /// 该锚点的每次交互都返回 CDP 错误（例如连接断开）
    pub fn break_connection_at(&self, anchor: &str) {
        self.state.lock().unwrap().broken.insert(anchor.to_string());
    }

    /// 接下来 `times` 次交互都返回失效
    pub fn make_stale(&self, anchor: &str, times: u32) {
        self.state
            .lock()
            .unwrap()
            .stale_remaining
            .insert(anchor.to_string(), times);
    }

    /// 提交登录后出现错误提示；`message` 为空表示提示没有文字
    pub fn reject_login(&self, message: &str) {
        self.state.lock().unwrap().rejection = Some(message.to_string());
    }

    pub fn show_promo(&self) {
        self.state.lock().unwrap().promo_visible = true;
    }

    pub fn set_share_link(&self, link: Option<&str>) {
        self.state.lock().unwrap().share_link = link.map(str::to_string);
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.state.lock().unwrap().shutdowns
    }

    pub fn clicks(&self, anchor: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Click(name) if name == anchor))
            .count()
    }

    pub fn typed_into(&self, anchor: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Type(name, text) if name == anchor => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clicked_any_with_prefix(&self, prefix: &str) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, Event::Click(name) if name.starts_with(prefix)))
    }

    pub fn position_of(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    fn take_stale(state: &mut SiteState, anchor: &str) -> bool {
        match state.stale_remaining.get_mut(anchor) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl UiDriver for ScriptedSite {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Navigate(url.to_string()));
        Ok(())
    }

    async fn reload(&self) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.promo_visible = false;
        state.events.push(Event::Reload);
        Ok(())
    }

    async fn probe(&self, anchor: &Anchor) -> DriverResult<AnchorState> {
        let state = self.state.lock().unwrap();
        let name = anchor.name.as_str();
        if state.broken.contains(name) {
            return Err(DriverError::Cdp("Received no response from the chromium instance.".into()));
        }
        let present = match name {
            "login.error" => state.login_submitted && state.rejection.is_some(),
            "create.promo_frame" => state.promo_visible,
            _ => !state.absent.contains(name),
        };
        Ok(if present {
            AnchorState::Interactable
        } else {
            AnchorState::Absent
        })
    }

    async fn click(&self, anchor: &Anchor) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        if Self::take_stale(&mut state, &anchor.name) {
            return Err(DriverError::Stale);
        }
        if anchor.name == "login.submit" {
            state.login_submitted = true;
        }
        state.events.push(Event::Click(anchor.name.clone()));
        Ok(())
    }

    async fn type_text(&self, anchor: &Anchor, text: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        if Self::take_stale(&mut state, &anchor.name) {
            return Err(DriverError::Stale);
        }
        state
            .events
            .push(Event::Type(anchor.name.clone(), text.to_string()));
        Ok(())
    }

    async fn attach_file(&self, anchor: &Anchor, path: &Path) -> DriverResult<()> {
        if !path.exists() {
            return Err(DriverError::Missing);
        }
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Attach(anchor.name.clone()));
        Ok(())
    }

    async fn read_value(&self, anchor: &Anchor) -> DriverResult<Option<String>> {
        let state = self.state.lock().unwrap();
        match anchor.name.as_str() {
            "finish.share_link" => Ok(state.share_link.clone()),
            _ => Ok(None),
        }
    }

    async fn read_text(&self, anchor: &Anchor) -> DriverResult<Option<String>> {
        let state = self.state.lock().unwrap();
        match anchor.name.as_str() {
            "login.error" => Ok(state.rejection.clone()),
            _ => Ok(None),
        }
    }

    async fn shutdown(&self) -> DriverResult<()> {
        self.state.lock().unwrap().shutdowns += 1;
        Ok(())
    }
}

pub fn session_for(site: &Arc<ScriptedSite>) -> SessionHandle {
    let driver: Arc<dyn UiDriver> = site.clone();
    SessionHandle::new(driver, "scripted")
}

/// 为测试缩短所有时限
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.login_url = "https://login.test/auth".into();
    config.timeouts.default_ms = 150;
    config.timeouts.consent_ms = 20;
    config.timeouts.auth_error_ms = 60;
    config.timeouts.promo_frame_ms = 20;
    config.timeouts.upload_ms = 150;
    config.timeouts.template_chooser_ms = 150;
    config.retry.stale_retries = 2;
    config.retry.stale_pause_ms = 5;
    config.retry.poll_interval_ms = 5;
    config
}

/// 写入真实临时文件的图片解析器，记录每次查询
#[derive(Default)]
pub struct FakeResolver {
    queries: Mutex<Vec<String>>,
    unavailable: Mutex<HashSet<String>>,
}

impl FakeResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn make_unavailable(&self, query: &str) {
        self.unavailable.lock().unwrap().insert(query.to_string());
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageResolver for FakeResolver {
    async fn resolve(&self, query: &str) -> Result<ImageAsset, MediaError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.unavailable.lock().unwrap().contains(query) {
            return Err(MediaError::NoImageAvailable {
                query: query.to_string(),
                attempts: 0,
            });
        }
        let path = tempfile::Builder::new()
            .suffix(".jpg")
            .tempfile()?
            .into_temp_path();
        Ok(ImageAsset::new(path, format!("https://images.test/{}", query)))
    }
}

pub fn mc(text: &str, correct_index: usize) -> Question {
    Question {
        kind: QuestionKind::MultipleChoice,
        text: text.to_string(),
        choices: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_index,
        image_query: None,
    }
}

pub fn tf(text: &str, correct_index: usize) -> Question {
    Question {
        kind: QuestionKind::TrueFalse,
        text: text.to_string(),
        choices: vec!["True".into(), "False".into()],
        correct_index,
        image_query: None,
    }
}

pub fn document(questions: Vec<Question>) -> QuizDocument {
    QuizDocument {
        title: "Solar System".into(),
        description: "Planets and moons".into(),
        cover_image_query: "solar system".into(),
        questions,
    }
}
