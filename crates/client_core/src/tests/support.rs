//! In-memory UI and transport doubles shared by the unit tests.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use shared::error::ActionError;

use crate::{
    request::ActionRequest,
    transport::{ActionTransport, TransportResponse},
    ui::{ActionUi, ImageTransition, Notification, TriggerView},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImageNode {
    pub src: Option<String>,
    pub transition: Option<ImageTransition>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UiState {
    pub trigger: Option<TriggerView>,
    pub progress_visible: bool,
    pub progress_writes: Vec<String>,
    pub error_visible: bool,
    pub error_message: Option<String>,
    pub idle_visible: bool,
    pub result_visible: bool,
    pub images: Vec<ImageNode>,
    pub images_created: usize,
    pub input_focused: bool,
    pub input_readonly: bool,
    pub form_dimmed: bool,
    pub reloaded: Option<String>,
    pub notifications: Vec<Notification>,
    pub questions: Vec<String>,
}

pub(crate) struct RecordingUi {
    state: Mutex<UiState>,
    confirm_answer: bool,
}

impl RecordingUi {
    /// Fresh page: idle placeholder shown, no image yet.
    pub fn idle() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(UiState {
                idle_visible: true,
                ..UiState::default()
            }),
            confirm_answer: true,
        })
    }

    pub fn with_image(src: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(UiState {
                result_visible: true,
                images: vec![ImageNode {
                    src: Some(src.to_string()),
                    transition: None,
                }],
                ..UiState::default()
            }),
            confirm_answer: true,
        })
    }

    pub fn answering(confirm_answer: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(UiState::default()),
            confirm_answer,
        })
    }

    pub fn snapshot(&self) -> UiState {
        self.state.lock().expect("ui state").clone()
    }

    fn with<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> R {
        f(&mut self.state.lock().expect("ui state"))
    }
}

impl ActionUi for RecordingUi {
    fn set_trigger(&self, view: &TriggerView) {
        self.with(|s| s.trigger = Some(view.clone()));
    }

    fn set_progress_visible(&self, visible: bool) {
        self.with(|s| s.progress_visible = visible);
    }

    fn set_progress_message(&self, text: &str) {
        self.with(|s| s.progress_writes.push(text.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.with(|s| {
            s.error_visible = true;
            s.error_message = Some(message.to_string());
        });
    }

    fn hide_error(&self) {
        self.with(|s| s.error_visible = false);
    }

    fn set_idle_visible(&self, visible: bool) {
        self.with(|s| s.idle_visible = visible);
    }

    fn set_result_visible(&self, visible: bool) {
        self.with(|s| s.result_visible = visible);
    }

    fn has_result_image(&self) -> bool {
        self.with(|s| !s.images.is_empty())
    }

    fn create_result_image(&self) {
        self.with(|s| {
            s.images.clear();
            s.images.push(ImageNode {
                src: None,
                transition: None,
            });
            s.images_created += 1;
        });
    }

    fn set_result_image(&self, src: &str, transition: ImageTransition) {
        self.with(|s| {
            if let Some(image) = s.images.first_mut() {
                image.src = Some(src.to_string());
                image.transition = Some(transition);
            }
        });
    }

    fn focus_input(&self) {
        self.with(|s| s.input_focused = true);
    }

    fn set_input_readonly(&self, readonly: bool) {
        self.with(|s| s.input_readonly = readonly);
    }

    fn set_form_dimmed(&self, dimmed: bool) {
        self.with(|s| s.form_dimmed = dimmed);
    }

    fn reload(&self, location: &str) {
        self.with(|s| s.reloaded = Some(location.to_string()));
    }

    fn show_notification(&self, notification: &Notification) {
        self.with(|s| s.notifications.push(notification.clone()));
    }

    fn confirm(&self, question: &str) -> bool {
        self.with(|s| s.questions.push(question.to_string()));
        self.confirm_answer
    }
}

pub(crate) enum Reply {
    Body { status: u16, body: String },
    Fail(String),
}

pub(crate) struct ScriptedTransport {
    reply: Reply,
    delay: Duration,
    location: String,
    calls: Mutex<Vec<ActionRequest>>,
}

impl ScriptedTransport {
    pub fn json(body: serde_json::Value, delay: Duration) -> Arc<Self> {
        Self::new(
            Reply::Body {
                status: 200,
                body: body.to_string(),
            },
            delay,
        )
    }

    pub fn raw(status: u16, body: &str, delay: Duration) -> Arc<Self> {
        Self::new(
            Reply::Body {
                status,
                body: body.to_string(),
            },
            delay,
        )
    }

    pub fn failing(reason: &str, delay: Duration) -> Arc<Self> {
        Self::new(Reply::Fail(reason.to_string()), delay)
    }

    fn new(reply: Reply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            location: "http://storyboard.test/project/5/".to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<ActionRequest> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl ActionTransport for ScriptedTransport {
    async fn send(&self, request: &ActionRequest) -> Result<TransportResponse, ActionError> {
        self.calls.lock().expect("calls").push(request.clone());
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Reply::Body { status, body } => Ok(TransportResponse {
                status: *status,
                location: self.location.clone(),
                body: body.clone(),
            }),
            Reply::Fail(reason) => Err(ActionError::Transport(reason.clone())),
        }
    }
}
