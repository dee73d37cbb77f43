//! UI surface consumed by the action controller.
//!
//! The page template owns the actual widgets; the controller only talks to
//! them through [`ActionUi`]. Handles that a page may not have (idle
//! placeholder, text input, form card) get no-op defaults.

use std::time::Duration;

use shared::domain::{Severity, TriggerTone};
use tracing::debug;

pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(5);
pub const FADE_IN_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerView {
    pub enabled: bool,
    /// Render a spinner in front of the label.
    pub busy: bool,
    pub label: String,
    pub tone: TriggerTone,
}

impl TriggerView {
    pub fn busy(label: impl Into<String>) -> Self {
        Self {
            enabled: false,
            busy: true,
            label: label.into(),
            tone: TriggerTone::Primary,
        }
    }

    pub fn ready(label: impl Into<String>, tone: TriggerTone) -> Self {
        Self {
            enabled: true,
            busy: false,
            label: label.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTransition {
    None,
    /// Start transparent and fade to opaque once the image has loaded.
    FadeIn { duration: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub auto_dismiss: Option<Duration>,
}

impl Notification {
    /// Info notifications stay until dismissed; everything else expires.
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            auto_dismiss: (severity != Severity::Info).then_some(NOTIFICATION_LIFETIME),
        }
    }

    pub fn icon(&self) -> &'static str {
        self.severity.icon()
    }
}

pub trait ActionUi: Send + Sync {
    fn set_trigger(&self, view: &TriggerView);

    fn set_progress_visible(&self, visible: bool);
    fn set_progress_message(&self, text: &str);

    fn show_error(&self, message: &str);
    fn hide_error(&self);

    fn set_idle_visible(&self, _visible: bool) {}

    fn set_result_visible(&self, visible: bool);
    fn has_result_image(&self) -> bool;
    fn create_result_image(&self);
    fn set_result_image(&self, src: &str, transition: ImageTransition);

    fn focus_input(&self) {}
    fn set_input_readonly(&self, _readonly: bool) {}
    fn set_form_dimmed(&self, _dimmed: bool) {}

    /// The server answered a form submission with a full page.
    fn reload(&self, location: &str);

    fn show_notification(&self, notification: &Notification);

    /// Blocking yes/no question.
    fn confirm(&self, question: &str) -> bool;
}

pub fn notify(ui: &dyn ActionUi, message: impl Into<String>, severity: Severity) {
    let notification = Notification::new(message, severity);
    debug!(
        severity = severity.as_str(),
        message = %notification.message,
        "ui: notification"
    );
    ui.show_notification(&notification);
}
