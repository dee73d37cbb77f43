use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{
    domain::{Severity, TriggerTone},
    error::ActionError,
    protocol::ActionResult,
};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

pub mod cookie;
pub mod profile;
pub mod progress;
pub mod request;
pub mod transport;
pub mod ui;

pub use profile::ActionProfile;
pub use progress::{ProgressCycle, ProgressScript, ProgressTimer};
pub use request::{ActionKind, ActionRequest, RequestBody};
pub use transport::{ActionTransport, HttpTransport, TransportResponse};
pub use ui::{notify, ActionUi, ImageTransition, Notification, TriggerView};

use profile::{Completion, FailureRestore};

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(1000);
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub progress_interval: Duration,
    /// Pause between the success line and revealing the image.
    pub success_delay: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            success_delay: DEFAULT_SUCCESS_DELAY,
        }
    }
}

/// Final state of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    ImageReady { image_url: String },
    PageReloaded { location: String },
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one server action at a time through idle, in-progress and
/// resolved UI states.
///
/// Every outcome, including errors, has been rendered on the UI by the time
/// [`ActionController::run`] returns. A second `run` while one is pending is
/// rejected with [`ActionError::Busy`] and leaves the UI untouched.
pub struct ActionController {
    transport: Arc<dyn ActionTransport>,
    ui: Arc<dyn ActionUi>,
    settings: ControllerSettings,
    in_flight: AtomicBool,
}

impl ActionController {
    pub fn new(
        transport: Arc<dyn ActionTransport>,
        ui: Arc<dyn ActionUi>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            transport,
            ui,
            settings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn run(&self, kind: ActionKind) -> Result<Settled, ActionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!(action = kind.name(), "action: rejected, another run is in flight");
            return Err(ActionError::Busy);
        };

        let span = info_span!("action", run_id = %Uuid::new_v4(), action = kind.name());
        self.drive(kind).instrument(span).await
    }

    async fn drive(&self, kind: ActionKind) -> Result<Settled, ActionError> {
        let profile = kind.profile();
        self.validate(&kind, profile)?;

        let request = kind.to_request();
        self.enter_in_progress(profile);
        let timer = self.start_progress(profile.progress);

        info!(endpoint = %request.endpoint, "action: request sent");
        let outcome = self.transport.send(&request).await;

        if let Some(timer) = timer {
            let ticks = timer.stop().await;
            debug!(ticks, "action: progress timer stopped");
        }

        let response = match outcome {
            Ok(response) => response,
            Err(err) => return Err(self.fail_transport(profile, err)),
        };

        match profile.completion {
            Completion::SwapImage => self.settle_image(profile, &response.body).await,
            Completion::Reload => self.settle_reload(profile, response),
        }
    }

    fn validate(&self, kind: &ActionKind, profile: &ActionProfile) -> Result<(), ActionError> {
        let Some(rule) = profile.input else {
            return Ok(());
        };

        let text = kind.input_text().unwrap_or_default().trim();
        if text.is_empty() {
            info!(field = rule.field, "action: required input is empty");
            notify(self.ui.as_ref(), rule.empty_warning, Severity::Warning);
            self.ui.focus_input();
            return Err(ActionError::EmptyInput { field: rule.field });
        }

        if let Some(short) = rule.short {
            let len = text.encode_utf16().count();
            if len < short.min_len && !self.ui.confirm(short.question) {
                info!(field = rule.field, len, "action: short input declined");
                return Err(ActionError::Declined);
            }
        }

        Ok(())
    }

    fn enter_in_progress(&self, profile: &ActionProfile) {
        self.ui.hide_error();
        if profile.hides_idle {
            self.ui.set_idle_visible(false);
        }
        self.ui.set_trigger(&TriggerView::busy(profile.busy_label));
        self.ui.set_progress_visible(true);
        if profile.hides_result {
            self.ui.set_result_visible(false);
        }
        if profile.locks_form {
            self.ui.set_input_readonly(true);
            self.ui.set_form_dimmed(true);
        }
        if let Some(notice) = profile.submit_notice {
            notify(self.ui.as_ref(), notice, Severity::Info);
        }
    }

    fn start_progress(&self, script: ProgressScript) -> Option<ProgressTimer> {
        match script {
            ProgressScript::Static(line) => {
                self.ui.set_progress_message(line);
                None
            }
            ProgressScript::Cycle {
                messages,
                fallback,
                lead_immediately,
            } => {
                let mut cycle = ProgressCycle::new(messages.iter().copied(), fallback);
                if lead_immediately {
                    self.ui.set_progress_message(cycle.advance());
                }
                Some(ProgressTimer::start(
                    cycle,
                    self.ui.clone(),
                    self.settings.progress_interval,
                ))
            }
        }
    }

    async fn settle_image(
        &self,
        profile: &ActionProfile,
        body: &str,
    ) -> Result<Settled, ActionError> {
        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                let err = ActionError::Transport(format!("response body is not JSON: {e}"));
                return Err(self.fail_transport(profile, err));
            }
        };

        match ActionResult::from_json(value, profile.failure_fallback) {
            ActionResult::Success { image_url } => {
                self.ui.set_progress_message(profile.success_line);
                tokio::time::sleep(self.settings.success_delay).await;
                self.present_image(profile, &image_url);
                info!(image_url = %image_url, "action: image ready");
                Ok(Settled::ImageReady { image_url })
            }
            ActionResult::Failure { message } => {
                warn!(message = %message, "action: server reported failure");
                self.render_failure(profile, &message);
                Err(ActionError::Server(message))
            }
        }
    }

    fn settle_reload(
        &self,
        profile: &ActionProfile,
        response: TransportResponse,
    ) -> Result<Settled, ActionError> {
        if !response.is_success() {
            warn!(status = response.status, "action: form submission rejected");
            let message = format!("{} (HTTP {})", profile.failure_fallback, response.status);
            self.render_failure(profile, &message);
            return Err(ActionError::Server(message));
        }

        info!(location = %response.location, "action: page reloaded");
        self.ui.reload(&response.location);
        Ok(Settled::PageReloaded {
            location: response.location,
        })
    }

    fn present_image(&self, profile: &ActionProfile, image_url: &str) {
        self.ui.set_progress_visible(false);
        self.ui.set_result_visible(true);
        if !self.ui.has_result_image() {
            self.ui.create_result_image();
        }
        self.ui.set_result_image(
            image_url,
            ImageTransition::FadeIn {
                duration: ui::FADE_IN_DURATION,
            },
        );
        self.ui
            .set_trigger(&TriggerView::ready(profile.done_label, profile.done_tone));
        notify(self.ui.as_ref(), profile.success_notice, Severity::Success);
    }

    fn fail_transport(&self, profile: &ActionProfile, err: ActionError) -> ActionError {
        warn!(error = %err, "action: transport failure");
        self.render_failure(profile, NETWORK_ERROR_MESSAGE);
        err
    }

    fn render_failure(&self, profile: &ActionProfile, message: &str) {
        self.ui.set_progress_visible(false);
        self.ui.show_error(message);
        match profile.restore {
            FailureRestore::IdleOrImage => {
                if self.ui.has_result_image() {
                    self.ui.set_result_visible(true);
                } else {
                    self.ui.set_idle_visible(true);
                }
            }
            FailureRestore::ResultContainer => self.ui.set_result_visible(true),
            FailureRestore::Form => {
                self.ui.set_input_readonly(false);
                self.ui.set_form_dimmed(false);
            }
        }
        self.ui
            .set_trigger(&TriggerView::ready(profile.idle_label, TriggerTone::Primary));
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
