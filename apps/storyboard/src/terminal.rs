//! Terminal rendering of the action lifecycle.

use std::{
    io::{self, BufRead, Write},
    sync::Mutex,
};

use client_core::{ActionUi, ImageTransition, Notification, TriggerView};
use url::Url;

#[derive(Default)]
struct ScreenState {
    image: Option<String>,
    last_progress: Option<String>,
}

pub struct TerminalUi {
    base_url: Url,
    assume_yes: bool,
    screen: Mutex<ScreenState>,
}

impl TerminalUi {
    pub fn new(base_url: Url, assume_yes: bool) -> Self {
        Self {
            base_url,
            assume_yes,
            screen: Mutex::new(ScreenState::default()),
        }
    }

    /// Image URLs from the server are usually site-relative.
    fn absolute(&self, src: &str) -> String {
        self.base_url
            .join(src)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| src.to_string())
    }

    fn with_screen<R>(&self, f: impl FnOnce(&mut ScreenState) -> R) -> R {
        match self.screen.lock() {
            Ok(mut screen) => f(&mut screen),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl ActionUi for TerminalUi {
    fn set_trigger(&self, view: &TriggerView) {
        if view.busy {
            eprintln!("… {}", view.label);
        }
    }

    fn set_progress_visible(&self, visible: bool) {
        if !visible {
            self.with_screen(|s| s.last_progress = None);
        }
    }

    fn set_progress_message(&self, text: &str) {
        let repeated = self.with_screen(|s| {
            let repeated = s.last_progress.as_deref() == Some(text);
            s.last_progress = Some(text.to_string());
            repeated
        });
        if !repeated {
            eprintln!("  {text}");
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn hide_error(&self) {}

    fn set_result_visible(&self, _visible: bool) {}

    fn has_result_image(&self) -> bool {
        self.with_screen(|s| s.image.is_some())
    }

    fn create_result_image(&self) {
        self.with_screen(|s| s.image = Some(String::new()));
    }

    fn set_result_image(&self, src: &str, _transition: ImageTransition) {
        let absolute = self.absolute(src);
        self.with_screen(|s| s.image = Some(absolute.clone()));
        println!("{absolute}");
    }

    fn reload(&self, location: &str) {
        println!("{location}");
    }

    fn show_notification(&self, notification: &Notification) {
        eprintln!(
            "[{}] {}",
            notification.severity.as_str(),
            notification.message
        );
    }

    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{question} [y/N] ");
        let _ = io::stderr().flush();
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_yes(&line),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
