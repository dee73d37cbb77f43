//! Per-action labels, progress scripts and failure handling.

use shared::domain::TriggerTone;

use crate::progress::ProgressScript;

/// Measured in UTF-16 code units, the way browsers report string length.
pub const MIN_STORY_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortInputRule {
    /// UTF-16 code units.
    pub min_len: usize,
    pub question: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputRule {
    pub field: &'static str,
    pub empty_warning: &'static str,
    pub short: Option<ShortInputRule>,
}

/// What to show again when an action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureRestore {
    /// Idle placeholder if no image has been produced yet, otherwise the
    /// existing image.
    IdleOrImage,
    ResultContainer,
    /// Unlock the form for another attempt.
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    SwapImage,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionProfile {
    pub name: &'static str,
    pub busy_label: &'static str,
    pub idle_label: &'static str,
    pub done_label: &'static str,
    pub done_tone: TriggerTone,
    pub input: Option<InputRule>,
    pub progress: ProgressScript,
    pub hides_idle: bool,
    pub hides_result: bool,
    pub locks_form: bool,
    pub submit_notice: Option<&'static str>,
    pub success_line: &'static str,
    pub success_notice: &'static str,
    pub failure_fallback: &'static str,
    pub restore: FailureRestore,
    pub completion: Completion,
}

const SCENE_PROGRESS: &[&str] = &[
    "Initializing image generation...",
    "Processing scene prompt...",
    "Preparing character descriptions...",
    "Connecting to Nano Banana...",
    "Generating image with AI...",
    "Applying artistic style...",
    "Finalizing image...",
];

const CHARACTER_PROGRESS: &[&str] = &[
    "Preparing character description...",
    "Applying project style...",
    "Generating character portrait...",
    "Finalizing image...",
];

const STORY_PROGRESS: &[&str] = &[
    "Analyzing your story...",
    "Identifying main characters...",
    "Extracting character descriptions...",
    "Detecting scene boundaries...",
    "Processing with AI...",
    "Organizing scenes for illustration...",
    "Creating character placeholders...",
    "Finalizing extraction...",
];

pub static GENERATE_SCENE_IMAGE: ActionProfile = ActionProfile {
    name: "generate_scene_image",
    busy_label: "Generating...",
    idle_label: "Generate Image with Nano Banana",
    done_label: "Regenerate Image",
    done_tone: TriggerTone::Warning,
    input: None,
    progress: ProgressScript::Cycle {
        messages: SCENE_PROGRESS,
        fallback: "This may take 20-30 seconds...",
        lead_immediately: false,
    },
    hides_idle: true,
    hides_result: true,
    locks_form: false,
    submit_notice: None,
    success_line: "Image generated successfully!",
    success_notice: "Image generated successfully!",
    failure_fallback: "An error occurred during generation.",
    restore: FailureRestore::IdleOrImage,
    completion: Completion::SwapImage,
};

pub static EDIT_SCENE_IMAGE: ActionProfile = ActionProfile {
    name: "edit_scene_image",
    busy_label: "Editing...",
    idle_label: "Apply Edit",
    done_label: "Apply Edit",
    done_tone: TriggerTone::Primary,
    input: Some(InputRule {
        field: "edit_prompt",
        empty_warning: "Please enter edit instructions",
        short: None,
    }),
    progress: ProgressScript::Static("Applying edits to your image..."),
    hides_idle: false,
    hides_result: true,
    locks_form: false,
    submit_notice: None,
    success_line: "Image edited successfully!",
    success_notice: "Image edited successfully!",
    failure_fallback: "An error occurred during editing.",
    restore: FailureRestore::ResultContainer,
    completion: Completion::SwapImage,
};

pub static GENERATE_CHARACTER_IMAGE: ActionProfile = ActionProfile {
    name: "generate_character_image",
    busy_label: "Generating...",
    idle_label: "Generate Character Image",
    done_label: "Regenerate Character Image",
    done_tone: TriggerTone::Warning,
    input: None,
    progress: ProgressScript::Cycle {
        messages: CHARACTER_PROGRESS,
        fallback: "This may take 20-30 seconds...",
        lead_immediately: false,
    },
    hides_idle: true,
    hides_result: true,
    locks_form: false,
    submit_notice: None,
    success_line: "Character image generated successfully!",
    success_notice: "Character image generated successfully!",
    failure_fallback: "An error occurred during generation.",
    restore: FailureRestore::IdleOrImage,
    completion: Completion::SwapImage,
};

pub static EXTRACT_STORY: ActionProfile = ActionProfile {
    name: "extract_story",
    busy_label: "Processing...",
    idle_label: "Extract Characters & Scenes",
    done_label: "Extract Characters & Scenes",
    done_tone: TriggerTone::Primary,
    input: Some(InputRule {
        field: "story_text",
        empty_warning: "Please enter your story text",
        short: Some(ShortInputRule {
            min_len: MIN_STORY_LEN,
            question: "Your story seems very short. Are you sure you want to continue?",
        }),
    }),
    progress: ProgressScript::Cycle {
        messages: STORY_PROGRESS,
        fallback: "This may take 20-30 seconds for longer stories...",
        lead_immediately: true,
    },
    hides_idle: false,
    hides_result: false,
    locks_form: true,
    submit_notice: Some("Processing your story with AI. Please wait..."),
    success_line: "",
    success_notice: "",
    failure_fallback: "An error occurred while processing your story.",
    restore: FailureRestore::Form,
    completion: Completion::Reload,
};
