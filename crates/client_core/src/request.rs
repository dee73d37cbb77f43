//! Server actions a user can trigger and the HTTP requests they map to.

use serde_json::{json, Value};
use shared::domain::{CharacterId, ProjectId, SceneId};

use crate::profile::{
    ActionProfile, EDIT_SCENE_IMAGE, EXTRACT_STORY, GENERATE_CHARACTER_IMAGE, GENERATE_SCENE_IMAGE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    GenerateSceneImage {
        project: ProjectId,
        scene: SceneId,
    },
    EditSceneImage {
        project: ProjectId,
        scene: SceneId,
        edit_prompt: String,
    },
    GenerateCharacterImage {
        project: ProjectId,
        character: CharacterId,
        prompt: Option<String>,
    },
    /// Form submission; the server answers with a full page.
    ExtractStory {
        project: ProjectId,
        story_text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// One POST to the storyboard server. `endpoint` is relative to the
/// configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub endpoint: String,
    pub body: RequestBody,
}

impl ActionRequest {
    pub fn method(&self) -> &'static str {
        "POST"
    }
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        self.profile().name
    }

    pub fn profile(&self) -> &'static ActionProfile {
        match self {
            ActionKind::GenerateSceneImage { .. } => &GENERATE_SCENE_IMAGE,
            ActionKind::EditSceneImage { .. } => &EDIT_SCENE_IMAGE,
            ActionKind::GenerateCharacterImage { .. } => &GENERATE_CHARACTER_IMAGE,
            ActionKind::ExtractStory { .. } => &EXTRACT_STORY,
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            ActionKind::GenerateSceneImage { project, scene } => {
                format!("/project/{project}/scene/{scene}/generate-ajax/")
            }
            ActionKind::EditSceneImage { project, scene, .. } => {
                format!("/project/{project}/scene/{scene}/edit-ajax/")
            }
            ActionKind::GenerateCharacterImage {
                project, character, ..
            } => format!("/project/{project}/character/{character}/generate-image/"),
            ActionKind::ExtractStory { project, .. } => format!("/project/{project}/story-input/"),
        }
    }

    /// Text the user typed, for kinds that take free text.
    pub fn input_text(&self) -> Option<&str> {
        match self {
            ActionKind::EditSceneImage { edit_prompt, .. } => Some(edit_prompt.as_str()),
            ActionKind::GenerateCharacterImage { prompt, .. } => prompt.as_deref(),
            ActionKind::ExtractStory { story_text, .. } => Some(story_text.as_str()),
            ActionKind::GenerateSceneImage { .. } => None,
        }
    }

    pub fn to_request(&self) -> ActionRequest {
        let body = match self {
            ActionKind::GenerateSceneImage { .. } => RequestBody::Json(json!({})),
            ActionKind::EditSceneImage { edit_prompt, .. } => {
                RequestBody::Json(json!({ "edit_prompt": edit_prompt.trim() }))
            }
            ActionKind::GenerateCharacterImage { prompt, .. } => RequestBody::Form(
                prompt
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| vec![("prompt".to_string(), p.to_string())])
                    .unwrap_or_default(),
            ),
            ActionKind::ExtractStory { story_text, .. } => {
                RequestBody::Form(vec![("story_text".to_string(), story_text.trim().to_string())])
            }
        };

        ActionRequest {
            endpoint: self.endpoint(),
            body,
        }
    }
}
