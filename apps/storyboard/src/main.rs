use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ActionController, ActionKind, HttpTransport, Settled};
use shared::{
    domain::{CharacterId, ProjectId, SceneId},
    error::ActionError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::load_settings;
use terminal::TerminalUi;

#[derive(Parser, Debug)]
#[command(name = "storyboard", about = "Run storyboard server actions from the terminal")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    /// Use this anti-forgery token instead of loading a page to get one.
    #[arg(long)]
    csrf_token: Option<String>,
    /// Answer yes to confirmation prompts.
    #[arg(long, short = 'y')]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the image for a scene.
    Generate {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        scene: i64,
    },
    /// Edit the current image of a scene.
    Edit {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        scene: i64,
        #[arg(long)]
        prompt: String,
    },
    /// Generate a character portrait.
    Character {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        character: i64,
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Extract characters and scenes from a story.
    Extract {
        #[arg(long)]
        project: i64,
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Command {
    /// Page that hosts the action; loading it hands out the CSRF cookie.
    fn page(&self) -> String {
        match self {
            Command::Generate { project, scene } | Command::Edit { project, scene, .. } => {
                format!("/project/{project}/scene/{scene}/")
            }
            Command::Character { project, .. } => format!("/project/{project}/character/gallery/"),
            Command::Extract { project, .. } => format!("/project/{project}/story-input/"),
        }
    }

    fn into_kind(self) -> Result<ActionKind> {
        Ok(match self {
            Command::Generate { project, scene } => ActionKind::GenerateSceneImage {
                project: ProjectId(project),
                scene: SceneId(scene),
            },
            Command::Edit {
                project,
                scene,
                prompt,
            } => ActionKind::EditSceneImage {
                project: ProjectId(project),
                scene: SceneId(scene),
                edit_prompt: prompt,
            },
            Command::Character {
                project,
                character,
                prompt,
            } => ActionKind::GenerateCharacterImage {
                project: ProjectId(project),
                character: CharacterId(character),
                prompt,
            },
            Command::Extract {
                project,
                text,
                file,
            } => {
                let story_text = match (text, file) {
                    (Some(text), _) => text,
                    (None, Some(path)) => std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read story from {}", path.display()))?,
                    (None, None) => bail!("extract needs --text or --file"),
                };
                ActionKind::ExtractStory {
                    project: ProjectId(project),
                    story_text,
                }
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(token) = args.csrf_token {
        settings.csrf_token = Some(token);
    }

    let page = args.command.page();
    let kind = args.command.into_kind()?;

    let mut transport =
        HttpTransport::new(&settings.server_url, settings.csrf_cookie_name.clone())?;
    match &settings.csrf_token {
        Some(token) => transport.set_csrf_token(token),
        None => transport = transport.with_prime_page(page),
    }

    let ui = Arc::new(TerminalUi::new(transport.base_url().clone(), args.yes));
    let controller = ActionController::new(
        Arc::new(transport),
        ui,
        settings.controller_settings(),
    );

    info!(action = kind.name(), server_url = %settings.server_url, "starting action");
    match controller.run(kind).await {
        Ok(Settled::ImageReady { image_url }) => {
            info!(image_url = %image_url, "image ready");
            Ok(())
        }
        Ok(Settled::PageReloaded { location }) => {
            info!(location = %location, "story submitted");
            Ok(())
        }
        Err(ActionError::Declined) => Ok(()),
        Err(err) => Err(anyhow!(err)),
    }
}
