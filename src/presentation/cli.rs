use crate::application::command_renderer::CommandRenderer;
use crate::application::prompt::{failure_summary, AiAssistant, PromptGenerator};
use crate::application::services::{HttpClient, HttpRequestService};
use crate::application::settings_editor::{apply_all, SettingsEdit};
use crate::domain::settings::{non_blank, Settings};
use crate::infrastructure::ai::{GeminiClient, OpenAiClient};
use crate::infrastructure::config::ConfigStore;
use crate::infrastructure::output::OutputSink;
use crate::infrastructure::persistence::{ArtifactKind, ArtifactStore};
use crate::presentation::presenter::ResultPresenter;
use crate::presentation::settings_view::display_settings;
use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser};
use std::sync::Arc;
use tracing::debug;

/// CLI configuration for reqsmith
#[derive(Parser, Debug)]
#[command(name = "reqsmith", version)]
#[command(
    about = "reqsmith: build curl commands from saved settings, or run them",
    long_about = None
)]
pub struct Cli {
    /// Add a path to the recent paths and use it for this run
    #[arg(short, long)]
    pub path: Option<String>,

    /// Execute the HTTP request instead of printing the curl command
    #[arg(short, long)]
    pub execute: bool,

    /// Save the curl command to disk
    #[arg(short, long)]
    pub save: bool,

    /// Save the HTTP response to disk (requires --execute)
    #[arg(short, long)]
    pub output: bool,

    /// Display the current settings
    #[arg(short, long)]
    pub config: bool,

    /// Delete the configuration file
    #[arg(short, long)]
    pub reset: bool,

    /// Generate a curl command from a natural-language prompt
    #[arg(long, value_name = "PROMPT")]
    pub ai: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub edits: EditArgs,
}

/// Flags that change a stored setting.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    #[arg(long, value_name = "URL")]
    pub set_url: Option<String>,
    #[arg(long, value_name = "METHOD")]
    pub set_method: Option<String>,
    /// none, bearer, basic or jwt
    #[arg(long, value_name = "TYPE")]
    pub set_auth: Option<String>,
    #[arg(long, value_name = "TOKEN")]
    pub set_token: Option<String>,
    #[arg(long, value_name = "NAME")]
    pub set_username: Option<String>,
    #[arg(long, value_name = "PASSWORD")]
    pub set_password: Option<String>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub set_follow_redirects: Option<bool>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub set_show_progress: Option<bool>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub set_show_error: Option<bool>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub set_show_headers: Option<bool>,
    /// Seconds; 0 clears the limit
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub set_max_time: Option<i64>,
    /// "Name: Value"
    #[arg(long, value_name = "HEADER")]
    pub add_header: Vec<String>,
    #[arg(long, value_name = "NAME")]
    pub remove_header: Vec<String>,
    /// "key=value"
    #[arg(long, value_name = "PARAM")]
    pub add_query: Vec<String>,
    #[arg(long, value_name = "KEY")]
    pub remove_query: Vec<String>,
    #[arg(long, value_name = "KEY")]
    pub set_gemini_key: Option<String>,
    #[arg(long, value_name = "KEY")]
    pub set_openai_key: Option<String>,
    #[arg(long, value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub set_ai_debugging: Option<bool>,
}

impl EditArgs {
    pub fn to_edits(&self) -> Vec<SettingsEdit> {
        let mut edits = Vec::new();
        let mut push = |value: Option<SettingsEdit>| edits.extend(value);

        push(self.set_url.clone().map(SettingsEdit::BaseUrl));
        push(self.set_method.clone().map(SettingsEdit::Method));
        push(self.set_auth.clone().map(SettingsEdit::AuthType));
        push(self.set_token.clone().map(SettingsEdit::AuthToken));
        push(self.set_username.clone().map(SettingsEdit::Username));
        push(self.set_password.clone().map(SettingsEdit::Password));
        push(self.set_follow_redirects.map(SettingsEdit::FollowRedirects));
        push(self.set_show_progress.map(SettingsEdit::ShowProgress));
        push(self.set_show_error.map(SettingsEdit::ShowError));
        push(self.set_show_headers.map(SettingsEdit::ShowHeaders));
        push(self.set_max_time.map(SettingsEdit::MaxTime));
        push(self.set_gemini_key.clone().map(SettingsEdit::GeminiKey));
        push(self.set_openai_key.clone().map(SettingsEdit::OpenAiKey));
        push(self.set_ai_debugging.map(SettingsEdit::AiDebugging));

        edits.extend(self.add_header.iter().cloned().map(SettingsEdit::AddHeader));
        edits.extend(self.remove_header.iter().cloned().map(SettingsEdit::RemoveHeader));
        edits.extend(self.add_query.iter().cloned().map(SettingsEdit::AddQuery));
        edits.extend(self.remove_query.iter().cloned().map(SettingsEdit::RemoveQuery));
        edits
    }
}

/// Collaborators a run needs.
pub struct AppContext<'a> {
    pub store: &'a dyn ConfigStore,
    pub artifacts: &'a ArtifactStore,
    pub sink: &'a dyn OutputSink,
    pub transport: Arc<dyn HttpClient>,
}

impl Cli {
    /// Runs one invocation and returns the process exit code.
    pub async fn run(&self, ctx: &AppContext<'_>) -> Result<i32> {
        if self.output && !self.execute {
            ctx.sink.error("Error: --output can only be used with --execute.");
            return Ok(1);
        }

        if self.reset {
            ctx.store.reset()?;
            ctx.sink.success(&format!(
                "Configuration deleted: {}",
                ctx.store.location().display()
            ));
            return Ok(0);
        }

        let mut settings = ctx.store.load();

        if self.config {
            display_settings(&settings, &ctx.store.location().display().to_string(), ctx.sink);
            return Ok(0);
        }

        let edits = self.edits.to_edits();
        if !edits.is_empty() {
            return self.apply_edits(ctx, &settings, &edits);
        }

        if let Some(prompt) = self.ai.as_deref().filter(|p| !p.trim().is_empty()) {
            self.generate_with_ai(ctx, &settings, prompt).await;
            return Ok(0);
        }

        let path = self.path.as_deref().filter(|p| !p.trim().is_empty());
        if let Some(path) = path {
            settings.add_recent_path(path);
            ctx.store.save(&settings)?;
            ctx.sink.success(&format!("Path '{}' added to recent paths.", path));
        } else if settings.recent_paths.is_empty() {
            ctx.sink.warn("No recent paths available. Use --path <PATH> to add one.");
            return Ok(0);
        }

        if let Err(err) = settings.validate(path) {
            ctx.sink.error(&format!("Configuration error: {}", err));
            return Ok(0);
        }

        if self.save {
            let command = CommandRenderer::render(&settings, path);
            self.persist(ctx, ArtifactKind::Command, &command, "Curl command saved to");
        }

        if self.execute {
            self.execute_request(ctx, &settings, path).await;
        } else {
            ctx.sink.info("=== Generated cURL Command ===");
            ctx.sink.success(&CommandRenderer::render(&settings, path));
        }
        Ok(0)
    }

    fn apply_edits(
        &self,
        ctx: &AppContext<'_>,
        settings: &Settings,
        edits: &[SettingsEdit],
    ) -> Result<i32> {
        match apply_all(settings, edits) {
            Ok(updated) => {
                ctx.store.save(&updated)?;
                for edit in edits {
                    ctx.sink.success(&edit.describe());
                }
            }
            Err(err) => ctx.sink.error(&format!("Configuration error: {}", err)),
        }
        Ok(0)
    }

    async fn execute_request(&self, ctx: &AppContext<'_>, settings: &Settings, path: Option<&str>) {
        ctx.sink.info("=== Executing HTTP Request ===");
        if settings.show_progress {
            ctx.sink.plain("Sending request...");
        }

        let service = HttpRequestService::new(Box::new(ctx.transport.clone()));
        let result = service.execute(settings, path).await;

        match &result {
            Ok(response) => {
                let rendered = ResultPresenter::present(response, settings);
                rendered.emit(ctx.sink);
                if self.output {
                    let text = rendered.to_plain_text();
                    self.persist(ctx, ArtifactKind::Response, &text, "Response saved to");
                }
            }
            Err(err) => {
                debug!(kind = %err.kind, "request failed");
                if let Some(line) = ResultPresenter::present_error(err, settings) {
                    ctx.sink.error(&line);
                }
            }
        }

        if let Some(summary) = failure_summary(&result) {
            self.show_debug_suggestions(ctx, settings, path, &summary).await;
        }
    }

    async fn show_debug_suggestions(
        &self,
        ctx: &AppContext<'_>,
        settings: &Settings,
        path: Option<&str>,
        summary: &str,
    ) {
        if !settings.allow_ai_debugging {
            return;
        }
        let Some(generator) = prompt_generator(&ctx.transport, settings) else {
            return;
        };
        let assistant = AiAssistant::new(generator);
        if let Some(suggestions) = assistant.explain_failure(summary, settings, path).await {
            ctx.sink.info("=== AI Debug Suggestions ===");
            for line in suggestions.lines() {
                ctx.sink.plain(line);
            }
            ctx.sink.plain("");
        }
    }

    async fn generate_with_ai(&self, ctx: &AppContext<'_>, settings: &Settings, prompt: &str) {
        ctx.sink.info("=== Generating curl command with AI ===");
        let Some(generator) = prompt_generator(&ctx.transport, settings) else {
            ctx.sink.error(
                "Error: No AI API key configured. \
                 Use --set-gemini-key or --set-openai-key to set one.",
            );
            return;
        };

        match AiAssistant::new(generator).generate_command(prompt, settings).await {
            Ok(Some(command)) => {
                ctx.sink.success("Generated curl command:");
                ctx.sink.success(&command);
                if self.save {
                    self.persist(ctx, ArtifactKind::Command, &command, "Curl command saved to");
                }
            }
            Ok(None) => ctx.sink.error("Failed to generate curl command from AI."),
            Err(err) => ctx.sink.error(&format!("Error: {}", err)),
        }
    }

    fn persist(&self, ctx: &AppContext<'_>, kind: ArtifactKind, content: &str, label: &str) {
        match ctx.artifacts.save(kind, content) {
            Ok(path) => ctx.sink.success(&format!("{}: {}", label, path.display())),
            Err(err) => ctx.sink.error(&format!("Error saving file: {:#}", err)),
        }
    }
}

/// Gemini when its key is set, otherwise OpenAI.
fn prompt_generator(
    transport: &Arc<dyn HttpClient>,
    settings: &Settings,
) -> Option<Box<dyn PromptGenerator>> {
    let gemini_key = non_blank(&settings.gemini_api_key);
    let generator: Box<dyn PromptGenerator> = if let Some(key) = gemini_key {
        Box::new(GeminiClient::new(Box::new(transport.clone()), key))
    } else {
        let key = non_blank(&settings.open_ai_api_key)?;
        Box::new(OpenAiClient::new(Box::new(transport.clone()), key))
    };
    Some(generator)
}
