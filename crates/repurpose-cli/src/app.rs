//! Command handlers for the repurpose CLI.
//!
//! `App` owns the configured gateway client and runs one command against
//! it. Each command maps onto a screen of the web client; protected
//! commands go through the route guard first, the way a page load would.

use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info, warn};

use repurpose_core::api::content::DEFAULT_CONTENT_PAGE_SIZE;
use repurpose_core::api::generate::DEFAULT_HISTORY_PAGE_SIZE;
use repurpose_core::api::BrandVoiceUpdate;
use repurpose_core::auth::{self, RegisterForm, RegisterOutcome, RouteDecision};
use repurpose_core::models::{Content, Generation, Platform, Tone};
use repurpose_core::utils::{format_timestamp, truncate_string};
use repurpose_core::{
    ApiClient, AuthState, Config, ContentStore, Navigator, Notice, RefreshPolicy, Route,
    RouteGuard, SessionContext,
};

use crate::args::Args;

/// Items shown per list on the dashboard
const DASHBOARD_RECENT: u32 = 5;

/// Width of body previews in list output
const PREVIEW_WIDTH: usize = 60;

/// Navigator for a terminal: there is no page to move to, so a redirect
/// to the login route becomes a hint on stderr.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, path: &str) {
        debug!(path, "Redirect requested");
        if path == Route::Login.path() {
            eprintln!("Run `repurpose login` to sign in.");
        }
    }
}

pub struct App {
    config: Config,
    api: ApiClient,
    guard: RouteGuard,
    contents: ContentStore,
}

impl App {
    pub fn new(config: Config, args: &Args) -> Result<Self> {
        let api_url = args
            .option("api-url")
            .map(str::to_string)
            .unwrap_or_else(|| config.api_url());

        let policy = match args.option("refresh-policy") {
            Some(raw) => RefreshPolicy::from_str(raw)
                .ok_or_else(|| anyhow!("Unknown refresh policy: {}", raw))?,
            None => config.refresh_policy,
        };

        let storage = config.open_storage()?;
        let session = SessionContext::new(storage.clone(), Arc::new(TerminalNavigator));
        let api = ApiClient::with_timeout(&api_url, session, config.request_timeout())?
            .with_refresh_policy(policy);

        info!(api_url = %api.base_url(), ?policy, "Client configured");

        Ok(Self {
            config,
            api,
            guard: RouteGuard::new(storage),
            contents: ContentStore::new(),
        })
    }

    /// Run the command named by the first positional.
    pub async fn run(&mut self, args: &Args) -> Result<()> {
        let command = args.positional(0).unwrap_or("dashboard");

        match command {
            "login" => self.login(args).await,
            "register" => self.register().await,
            "logout" => self.logout(),
            "whoami" => self.whoami().await,
            "route" => self.route(args),
            "dashboard" => self.dashboard().await,
            "content" => self.content(args).await,
            "generate" => self.generate(args).await,
            "history" => self.history(args).await,
            "generation" => self.generation(args).await,
            "regenerate" => self.regenerate(args).await,
            "voices" => self.voices(args).await,
            other => bail!("Unknown command: {}", other),
        }
    }

    /// Gate a command on its route, then assume the stored session.
    fn enter(&self, route: Route) -> Result<()> {
        match self.guard.decide(route) {
            RouteDecision::Render => {
                self.api.session().auth().init_auth()?;
                Ok(())
            }
            RouteDecision::Redirect(target) => {
                debug!(from = route.path(), to = target.path(), "Route redirected");
                bail!("Not logged in. Run `repurpose login` first.")
            }
        }
    }

    // =========================================================================
    // Account
    // =========================================================================

    async fn login(&mut self, args: &Args) -> Result<()> {
        if let RouteDecision::Redirect(_) = self.guard.decide(Route::Login) {
            println!("Already logged in. Run `repurpose logout` to switch accounts.");
            return Ok(());
        }

        let email = match args.positional(1) {
            Some(email) => email.to_string(),
            None => prompt("Email", self.config.last_email.as_deref())?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        println!("\nAuthenticating...");
        let user = auth::login(&self.api, &email, &password).await?;

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("{}", Notice::success(format!("Logged in as {}", user.display_name())));
        Ok(())
    }

    async fn register(&mut self) -> Result<()> {
        if let RouteDecision::Redirect(_) = self.guard.decide(Route::Register) {
            println!("Already logged in. Run `repurpose logout` to create another account.");
            return Ok(());
        }

        let form = RegisterForm {
            email: prompt("Email", None)?,
            username: prompt("Username", None)?,
            password: rpassword::prompt_password("Password: ")?,
            confirm_password: rpassword::prompt_password("Confirm password: ")?,
        };

        match auth::register(&self.api, &form).await? {
            RegisterOutcome::LoggedIn(user) => {
                self.config.last_email = Some(form.email.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                println!(
                    "{}",
                    Notice::success(format!("Account created. Logged in as {}", user.display_name()))
                );
            }
            RegisterOutcome::LoginRequired(_) => {
                println!(
                    "{}",
                    Notice::success("Account created. Please log in with your new credentials.")
                );
            }
        }
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        self.api.session().auth().logout()?;
        println!("{}", Notice::success("Logged out"));
        Ok(())
    }

    async fn whoami(&self) -> Result<()> {
        self.enter(Route::Settings)?;

        match auth::bootstrap(&self.api).await? {
            AuthState::Verified(user) => {
                println!("{}", user.display_name());
                println!("  Email: {}", user.email);
                println!("  Plan:  {}", user.plan_display());
                if let Some(ref created) = user.created_at {
                    println!("  Since: {}", format_timestamp(created));
                }
            }
            AuthState::Unverified => {
                let email = self.api.session().user_email()?;
                println!(
                    "{} (backend unreachable, session not verified)",
                    email.as_deref().unwrap_or("unknown user")
                );
            }
            AuthState::Anonymous => bail!("Session is no longer valid. Run `repurpose login`."),
        }
        Ok(())
    }

    fn route(&self, args: &Args) -> Result<()> {
        let path = args.required(1, "route path")?;
        let route = Route::from_path(path).ok_or_else(|| anyhow!("Unknown route: {}", path))?;
        match self.guard.decide(route) {
            RouteDecision::Render => println!("{} renders", route.path()),
            RouteDecision::Redirect(target) => {
                println!("{} redirects to {}", route.path(), target.path())
            }
        }
        Ok(())
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    async fn dashboard(&mut self) -> Result<()> {
        self.enter(Route::Dashboard)?;

        let (contents, generations) = futures::try_join!(
            self.api.list_content(0, DASHBOARD_RECENT),
            self.api.generation_history(0, DASHBOARD_RECENT),
        )?;

        println!("Recent content");
        if contents.is_empty() {
            println!("  (none yet, try `repurpose content text ...`)");
        }
        for content in &contents {
            print_content_line(content);
        }

        println!("\nRecent generations");
        if generations.is_empty() {
            println!("  (none yet)");
        }
        for generation in &generations {
            print_generation_line(generation);
        }

        self.contents.set_contents(contents);
        Ok(())
    }

    // =========================================================================
    // Content library
    // =========================================================================

    async fn content(&mut self, args: &Args) -> Result<()> {
        let sub = args.positional(1).unwrap_or("list");
        let route = match sub {
            "text" | "url" | "file" => Route::NewProject,
            _ => Route::ContentLibrary,
        };
        self.enter(route)?;

        let title = args.option("title");
        match sub {
            "list" => {
                let skip = args.number("skip", 0)?;
                let limit = args.number("limit", DEFAULT_CONTENT_PAGE_SIZE)?;
                let contents = self.api.list_content(skip, limit).await?;
                if contents.is_empty() {
                    println!("No content yet.");
                }
                for content in &contents {
                    print_content_line(content);
                }
                self.contents.set_contents(contents);
            }
            "show" => {
                let id = args.id(2)?;
                let (content, history) = futures::try_join!(
                    self.api.get_content(id),
                    self.api.generation_history(0, DEFAULT_HISTORY_PAGE_SIZE),
                )?;
                let generations: Vec<Generation> = history
                    .into_iter()
                    .filter(|g| g.content_id == id)
                    .collect();

                self.contents.add_content(content);
                self.contents.set_selected(Some(id));
                self.contents.set_generations(id, generations);

                if let Some(content) = self.contents.selected() {
                    println!("#{} {}", content.id, content.title_display());
                    println!(
                        "  {} | {} words | {}",
                        content.content_type.as_str(),
                        content.word_count.unwrap_or(0),
                        format_timestamp(&content.created_at)
                    );
                    println!("\n{}\n", content.original_content);
                }
                for generation in self.contents.generations(id) {
                    print_generation_line(generation);
                }
            }
            "text" => {
                let text = if args.switch("stdin") {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                } else {
                    args.rest(2).unwrap_or_default()
                };
                let content = self.api.upload_text(title, &text).await?;
                self.report_upload(content);
            }
            "url" => {
                let url = args.positional(2).unwrap_or_default();
                let content = self.api.import_url(title, url).await?;
                self.report_upload(content);
            }
            "file" => {
                let path = args.required(2, "file path")?;
                let content = self.api.upload_file(title, Path::new(path)).await?;
                self.report_upload(content);
            }
            "delete" => {
                let id = args.id(2)?;
                self.api.delete_content(id).await?;
                self.contents.remove_content(id);
                println!("{}", Notice::success("Content deleted"));
            }
            other => bail!("Unknown content command: {}", other),
        }
        Ok(())
    }

    fn report_upload(&mut self, content: Content) {
        println!(
            "{}",
            Notice::success(format!(
                "Uploaded #{} {}",
                content.id,
                content.title_display()
            ))
        );
        self.contents.add_content(content);
    }

    // =========================================================================
    // Generation
    // =========================================================================

    async fn generate(&mut self, args: &Args) -> Result<()> {
        self.enter(Route::NewProject)?;

        let content_id = args.id(1)?;
        let platforms = match args.option("platforms") {
            Some(raw) => parse_platforms(raw)?,
            None => Vec::new(),
        };
        let tone = args
            .option("tone")
            .unwrap_or_else(|| Tone::default().as_str());
        let voice = match args.option("voice") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| anyhow!("Not a valid brand voice id: {}", raw))?,
            ),
            None => None,
        };

        println!("Generating...");
        let result = self.api.repurpose(content_id, &platforms, tone, voice).await?;

        for (platform, text) in &result.platform_results {
            let label = Platform::from_str(platform)
                .map(|p| p.label())
                .unwrap_or(platform.as_str());
            println!("\n== {} ==\n{}", label, text);
        }
        for generation in result.generations {
            self.contents.add_generation(content_id, generation);
        }
        println!(
            "\n{}",
            Notice::success(format!(
                "Generated {} posts",
                self.contents.generations(content_id).len()
            ))
        );
        Ok(())
    }

    async fn history(&self, args: &Args) -> Result<()> {
        self.enter(Route::ContentLibrary)?;
        let skip = args.number("skip", 0)?;
        let limit = args.number("limit", DEFAULT_HISTORY_PAGE_SIZE)?;
        let generations = self.api.generation_history(skip, limit).await?;
        if generations.is_empty() {
            println!("No generations yet.");
        }
        for generation in &generations {
            print_generation_line(generation);
        }
        Ok(())
    }

    async fn generation(&mut self, args: &Args) -> Result<()> {
        self.enter(Route::ContentLibrary)?;
        match args.required(1, "generation command")? {
            "show" => {
                let generation = self.api.get_generation(args.id(2)?).await?;
                println!(
                    "#{} {} ({}) {}",
                    generation.id,
                    generation.platform_label(),
                    generation.tone,
                    format_timestamp(&generation.created_at)
                );
                println!("\n{}", generation.generated_text);
            }
            "delete" => {
                let id = args.id(2)?;
                self.api.delete_generation(id).await?;
                self.contents.remove_generation(id);
                println!("{}", Notice::success("Generation deleted"));
            }
            other => bail!("Unknown generation command: {}", other),
        }
        Ok(())
    }

    async fn regenerate(&self, args: &Args) -> Result<()> {
        self.enter(Route::ContentLibrary)?;
        let generation = self
            .api
            .regenerate(args.id(1)?, args.option("tone"))
            .await?;
        println!("{}\n", generation.generated_text);
        println!("{}", Notice::success("Regenerated"));
        Ok(())
    }

    // =========================================================================
    // Brand voices
    // =========================================================================

    async fn voices(&self, args: &Args) -> Result<()> {
        self.enter(Route::Settings)?;
        match args.positional(1).unwrap_or("list") {
            "list" => {
                let voices = self.api.list_brand_voices().await?;
                if voices.is_empty() {
                    println!("No brand voices yet.");
                }
                for voice in voices {
                    let marker = if voice.is_default { "*" } else { " " };
                    println!(
                        "{} #{:<4} {:<24} {}",
                        marker,
                        voice.id,
                        truncate_string(&voice.name, 24),
                        truncate_string(&voice.instructions, PREVIEW_WIDTH)
                    );
                }
            }
            "show" => {
                let voice = self.api.get_brand_voice(args.id(2)?).await?;
                println!("{}{}", voice.name, if voice.is_default { " (default)" } else { "" });
                println!("\n{}", voice.instructions);
            }
            "create" => {
                let name = args.required(2, "name")?;
                let instructions = args.rest(3).unwrap_or_default();
                let voice = self.api.create_brand_voice(name, &instructions).await?;
                println!("{}", Notice::success(format!("Created brand voice #{}", voice.id)));
            }
            "update" => {
                let update = BrandVoiceUpdate {
                    name: args.option("name").map(str::to_string),
                    instructions: args.option("instructions").map(str::to_string),
                    is_default: None,
                };
                self.api.update_brand_voice(args.id(2)?, &update).await?;
                println!("{}", Notice::success("Brand voice updated"));
            }
            "default" => {
                let update = BrandVoiceUpdate {
                    is_default: Some(true),
                    ..Default::default()
                };
                self.api.update_brand_voice(args.id(2)?, &update).await?;
                println!("{}", Notice::success("Default brand voice set"));
            }
            "delete" => {
                self.api.delete_brand_voice(args.id(2)?).await?;
                println!("{}", Notice::success("Brand voice deleted"));
            }
            other => bail!("Unknown voices command: {}", other),
        }
        Ok(())
    }
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    match (input.is_empty(), default) {
        (true, Some(d)) => Ok(d.to_string()),
        _ => Ok(input.to_string()),
    }
}

/// Parse a comma-separated platform list, e.g. `twitter,linkedin`.
fn parse_platforms(raw: &str) -> Result<Vec<Platform>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Platform::from_str(s).ok_or_else(|| anyhow!("Unknown platform: {}", s)))
        .collect()
}

fn print_content_line(content: &Content) {
    println!(
        "  #{:<5} {:<28} {}",
        content.id,
        truncate_string(content.title_display(), 28),
        content.preview(PREVIEW_WIDTH)
    );
}

fn print_generation_line(generation: &Generation) {
    println!(
        "  #{:<5} {:<12} {}  {}",
        generation.id,
        generation.platform_label(),
        format_timestamp(&generation.created_at),
        truncate_string(&generation.generated_text.replace('\n', " "), PREVIEW_WIDTH)
    );
}
