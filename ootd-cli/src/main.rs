use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ootd_core::{
    Demographic, Preference, PromptParts, UserId, UserProfile, WardrobeSnapshot, compose_prompt,
    normalize_preferences, today_in_tz,
};
use ootd_suggest::{
    MemoryStore, PgStore, SuggestionEngine, SuggestionLedger, SuggestionRequest,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod llm;
mod server;
mod state;

const DEFAULT_LOG_FILTER: &str = "ootd=info,ootd_suggest=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "ootd", version, about = "Outfit-of-the-day suggestions from a personal wardrobe")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve {
        /// Override server.bind from config.toml
        #[arg(long)]
        bind: Option<String>,
    },

    /// Create the users/outfits tables if they are missing
    Migrate,

    /// Manage ~/.ootd/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print the prompt that would be sent for a wardrobe file (no model call)
    Prompt {
        #[command(flatten)]
        input: WardrobeInput,
    },

    /// Parse a saved model reply and print the outfit options as JSON
    Parse {
        /// Text file holding the raw reply
        file: PathBuf,
    },

    /// Run one suggestion against a wardrobe file using the configured model
    Suggest {
        #[command(flatten)]
        input: WardrobeInput,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,

    /// Print the effective config
    Show,
}

#[derive(clap::Args, Debug)]
struct WardrobeInput {
    /// JSON array of garments
    #[arg(long)]
    wardrobe: PathBuf,

    /// Preference as Category=Tag (repeatable)
    #[arg(long = "pref")]
    prefs: Vec<String>,

    #[arg(long)]
    gender: Option<String>,

    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    dob: Option<NaiveDate>,

    /// User id the garments are assigned to
    #[arg(long, default_value_t = 1)]
    user: UserId,
}

impl WardrobeInput {
    fn preferences(&self) -> Result<Vec<Preference>> {
        self.prefs.iter().map(|p| Preference::parse_pair(p)).collect()
    }

    fn demographic(&self, timezone: &str) -> Result<Option<Demographic>> {
        let profile = UserProfile {
            gender: self.gender.clone(),
            dob: self.dob,
        };
        let today = today_in_tz(timezone)?;
        Ok(Demographic::from_profile(&profile, today))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let cfg = config::load_config()?;
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());

            let store = Arc::new(
                PgStore::connect(&cfg.database_url(), cfg.database.max_connections)
                    .await
                    .context("connect to database")?,
            );
            let model = llm::build_model(&cfg.llm)?;
            let engine = SuggestionEngine::new(
                store.clone(),
                store,
                model,
                Arc::new(SuggestionLedger::new(cfg.history.capacity)),
                cfg.engine_settings(),
            );

            info!(provider = %cfg.llm.provider, model = %cfg.llm.model, "Starting ootd server");
            server::serve(
                server::AppState {
                    engine: Arc::new(engine),
                },
                &bind,
            )
            .await?;
        }

        Command::Migrate => {
            let cfg = config::load_config()?;
            let store = PgStore::connect(&cfg.database_url(), cfg.database.max_connections)
                .await
                .context("connect to database")?;
            store.ensure_schema().await.context("create schema")?;
            println!("Schema is up to date");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Prompt { input } => {
            let cfg = config::load_config()?;
            let garments = state::read_wardrobe_json(&input.wardrobe, input.user)?;
            let Some(snapshot) = WardrobeSnapshot::build(&garments) else {
                bail!("{} holds no garments", input.wardrobe.display());
            };
            let preferences = normalize_preferences(&input.preferences()?);
            let demographic = input.demographic(&cfg.profile.timezone)?;

            let prompt = compose_prompt(&PromptParts {
                snapshot: &snapshot,
                demographic: demographic.as_ref(),
                preferences: &preferences,
                history: &[],
            });
            println!("{prompt}");
        }

        Command::Parse { file } => {
            let text = state::read_text(&file)?;
            let parsed = ootd_parse::parse_outfit_reply_detailed(&text);
            info!(
                options = parsed.options.len(),
                slots = parsed.slot_count(),
                preamble_lines = parsed.preamble_lines,
                unread_lines = parsed.unread_lines,
                "parsed reply"
            );
            println!("{}", serde_json::to_string_pretty(&parsed.options)?);
        }

        Command::Suggest { input } => {
            let cfg = config::load_config()?;
            let garments = state::read_wardrobe_json(&input.wardrobe, input.user)?;
            let store = Arc::new(MemoryStore::with_garments(garments));
            let engine = SuggestionEngine::new(
                store.clone(),
                store,
                llm::build_model(&cfg.llm)?,
                Arc::new(SuggestionLedger::new(cfg.history.capacity)),
                cfg.engine_settings(),
            );

            let mut req = SuggestionRequest::new(input.user, input.preferences()?);
            req.demographic = input.demographic(&cfg.profile.timezone)?;

            let set = engine.generate_suggestions(&req).await?;
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
    }

    Ok(())
}
