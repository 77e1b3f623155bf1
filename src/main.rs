use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;

use flashdeck::auth::Auth;
use flashdeck::config::Config;
use flashdeck::remote::RemoteClient;
use flashdeck::speech::{system_speech, CommandSpeech, Speech};
use flashdeck::storage::{Database, LocalStore};
use flashdeck::sync::{Catalog, NewCard, NewCategory};
use flashdeck::{seed, ui};

/// Get the config directory path (~/.config/flashdeck/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("flashdeck"))
}

#[derive(Parser, Debug)]
#[command(name = "flashdeck", about = "Flashcards with a REST backend and offline fallback")]
struct Args {
    /// Override the API base URL from config
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all categories with their card counts
    List,
    /// Create a new category
    Create {
        title: String,
        /// Display color token, e.g. "#ffd166"
        #[arg(long)]
        color: Option<String>,
    },
    /// Append a card to a category
    AddCard {
        category: String,
        label: String,
        image_url: String,
        /// Spoken-text override (defaults to the label)
        #[arg(long)]
        speak: Option<String>,
    },
    /// Search categories and cards
    Search { query: String },
    /// Browse a category's cards interactively
    View {
        category: String,
        /// Card index to start at
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
    /// Register a new user
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Log in and open a session
    Login { email: String, password: String },
    /// Close the current session
    Logout,
    /// Show the currently authenticated user
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let config = Config::load(&config_dir.join("config.toml"))?;

    let db_path = config_dir.join("cards.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = Database::open(db_path_str)
        .await
        .context("Failed to open local store")?;

    let local = LocalStore::new(db.clone(), seed::default_categories());
    let base_url = args.api_base.unwrap_or_else(|| config.api_base_url.clone());
    let remote = RemoteClient::new(reqwest::Client::new(), &base_url)?
        .with_timeout(Duration::from_secs(config.request_timeout_secs));
    let catalog = Catalog::new(remote, local);
    let auth = Auth::new(db);

    match args.command {
        Command::List => {
            for category in catalog.categories().await {
                println!(
                    "{:<16} {:<20} {:>3} cards  {}",
                    category.id,
                    category.title,
                    category.cards.len(),
                    category.color
                );
            }
        }

        Command::Create { title, color } => {
            let created = catalog.create_category(NewCategory { title, color }).await?;
            println!("Created category '{}' (id: {})", created.title, created.id);
        }

        Command::AddCard {
            category,
            label,
            image_url,
            speak,
        } => {
            let updated = catalog
                .append_card(
                    &category,
                    NewCard {
                        label,
                        image_url,
                        speak,
                    },
                )
                .await?;
            println!(
                "Added card to '{}' ({} cards total)",
                updated.title,
                updated.cards.len()
            );
        }

        Command::Search { query } => {
            let results = catalog.search(&query).await;
            if results.is_empty() {
                println!("No matches.");
            }
            for m in &results.category_matches {
                println!("category  {:<16} {}", m.id, m.title);
            }
            for m in &results.card_matches {
                println!(
                    "card      {:<16} {}  (in {}, index {})",
                    m.card.id, m.card.label, m.category_title, m.card_index
                );
            }
        }

        Command::View { category, index } => {
            let speech: Box<dyn Speech> = match &config.speech_command {
                Some(command) => Box::new(CommandSpeech::with_command(command)),
                None => system_speech(),
            };
            ui::run(&catalog, &category, index, speech).await?;
        }

        Command::Register {
            name,
            email,
            password,
        } => {
            let user = auth
                .register(&name, &email, SecretString::from(password))
                .await?;
            println!("Registered {} <{}>", user.name, user.email);
        }

        Command::Login { email, password } => {
            let user = auth.login(&email, SecretString::from(password)).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }

        Command::Logout => {
            auth.logout().await?;
            println!("Logged out.");
        }

        Command::Whoami => match auth.current_user().await {
            Some(user) => println!("{} <{}>", user.name, user.email),
            None => println!("Not logged in."),
        },
    }

    Ok(())
}
