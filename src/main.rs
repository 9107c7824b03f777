//! zotero - search Zotero libraries and format citations from the terminal.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use zotero_client::api::Page;
use zotero_client::storage::{self, KeyValueStore, StorageBackend};
use zotero_client::{logging, AppError, Item, Session, Settings, ZoteroClient};

#[derive(Debug, Parser)]
#[command(name = "zotero", version, about = "Search Zotero libraries and format citations")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API origin.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Credential storage backend: keyring, file or memory.
    #[arg(long, global = true)]
    store: Option<StorageBackend>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve an API key and remember it.
    Login {
        /// Personal API key from https://www.zotero.org/settings/keys
        api_key: String,
    },
    /// Forget stored credentials.
    Logout,
    /// Show the stored account.
    Status,
    /// Search your personal library.
    Items {
        /// Quick-search text.
        query: String,
        /// Follow pagination to the last page.
        #[arg(long)]
        all: bool,
    },
    /// Search a group library.
    Group {
        /// Group id.
        group_id: String,
        /// Quick-search text.
        query: String,
        /// Follow pagination to the last page.
        #[arg(long)]
        all: bool,
    },
    /// List the groups you belong to.
    Groups {
        /// Fetch the list from Zotero instead of using the stored one.
        #[arg(long)]
        refresh: bool,
    },
    /// Format items as a bibliography.
    Cite {
        /// Item keys.
        #[arg(required = true)]
        item_keys: Vec<String>,
        /// Group library holding the items.
        #[arg(long)]
        group: Option<String>,
        /// CSL style name.
        #[arg(long)]
        style: Option<String>,
        /// Citation locale.
        #[arg(long)]
        locale: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        let code = match e.downcast_ref::<AppError>() {
            Some(app_err) => {
                eprintln!("error: {}", app_err.user_message());
                eprintln!("       ({})", app_err);
                if let Some(action) = app_err.suggested_action() {
                    eprintln!("hint: {}", action);
                }
                app_err.exit_code()
            }
            None => {
                eprintln!("error: {:#}", e);
                1
            }
        };
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;
    let client = ZoteroClient::new(&settings).map_err(AppError::from)?;
    let store = storage::open(settings.storage, settings.storage_path.as_deref())
        .map_err(AppError::from)?;
    let mut session = Session::new(store);
    let configured = session.has_settings().map_err(AppError::from)?;
    info!(configured, backend = %settings.storage, "Session ready");

    match cli.command {
        Command::Login { api_key } => {
            let outcome = client
                .login(&mut session, api_key.trim())
                .await
                .map_err(AppError::from)?;
            println!("Logged in as user {}", outcome.user_id);
            match outcome.groups {
                Ok(groups) => println!("Member of {} group(s)", groups.len()),
                Err(e) => eprintln!("warning: could not load groups: {}", e),
            }
        }
        Command::Logout => {
            session.clear_settings().map_err(AppError::from)?;
            println!("Credentials removed");
        }
        Command::Status => match session.user_id() {
            Some(user_id) if session.credentials().is_configured() => {
                println!("User:   {}", user_id);
                println!("Groups: {}", session.user_groups().join(", "));
                println!("API:    {}", client.base_url());
            }
            _ => println!("Not logged in"),
        },
        Command::Items { query, all } => {
            let page = client.items(&session, &query).await.map_err(AppError::from)?;
            print_items(&client, &session, page, all).await?;
        }
        Command::Group {
            group_id,
            query,
            all,
        } => {
            let page = client
                .groups(&session, &query, &group_id)
                .await
                .map_err(AppError::from)?;
            print_items(&client, &session, page, all).await?;
        }
        Command::Groups { refresh } => {
            if refresh {
                client
                    .refresh_user_groups(&mut session)
                    .await
                    .map_err(AppError::from)?;
            }
            for group in session.user_groups() {
                println!("{}", group);
            }
        }
        Command::Cite {
            item_keys,
            group,
            style,
            locale,
        } => {
            let keys: Vec<&str> = item_keys.iter().map(String::as_str).collect();
            let style = style.unwrap_or_else(|| settings.style.clone());
            let locale = locale.unwrap_or_else(|| settings.locale.clone());
            let bib = client
                .format(&session, &keys, group.as_deref(), &style, &locale)
                .await
                .map_err(AppError::from)?;
            println!("{}", bib);
        }
    }

    Ok(())
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Settings::default_path().map_err(AppError::from)?,
    };
    let settings = Settings::load_with_overrides(&path, cli.base_url.as_deref(), cli.store)
        .map_err(AppError::from)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(settings)
}

async fn print_items<S: KeyValueStore>(
    client: &ZoteroClient,
    session: &Session<S>,
    page: Page<Item>,
    all: bool,
) -> anyhow::Result<()> {
    let has_more = page.has_next();
    let items = if all {
        client
            .collect_all(session, page)
            .await
            .map_err(AppError::from)?
    } else {
        page.items
    };

    for item in &items {
        println!("{}", item);
    }
    if has_more && !all {
        eprintln!("(more results available, pass --all to fetch every page)");
    }
    Ok(())
}
