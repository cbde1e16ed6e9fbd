//! ledgerlink command-line client

use anyhow::{anyhow, bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use ledgerlink_api::{ApiClient, ApiError, EntrySubmission, SuggestionKind, UploadFile};
use ledgerlink_config::Config;
use ledgerlink_core::time::parse_flexible_date;
use ledgerlink_core::{
    open_session_store, Authenticator, CoreError, CredentialStore, Entry, FilterInput, ListingController,
    ListingStatus, RequestSigner, Side,
};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "ledgerlink")]
#[command(author = "ledgerlink Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Signed client for a remote transaction ledger", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Start a session
    Login {
        #[arg(short, long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show session and endpoint status
    Status,
    /// List entries
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Export entries as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Directory to write the file into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Submit a new entry
    Submit {
        #[arg(long)]
        date: String,
        #[arg(long)]
        amount: String,
        /// CR or DR
        #[arg(long, default_value = "CR")]
        side: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        /// Attach a file (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Autocomplete a category or description
    Suggest {
        /// category or description
        kind: String,
        text: String,
    },
    /// Print a signed link for a document URL
    Link { url: String },
}

#[derive(ClapArgs, Debug, Default)]
struct FilterArgs {
    /// Free-text search
    #[arg(short, long)]
    query: Option<String>,
    /// Start date
    #[arg(long)]
    from: Option<String>,
    /// End date
    #[arg(long)]
    to: Option<String>,
}

impl FilterArgs {
    fn to_input(&self) -> FilterInput {
        FilterInput {
            query: self.query.clone(),
            start_date: self.from.clone(),
            end_date: self.to.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::InitConfig { force } = &args.command {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        return init_config(&args.config, *force);
    }

    let config = Config::load(args.config.clone()).map_err(|e| anyhow!("{}", e.to_details()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();
    log::debug!("Config loaded from {}", args.config.display());

    let store = open_session_store(&config).map_err(user_error)?;
    let rt = Runtime::new()?;
    rt.block_on(run(args.command, config, store))
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, Config::generate_default()).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote default configuration to {}", path.display());
    Ok(())
}

async fn run(command: Command, config: Config, store: Arc<CredentialStore>) -> anyhow::Result<()> {
    match command {
        Command::InitConfig { .. } => Ok(()),
        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let auth = Authenticator::new(config.auth.clone(), store);
            auth.login(&username, &password).map_err(user_error)?;
            println!("Logged in as {}", username);
            Ok(())
        }
        Command::Logout => {
            Authenticator::new(config.auth.clone(), store).logout().map_err(user_error)?;
            println!("Logged out");
            Ok(())
        }
        Command::Status => {
            let credential = store.credential();
            println!("Session:  {}", if credential.logged_in { "logged in" } else { "logged out" });
            println!("Signing:  {}", if credential.can_sign() { "enabled" } else { "disabled" });
            println!("Entries:  {}", config.api.filter_endpoint);
            println!("Uploads:  {}", config.api.upload_endpoint);
            Ok(())
        }
        Command::List { filters, pages } => {
            let client = client(&config, store)?;
            list_entries(&client, config.listing.page_size, &filters, pages).await
        }
        Command::Export { filters, out } => {
            let client = client(&config, store)?;
            let export = client
                .export_entries(&filters.to_input().to_filters())
                .await
                .map_err(api_error)?;
            let path = export.save_in(&out).await.map_err(api_error)?;
            println!("Exported to {}", path.display());
            Ok(())
        }
        Command::Submit { date, amount, side, category, description, files } => {
            let client = client(&config, store)?;
            let submission = EntrySubmission {
                date: parse_flexible_date(&date).ok_or_else(|| anyhow!("Invalid date: {}", date))?,
                amount: Decimal::from_str(amount.trim()).map_err(|e| anyhow!("Invalid amount {}: {}", amount, e))?,
                side: Side::from_str(&side).map_err(|e| anyhow!(e))?,
                category,
                description,
                files: read_files(&files).await?,
            };
            submit(&client, submission).await
        }
        Command::Suggest { kind, text } => {
            let kind = SuggestionKind::from_str(&kind).map_err(|e| anyhow!(e))?;
            let client = client(&config, store)?;
            for suggestion in client.debounced_suggestions(kind, &text).await.unwrap_or_default() {
                println!("{}", suggestion);
            }
            Ok(())
        }
        Command::Link { url } => {
            let client = client(&config, store)?;
            println!("{}", client.transport().sign_for_link(&url));
            Ok(())
        }
    }
}

fn client(config: &Config, store: Arc<CredentialStore>) -> anyhow::Result<ApiClient> {
    ApiClient::new(config, RequestSigner::new(store)).map_err(api_error)
}

async fn list_entries(client: &ApiClient, page_size: usize, filters: &FilterArgs, pages: usize) -> anyhow::Result<()> {
    let mut listing = ListingController::new(page_size);
    let input = filters.to_input();
    if input == FilterInput::default() {
        listing.reset_and_load(client).await;
    } else {
        listing.apply_filters(&input, client).await;
    }

    for _ in 1..pages {
        if !matches!(listing.status(), ListingStatus::Loaded) || !listing.load_more(client).await {
            break;
        }
    }

    match listing.status() {
        ListingStatus::Empty(message) => println!("{}", message),
        ListingStatus::Error(message) => bail!("{}", message),
        _ => {
            for entry in listing.entries() {
                print_entry(client, entry);
            }
            let state = listing.state();
            println!(
                "{} entries over {} page(s){}",
                state.total_loaded,
                state.page,
                if state.exhausted { "" } else { " (more available)" }
            );
        }
    }
    Ok(())
}

fn print_entry(client: &ApiClient, entry: &Entry) {
    println!(
        "{:<14} {:>12} {:<20} {}{}",
        entry.display_date(),
        entry.display_amount(),
        entry.category,
        entry.description,
        entry.human_code.as_deref().map(|c| format!(" [{}]", c)).unwrap_or_default()
    );
    for link in client.document_links(entry) {
        println!("    {} ({}): {}", link.name, link.kind, link.url);
    }
}

async fn submit(client: &ApiClient, submission: EntrySubmission) -> anyhow::Result<()> {
    let handle = client.submit_entry(submission).map_err(api_error)?;
    handle
        .wait_with_progress(|fraction| {
            eprint!("\rUploading... {:>3.0}%", fraction * 100.0);
            let _ = std::io::stderr().flush();
        })
        .await
        .map_err(api_error)?;
    eprintln!();
    println!("Entry submitted");
    Ok(())
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(UploadFile::read(path).await.with_context(|| format!("reading {}", path.display()))?);
    }
    Ok(files)
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn user_error(error: CoreError) -> anyhow::Error {
    log::debug!("{}", error.to_details());
    if error.is_user_visible() {
        anyhow!(error.user_message())
    } else {
        anyhow!(error)
    }
}

fn api_error(error: ApiError) -> anyhow::Error {
    match error {
        ApiError::UploadFailed { message } => anyhow!(message),
        other => user_error(other.into()),
    }
}
