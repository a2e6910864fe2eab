//! gutenshelf - browse the Gutendex catalog from a terminal.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use gutenshelf_core::config::{AppConfig, LoggingConfig};
use gutenshelf_runtime::screen::detail::{self, detail_id_from_query};
use gutenshelf_runtime::screen::{browse, wishlist, Phase};
use gutenshelf_runtime::{Driver, Runtime};

mod print;
mod repl;

#[derive(Parser, Debug)]
#[clap(
    name = "gutenshelf",
    about = "Browse Project Gutenberg books and keep a reading wishlist",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Use this config file instead of the default location
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG and the config)
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a page of books, or browse interactively
    Browse {
        /// Search text; defaults to the saved search
        #[clap(long)]
        search: Option<String>,

        /// Remote subject or bookshelf filter
        #[clap(long)]
        topic: Option<String>,

        /// Show only books with this genre on the loaded page
        #[clap(long)]
        genre: Option<String>,

        /// Page to load first
        #[clap(long, default_value_t = 1)]
        page: u32,

        /// Read search text and commands from stdin
        #[clap(short, long)]
        interactive: bool,
    },

    /// Show one book by id or detail link
    Show {
        /// Book id, `?id=N`, or a `book-details.html?id=N` link
        book: String,

        /// Flip wishlist membership after loading
        #[clap(long)]
        toggle: bool,
    },

    /// List or edit the wishlist
    Wishlist {
        #[clap(subcommand)]
        command: Option<WishlistCommand>,
    },

    /// Inspect configuration
    Config {
        #[clap(subcommand)]
        command: Option<ConfigCommand>,
    },
}

#[derive(Subcommand, Debug)]
enum WishlistCommand {
    /// Resolve and list every wishlisted book
    List,
    Add { id: u64 },
    Remove { id: u64 },
    Toggle { id: u64 },
    /// Remove every book
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
}

fn initialize_tracing(logging: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let filter = if verbose {
        EnvFilter::new("gutenshelf=debug")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&logging.level))
            .with_context(|| format!("invalid logging.level {:?}", logging.level))?
    };

    if logging.file {
        let appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "gutenshelf.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        Ok(Some(guard))
    } else {
        // stdout carries the rendered output
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let _guard = initialize_tracing(&config.logging, cli.verbose)?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Config { command } => config_command(command, &config, &config_path, &mut out),
        Command::Browse {
            search,
            topic,
            genre,
            page,
            interactive,
        } => {
            let runtime = start(config)?;
            let options = BrowseOptions {
                search,
                topic,
                genre,
                page,
            };
            browse_command(&runtime, options, interactive, &mut out).await
        }
        Command::Show { book, toggle } => {
            let runtime = start(config)?;
            show_command(&runtime, &book, toggle, &mut out).await
        }
        Command::Wishlist { command } => {
            let runtime = start(config)?;
            let command = command.unwrap_or(WishlistCommand::List);
            wishlist_command(&runtime, command, &mut out).await
        }
    }
}

fn start(config: AppConfig) -> Result<Runtime> {
    Runtime::new(config).context("failed to open the book shelf")
}

struct BrowseOptions {
    search: Option<String>,
    topic: Option<String>,
    genre: Option<String>,
    page: u32,
}

async fn browse_command(
    runtime: &Runtime,
    options: BrowseOptions,
    interactive: bool,
    out: &mut impl Write,
) -> Result<()> {
    let mut prefs = runtime.preferences();
    if let Some(search) = options.search {
        prefs.search = search;
    }
    if let Some(genre) = options.genre {
        prefs.genre = Some(genre);
    }
    let screen = runtime
        .browse()
        .with_preferences(prefs)
        .with_topic(options.topic)
        .with_start_page(options.page);
    let mut driver = Driver::new(screen);

    let screen = if interactive {
        repl::run(driver, out).await?
    } else {
        driver.dispatch(browse::Message::Load);
        let frames = driver.settle().await;
        if let Some(last) = frames.last() {
            print::paint(out, last)?;
        }
        driver.into_screen()
    };

    if let Err(e) = runtime.save_preferences(&screen.preferences()) {
        tracing::warn!("Failed to save preferences: {e}");
    }
    if let Phase::Failed(e) = screen.phase() {
        bail!("{e}");
    }
    Ok(())
}

async fn show_command(
    runtime: &Runtime,
    book: &str,
    toggle: bool,
    out: &mut impl Write,
) -> Result<()> {
    let id = book
        .trim()
        .parse()
        .ok()
        .or_else(|| detail_id_from_query(book))
        .with_context(|| format!("no book id in {book:?}"))?;

    let mut driver = Driver::new(runtime.detail(id));
    driver.dispatch(detail::Message::Load);
    print::paint_all(out, &driver.settle().await)?;

    if let Phase::Failed(e) = driver.screen().phase() {
        bail!("{e}");
    }
    if toggle {
        print::paint_all(out, &driver.dispatch(detail::Message::WishlistToggled))?;
    }
    Ok(())
}

async fn wishlist_command(
    runtime: &Runtime,
    command: WishlistCommand,
    out: &mut impl Write,
) -> Result<()> {
    let store = runtime.wishlist();
    match command {
        WishlistCommand::List => {
            let mut driver = Driver::new(runtime.wishlist_view());
            let mut frames = driver.dispatch(wishlist::Message::Load);
            frames.extend(driver.settle().await);
            if let Some(last) = frames.last() {
                print::paint(out, last)?;
            }
            if let Phase::Failed(e) = driver.screen().phase() {
                bail!("{e}");
            }
        }
        WishlistCommand::Add { id } => {
            if store.add(id)? {
                writeln!(out, "Added #{id} to the wishlist")?;
            } else {
                writeln!(out, "#{id} is already on the wishlist")?;
            }
        }
        WishlistCommand::Remove { id } => {
            if store.remove(id)? {
                writeln!(out, "Removed #{id} from the wishlist")?;
            } else {
                writeln!(out, "#{id} is not on the wishlist")?;
            }
        }
        WishlistCommand::Toggle { id } => {
            let now = store.toggle(id)?;
            let verb = if now { "Added" } else { "Removed" };
            writeln!(out, "{verb} #{id}")?;
        }
        WishlistCommand::Clear => {
            let count = store.len();
            store.clear()?;
            writeln!(out, "Cleared {count} book(s) from the wishlist")?;
        }
    }
    Ok(())
}

fn config_command(
    command: Option<ConfigCommand>,
    config: &AppConfig,
    path: &std::path::Path,
    out: &mut impl Write,
) -> Result<()> {
    match command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Path => writeln!(out, "{}", path.display())?,
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(config).context("failed to render config")?;
            write!(out, "{text}")?;
        }
    }
    Ok(())
}
