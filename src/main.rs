//! tkp - command-line front end of the toolkit palette
//!
//! One invocation is one palette session: focus, gather candidates, type the
//! query, then either list the results or execute one of them.
//!
//! # Output
//! - `query`: sections with numbered results (colored, or JSON with `--json`)
//! - `run`: the effect's output (copied text, navigation events) on stdout
//!
//! Logs go to stderr, filtered by `RUST_LOG`.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use toolkit_palette::action::{flat_get, icon_glyph, Section, INSTANT_SECTION, RECENT_SECTION};
use toolkit_palette::config::{get_config_path, get_recent_path, load_config};
use toolkit_palette::providers::{ConsoleDesktop, NativeSystem};
use toolkit_palette::registry::{builtin_tools, tools_by_category};
use toolkit_palette::{ExecuteOutcome, Executor, Palette, PaletteConfig, PaletteError, RecentStore};
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "tkp")]
#[command(about = "Developer-toolkit quick launcher: ranked actions and instant answers")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/toolkit-palette/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of the colored listing
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank actions and instant answers for a query ("-" reads stdin)
    Query { text: Vec<String> },

    /// Execute one result of a query
    Run {
        /// Position in the listing printed by `query`
        #[arg(long, short = 'i', default_value_t = 0)]
        index: usize,

        text: Vec<String>,
    },

    /// List the registered tools by category
    Tools,

    /// Show the recency list
    Recent {
        /// Forget every recent action
        #[arg(long)]
        clear: bool,
    },
}

fn main() {
    // Initialize tracing if RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(PaletteError::Runtime)
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(e) = result {
        error!("Error: {}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), PaletteError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => get_config_path()?,
    };
    let config = load_config(&config_path)?;

    let recent_path = if config.persist_recent {
        Some(get_recent_path()?)
    } else {
        None
    };
    let recent = match &recent_path {
        Some(path) => RecentStore::load_or_empty(path, config.max_recent),
        None => RecentStore::new(config.max_recent),
    };
    debug!("Loaded {} recent actions", recent.len());

    match cli.command {
        Commands::Tools => print_tools(cli.json),
        Commands::Recent { clear } => {
            let mut recent = recent;
            if clear {
                recent.clear();
                if let Some(path) = &recent_path {
                    recent.save(path)?;
                }
                info!("Cleared recent actions");
                return Ok(());
            }
            let sections = vec![Section {
                title: RECENT_SECTION.to_string(),
                actions: recent.actions().to_vec(),
            }];
            print_sections(&sections, cli.json)
        }
        Commands::Query { text } => {
            let query = read_query(&text)?;
            let mut palette = Palette::new(&config, builtin_tools(), recent);
            palette.on_focus();
            palette.refresh_candidates(&NativeSystem).await;
            palette.on_input(&query);
            print_sections(palette.sections(), cli.json)
        }
        Commands::Run { index, text } => {
            let query = read_query(&text)?;
            let executor = Executor::new(Arc::new(NativeSystem), Arc::new(ConsoleDesktop::new(&config)?));
            let mut palette = Palette::new(&config, builtin_tools(), recent);
            palette.on_focus();
            palette.refresh_candidates(executor.system()).await;
            palette.on_input(&query);

            let selected = flat_get(palette.sections(), index).map(|a| a.id.clone());
            let outcome = palette.execute_at(index, &executor).await;
            finish(&mut palette, outcome, index, selected, &config).await?;

            if let Some(path) = &recent_path {
                palette.recent().save(path)?;
            }
            Ok(())
        }
    }
}

async fn finish(
    palette: &mut Palette,
    outcome: ExecuteOutcome,
    index: usize,
    selected: Option<String>,
    config: &PaletteConfig,
) -> Result<(), PaletteError> {
    match outcome {
        ExecuteOutcome::Ignored => Err(PaletteError::NoSuchResult(index)),
        ExecuteOutcome::Failed => Err(PaletteError::ExecutionFailed(selected.unwrap_or_default())),
        ExecuteOutcome::Hidden => Ok(()),
        ExecuteOutcome::Feedback(kind) => {
            eprintln!("{} {}", "✓".green().bold(), format!("{:?}", kind).to_lowercase().green());
            debug!("Holding confirmation for {}ms", config.feedback_dwell_ms);
            palette.settle_feedback().await;
            Ok(())
        }
    }
}

/// Join the positional words; a lone "-" reads the query from stdin.
fn read_query(words: &[String]) -> Result<String, PaletteError> {
    if let [only] = words {
        if only == "-" {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            return Ok(input.trim_end_matches(['\r', '\n']).to_string());
        }
    }
    Ok(words.join(" "))
}

fn print_sections(sections: &[Section], json: bool) -> Result<(), PaletteError> {
    if json {
        println!("{}", serde_json::to_string_pretty(sections)?);
        return Ok(());
    }

    if sections.is_empty() {
        println!("{}", "No results".dimmed());
        return Ok(());
    }

    let mut index = 0;
    for section in sections {
        let title = if section.title == INSTANT_SECTION {
            section.title.yellow().bold()
        } else {
            section.title.blue().bold()
        };
        println!("{}", title);

        for action in &section.actions {
            let detail = match &action.result {
                Some(result) if !result.is_empty() => action.description.green(),
                _ => action.description.dimmed(),
            };
            let shortcut = action.shortcut.as_deref().unwrap_or_default();
            println!(
                "{:>3}  {} {}  {}  {}",
                index.to_string().dimmed(),
                icon_glyph(&action.icon),
                action.label.bold(),
                detail,
                shortcut.cyan()
            );
            index += 1;
        }
    }
    Ok(())
}

fn print_tools(json: bool) -> Result<(), PaletteError> {
    if json {
        println!("{}", serde_json::to_string_pretty(builtin_tools())?);
        return Ok(());
    }

    for (category, tools) in tools_by_category() {
        println!("{}", category.label().blue().bold());
        for tool in tools {
            println!(
                "  {} {:<20} {}",
                icon_glyph(tool.icon),
                tool.name.bold(),
                tool.description.dimmed()
            );
        }
    }
    Ok(())
}
