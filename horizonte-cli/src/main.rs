use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use horizonte_advisor::{build_prompt, offline_reply, parse_response, render_plain};
use horizonte_catalog::load_catalog;

mod auth;
mod chat;
mod chat_worker;
mod config;
mod llm;
mod llm_stream;
mod report;
mod sse;
mod state;

use llm::{ChatTurn, LlmConfig};
use llm_stream::StreamEvent;

#[derive(Parser, Debug)]
#[command(
    name = "horizonte",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("HORIZONTE_BUILD_SHA"), ")"),
    about = "Construction and EVN advisory assistant"
)]
struct Cli {
    /// Debug logging (overridden by HORIZONTE_LOG / RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct CatalogArgs {
    /// Industries file (.json)
    #[arg(long)]
    industries: Option<PathBuf>,

    /// Companies file (.json or .csv)
    #[arg(long)]
    companies: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a prompt and show the routing decision
    Route {
        prompt: String,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Route a prompt and answer it with the configured model
    Ask {
        prompt: String,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Wait for the full answer and print it rendered
        #[arg(long)]
        no_stream: bool,

        /// Frame output as server-sent events
        #[arg(long)]
        sse: bool,
    },

    /// Interactive terminal chat
    Chat {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Print the effective signal table as JSON
    Profiles,

    /// Manage ~/.horizonte/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store API keys in ~/.horizonte/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    PasteMistralKey,
    PasteOpenaiKey,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("HORIZONTE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Route { prompt, json } => {
            let router = config::load_config()?.build_router()?;
            let decision = router.route(&prompt);
            if json {
                println!("{}", serde_json::to_string_pretty(&decision)?);
            } else {
                println!("{}", report::format_decision(&decision));
            }
        }

        Command::Ask { prompt, catalog, no_stream, sse } => {
            ask(&prompt, &catalog, no_stream, sse).await?;
        }

        Command::Chat { catalog } => {
            let cfg = config::load_config()?;
            let router = cfg.build_router()?;
            let catalog = load_catalog(catalog.industries.as_deref(), catalog.companies.as_deref())?;
            let handle = tokio::runtime::Handle::current();
            tokio::task::block_in_place(|| chat::run_chat(handle, &cfg, &router, &catalog))?;
        }

        Command::Profiles => {
            let router = config::load_config()?.build_router()?;
            println!("{}", router.table().to_json_pretty()?);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteMistralKey => auth::mistral_paste_key()?,
            AuthCommand::PasteOpenaiKey => auth::openai_paste_key()?,
        },
    }

    Ok(())
}

async fn ask(prompt: &str, catalog: &CatalogArgs, no_stream: bool, sse: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let decision = cfg.build_router()?.route(prompt);
    let catalog = load_catalog(catalog.industries.as_deref(), catalog.companies.as_deref())?;
    let pair = build_prompt(&decision, prompt, &catalog);

    let mut out = std::io::stdout();

    let Some(llm_cfg) = LlmConfig::resolve(&cfg)? else {
        warn!(provider = ?cfg.llm.provider, "no API key configured, replying offline");
        let reply = offline_reply(&decision);
        if sse {
            write!(out, "{}{}", sse::chunk_frame(&reply), sse::DONE)?;
        } else {
            writeln!(out, "{reply}")?;
        }
        return Ok(());
    };

    let turns = [ChatTurn::user(pair.user)];

    if no_stream {
        let text = match llm::chat_complete_async(&llm_cfg, &pair.system, &turns).await {
            Ok(text) => text,
            Err(e) if sse => {
                warn!(error = %format!("{e:#}"), "generation failed");
                write!(out, "{}", sse::error_frame("Stream error"))?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if sse {
            write!(out, "{}{}", sse::chunk_frame(&text), sse::DONE)?;
        } else {
            writeln!(out, "{}", render_plain(&parse_response(&text)))?;
        }
        return Ok(());
    }

    let mut write_err: Option<std::io::Error> = None;
    let res = llm_stream::stream_chat(&llm_cfg, &pair.system, &turns, |ev| {
        let frame = match ev {
            StreamEvent::Started => return,
            StreamEvent::Delta(text) if sse => sse::chunk_frame(&text),
            StreamEvent::Delta(text) => text,
            StreamEvent::Completed if sse => sse::DONE.to_string(),
            StreamEvent::Completed => "\n".to_string(),
        };
        if let Err(e) = out.write_all(frame.as_bytes()).and_then(|_| out.flush()) {
            write_err.get_or_insert(e);
        }
    })
    .await;

    match res {
        Err(e) if sse => {
            warn!(error = %format!("{e:#}"), "stream failed");
            write!(out, "{}", sse::error_frame("Stream error"))?;
        }
        Err(e) => return Err(e).context("streaming answer"),
        Ok(()) => {}
    }
    if let Some(e) = write_err {
        return Err(e).context("write to stdout");
    }

    Ok(())
}
