//! Knowledge Responder - a bilingual bot that learns question/answer pairs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use knowledge_responder::api::ApiServer;
use knowledge_responder::chat::{ChatBot, WELCOME_TEXT};
use knowledge_responder::config::{ConfigLoader, ResponderConfig};
use knowledge_responder::display;
use knowledge_responder::engine::KnowledgeEngine;
use knowledge_responder::store::NewEntry;

#[derive(Parser)]
#[command(
    name = "knowledge-responder",
    about = "Bilingual Hindi/English knowledge responder",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the knowledge database (overrides config).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API.
    Serve {
        /// Host to bind (overrides config).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Chat with the bot in the terminal.
    Chat {
        /// Actor id recorded with each conversation turn.
        #[arg(long, default_value = "cli")]
        actor: String,
    },
    /// Teach a question/answer pair.
    Learn {
        question: String,
        answer: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Forget a question.
    Forget { question: String },
    /// List all known entries.
    List,
    /// Search entries by free text.
    Search { query: String },
    /// Show knowledge base statistics.
    Stats,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<ResponderConfig, String> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().map_err(|e| e.to_string())?;
    if let Some(db) = &cli.db {
        config.storage.path.clone_from(db);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            display::print_error(&message);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut config = load_config(&cli)?;
    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    let engine = KnowledgeEngine::open(&config)
        .await
        .map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Serve { .. } => serve(engine, &config).await,
        Commands::Chat { actor } => chat(engine, &actor).await,
        Commands::Learn {
            question,
            answer,
            category,
            language,
        } => {
            let mut new_entry = NewEntry::new(question, answer);
            if let Some(category) = category {
                new_entry = new_entry.category(category);
            }
            if let Some(language) = language {
                new_entry = new_entry.language(language);
            }
            let entry = engine.add(new_entry).await.map_err(|e| e.to_string())?;
            display::print_ok(&format!("Learned: {}", entry.question));
            Ok(())
        }
        Commands::Forget { question } => {
            if engine.forget(&question).await.map_err(|e| e.to_string())? {
                display::print_ok(&format!("Forgot: {question}"));
                Ok(())
            } else {
                Err(format!("No entry for: {question}"))
            }
        }
        Commands::List => {
            for entry in engine.list_all().await {
                display::print_entry(&entry);
            }
            Ok(())
        }
        Commands::Search { query } => {
            for entry in engine.search(&query).await {
                display::print_entry(&entry);
            }
            Ok(())
        }
        Commands::Stats => {
            let stats = engine.statistics().await.map_err(|e| e.to_string())?;
            display::print_statistics(&stats);
            Ok(())
        }
    }
}

async fn serve(engine: KnowledgeEngine, config: &ResponderConfig) -> Result<(), String> {
    let server = ApiServer::new(engine).with_config(config.server.clone());
    let cancel = server.cancel_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
            cancel.cancel();
        }
    });

    println!("Serving on http://{}", server.address());
    server.run().await.map_err(|e| e.to_string())
}

async fn chat(engine: KnowledgeEngine, actor: &str) -> Result<(), String> {
    let bot = ChatBot::new(engine);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    display::print_reply(WELCOME_TEXT);
    loop {
        display::print_prompt();
        let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "/quit" | "/exit") {
            break;
        }
        match bot.handle(line, actor).await {
            Ok(reply) => display::print_reply(&reply),
            Err(e) => display::print_error(&e.to_string()),
        }
    }
    Ok(())
}
