use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::{debug, info, warn};

use layout_language_server::logging::init_logger;
use layout_language_server::lsp::backend::LayoutBackend;
use layout_language_server::lsp::config::ServerConfig;
use layout_language_server::schema::{self, Schema};

/// Language server suggesting `data-layout` attributes inside markup tags.
#[derive(Parser, Debug)]
#[command(name = "layout-language-server", version, about)]
struct Args {
    /// Layout schema (JSON). Defaults to $LAYOUT_LS_SCHEMA, then layouts.json next to the executable
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// LSP language ids to serve, comma separated
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    languages: Option<Vec<String>>,

    /// Characters that make the client request completion, comma separated
    #[arg(long, value_delimiter = ',', value_name = "CHARS")]
    trigger_characters: Option<Vec<String>>,

    /// Log level filter for stderr (otherwise RUST_LOG, then "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output
    #[arg(long)]
    no_color: bool,

    /// Do not write a session log to the cache directory
    #[arg(long)]
    no_file_logging: bool,

    /// Communicate over stdio (the only transport; accepted for client compatibility)
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logger(args.no_color, args.log_level.as_deref(), !args.no_file_logging)?;

    let mut config = ServerConfig::from_env_or_default().with_schema_path(args.schema);
    if let Some(languages) = args.languages {
        config = config.with_languages(languages);
    }
    if let Some(characters) = args.trigger_characters {
        config = config.with_trigger_characters(characters);
    }

    let schema = match config.resolve_schema_path() {
        Some(path) => schema::load(&path),
        None => {
            warn!("Unable to locate a layout schema; suggestions disabled");
            Schema::empty()
        }
    };
    let schema = Arc::new(schema);

    info!("Starting layout-language-server {}", env!("CARGO_PKG_VERSION"));
    debug!("Transport: stdio ({})", if args.stdio { "requested" } else { "default" });

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| LayoutBackend::new(client, schema.clone(), config.clone()));

    Server::new(stdin, stdout, socket)
        .serve(service)
        .await;

    info!("Server stopped");
    Ok(())
}
