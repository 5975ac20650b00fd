//! SiteSearch CLI — run the search widget headless, or serve a fixture API for it.

use clap::{Args, CommandFactory, Parser, Subcommand};
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use sitesearch_core::error::ConfigError;
use sitesearch_core::types::{SearchOverrides, WidgetState};
use sitesearch_core::{
    find_config, load_config_file, HttpContentSource, ResultsContent, SearchConfig, SearchWidget, WidgetView,
};
use sitesearch_http::{router, serve, Fixture};

/// SiteSearch — live content search from the terminal.
#[derive(Parser)]
#[command(name = "sitesearch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    /// Config file (default: .sitesearch.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Site host the default API base URL is derived from
    #[arg(long, default_value = "localhost")]
    host: String,

    /// API base URL, e.g. https://example.com/wp-json/wp/v2
    #[arg(long)]
    base_url: Option<String>,

    /// Content type to search (repeatable, in render order)
    #[arg(long = "type", value_name = "TYPE")]
    types: Vec<String>,

    /// Maximum number of rendered results
    #[arg(long)]
    max_results: Option<usize>,

    /// Escape titles instead of trusting them as markup
    #[arg(long)]
    escape_titles: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the configured collections and print what the widget would show
    Search {
        /// Search query
        query: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// Print the results container HTML
        #[arg(long)]
        html: bool,
    },
    /// Print the resolved widget configuration
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Serve a JSON fixture through a content API
    Serve {
        /// Fixture file: { "<type>": [{ "link": ..., "title": { "rendered": ... } }] }
        #[arg(long)]
        fixture: PathBuf,

        /// Port to listen on
        #[arg(long, default_value = "8787")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
        #[arg(long)]
        bind_all: bool,

        /// Directory with the built web widget, served for unmatched paths
        #[arg(long)]
        dist: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Config resolution: defaults < config file < flags
// ---------------------------------------------------------------------------

fn resolve_config(args: &ConfigArgs) -> Result<SearchConfig, ConfigError> {
    let file = match &args.config {
        Some(path) => Some(path.clone()),
        None => std::env::current_dir().ok().and_then(|cwd| find_config(&cwd)),
    };
    let from_file = match file {
        Some(path) => load_config_file(&path)?,
        None => SearchOverrides::default(),
    };

    let from_flags = SearchOverrides {
        base_url: args.base_url.clone(),
        content_types: (!args.types.is_empty()).then(|| args.types.clone()),
        max_results: args.max_results,
        escape_titles: args.escape_titles.then_some(true),
    };

    Ok(SearchConfig::resolve(&args.host, &from_file.merge(from_flags)))
}

fn resolve_or_exit(args: &ConfigArgs) -> SearchConfig {
    resolve_config(args).unwrap_or_else(|e| {
        error!(error = %e, "Invalid configuration");
        std::process::exit(2);
    })
}

// ---------------------------------------------------------------------------
// Headless view
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TerminalView {
    last: RefCell<ResultsContent>,
}

impl WidgetView for TerminalView {
    fn show(&self, content: ResultsContent) {
        *self.last.borrow_mut() = content;
    }
}

/// Drop markup so titles read cleanly in a terminal.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn print_results(query: &str, content: &ResultsContent, state: &WidgetState, json: bool, html: bool) -> bool {
    let rendered = matches!(content, ResultsContent::Entries { .. });

    if json {
        let output = serde_json::json!({
            "query": query,
            "content": content,
            "state": state,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => error!(error = %e, "Could not serialize results"),
        }
        return rendered;
    }

    if html {
        println!("{}", content.to_html());
        return rendered;
    }

    match content {
        ResultsContent::Entries { entries } => {
            for e in entries {
                println!("{:<50} {}", strip_tags(&e.title_html), e.link);
            }
            eprintln!("\n{} results", entries.len());
        }
        ResultsContent::Message { message } => eprintln!("{}", message.text()),
        ResultsContent::Cleared => eprintln!("Nothing to search for"),
    }
    rendered
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received SIGINT, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not register SIGTERM handler");
                ctrl_c.await;
                info!("Received SIGINT, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if matches!(cli.command, Commands::Serve { .. }) { "sitesearch=info" } else { "sitesearch=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search { query, config, html } => {
            let config = resolve_or_exit(&config);
            let source = HttpContentSource::new(&config.base_url);
            let widget = SearchWidget::new(config, source, TerminalView::default());

            widget.handle_input(&query).await;

            let content = widget.view().last.borrow().clone();
            if !print_results(&query, &content, &widget.state(), cli.json, html) {
                std::process::exit(1);
            }
        }
        Commands::Config { config } => {
            let config = resolve_or_exit(&config);
            if cli.json {
                match serde_json::to_string_pretty(&config) {
                    Ok(s) => println!("{s}"),
                    Err(e) => error!(error = %e, "Could not serialize config"),
                }
            } else {
                println!("Base URL:       {}", config.base_url);
                println!("Content types:  {}", config.content_types.join(", "));
                println!("Max results:    {}", config.max_results);
                println!("Escape titles:  {}", config.escape_titles);
            }
        }
        Commands::Serve { fixture, port, bind_all, dist } => {
            let fixture = Fixture::load(&fixture).unwrap_or_else(|e| {
                error!(error = %e, "Could not load fixture");
                std::process::exit(1);
            });

            let bind_addr = if bind_all { "0.0.0.0" } else { "127.0.0.1" };
            let listener = tokio::net::TcpListener::bind(format!("{bind_addr}:{port}")).await.unwrap_or_else(|e| {
                error!(port = port, error = %e, "Could not bind to port");
                std::process::exit(1);
            });

            let app = router(Arc::new(fixture), dist.as_deref());
            eprintln!("  Content API: http://{bind_addr}:{port}/wp-json/wp/v2");
            if let Err(e) = serve(listener, app, shutdown_signal()).await {
                error!(error = %e, "Server error");
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sitesearch", &mut std::io::stdout());
        }
    }
}
