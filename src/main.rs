//! aiproxy-docs - API documentation page for an OpenAI-compatible AI proxy
//!
//! Serves the docs page, renders it to stdout, and checks it against the
//! live proxy so the documented models never drift from what is served.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aiproxy_docs::config::{Config, ValueSource};
use aiproxy_docs::docs::templates::round_trips;
use aiproxy_docs::docs::{DocsPage, HtmlShell, PageShell, TemplateId};

#[derive(Parser)]
#[command(name = "aiproxy-docs")]
#[command(about = "API documentation page for an OpenAI-compatible AI proxy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the documentation server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration and the rendered samples
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },

    /// Print the documentation page to stdout
    Render {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Print a single sample (e.g. "chat-curl") instead of the page
        #[arg(short, long)]
        sample: Option<String>,

        /// Print the page as JSON instead of HTML
        #[arg(long, conflicts_with = "sample")]
        json: bool,
    },

    /// Compare the configured allow-lists with the live proxy
    Verify {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    tracing::info!(config = %path, "Loading configuration");
    let (config, sources) = Config::from_file_with_env(path)?;
    for (field, source) in &sources {
        match source {
            ValueSource::None => tracing::debug!(field = %field, "Value not set"),
            _ => tracing::info!(field = %field, source = %source, "Resolved value"),
        }
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aiproxy_docs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            let mut config = load_config(&config)?;

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            aiproxy_docs::web::run_server(config).await
        }

        Commands::Check { config } => {
            let config = load_config(&config)?;
            let page = DocsPage::build(&config.page_inputs());

            println!("Base URL:        {}", page.context.base_url);
            println!("Example model:   {}", page.context.example_language_model);
            println!("Embedding model: {}", page.context.example_embedding_model);

            let broken: Vec<TemplateId> = TemplateId::ALL
                .into_iter()
                .filter(|id| !round_trips(*id, &page.context))
                .collect();

            if !broken.is_empty() {
                for id in &broken {
                    tracing::error!(sample = %id, "Sample does not match its template");
                }
                anyhow::bail!("{} sample(s) failed to render", broken.len());
            }

            println!("All {} samples OK", TemplateId::ALL.len());
            Ok(())
        }

        Commands::Render {
            config,
            sample,
            json,
        } => {
            let config = load_config(&config)?;
            let page = DocsPage::build(&config.page_inputs());

            let output = match (sample, json) {
                (Some(sample), _) => {
                    let id: TemplateId = sample.parse()?;
                    page.sample(id)
                        .map(|s| s.text.clone())
                        .unwrap_or_default()
                }
                (None, true) => serde_json::to_string_pretty(&page)?,
                (None, false) => HtmlShell.render(&page, None),
            };

            println!("{}", output);
            Ok(())
        }

        Commands::Verify { config } => {
            let config = load_config(&config)?;
            let report = aiproxy_docs::verify::verify(&config).await?;

            println!("Checked {} ({} models served)", report.models_url, report.served);
            println!("{}", report.language);
            println!("{}", report.embedding);

            if !report.is_consistent() {
                anyhow::bail!("Documented allow-lists drift from the live proxy");
            }
            Ok(())
        }
    }
}
