//! # Etiket CLI
//!
//! Command-line interface for the label designer services and one-off jobs.
//!
//! ## Usage
//!
//! ```bash
//! # Run the local print agent (browser -> printer bridge)
//! etiket agent --port 18080
//!
//! # Run the designer API and print proxy
//! etiket serve --listen 0.0.0.0:8080 --share-host PRINTSRV
//!
//! # Generate ZPL for a saved label document
//! etiket zpl label.json > label.zpl
//!
//! # Render a preview PNG at double zoom with a 5 mm grid
//! etiket preview label.json --zoom 2 --grid 5 -o label.png
//!
//! # Send a document (or a .zpl file) straight to a printer
//! etiket print label.json --host 192.168.1.50
//!
//! # List the built-in label types
//! etiket types
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use etiket::{
    AssetSource, Assets, EtiketError, LabelDocument,
    config::{
        AgentConfig, DEFAULT_AGENT_HOST, DEFAULT_AGENT_PORT, DEFAULT_LABEL_TYPES, DEFAULT_LISTEN,
        DEFAULT_PRINTER, DEFAULT_SHARE_HOST, RegistryConfig, ServerConfig,
    },
    registry,
    render::{self, RenderOptions},
    transport::{RAW_PORT, RawTcpClient},
    zpl,
};

/// Etiket - ZPL label designer and printing pipeline
#[derive(Parser, Debug)]
#[command(name = "etiket")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the local print agent
    Agent {
        /// Port to listen on
        #[arg(long, env = "PRINT_AGENT_PORT", default_value_t = DEFAULT_AGENT_PORT)]
        port: u16,

        /// Interface to bind
        #[arg(long, env = "ETIKET_AGENT_HOST", default_value = DEFAULT_AGENT_HOST)]
        host: String,
    },

    /// Run the designer API and server-side print proxy
    Serve {
        /// Address to listen on
        #[arg(long, env = "ETIKET_LISTEN", default_value = DEFAULT_LISTEN)]
        listen: String,

        /// Host sharing the printers
        #[arg(long, env = "ETIKET_SHARE_HOST", default_value = DEFAULT_SHARE_HOST)]
        share_host: String,

        /// Printer used when a print request names none
        #[arg(long, env = "ETIKET_PRINTER", default_value = DEFAULT_PRINTER)]
        printer: String,

        /// JSON file holding custom label types
        #[arg(long, env = "ETIKET_LABEL_TYPES", default_value = DEFAULT_LABEL_TYPES)]
        label_types: PathBuf,

        /// REST table URL for label types (overrides --label-types)
        #[arg(long, env = "ETIKET_REGISTRY_URL")]
        registry_url: Option<String>,

        /// API key sent to the REST label type store
        #[arg(long, env = "ETIKET_REGISTRY_KEY")]
        registry_key: Option<String>,
    },

    /// Print the ZPL for a label document to stdout
    Zpl {
        /// Label document (JSON)
        document: PathBuf,
    },

    /// Render a label document to PNG
    Preview {
        /// Label document (JSON)
        document: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "label.png")]
        output: PathBuf,

        /// Zoom factor (1.0 = 3.78 px per mm)
        #[arg(long, default_value_t = 1.0)]
        zoom: f32,

        /// Grid spacing in mm
        #[arg(long, value_name = "MM")]
        grid: Option<f32>,
    },

    /// Send a label document or a .zpl file to a network printer
    Print {
        /// Label document (JSON) or raw ZPL file
        file: PathBuf,

        /// Printer host name or IP
        #[arg(long)]
        host: String,

        /// Printer raw port
        #[arg(long, default_value_t = RAW_PORT)]
        port: u16,
    },

    /// List the built-in label types
    Types,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), EtiketError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Agent { port, host } => etiket::server::serve_agent(AgentConfig { host, port }).await,
        Commands::Serve {
            listen,
            share_host,
            printer,
            label_types,
            registry_url,
            registry_key,
        } => {
            let registry = match registry_url {
                Some(url) => RegistryConfig::Rest {
                    url,
                    api_key: registry_key,
                },
                None => RegistryConfig::File(label_types),
            };
            etiket::server::serve(ServerConfig {
                listen_addr: listen,
                share_host,
                default_printer: printer,
                registry,
            })
            .await
        }
        Commands::Zpl { document } => {
            let output = zpl_for(&document).await?;
            println!("{}", output);
            Ok(())
        }
        Commands::Preview {
            document,
            output,
            zoom,
            grid,
        } => {
            let doc = read_document(&document)?;
            let assets = load_assets(&doc).await;
            let options = RenderOptions {
                zoom,
                grid_mm: grid,
                selection: None,
            };
            let png = render::render_png(&doc, &assets, &options)?;
            std::fs::write(&output, png)?;
            println!("Saved preview to {}", output.display());
            Ok(())
        }
        Commands::Print { file, host, port } => {
            let zpl = if is_zpl_file(&file) {
                std::fs::read_to_string(&file)?
            } else {
                zpl_for(&file).await?
            };
            RawTcpClient::new().send(&host, port, zpl.as_bytes()).await?;
            println!("Sent {} bytes to {}:{}", zpl.len(), host, port);
            Ok(())
        }
        Commands::Types => {
            for def in registry::built_in() {
                let visible: Vec<_> = etiket::layout::FieldKey::ALL
                    .iter()
                    .filter(|key| def.fields.is_visible(**key))
                    .map(|key| key.caption())
                    .collect();
                println!("{:<12} {}", def.name, visible.join(", "));
            }
            Ok(())
        }
    }
}

fn read_document(path: &Path) -> Result<LabelDocument, EtiketError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn is_zpl_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zpl"))
}

async fn load_assets(doc: &LabelDocument) -> Assets {
    let mut assets = Assets::new();
    let client = reqwest::Client::new();
    let failures = assets
        .fetch_for_document(&client, doc, AssetSource::Any)
        .await;
    for (reference, e) in failures {
        tracing::warn!(reference = %reference, error = %e, "image asset not loaded");
    }
    assets
}

/// Generate ZPL for a document file; validation issues go to stderr.
async fn zpl_for(path: &Path) -> Result<String, EtiketError> {
    let doc = read_document(path)?;
    let assets = load_assets(&doc).await;
    let output = zpl::generate(&doc, &assets);
    for issue in &output.issues {
        eprintln!("warning: {}", issue);
    }
    Ok(output.zpl)
}
