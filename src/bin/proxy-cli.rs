use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use api_proxy_shim::client::{resolve, ApiClient, ClientDefaults, PageProtocol};

#[derive(Parser)]
#[command(name = "proxy-cli")]
#[command(about = "Resolve front-end API routing and call the backend through it", long_about = None)]
struct Cli {
    /// Backend HTTP base URL.
    #[arg(long, env = "API_BASE_URL")]
    api_base_url: Option<String>,

    /// Backend WebSocket base URL.
    #[arg(long, env = "WS_BASE_URL")]
    ws_base_url: Option<String>,

    /// Address of the forwarding shim, e.g. https://proxy.example/api/proxy
    #[arg(long, env = "API_PROXY_URL")]
    proxy_url: Option<String>,

    /// Protocol of the hosting page (http, https, or a page URL).
    #[arg(long, default_value = "https")]
    page_protocol: PageProtocol,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration
    Resolve,
    /// Print the URL an API path resolves to
    Url { path: String },
    /// GET an API path through the resolved routing
    Get { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_proxy_shim=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let env_defaults = ClientDefaults::from_env();
    let defaults = ClientDefaults {
        api_base_url: cli.api_base_url.unwrap_or(env_defaults.api_base_url),
        ws_base_url: cli.ws_base_url.unwrap_or(env_defaults.ws_base_url),
    };
    let resolved = Arc::new(resolve(&defaults, cli.page_protocol, cli.proxy_url.as_deref()));

    match cli.command {
        Commands::Resolve => {
            println!("{}", serde_json::to_string_pretty(resolved.as_ref())?);
        }
        Commands::Url { path } => {
            println!("{}", resolved.build_api_url(&path));
        }
        Commands::Get { path } => {
            let client = ApiClient::new(resolved);
            print_response(client.get(&path).await?).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
