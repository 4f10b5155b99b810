//! flowbridge diagnostic CLI
//!
//! Exercises the bridge and agent flows against live endpoints: the session
//! token normally read from the browser cookie store is supplied as a flag
//! and seeded into an in-memory store.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use flowbridge::{
    agent::{ConsoleSurface, PageAgent, PageLocation},
    backend::BackendClient,
    bridge::{Bridge, BridgeHandle, BridgeHandler, BridgeOp, MemoryCookieStore},
    config::FlowBridgeConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flowbridge")]
#[command(version)]
#[command(about = "Session-acquisition bridge for a Salesforce Flow Builder chat assistant")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FLOWBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full session bootstrap for a page URL
    Bootstrap {
        /// Flow Builder page URL
        #[arg(long)]
        page_url: String,

        /// Salesforce session token
        #[arg(long, env = "FLOWBRIDGE_SID", hide_env_values = true)]
        sid: String,

        /// Also open the chat panel and fetch the initial summary
        #[arg(long)]
        open_panel: bool,
    },

    /// Fetch the authenticated userinfo document
    UserInfo {
        /// Salesforce API origin, e.g. https://acme.my.salesforce.com
        #[arg(long)]
        base_url: String,

        /// Salesforce session token
        #[arg(long, env = "FLOWBRIDGE_SID", hide_env_values = true)]
        sid: String,
    },

    /// Fetch a flow's metadata through the Tooling API
    FlowMetadata {
        /// Salesforce API origin
        #[arg(long)]
        instance_url: String,

        /// Salesforce session token
        #[arg(long, env = "FLOWBRIDGE_SID", hide_env_values = true)]
        sid: String,

        /// Flow record id (15 or 18 characters)
        #[arg(long)]
        flow_id: String,
    },

    /// Fetch the initial flow summary from the chat backend
    Summary {
        /// Salesforce session token
        #[arg(long, env = "FLOWBRIDGE_SID", hide_env_values = true)]
        sid: String,

        /// Salesforce page hostname
        #[arg(long)]
        host: String,

        /// Flow record id
        #[arg(long)]
        flow_id: String,
    },

    /// Send a single chat message to the backend
    Chat {
        /// The question to ask
        message: String,

        /// AI model identifier
        #[arg(long)]
        model: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("flowbridge={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => FlowBridgeConfig::load(path)?,
        None => FlowBridgeConfig::default(),
    };

    match cli.command {
        Commands::Bootstrap {
            page_url,
            sid,
            open_panel,
        } => run_bootstrap(&config, &page_url, &sid, open_panel).await?,
        Commands::UserInfo { base_url, sid } => {
            let bridge = spawn_bridge(&config, None, None).await;
            let response = bridge.call(BridgeOp::FetchUserInfo { base_url, sid }).await;
            print_response(response)?;
        }
        Commands::FlowMetadata {
            instance_url,
            sid,
            flow_id,
        } => {
            let bridge = spawn_bridge(&config, None, None).await;
            let response = bridge
                .call(BridgeOp::FetchFlowMetadata {
                    instance_url,
                    session_id: sid,
                    flow_id,
                })
                .await;
            print_response(response)?;
        }
        Commands::Summary { sid, host, flow_id } => {
            let backend = BackendClient::new(config.backend.base_url.clone());
            let summary = backend.initial_summary(&sid, &host, &flow_id).await?;
            println!("{}", summary);
        }
        Commands::Chat { message, model } => {
            let backend = BackendClient::new(config.backend.base_url.clone());
            let model = model.unwrap_or_else(|| config.chat.default_model.clone());
            let reply = backend.chat(&message, &model).await?;
            println!("{}", reply);
        }
        Commands::Config { default } => {
            let shown = if default {
                FlowBridgeConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

/// Spawn a bridge over an in-memory cookie store, optionally pre-seeded
async fn spawn_bridge(
    config: &FlowBridgeConfig,
    seed_origin: Option<&str>,
    seed_sid: Option<&str>,
) -> BridgeHandle {
    let store = Arc::new(MemoryCookieStore::new());
    if let (Some(origin), Some(sid)) = (seed_origin, seed_sid) {
        store.set(origin, &config.salesforce.cookie_name, sid).await;
    }
    let handler = BridgeHandler::new(
        store,
        config.salesforce.cookie_name.clone(),
        config.salesforce.api_version.clone(),
    );
    Bridge::spawn(handler)
}

async fn run_bootstrap(
    config: &FlowBridgeConfig,
    page_url: &str,
    sid: &str,
    open_panel: bool,
) -> Result<()> {
    let location = PageLocation::parse(page_url)?;
    let api_origin = location.api_origin(&config.salesforce);

    let bridge = spawn_bridge(config, Some(&api_origin), Some(sid)).await;
    let backend = BackendClient::new(config.backend.base_url.clone());
    let surface = Arc::new(ConsoleSurface::new());

    let Some(mut agent) = PageAgent::attach(location, bridge, backend, surface, config) else {
        bail!("{} is not a recognized Flow Builder page", page_url);
    };

    agent.bootstrap().await;
    println!("{:#?}", agent.context());

    if open_panel {
        agent.toggle_panel().await;
    }

    Ok(())
}

fn print_response(response: flowbridge::bridge::BridgeResponse) -> Result<()> {
    match response.into_result() {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(())
        }
        Err(message) => bail!(message),
    }
}
