use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use std::process;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

mod anki;
mod config;
mod input;
mod mcp;
mod tools;

use anki::AnkiClient;
use config::ClientConfig;

#[derive(Parser)]
#[command(name = "mcp-anki")]
#[command(version, about = "MCP server for managing Anki decks and cards through AnkiConnect")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ConnectionArgs {
    /// AnkiConnect endpoint
    #[arg(long, global = true, env = "ANKI_CONNECT_URL", default_value = config::DEFAULT_ENDPOINT)]
    anki_url: String,
    /// Attempts per AnkiConnect request, including the first
    #[arg(long, global = true, env = "ANKI_CONNECT_MAX_RETRIES", default_value_t = config::DEFAULT_MAX_RETRIES)]
    max_retries: u32,
    /// Delay before the first retry in milliseconds; doubles on each retry
    #[arg(long, global = true, env = "ANKI_CONNECT_RETRY_DELAY_MS", default_value_t = config::DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,
}

impl ConnectionArgs {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_endpoint(self.anki_url.clone())
            .with_retries(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP stdio server
    Serve {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// List deck resources
    ListDecks {
        /// Output JSON instead of one URI per line
        #[arg(long)]
        json: bool,
    },
    /// Print the cards of one deck
    ReadDeck {
        /// Deck name
        #[arg(long)]
        deck: String,
        /// Output the full resource contents as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    // stdout carries the protocol, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let client = AnkiClient::new(cli.connection.client_config())
        .context("failed to create AnkiConnect client")?;

    match cli.command {
        Commands::Serve { stdio } => {
            if stdio {
                run_stdio_server(&client).await
            } else {
                anyhow::bail!("only --stdio transport is supported")
            }
        }
        Commands::ListDecks { json } => run_list_decks(&client, json).await,
        Commands::ReadDeck { deck, json } => run_read_deck(&client, &deck, json).await,
    }
}

async fn run_list_decks(client: &AnkiClient, json_output: bool) -> Result<()> {
    let listing = match mcp::resources::list(client).await {
        Ok(listing) => listing,
        Err(err) => fail(&err.message),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let resources = listing
        .get("resources")
        .and_then(|value| value.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    for resource in resources {
        let uri = resource.get("uri").and_then(|value| value.as_str()).unwrap_or("");
        let name = resource.get("name").and_then(|value| value.as_str()).unwrap_or("");
        println!("{uri}\t{name}");
    }
    Ok(())
}

async fn run_read_deck(client: &AnkiClient, deck: &str, json_output: bool) -> Result<()> {
    let params = json!({ "uri": mcp::resources::deck_uri(deck) });
    let contents = match mcp::resources::read(client, Some(&params)).await {
        Ok(contents) => contents,
        Err(err) => fail(&err.message),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&contents)?);
        return Ok(());
    }

    let text = contents
        .get("contents")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");
    println!("{text}");
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(1);
}

async fn run_stdio_server(client: &AnkiClient) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut writer = tokio::io::stdout();
    tracing::info!(endpoint = %client.config().endpoint, "serving MCP over stdio");

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed request line");
                continue;
            }
        };

        let method = request.get("method").and_then(|value| value.as_str());
        let id = request.get("id").cloned();
        let response = match (method, id) {
            (Some(method), Some(id)) => Some(handle_request(client, method, &request, id).await),
            (Some(method), None) => {
                tracing::debug!(method, "notification received");
                None
            }
            _ => None,
        };

        if let Some(response) = response {
            let mut serialized =
                serde_json::to_string(&response).context("failed to serialize response")?;
            serialized.push('\n');
            writer
                .write_all(serialized.as_bytes())
                .await
                .context("failed to write response")?;
            writer.flush().await.context("failed to flush response")?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_request(client: &AnkiClient, method: &str, request: &Value, id: Value) -> Value {
    let params = request.get("params");
    let outcome = match method {
        "initialize" => Ok(json!({
            "protocolVersion": mcp::contracts::PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": mcp::tool_definitions() })),
        "tools/call" => Ok(handle_tool_call(client, params).await),
        "resources/list" => mcp::resources::list(client).await,
        "resources/read" => mcp::resources::read(client, params).await,
        _ => Err(mcp::resources::RpcError {
            code: mcp::errors::RPC_METHOD_NOT_FOUND,
            message: format!("method not found: {method}"),
        }),
    };

    match outcome {
        Ok(result) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": result
        }),
        Err(err) => {
            tracing::warn!(method, code = err.code, error = %err.message, "request failed");
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": err.code,
                    "message": err.message
                }
            })
        }
    }
}

async fn handle_tool_call(client: &AnkiClient, params: Option<&Value>) -> Value {
    let Some(params) = params.and_then(|value| value.as_object()) else {
        return tools::error_result(mcp::errors::INVALID_INPUT, "params must be an object", None);
    };

    let name = params.get("name").and_then(|value| value.as_str());
    let Some(name) = name else {
        return tools::error_result(
            mcp::errors::INVALID_INPUT,
            "params.name must be a string",
            None,
        );
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    tracing::debug!(tool = name, "tool call");
    match name {
        mcp::contracts::TOOL_CREATE_DECK => tools::create_deck::call(client, &args).await,
        mcp::contracts::TOOL_CREATE_CARD => tools::create_card::call(client, &args).await,
        mcp::contracts::TOOL_UPDATE_CARD => tools::update_card::call(client, &args).await,
        mcp::contracts::TOOL_CREATE_CLOZE_CARD => {
            tools::create_cloze_card::call(client, &args).await
        }
        mcp::contracts::TOOL_UPDATE_CLOZE_CARD => {
            tools::update_cloze_card::call(client, &args).await
        }
        _ => tools::error_result(
            mcp::errors::INVALID_INPUT,
            format!("tool not implemented: {name}"),
            Some(name),
        ),
    }
}
