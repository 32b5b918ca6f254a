//! farming - command-line client for a running farming server

use anyhow::Result;
use clap::{Parser, Subcommand};
use farming::client::{self, FarmingClient};
use farming::config::Config;
use farming::protocol::{Caller, Request};
use farming::session::is_valid_code;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "farming")]
#[command(about = "Create, join and inspect farming sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Socket path override
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    /// Server name (selects the socket under the runtime dir)
    #[arg(long, global = true, default_value = "default")]
    server: String,

    /// Platform user id to act as
    #[arg(short, long, global = true, default_value = "local")]
    user: String,

    /// Platform role ids held by the user
    #[arg(short, long = "role", global = true)]
    roles: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new farming session
    Create,
    /// Join an open farming session
    Join {
        /// 10-digit farming code
        #[arg(value_parser = parse_code)]
        code: String,
        /// Your nickname for the farming
        nickname: String,
    },
    /// Close a farming session
    Close {
        /// 10-digit farming code
        #[arg(value_parser = parse_code)]
        code: String,
    },
    /// View a farming session
    View {
        /// 10-digit farming code
        #[arg(value_parser = parse_code)]
        code: String,
    },
    /// Get a random nickname list from a farming session
    List {
        /// 10-digit farming code
        #[arg(value_parser = parse_code)]
        code: String,
    },
    /// Check that the server is alive
    Ping,
    /// Stop the server
    Shutdown,
}

fn parse_code(code: &str) -> Result<String, String> {
    if is_valid_code(code) {
        Ok(code.to_string())
    } else {
        Err(format!("'{}' is not a 10-digit farming code", code))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let socket_path = cli
        .socket
        .clone()
        .unwrap_or_else(|| config.socket_path(&cli.server));

    let caller = Caller {
        user_id: cli.user.clone(),
        roles: cli.roles.clone(),
    };

    let request = match cli.command {
        Commands::Create => Request::Create { caller },
        Commands::Join { code, nickname } => Request::Join {
            caller,
            code,
            nickname,
        },
        Commands::Close { code } => Request::Close { caller, code },
        Commands::View { code } => Request::View { code },
        Commands::List { code } => Request::List { code },
        Commands::Ping => Request::Ping,
        Commands::Shutdown => Request::Shutdown { caller },
    };

    let is_ping = matches!(request, Request::Ping);
    let mut connection = FarmingClient::connect(&socket_path).await?;
    let response = connection.request(request).await?;

    for line in client::render(&response) {
        println!("{}", line);
    }
    if is_ping {
        println!("Server id: {}", connection.server_id());
    }

    // The rendered message is the whole report; only the exit status signals failure
    if client::is_failure(&response) {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
