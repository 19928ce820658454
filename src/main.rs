use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tvremote::config::parse_duration;
use tvremote::{Config, Environment, RemoteClient, SAMSUNG_KEYS};

#[derive(Parser, Debug)]
#[command(name = "tvremote", version, about = "Send remote-control keys to a Samsung TV")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// TV host name or IP address (overrides the config file)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port of the remote-control channel
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Use ws:// instead of wss://
    #[arg(long, global = true)]
    insecure: bool,

    /// Name this client shows on the TV
    #[arg(long, global = true)]
    app_name: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    dev: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one or more keys (the last key given is sent first)
    Send {
        /// Key names, e.g. HOME, VOLUP or KEY_ENTER
        #[arg(default_value = "home")]
        keys: Vec<String>,

        /// Pause after each key, e.g. 500ms or 1s
        #[arg(short, long)]
        delay: Option<String>,
    },
    /// List the built-in Samsung key names
    Keys,
    /// Write a starter configuration file
    InitConfig {
        /// Where to write the file
        path: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "An error occurred:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Keys => {
            for key in SAMSUNG_KEYS {
                println!("{key}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig { path } => {
            let config = load_config(&cli)?;
            config.validate()?;
            config.save_to_file(path)?;
            println!("{} {}", "Wrote config to".green(), path.bold());
            Ok(ExitCode::SUCCESS)
        }
        Command::Send { keys, delay } => {
            let config = load_config(&cli)?;
            init_logging(config.verbose);
            config.validate()?;

            let delay = match delay {
                Some(raw) => parse_duration(raw)?,
                None => config.key_delay,
            };

            send(&config, keys, delay).await
        }
    }
}

async fn send(config: &Config, keys: &[String], delay: std::time::Duration) -> Result<ExitCode> {
    let mut client = RemoteClient::new(config.client_settings(), config.token_store())
        .with_validator(config.key_validator());
    debug!("Token cache at {}", config.token_path().display());

    let cancel = client.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let key_list = keys
        .iter()
        .map(|k| k.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} {} to {}",
        "Sending".cyan(),
        key_list.bold(),
        client.host().bold()
    );

    let result = if let [key] = keys {
        client.send_key(key, delay).await
    } else {
        client.send_keys(keys, delay).await
    };

    match result {
        Ok(()) => {
            println!("{} {}", "Successfully sent".green().bold(), key_list);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "An error occurred:".red().bold(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match (&cli.config, &cli.host) {
        (Some(path), _) => Config::from_file(path)?,
        (None, Some(host)) => Config::new(host.clone()),
        (None, None) => anyhow::bail!("either --config or --host is required"),
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.port = Some(port);
    }
    if cli.insecure {
        config.secure = false;
    }
    if let Some(app_name) = &cli.app_name {
        config.app_name = app_name.clone();
    }
    if cli.dev {
        config.environment = Environment::Dev;
    }
    if cli.verbose {
        config.verbose = true;
    }

    Ok(config)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tvremote=debug" } else { "tvremote=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .context("invalid log filter");

    match filter {
        Ok(filter) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .try_init();
        }
        Err(e) => eprintln!("{e:#}"),
    }
}
