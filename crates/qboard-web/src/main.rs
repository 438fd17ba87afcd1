//! `qboard` command line entry point.

use anyhow::Context;
use clap::{value_parser, Arg, Command};
use qboard_web::{start_server, telemetry, LogFormat, QBoardConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Command::new("qboard")
        .version(qboard_web::VERSION)
        .about("Group question board backed by a spreadsheet")
        .subcommand_required(false)
        .subcommand(
            Command::new("serve")
                .about("Serve the board over HTTP (default)"),
        )
        .subcommand(
            Command::new("check")
                .about("Load the config and probe the store, then exit"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .global(true)
                .help("Listen address, e.g. 0.0.0.0:8501"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(value_parser!(LogFormat))
                .help("Log output: plain or json"),
        );

    let matches = cli.get_matches();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => QBoardConfig::load(path)?,
        None => QBoardConfig::default(),
    };
    if let Some(bind) = matches.get_one::<String>("bind") {
        config = config.with_bind_str(bind)?;
    }
    if let Some(format) = matches.get_one::<LogFormat>("log-format") {
        config = config.with_log_format(*format);
    }

    telemetry::init(config.log_format)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to initialise logging")?;

    match matches.subcommand() {
        Some(("check", _)) => {
            let board = qboard_web::connect(&config)
                .await
                .context("cannot connect to the question store; check the store settings and token")?;
            println!(
                "Store '{}' reachable, worksheet '{}' found",
                board.backend_tag(),
                board.config().worksheet
            );
            board.close();
        }
        _ => {
            start_server(config).await.context("qboard server failed")?;
        }
    }

    Ok(())
}
