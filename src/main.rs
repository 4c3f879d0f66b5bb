use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use updash::args::{Args, Command, GoalAction, OverrideAction};
use updash::{commands, Config, Result};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().updash_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Auth(auth_args) => {
            let config = Config::load(home).await?;
            if auth_args.clear() {
                commands::auth_clear(&config).await?.print()
            } else if auth_args.verify() {
                commands::auth_verify(&config, auth_args).await?.print()
            } else {
                commands::auth_store(&config, auth_args).await?.print()
            }
        }

        Command::Dash(dash_args) => {
            let config = Config::load(home).await?;
            commands::dash(&config, dash_args).await?.print()
        }

        Command::Accounts(accounts_args) => {
            let config = Config::load(home).await?;
            commands::accounts(&config, accounts_args).await?.print()
        }

        Command::Transactions(transactions_args) => {
            let config = Config::load(home).await?;
            commands::transactions(&config, transactions_args)
                .await?
                .print()
        }

        Command::Stats(stats_args) => {
            let config = Config::load(home).await?;
            commands::stats(&config, stats_args).await?.print()
        }

        Command::Override(override_args) => {
            let config = Config::load(home).await?;
            match override_args.action() {
                OverrideAction::Set(set_args) => {
                    commands::override_set(&config, set_args).await?.print()
                }
                OverrideAction::Clear(clear_args) => {
                    commands::override_clear(&config, clear_args).await?.print()
                }
                OverrideAction::List => commands::override_list(&config).await?.print(),
            }
        }

        Command::Goal(goal_args) => {
            let config = Config::load(home).await?;
            match goal_args.action() {
                GoalAction::Set(set_args) => commands::goal_set(&config, set_args).await?.print(),
                GoalAction::Clear(clear_args) => {
                    commands::goal_clear(&config, clear_args).await?.print()
                }
                GoalAction::List => commands::goal_list(&config).await?.print(),
            }
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await?;
            commands::export(&config, export_args).await?.print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
