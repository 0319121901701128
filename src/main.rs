use anyhow::Result;
use env_logger::Env;
use pgstate::cli::{self, Cli, Command};
use pgstate::config::{self, Config};
use pgstate::connection::{Connector, DryRunConnector, PgConnector};
use pgstate::password;
use pgstate::reconcile::{self, ProvisionError, TeardownError};
use pgstate::report::{Status, Summary};
use pgstate::{ResourceName, Secret};
use std::process;

/// Usage, configuration or password generation failure.
const EXIT_FAILURE: i32 = 1;

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let code = match run(cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Failed: {:#}", e);
            EXIT_FAILURE
        }
    };

    process::exit(code);
}

fn run(args: Cli) -> Result<i32> {
    let config = match &args.config {
        Some(path) => Config::new(path)?,
        None => Config::default(),
    };

    match args.cmd {
        Command::Ensure {
            database_name,
            secret,
            dryrun,
        } => {
            let name = ResourceName::new(database_name)?;
            let secret = if secret == "-" {
                let generated = password::generate(&config.password.to_policy())?;
                println!("Generated password: {}", generated);
                Secret::new(generated)?
            } else {
                Secret::new(secret)?
            };

            if dryrun {
                Ok(ensure(&DryRunConnector, &name, &secret, true))
            } else {
                let cluster = config::resolve_cluster(args.cluster.as_deref(), &config)?;
                Ok(ensure(&PgConnector::new(cluster), &name, &secret, false))
            }
        }

        Command::Drop {
            database_name,
            dryrun,
        } => {
            let name = ResourceName::new(database_name)?;

            if dryrun {
                Ok(teardown(&DryRunConnector, &name, true))
            } else {
                let cluster = config::resolve_cluster(args.cluster.as_deref(), &config)?;
                Ok(teardown(&PgConnector::new(cluster), &name, false))
            }
        }

        Command::GeneratePassword {
            allow_special,
            length,
            username,
        } => {
            let mut password_config = config.password;
            if let Some(allow_special) = allow_special {
                password_config.allow_special = allow_special;
            }
            if let Some(length) = length {
                password_config.length = length;
            }
            password_config.validate()?;

            let generated = password::generate(&password_config.to_policy())?;
            println!("Len {} -- {:?}", generated.len(), generated);

            if let Some(username) = username {
                println!(
                    "Generated MD5 (user: {}): {}",
                    username,
                    password::md5_password(&username, &generated)
                );
            }

            Ok(0)
        }
    }
}

fn status(outcome: reconcile::Outcome, dryrun: bool) -> Status {
    if dryrun {
        Status::DryRun(outcome)
    } else {
        Status::Done(outcome)
    }
}

/// Ensure the role then the database, returning the exit code.
fn ensure<C: Connector>(connector: &C, name: &ResourceName, secret: &Secret, dryrun: bool) -> i32 {
    let mut summary = Summary::new();

    let code = match reconcile::ensure(connector, name, secret) {
        Ok(provisioned) => {
            summary.push("role", name.as_str(), status(provisioned.role, dryrun));
            summary.push("database", name.as_str(), status(provisioned.database, dryrun));
            0
        }
        Err(e) => {
            match &e {
                ProvisionError::Role(_) => {
                    summary.push("role", name.as_str(), Status::Failed);
                    summary.push("database", name.as_str(), Status::Skipped);
                }
                ProvisionError::Database { role, .. } => {
                    summary.push("role", name.as_str(), status(*role, dryrun));
                    summary.push("database", name.as_str(), Status::Failed);
                }
            }
            eprintln!("Failed: {}", e);
            e.exit_code()
        }
    };

    summary.print();
    code
}

/// Drop the database then the role, returning the exit code.
fn teardown<C: Connector>(connector: &C, name: &ResourceName, dryrun: bool) -> i32 {
    let mut summary = Summary::new();

    let code = match reconcile::teardown(connector, name) {
        Ok(torn) => {
            summary.push("database", name.as_str(), status(torn.database, dryrun));
            summary.push("role", name.as_str(), status(torn.role, dryrun));
            0
        }
        Err(e) => {
            match &e {
                TeardownError::Database(_) => {
                    summary.push("database", name.as_str(), Status::Failed);
                    summary.push("role", name.as_str(), Status::Skipped);
                }
                TeardownError::Role { database, .. } => {
                    summary.push("database", name.as_str(), status(*database, dryrun));
                    summary.push("role", name.as_str(), Status::Failed);
                }
            }
            eprintln!("Failed: {}", e);
            e.exit_code()
        }
    };

    summary.print();
    code
}
