//! Operator commands against the configured store.
//!
//! $ cargo run --bin admin -- --settings=settings/dev.toml list-users
//! $ cargo run --bin admin -- set-password --id Y4TugNZanFB46jpJVOqL --password 12345

use clap::{Parser, Subcommand};
use credential_gate::application_impl::*;
use credential_gate::application_port::*;
use credential_gate::domain_model::UserId;
use credential_gate::logger::*;
use credential_gate::server::connect_store;
use credential_gate::settings::parse_settings;

#[derive(Parser, Debug)]
struct AdminCli {
    #[arg(long, env = "CREDENTIAL_GATE_SETTINGS")]
    settings: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every user's id and username.
    ListUsers,
    /// Hash a new password and store it on the given document.
    SetPassword {
        #[arg(long)]
        id: String,
        #[arg(long, env = "CREDENTIAL_GATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = AdminCli::parse();

    let logger = Logger::new_bootstrap();
    let settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig::from(&settings))?;

    let store = connect_store(&settings.store).await?;
    let hasher = build_hasher(&settings.hashing.scheme, settings.hashing.cost)?;
    let users = UserCollection {
        collection: settings.store.collection.clone(),
        username_field: settings.store.username_field.clone(),
        credential_field: settings.store.credential_field.clone(),
    };
    let service = RealCredentialService::new(store, hasher, users, Diagnostics::Quiet);

    match cli.command {
        Command::ListUsers => {
            for user in service.list_users().await? {
                println!("{}\t{}", user.id, user.username);
            }
        }
        Command::SetPassword { id, password } => {
            service.set_credential(&UserId(id), &password).await?;
            println!("credential updated");
        }
    }

    Ok(())
}
