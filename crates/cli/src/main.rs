//! Dribble CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! dribble-cli migrate
//!
//! # Create an admin account (password from DRIBBLE_ADMIN_PASSWORD)
//! dribble-cli admin create -e ops@dribble.com -n "Ops" -r staff
//!
//! # Create a mobile-only account
//! dribble-cli admin create -m 9876543210 -n "Priya" -r viewer --password '...'
//!
//! # Deactivate an account (by email or mobile)
//! dribble-cli admin deactivate -i ops@dribble.com
//!
//! # List accounts
//! dribble-cli admin list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "dribble-cli")]
#[command(version, about = "Dribble admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Login email address
        #[arg(short, long, required_unless_present = "mobile")]
        email: Option<String>,

        /// Login mobile number
        #[arg(short, long)]
        mobile: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Role (`admin`, `staff`, `viewer`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Password (prefer the environment variable over the command line)
        #[arg(long, env = "DRIBBLE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Deactivate an account so it can no longer log in
    Deactivate {
        /// Email or mobile number of the account
        #[arg(short, long)]
        identifier: String,
    },
    /// Re-activate a deactivated account
    Activate {
        /// Email or mobile number of the account
        #[arg(short, long)]
        identifier: String,
    },
    /// List all accounts
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                mobile,
                name,
                role,
                password,
            } => {
                let request = commands::admin::CreateRequest {
                    email,
                    mobile,
                    name,
                    role,
                    password: SecretString::from(password),
                };
                commands::admin::create_user(&request).await?;
            }
            AdminAction::Deactivate { identifier } => {
                commands::admin::set_active(&identifier, false).await?;
            }
            AdminAction::Activate { identifier } => {
                commands::admin::set_active(&identifier, true).await?;
            }
            AdminAction::List => commands::admin::list_users().await?,
        },
    }
    Ok(())
}
