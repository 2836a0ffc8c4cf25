//! Hot-Wallet Call Guard - check and maintain the call policy of a trading vault
//!
//! # WARNING
//! - The guard only constrains where value can flow, not how much.
//! - Whoever holds the governance identity can allow anything.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

// Use the library crate
use hotwallet_guard::cli::commands::{self, AdminAction, CheckOutcome, EncodeCall};
use hotwallet_guard::config::{Config, LoggingConfig};
use hotwallet_guard::guard::ListKind;
use hotwallet_guard::Error;

/// Hot-Wallet Call Guard
#[derive(Parser)]
#[command(name = "guard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "guard.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a call would be allowed
    Check {
        /// Hot wallet initiating the call
        #[arg(long)]
        sender: String,

        /// Contract the call is forwarded to
        #[arg(long)]
        target: String,

        /// Call data, selector included (hex)
        #[arg(long)]
        data: String,
    },

    /// Show the stored policy
    Policy,

    /// List the call shapes the guard understands
    Selectors,

    /// Encode call data for a known call shape
    Encode {
        #[command(subcommand)]
        call: EncodeAction,
    },

    /// Create the policy file from the config bootstrap section
    Init {
        /// Overwrite an existing policy file without asking
        #[arg(long)]
        force: bool,
    },

    /// Governance-only policy changes
    Admin {
        /// Address performing the change (must be governance)
        #[arg(long = "as", value_name = "ADDRESS")]
        caller: String,

        /// Skip confirmation prompt
        #[arg(long, global = true)]
        force: bool,

        #[command(subcommand)]
        action: AdminCommand,
    },

    /// Show current configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListArg {
    CallSite,
    Asset,
    Sender,
    WithdrawDestination,
    ApprovalDestination,
}

impl From<ListArg> for ListKind {
    fn from(arg: ListArg) -> Self {
        match arg {
            ListArg::CallSite => ListKind::CallSite,
            ListArg::Asset => ListKind::Asset,
            ListArg::Sender => ListKind::Sender,
            ListArg::WithdrawDestination => ListKind::WithdrawDestination,
            ListArg::ApprovalDestination => ListKind::ApprovalDestination,
        }
    }
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Allow an entry
    Allow {
        #[arg(value_enum)]
        kind: ListArg,

        /// Address key (call-site target for call sites)
        key: String,

        /// Function selector, call sites only
        #[arg(long)]
        selector: Option<String>,

        /// Audit note
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Remove an entry
    Remove {
        #[arg(value_enum)]
        kind: ListArg,

        key: String,

        #[arg(long)]
        selector: Option<String>,

        #[arg(long, default_value = "")]
        note: String,
    },

    /// Allow transfer and approve on a token
    WhitelistToken {
        token: String,

        #[arg(long, default_value = "")]
        note: String,
    },

    /// Allow the swap call site on a router and approvals to it
    WhitelistRouter {
        router: String,

        #[arg(long, default_value = "")]
        note: String,
    },
}

#[derive(Subcommand)]
enum EncodeAction {
    /// swapTokensForExactTokens
    Swap {
        #[arg(long)]
        amount_out: String,

        #[arg(long)]
        amount_in_max: String,

        /// Token route, tokenIn first
        #[arg(long, value_delimiter = ',', required = true)]
        path: Vec<String>,

        #[arg(long)]
        to: String,

        #[arg(long)]
        deadline: String,
    },

    /// transfer
    Transfer {
        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: String,
    },

    /// approve
    Approve {
        #[arg(long)]
        spender: String,

        #[arg(long)]
        amount: String,
    },
}

fn init_tracing(logging: &LoggingConfig) {
    let directive = format!("hotwallet_guard={}", logging.level);
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        directive
            .parse()
            .unwrap_or_else(|_| "hotwallet_guard=info".parse().expect("static directive")),
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.with_file(true).with_line_number(true).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Commands that need no configuration
    match &cli.command {
        Commands::Selectors => return commands::selectors(),
        Commands::Encode { call } => {
            commands::encode(&encode_call(call))?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    init_tracing(&config.logging);

    // Execute command
    let result = match cli.command {
        Commands::Check {
            sender,
            target,
            data,
        } => match commands::check(&config, &sender, &target, &data).await {
            Ok(CheckOutcome::Allowed) => Ok(()),
            Ok(CheckOutcome::Denied) => std::process::exit(2),
            Err(e) => Err(e),
        },
        Commands::Policy => commands::show_policy(&config).await,
        Commands::Init { force } => commands::init(&config, force).await,
        Commands::Admin {
            caller,
            force,
            action,
        } => commands::admin(&config, &caller, &admin_action(action), force).await,
        Commands::Config => commands::show_config(&config),
        Commands::Selectors | Commands::Encode { .. } => Ok(()),
    };

    if let Err(e) = &result {
        // Policy denials share the exit code of a denied check
        if let Some(violation) = e.downcast_ref::<Error>().and_then(Error::violation) {
            error!(kind = violation.kind(), "Denied: {}", violation);
            eprintln!("DENIED {}: {}", violation.kind(), violation);
            std::process::exit(2);
        }
        error!("Command failed: {:#}", e);
    }

    result
}

fn admin_action(command: AdminCommand) -> AdminAction {
    match command {
        AdminCommand::Allow {
            kind,
            key,
            selector,
            note,
        } => AdminAction::Allow {
            kind: kind.into(),
            key,
            selector,
            note,
        },
        AdminCommand::Remove {
            kind,
            key,
            selector,
            note,
        } => AdminAction::Remove {
            kind: kind.into(),
            key,
            selector,
            note,
        },
        AdminCommand::WhitelistToken { token, note } => AdminAction::WhitelistToken { token, note },
        AdminCommand::WhitelistRouter { router, note } => {
            AdminAction::WhitelistRouter { router, note }
        }
    }
}

fn encode_call(action: &EncodeAction) -> EncodeCall {
    match action {
        EncodeAction::Swap {
            amount_out,
            amount_in_max,
            path,
            to,
            deadline,
        } => EncodeCall::Swap {
            amount_out: amount_out.clone(),
            amount_in_max: amount_in_max.clone(),
            path: path.clone(),
            to: to.clone(),
            deadline: deadline.clone(),
        },
        EncodeAction::Transfer { to, amount } => EncodeCall::Transfer {
            to: to.clone(),
            amount: amount.clone(),
        },
        EncodeAction::Approve { spender, amount } => EncodeCall::Approve {
            spender: spender.clone(),
            amount: amount.clone(),
        },
    }
}
