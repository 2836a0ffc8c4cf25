//! CLI command implementations

use anyhow::{Context, Result};
use dialoguer::Confirm;
use tracing::{info, warn};

use alloy_primitives::hex;
use alloy_sol_types::SolCall;

use crate::abi::{
    approveCall, decode_hex, swapTokensForExactTokensCall, transferCall, Address, KnownFunction,
    Selector, U256,
};
use crate::config::Config;
use crate::error::{Error, GuardViolation};
use crate::guard::{events, snapshot, Authorized, Guard, ListKind, PolicyKey};

/// Outcome of `guard check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Allowed,
    Denied,
}

/// Policy mutation requested from the command line
#[derive(Debug, Clone)]
pub enum AdminAction {
    Allow {
        kind: ListKind,
        key: String,
        selector: Option<String>,
        note: String,
    },
    Remove {
        kind: ListKind,
        key: String,
        selector: Option<String>,
        note: String,
    },
    WhitelistToken {
        token: String,
        note: String,
    },
    WhitelistRouter {
        router: String,
        note: String,
    },
}

/// Payload to encode
#[derive(Debug, Clone)]
pub enum EncodeCall {
    Swap {
        amount_out: String,
        amount_in_max: String,
        path: Vec<String>,
        to: String,
        deadline: String,
    },
    Transfer {
        to: String,
        amount: String,
    },
    Approve {
        spender: String,
        amount: String,
    },
}

/// Check a call against the stored policy
pub async fn check(
    config: &Config,
    sender: &str,
    target: &str,
    data: &str,
) -> Result<CheckOutcome> {
    let sender = parse_address(sender, "sender")?;
    let target = parse_address(target, "target")?;
    let data = decode_hex(data).context("Invalid call data")?;

    let guard = snapshot::load(&config.guard.policy_file).await?;

    match guard.authorize(sender, target, &data) {
        Ok(Authorized::GovernanceBypass) => {
            println!("ALLOWED (governance bypass)");
            Ok(CheckOutcome::Allowed)
        }
        Ok(Authorized::Call(function)) => {
            println!("ALLOWED ({})", function);
            Ok(CheckOutcome::Allowed)
        }
        Err(violation) => {
            warn!(kind = violation.kind(), "Call denied: {}", violation);
            println!("DENIED {}: {}", violation.kind(), violation);
            Ok(CheckOutcome::Denied)
        }
    }
}

/// Show the stored policy
pub async fn show_policy(config: &Config) -> Result<()> {
    let guard = snapshot::load(&config.guard.policy_file).await?;
    let policy = guard.policy();

    println!("\n=== GUARD POLICY ===\n");
    println!("Governance: {}", policy.governance());

    println!("\nCall sites ({}):", policy.call_site_count());
    for (target, selector) in policy.call_sites() {
        let name = crate::abi::match_selector(selector)
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  {} {} ({})", target, selector, name);
    }

    print_list("Senders / receivers", policy.senders());
    print_list("Assets", policy.assets());
    print_list("Withdraw destinations", policy.withdraw_destinations());
    print_list("Approval destinations", policy.approval_destinations());

    Ok(())
}

fn print_list(title: &str, items: impl Iterator<Item = Address>) {
    let items: Vec<Address> = items.collect();
    println!("\n{} ({}):", title, items.len());
    if items.is_empty() {
        println!("  (none)");
    }
    for item in items {
        println!("  {}", item);
    }
}

/// List the call shapes the guard understands
pub fn selectors() -> Result<()> {
    println!("\n=== KNOWN SELECTORS ===\n");
    for function in KnownFunction::ALL {
        println!("  {}  {}", function.selector(), function.signature());
    }
    Ok(())
}

/// Encode a payload for one of the known call shapes
pub fn encode(call: &EncodeCall) -> Result<String> {
    let data = match call {
        EncodeCall::Swap {
            amount_out,
            amount_in_max,
            path,
            to,
            deadline,
        } => swapTokensForExactTokensCall {
            amountOut: parse_amount(amount_out, "amount_out")?,
            amountInMax: parse_amount(amount_in_max, "amount_in_max")?,
            path: path
                .iter()
                .map(|p| parse_address(p, "path"))
                .collect::<Result<Vec<_>>>()?,
            to: parse_address(to, "to")?,
            deadline: parse_amount(deadline, "deadline")?,
        }
        .abi_encode(),
        EncodeCall::Transfer { to, amount } => transferCall {
            to: parse_address(to, "to")?,
            amount: parse_amount(amount, "amount")?,
        }
        .abi_encode(),
        EncodeCall::Approve { spender, amount } => approveCall {
            spender: parse_address(spender, "spender")?,
            amount: parse_amount(amount, "amount")?,
        }
        .abi_encode(),
    };

    let encoded = hex::encode_prefixed(data);
    println!("{}", encoded);
    Ok(encoded)
}

/// Create the policy file from the bootstrap section of the config
pub async fn init(config: &Config, force: bool) -> Result<()> {
    let path = &config.guard.policy_file;

    if tokio::fs::try_exists(path).await? && !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite it?", path))
            .default(false)
            .interact()?;

        if !confirmed {
            info!("Init cancelled by user");
            return Ok(());
        }
    }

    let mut guard = config.bootstrap_guard()?;
    persist(config, &mut guard).await?;

    println!("\nPolicy initialised: {}", path);
    println!("Governance: {}", guard.owner());
    println!("Call sites: {}", guard.policy().call_site_count());
    Ok(())
}

/// Apply a governance mutation and persist it
///
/// A change rejected by the guard comes back as [`Error::Violation`] so the
/// binary can tell a policy denial apart from an I/O or parse failure.
pub async fn admin(
    config: &Config,
    caller: &str,
    action: &AdminAction,
    force: bool,
) -> Result<()> {
    let caller = parse_address(caller, "caller")?;
    let mut guard = snapshot::load(&config.guard.policy_file).await?;

    let outcome: std::result::Result<(), GuardViolation> = match action {
        AdminAction::Allow {
            kind,
            key,
            selector,
            note,
        } => {
            let key = build_key(*kind, key, selector.as_deref())?;
            guard.allow(caller, key, note)
        }
        AdminAction::Remove {
            kind,
            key,
            selector,
            note,
        } => {
            let key = build_key(*kind, key, selector.as_deref())?;

            if !guard.policy().contains(&key) {
                warn!(
                    %key,
                    "{} entry is not currently allowed; removal only records the event",
                    kind
                );
            }

            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove {} {} from the policy?", kind, key))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    info!("Removal cancelled by user");
                    return Ok(());
                }
            }

            guard.remove(caller, key, note)
        }
        AdminAction::WhitelistToken { token, note } => {
            guard.whitelist_token(caller, parse_address(token, "token")?, note)
        }
        AdminAction::WhitelistRouter { router, note } => {
            guard.whitelist_router(caller, parse_address(router, "router")?, note)
        }
    };

    if let Err(violation) = outcome {
        if violation.is_admin_violation() {
            warn!(%caller, governance = %guard.owner(), "Policy change from non-governance caller");
        }
        return Err(Error::from(violation).into());
    }

    for event in guard.events() {
        println!("{} {} {:?}", event.event, event.key, event.note);
    }
    persist(config, &mut guard).await
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

/// Append drained events to the audit trail, then save the snapshot.
///
/// A policy change never reaches the snapshot without its audit record.
async fn persist(config: &Config, guard: &mut Guard) -> Result<()> {
    let drained = guard.take_events();
    events::append_jsonl(&config.guard.audit_log, &drained)
        .await
        .with_context(|| {
            format!(
                "Failed to append audit log {}; {} policy event(s) not recorded, policy not saved",
                config.guard.audit_log,
                drained.len()
            )
        })?;
    info!("Recorded {} policy event(s)", drained.len());

    snapshot::save(guard, &config.guard.policy_file)
        .await
        .with_context(|| format!("Failed to save policy {}", config.guard.policy_file))?;
    Ok(())
}

fn build_key(kind: ListKind, key: &str, selector: Option<&str>) -> Result<PolicyKey> {
    let address = parse_address(key, "key")?;
    match (kind, selector) {
        (ListKind::CallSite, Some(selector)) => {
            let selector: Selector = selector
                .parse()
                .with_context(|| format!("Invalid selector: {}", selector))?;
            Ok(PolicyKey::CallSite {
                target: address,
                selector,
            })
        }
        (ListKind::CallSite, None) => anyhow::bail!("call-site entries need --selector"),
        (kind, None) => PolicyKey::for_address(kind, address)
            .with_context(|| format!("{} entries cannot be keyed by address", kind)),
        (kind, Some(_)) => anyhow::bail!("--selector only applies to call sites, not {}", kind),
    }
}

fn parse_address(s: &str, what: &str) -> Result<Address> {
    s.parse::<Address>()
        .with_context(|| format!("Invalid {} address: {}", what, s))
}

fn parse_amount(s: &str, what: &str) -> Result<U256> {
    s.parse::<U256>()
        .with_context(|| format!("Invalid {}: {}", what, s))
}
