//! Vault factory CLI - Entry Point
//!
//! Builds, inspects and dry-runs vault operations. Nothing here talks to a
//! real wallet or chain; `simulate` drives the full orchestrator against
//! in-memory ones.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vault_app::{parse_request, AppConfig, Application, DRY_RUN_ACCOUNT};
use vault_core::{Address, Amount, OperationKind, OrderSide, TradeMode};
use vault_executor::{MockChain, MockWallet, RetryPolicy, WalletSession};
use vault_telemetry::Metrics;

/// Vault factory transaction CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via VAULT_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List entry functions and their resolved gas profiles
    Functions,
    /// Validate input and print the contract call it builds
    Build(OperationArgs),
    /// Generate a trade payload
    Payload {
        amount: String,
        #[arg(long, default_value = "buy")]
        side: OrderSide,
        /// Defaults to trade.mode from the config
        #[arg(long)]
        mode: Option<TradeMode>,
        #[arg(long, default_value = DRY_RUN_ACCOUNT)]
        account: String,
    },
    /// Classify a raw wallet or chain failure message
    Classify { message: String },
    /// Fetch the market summary
    Markets,
    /// Run an operation end to end against an in-memory wallet and chain
    Simulate {
        #[command(flatten)]
        op: OperationArgs,
        /// Wallet rejects the signature request
        #[arg(long)]
        reject: bool,
        /// Chain aborts the transaction with this status text
        #[arg(long)]
        abort: Option<String>,
        /// Polls reporting pending before the final status
        #[arg(long, default_value_t = 0)]
        pending_polls: u32,
        /// Apply the configured retry policy
        #[arg(long)]
        retry: bool,
        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct OperationArgs {
    operation: OperationKind,
    /// Leader address, amount or signal, depending on the operation
    value: Option<String>,
    #[arg(long, default_value = "buy")]
    side: OrderSide,
    /// Defaults to trade.mode from the config
    #[arg(long)]
    mode: Option<TradeMode>,
    /// Signer account
    #[arg(long, default_value = DRY_RUN_ACCOUNT)]
    account: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    vault_telemetry::init_logging()?;

    info!("Starting vault-cli v{}", env!("CARGO_PKG_VERSION"));

    let (config, config_path) = AppConfig::load(args.config.as_deref())?;
    match &config_path {
        Some(path) => info!(config_path = %path.display(), "Configuration loaded"),
        None => info!("No config file found, using defaults"),
    }

    let app = Application::new(config)?;

    match args.command {
        Command::Functions => functions(&app),
        Command::Build(op) => build(&app, op),
        Command::Payload {
            amount,
            side,
            mode,
            account,
        } => {
            let mode = mode.unwrap_or(app.config().trade.mode);
            let account = Address::parse(&account)?;
            let amount: Amount = amount.parse()?;
            let payload = app
                .trade_generator()
                .generate_payload(amount, side, mode, &account)?;
            print_json(&payload)
        }
        Command::Classify { message } => print_json(&app.classifier().classify(&message)),
        Command::Markets => {
            let markets = app.market_data().fetch_summary_or_empty().await;
            print_json(&markets)
        }
        Command::Simulate {
            op,
            reject,
            abort,
            pending_polls,
            retry,
            metrics,
        } => {
            simulate(&app, op, reject, abort, pending_polls, retry).await?;
            if metrics {
                print!("{}", Metrics::render()?);
            }
            Ok(())
        }
    }
}

fn functions(app: &Application) -> Result<()> {
    let network = app.config().network;
    let rows: Vec<_> = OperationKind::ALL
        .into_iter()
        .map(|op| {
            let entry = app.builder().registry().entry(op);
            let resolved = app.builder().gas_policy().resolve(op, network);
            json!({
                "operation": op,
                "function": app.builder().registry().qualified_name(op),
                "params": entry.params.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                "gas": resolved.profile,
                "gas_substituted": resolved.is_substituted(),
            })
        })
        .collect();
    print_json(&rows)
}

fn build(app: &Application, op: OperationArgs) -> Result<()> {
    let mode = op.mode.unwrap_or(app.config().trade.mode);
    let account = Address::parse(&op.account)?;
    let request = parse_request(op.operation, op.value, op.side, mode)?;

    let orchestrator = app.dry_run_orchestrator(Arc::new(MockChain::new()));
    let built = orchestrator.build_call(&request, &account)?;
    print_json(&json!({
        "call": built.call,
        "gas_substituted": built.gas_substitution.is_some(),
        "gas_substitution_reason": built.gas_substitution.map(|s| s.reason),
    }))
}

async fn simulate(
    app: &Application,
    op: OperationArgs,
    reject: bool,
    abort: Option<String>,
    pending_polls: u32,
    retry: bool,
) -> Result<()> {
    let mode = op.mode.unwrap_or(app.config().trade.mode);
    let account = Address::parse(&op.account)?;
    let request = parse_request(op.operation, op.value, op.side, mode)?;

    let wallet = Arc::new(MockWallet::new(account));
    if reject {
        wallet.push_failure("User rejected the request.");
    }
    let chain = Arc::new(MockChain::new());
    chain.set_pending_polls(pending_polls);
    if let Some(vm_status) = abort {
        chain.set_abort(vm_status);
    }

    let orchestrator = app.dry_run_orchestrator(chain);
    let session = WalletSession::new(wallet);
    let policy = if retry {
        app.config().retry.clone()
    } else {
        RetryPolicy::none()
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let started = std::time::Instant::now();
    let result = orchestrator
        .execute_with_retry(request, &session, &policy, &cancel)
        .await;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        outcome = result.outcome_label(),
        "Simulation finished"
    );
    print_json(&result)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
