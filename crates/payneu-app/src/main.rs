use alloy::primitives::{utils::format_units, Address, U256};
use payneu::{
    amount::approval_amount, determine_payment_path, PayError, PathDecision, PaymentOrchestrator,
    PaymentPath, TokenKind, TOKEN_DECIMALS,
};
use payneu_backend::{BackendClient, CreateInvoiceRequest, CreateTokenRequest};
use payneu_wallet::LocalWallet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
use config::AppConfig;

fn usage() {
    eprintln!(
        "Usage: payneu <command> [args]\n\
         \n\
         Commands:\n\
         \x20 pay <invoice-id>                        settle an invoice from the configured wallet\n\
         \x20 invoices                                list all invoices\n\
         \x20 invoice-create <amount> <token-id> <details...>\n\
         \x20 mint <to> <amount> [token-address]      faucet-mint test tokens (default mUSD)\n\
         \x20 token-register <address> <name...>      register a new accepted token\n\
         \n\
         Environment: BACKEND_URL, RPC_URL, EVM_PRIVATE_KEY, PAYMENT_CONTRACT,\n\
         CONFIRMATIONS, MERCHANT_ID (also read from .env)"
    );
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("pay") => cmd_pay(&config, &args[1..]).await,
        Some("invoices") => cmd_invoices(&config).await,
        Some("invoice-create") => cmd_invoice_create(&config, &args[1..]).await,
        Some("mint") => cmd_mint(&config, &args[1..]).await,
        Some("token-register") => cmd_token_register(&config, &args[1..]).await,
        _ => {
            usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn arg<'a>(args: &'a [String], index: usize, what: &str) -> Result<&'a str, PayError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| PayError::PreconditionFailed(format!("missing argument: {what}")))
}

fn parse_address(s: &str, what: &str) -> Result<Address, PayError> {
    s.parse()
        .map_err(|_| PayError::PreconditionFailed(format!("invalid {what}: {s}")))
}

/// Render a smallest-unit amount as a human token amount.
fn display_units(value: U256) -> String {
    let text = format_units(value, TOKEN_DECIMALS).unwrap_or_else(|_| value.to_string());
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

async fn cmd_pay(config: &AppConfig, args: &[String]) -> Result<(), PayError> {
    let invoice_id: u64 = arg(args, 0, "invoice id")?
        .parse()
        .map_err(|_| PayError::PreconditionFailed("invoice id must be a number".to_string()))?;

    let backend = BackendClient::new(&config.backend_url);
    let mut invoice = backend.invoice(invoice_id).await?;
    let token = invoice.token();

    println!("Invoice #{} from {}", invoice.id, invoice.merchant_name());
    println!("  Amount due: {} {}", invoice.amount, token);
    if !invoice.description.is_empty() {
        println!("  {}", invoice.description);
    }

    let Some(key) = config.private_key.as_deref() else {
        return Err(PayError::PreconditionFailed(
            "no wallet connected; set EVM_PRIVATE_KEY to pay".to_string(),
        ));
    };
    let chain = config.chain_config();
    let wallet = LocalWallet::connect(key, &chain.rpc_url)?;
    let payer = wallet.payer();
    println!("  Paying from: {payer}");

    let Some(eligibility) = backend.payer_status(payer, invoice.id).await? else {
        return Err(PayError::PreconditionFailed(
            "payer eligibility is not available yet; try again shortly".to_string(),
        ));
    };
    // The eligibility check reports the fresher invoice status.
    if let Some(status) = eligibility.status {
        invoice.status = status;
    }

    let path = match determine_payment_path(&invoice, &eligibility) {
        PathDecision::Closed => {
            println!("This invoice is no longer available for payment.");
            return Ok(());
        }
        PathDecision::Unavailable => {
            println!("Payment not available: insufficient {token} or BAZE balance.");
            return Ok(());
        }
        PathDecision::AssetFallback => {
            println!("Payment with {token} is not possible. Paying with BAZE instead (1 {token} = 10 BAZE).");
            PaymentPath::AssetFallback
        }
        PathDecision::Stable => PaymentPath::Stable,
    };

    let pay_token = match path {
        PaymentPath::Stable => chain.token_address(token),
        PaymentPath::AssetFallback => chain.fallback_token,
    };
    let pay_symbol = match path {
        PaymentPath::Stable => token.symbol(),
        PaymentPath::AssetFallback => TokenKind::Baze.symbol(),
    };
    let approval = approval_amount(&invoice.amount, path)?;

    let current = wallet
        .allowance(pay_token, payer, chain.payment_contract)
        .await?;
    tracing::info!(%current, "current payment-contract allowance");

    println!("Approve and pay {} {pay_symbol}...", display_units(approval));

    let amount_text = invoice.amount.clone();
    let mut orchestrator = PaymentOrchestrator::with_config(backend, wallet, invoice, chain);
    match orchestrator.pay(path).await {
        Ok(receipt) => {
            match path {
                PaymentPath::Stable => {
                    println!("Payment of {amount_text} {token} has been processed successfully!")
                }
                PaymentPath::AssetFallback => {
                    println!("Payment with BAZE tokens has been processed successfully!")
                }
            }
            if let Some(tx) = receipt.transaction {
                println!("  Settlement tx: {tx}");
            }
            Ok(())
        }
        Err(e) => {
            match &e {
                PayError::ApprovalRejected(_) | PayError::ApprovalFailed(_) => {
                    println!("Token approval failed. Please try again.")
                }
                _ => println!("Payment failed. Please try again."),
            }
            Err(e)
        }
    }
}

async fn cmd_invoices(config: &AppConfig) -> Result<(), PayError> {
    let backend = BackendClient::new(&config.backend_url);
    let invoices = backend.invoices().await?;
    if invoices.is_empty() {
        println!("No invoices.");
        return Ok(());
    }
    println!("{:>5}  {:>12}  {:<7}  {:<8}  DETAILS", "ID", "AMOUNT", "TOKEN", "STATUS");
    for invoice in invoices {
        println!(
            "{:>5}  {:>12}  {:<7}  {:<8}  {}",
            invoice.id,
            invoice.amount,
            invoice.token().symbol(),
            invoice.status,
            invoice.description,
        );
    }
    Ok(())
}

async fn cmd_invoice_create(config: &AppConfig, args: &[String]) -> Result<(), PayError> {
    let amount: f64 = arg(args, 0, "amount")?
        .parse()
        .map_err(|_| PayError::PreconditionFailed("amount must be a number".to_string()))?;
    let token_id: u64 = arg(args, 1, "token id")?
        .parse()
        .map_err(|_| PayError::PreconditionFailed("token id must be a number".to_string()))?;
    let details = args[2..].join(" ");
    if details.is_empty() {
        return Err(PayError::PreconditionFailed(
            "missing argument: details".to_string(),
        ));
    }
    let merchant_id = std::env::var("MERCHANT_ID")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let backend = BackendClient::new(&config.backend_url);
    let invoice = backend
        .create_invoice(&CreateInvoiceRequest {
            details,
            merchant_id,
            token_id,
            amount,
        })
        .await?;
    println!(
        "Created invoice #{}: {} {} ({})",
        invoice.id,
        invoice.amount,
        invoice.token().symbol(),
        invoice.status,
    );
    Ok(())
}

async fn cmd_mint(config: &AppConfig, args: &[String]) -> Result<(), PayError> {
    let to = parse_address(arg(args, 0, "recipient address")?, "recipient address")?;
    let amount: f64 = arg(args, 1, "amount")?
        .parse()
        .map_err(|_| PayError::PreconditionFailed("amount must be a number".to_string()))?;
    let token = match args.get(2) {
        Some(s) => parse_address(s, "token address")?,
        None => TokenKind::MUsd.address(),
    };

    let backend = BackendClient::new(&config.backend_url);
    backend.mint(to, amount, token).await?;
    println!("Successfully minted {amount} tokens to {to}");
    Ok(())
}

async fn cmd_token_register(config: &AppConfig, args: &[String]) -> Result<(), PayError> {
    let address = parse_address(arg(args, 0, "token address")?, "token address")?;
    let name = args[1..].join(" ");
    if name.is_empty() {
        return Err(PayError::PreconditionFailed(
            "missing argument: token name".to_string(),
        ));
    }

    let backend = BackendClient::new(&config.backend_url);
    backend
        .register_token(&CreateTokenRequest {
            address: address.to_string(),
            name: name.clone(),
        })
        .await?;
    println!("Registered token {name} at {address}");
    Ok(())
}
