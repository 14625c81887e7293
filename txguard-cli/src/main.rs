//! Txguard CLI - exercise the verification engine from a terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "txguard")]
#[command(author, version, about = "Transaction security verification engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a verification round against a simulated device
    Verify {
        /// Simulate a device without biometric hardware
        #[arg(long)]
        no_hardware: bool,

        /// Simulate an enrolled device whose prompt fails
        #[arg(long)]
        fail_biometric: bool,

        /// PIN to submit when the flow degrades to the pin-pad
        #[arg(long)]
        pin: Option<String>,
    },

    /// Run a guarded top-up against the in-process mock backend
    Topup {
        /// Amount to deduct
        #[arg(value_name = "AMOUNT")]
        amount: f64,

        /// Product code for the mutation
        #[arg(short, long, default_value = "MTN-AIRTIME")]
        product: String,

        /// Recipient phone number
        #[arg(short, long, default_value = "+2348012345678")]
        recipient: String,

        /// Starting balance of the simulated account
        #[arg(long, default_value_t = 1000.0)]
        balance: f64,

        /// Make the remote call fail with a server rejection
        #[arg(long)]
        fail_remote: bool,
    },

    /// Print the resolved credential environment
    Env,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            no_hardware,
            fail_biometric,
            pin,
        } => commands::verify::execute(no_hardware, fail_biometric, pin).await,
        Commands::Topup {
            amount,
            product,
            recipient,
            balance,
            fail_remote,
        } => commands::topup::execute(amount, product, recipient, balance, fail_remote).await,
        Commands::Env => commands::env::execute(),
    }
}
