//! Env command implementation.

use anyhow::Result;
use colored::Colorize;
use txguard_core::environment::{CredentialEnvironment, ENV_OVERRIDE_VAR};

/// Print the resolved credential environment.
pub fn execute() -> Result<()> {
    let environment = CredentialEnvironment::current();
    let label = match environment {
        CredentialEnvironment::Development => "development".yellow(),
        CredentialEnvironment::Production => "production".green(),
    };
    println!("credential environment: {label}");
    println!(
        "override: {}",
        std::env::var(ENV_OVERRIDE_VAR).unwrap_or_else(|_| "<unset>".into())
    );
    Ok(())
}
