//! `sitekey` command line tool.
//!
//! Generates production keys (signed with the secret from the environment
//! variable named by `license.secret_env`, `SS_LICENSE_SECRET` by default),
//! unsigned development keys, verifies keys, and prints the local binding
//! fingerprint for cross-machine pre-binding.

mod args;

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use sitekey::batch::{all_selectors, generate_batch, BatchMode};
use sitekey::config::SiteKeyConfig;
use sitekey::errors::LicenseError;
use sitekey::logging::init_logging;
use sitekey::{LicenseSecret, Signer, Verifier, VerifierMode, VerifierPolicy};

use args::{Cli, Command, FingerprintArgs, GenerateArgs, VerifyArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SiteKeyConfig::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    init_logging(&config.logging);

    let result = match cli.command {
        Command::Generate(args) => run_generate(&config, args),
        Command::Verify(args) => run_verify(&config, args),
        Command::Fingerprint(args) => run_fingerprint(&config, args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            match e {
                LicenseError::MissingSecret(_) | LicenseError::ConfigError(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run_generate(config: &SiteKeyConfig, args: GenerateArgs) -> Result<(), LicenseError> {
    let mut selectors = if args.all { all_selectors() } else { Vec::new() };
    selectors.extend(args.disciplines);

    let signer = Signer::default();
    let secret;
    let mode = if args.dev {
        BatchMode::Development
    } else {
        secret = LicenseSecret::from_env(&config.license.secret_env)?;
        BatchMode::Signed {
            secret: &secret,
            bound: config.license.bind && !args.no_bind,
            body_length: args.body_length.unwrap_or(config.license.body_length),
            device_override: args
                .device
                .as_deref()
                .or_else(|| config.license.device_override()),
        }
    };

    let outcomes = generate_batch(&signer, &selectors, args.count, mode)?;
    for outcome in outcomes {
        // The first unknown discipline aborts the run; keys already printed stay valid.
        for key in outcome.keys? {
            println!("{key}");
        }
    }

    info!(disciplines = selectors.len(), count = args.count, "keys generated");
    Ok(())
}

fn run_verify(config: &SiteKeyConfig, args: VerifyArgs) -> Result<(), LicenseError> {
    let secret = LicenseSecret::from_env(&config.license.secret_env)?;

    let mut policy = VerifierPolicy::from(&config.license);
    if args.dev_mode {
        policy.mode = VerifierMode::development()?;
    }
    policy.accept_unbound = args.accept_unbound;

    let mut verifier = Verifier::new(Default::default(), policy);
    if let Some(device) = args
        .device
        .as_deref()
        .or_else(|| config.license.device_override())
    {
        verifier = verifier.with_device_override(device);
    }

    let info = if args.no_bind {
        if let Some(expected) = &args.discipline {
            verifier.expect_discipline(expected, &args.key)?;
        }
        verifier.verify_as(&secret, &args.key, false)?
    } else if let Some(expected) = &args.discipline {
        verifier.verify_for(&secret, expected, &args.key)?
    } else {
        verifier.verify(&secret, &args.key)?
    };

    if args.json {
        let out = serde_json::to_string(&info)
            .map_err(|e| LicenseError::ConfigError(format!("failed to encode result: {e}")))?;
        println!("{out}");
    } else {
        println!("valid: {} ({})", info.code, info.long_name);
    }
    Ok(())
}

fn run_fingerprint(config: &SiteKeyConfig, args: FingerprintArgs) -> Result<(), LicenseError> {
    let device = args
        .device
        .as_deref()
        .or_else(|| config.license.device_override());
    let fingerprint = sitekey::current_fingerprint(device);

    if args.json {
        println!(
            "{}",
            serde_json::json!({ "value": fingerprint.value, "source": fingerprint.source })
        );
    } else {
        println!("{fingerprint}");
    }
    Ok(())
}
