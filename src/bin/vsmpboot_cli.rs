//! VsmpBoot CLI - Bridge interface for the reconcile tooling
//!
//! Commands: validate, resolve, render
//! Outputs JSON to stdout
//! Returns non-zero on validation failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use vsmpboot_core::{Configuration, ProvisioningPipeline, RenderRequest};

#[derive(Parser)]
#[command(name = "vsmpboot-cli")]
#[command(about = "VsmpBoot CLI - vSMP Bootstrap Compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a serialized configuration
    Validate {
        /// JSON payload (BootstrapConfiguration envelope)
        #[arg(short, long)]
        payload: String,
    },

    /// Resolve a configuration into the canonical key-value set
    Resolve {
        /// JSON payload (BootstrapConfiguration envelope); omit for defaults
        #[arg(short, long)]
        payload: Option<String>,
    },

    /// Render the boot user-data document
    Render {
        /// JSON payload (BootstrapConfiguration envelope); omit for defaults
        #[arg(short, long)]
        payload: Option<String>,

        /// Path to the provisioning script to embed
        #[arg(short, long)]
        script: PathBuf,

        /// Print the raw document instead of the JSON report
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let pipeline = ProvisioningPipeline::new();

    match cli.command {
        Commands::Validate { payload } => {
            let config = match pipeline.decode_config(payload.as_bytes()) {
                Ok(c) => c,
                Err(e) => {
                    println!(r#"{{"valid": false, "error": "{}"}}"#, e);
                    return ExitCode::FAILURE;
                }
            };

            let report = pipeline.validate_config(&config);
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
            if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Resolve { payload } => {
            let config = match decode_optional(&pipeline, payload.as_deref()) {
                Ok(c) => c,
                Err(code) => return code,
            };

            let resolved = vsmpboot_core::resolve_with_origins(config.as_ref());
            println!("{}", serde_json::to_string_pretty(&resolved).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Render {
            payload,
            script,
            raw,
        } => {
            let config = match decode_optional(&pipeline, payload.as_deref()) {
                Ok(c) => c,
                Err(code) => return code,
            };

            let script = match std::fs::read_to_string(&script) {
                Ok(s) => s,
                Err(e) => {
                    println!(
                        r#"{{"success": false, "error": "Failed to read script {}: {}"}}"#,
                        script.display(),
                        e
                    );
                    return ExitCode::FAILURE;
                }
            };

            let request = RenderRequest { config, script };

            match pipeline.render(&request) {
                Ok(rendered) => {
                    if raw {
                        print!("{}", rendered.user_data);
                    } else {
                        let output = serde_json::json!({
                            "success": true,
                            "rendered": rendered,
                        });
                        println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    });
                    println!("{}", serde_json::to_string(&output).unwrap());
                    ExitCode::from(2) // Render failure (validation)
                }
            }
        }
    }
}

fn decode_optional(
    pipeline: &ProvisioningPipeline,
    payload: Option<&str>,
) -> Result<Option<Configuration>, ExitCode> {
    match payload {
        None => Ok(None),
        Some(raw) => match pipeline.decode_config(raw.as_bytes()) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                println!(r#"{{"success": false, "error": "{}"}}"#, e);
                Err(ExitCode::FAILURE)
            }
        },
    }
}
