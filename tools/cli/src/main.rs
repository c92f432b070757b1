//! Sealfield CLI - encrypt and decrypt values from the command line.
//!
//! Envelopes are read and written as the `{salt, iv, value}` JSON wire
//! format, so values produced here can be dropped into any document that
//! stores encrypted fields.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zeroize::Zeroizing;

use sealfield_crypto::{ContextParams, Envelope, PasswordCryptoContext};
use sealfield_service::{validate, EncryptionService};

/// Environment variable consulted before prompting for the password.
const PASSWORD_ENV: &str = "SEALFIELD_PASSWORD";
/// Environment variable consulted before prompting for a new password.
const NEW_PASSWORD_ENV: &str = "SEALFIELD_NEW_PASSWORD";

#[derive(Parser)]
#[command(name = "sealfield")]
#[command(about = "Sealfield - Password based value encryption")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with context parameters (cipher, key_derivation, ...).
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text or a file and print the envelope.
    Encrypt {
        /// Text to encrypt.
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// File to encrypt ("-" for stdin).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Charset used to encode --text.
        #[arg(short, long, default_value = "UTF-8")]
        encoding: String,
    },

    /// Decrypt an envelope.
    Decrypt {
        /// Envelope JSON file ("-" for stdin).
        #[arg(short = 'n', long)]
        envelope: PathBuf,

        /// Write plaintext here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-encrypt an envelope under a new password.
    Rekey {
        /// Envelope JSON file ("-" for stdin).
        #[arg(short = 'n', long)]
        envelope: PathBuf,
    },

    /// Check an envelope's structure without decrypting it.
    Inspect {
        /// Envelope JSON file ("-" for stdin).
        #[arg(short = 'n', long)]
        envelope: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let params = load_params(cli.params.as_deref())?;

    match cli.command {
        Commands::Encrypt {
            text,
            input,
            encoding,
        } => cmd_encrypt(&params, text.as_deref(), input.as_deref(), &encoding),

        Commands::Decrypt { envelope, output } => {
            cmd_decrypt(&params, &envelope, output.as_deref())
        }

        Commands::Rekey { envelope } => cmd_rekey(&params, &envelope),

        Commands::Inspect { envelope } => cmd_inspect(&envelope),
    }
}

/// Load context parameters from a JSON file, or use the defaults.
fn load_params(path: Option<&Path>) -> Result<ContextParams> {
    let Some(path) = path else {
        return Ok(ContextParams::default());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    let params: ContextParams =
        serde_json::from_str(&json).context("Invalid parameters file")?;
    params.validate().context("Invalid parameters")?;
    Ok(params)
}

/// Read the password from the environment, or prompt for it.
fn read_password(env: &str, prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(password) = std::env::var(env) {
        return Ok(Zeroizing::new(password));
    }
    let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
    Ok(Zeroizing::new(password))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn read_envelope(path: &Path) -> Result<Envelope> {
    let bytes = read_input(path)?;
    let json = String::from_utf8(bytes).context("Envelope is not UTF-8")?;
    Envelope::from_json(&json).context("Failed to parse envelope")
}

fn build_service(read_password: &str, write_password: &str, params: &ContextParams) -> Result<EncryptionService> {
    let context = PasswordCryptoContext::with_params(read_password, write_password, params)
        .context("Failed to initialize crypto context")?;
    Ok(EncryptionService::new(Arc::new(context)))
}

/// Encrypt text or file contents.
fn cmd_encrypt(
    params: &ContextParams,
    text: Option<&str>,
    input: Option<&Path>,
    encoding: &str,
) -> Result<()> {
    let password = read_password(PASSWORD_ENV, "Enter password: ")?;
    let service = build_service(&password, &password, params)?;

    let envelope = match (text, input) {
        (Some(text), _) => service.encrypt_text(text, encoding)?,
        (None, Some(path)) => service.encrypt(&read_input(path)?)?,
        (None, None) => anyhow::bail!("Provide --text or --input"),
    };

    println!("{}", envelope.to_json()?);
    Ok(())
}

/// Decrypt an envelope to stdout or a file.
fn cmd_decrypt(params: &ContextParams, envelope: &Path, output: Option<&Path>) -> Result<()> {
    let envelope = read_envelope(envelope)?;
    let password = read_password(PASSWORD_ENV, "Enter password: ")?;
    let service = build_service(&password, &password, params)?;

    let plaintext = Zeroizing::new(service.decrypt(&envelope).context("Failed to decrypt")?);

    match output {
        Some(path) => {
            std::fs::write(path, plaintext.as_slice())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {}", plaintext.len(), path.display());
        }
        None => {
            std::io::stdout().write_all(&plaintext)?;
        }
    }

    Ok(())
}

/// Decrypt with the current password and encrypt under a new one.
fn cmd_rekey(params: &ContextParams, envelope: &Path) -> Result<()> {
    let envelope = read_envelope(envelope)?;

    let current = read_password(PASSWORD_ENV, "Enter current password: ")?;
    let new = read_password(NEW_PASSWORD_ENV, "Enter new password: ")?;
    if std::env::var(NEW_PASSWORD_ENV).is_err() {
        let confirm = read_password(NEW_PASSWORD_ENV, "Confirm new password: ")?;
        if *new != *confirm {
            anyhow::bail!("Passwords do not match");
        }
    }

    let service = build_service(&current, &new, params)?;
    let plaintext = Zeroizing::new(service.decrypt(&envelope).context("Failed to decrypt")?);
    let rekeyed = service.encrypt(&plaintext)?;

    info!("Envelope re-encrypted under new password");
    println!("{}", rekeyed.to_json()?);
    Ok(())
}

/// Report envelope structure.
fn cmd_inspect(envelope: &Path) -> Result<()> {
    let envelope = read_envelope(envelope)?;
    let result = validate(&envelope);

    let size = |field: Option<&[u8]>| {
        field
            .map(|b| format!("{} bytes", b.len()))
            .unwrap_or_else(|| "missing".to_string())
    };

    println!("Envelope:");
    println!("  salt:  {}", size(envelope.salt()));
    println!("  iv:    {}", size(envelope.iv()));
    println!("  value: {}", size(envelope.ciphertext()));
    if let Some(id) = &envelope.id {
        println!("  id:    {} bytes", id.len());
    }

    if result.is_valid() {
        println!("Structurally valid.");
        Ok(())
    } else {
        for violation in result.violations() {
            println!("  - {}", violation);
        }
        anyhow::bail!("Envelope is invalid")
    }
}
