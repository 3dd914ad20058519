//! # Unikey CLI
//!
//! Key management from the command line.
//!
//! ## Usage
//!
//! ```bash
//! unikey generate --bits 2048 --out alice.key --password secret
//! unikey public --key alice.key --password secret --out alice.pub
//! unikey inspect --key alice.pub
//! unikey sign --key alice.key --password secret --data doc.txt --out doc.sig --embed-public-key
//! unikey verify --key alice.pub --data doc.txt --signature doc.sig
//! ```
//!
//! Password KDF defaults come from `UNIKEY_KDF_ROUNDS` / `UNIKEY_KDF_PRF`,
//! key strength from `UNIKEY_KEY_BITS`. Log verbosity follows `RUST_LOG`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use unikey::{extended_signature, AnyKey, KeyConfig, KeyIdentity, PrivateKey};

#[derive(Parser, Debug)]
#[command(name = "unikey")]
#[command(about = "Generate, protect, inspect and use RSA keys")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new private key
    Generate {
        /// Key strength in bits (defaults to UNIKEY_KEY_BITS or 2048)
        #[arg(short, long)]
        bits: Option<usize>,

        /// Where to write the packed private key
        #[arg(short, long)]
        out: PathBuf,

        /// Protect the written key with this password
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Extract the public key of a private key
    Public {
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(short, long)]
        password: Option<String>,
    },

    /// Print fingerprint, addresses and info of a key
    Inspect {
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        password: Option<String>,
    },

    /// Re-pack a private key under a password
    Protect {
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        #[arg(short, long)]
        password: String,

        /// PBKDF2 rounds (defaults to UNIKEY_KDF_ROUNDS or 100000)
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Password the input key is currently protected with
        #[arg(long)]
        current_password: Option<String>,
    },

    /// Create an extended signature over a file
    Sign {
        #[arg(short, long)]
        key: PathBuf,

        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        out: PathBuf,

        /// Embed the signer's public key in the signature
        #[arg(short, long)]
        embed_public_key: bool,

        #[arg(short, long)]
        password: Option<String>,
    },

    /// Check an extended signature over a file
    Verify {
        /// Public or private key; the embedded key is used when omitted
        #[arg(short, long)]
        key: Option<PathBuf>,

        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        signature: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = KeyConfig::from_env();
    config.validate().context("invalid environment configuration")?;

    let output = run(args.command, &config)?;
    print!("{output}");
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Execute one command, returning what it prints.
fn run(command: Command, config: &KeyConfig) -> Result<String> {
    match command {
        Command::Generate { bits, out, password } => {
            let bits = bits.unwrap_or(config.default_bits);
            unikey::config::validate_bits(bits)?;
            let key = PrivateKey::generate(bits)?;
            let packed = match password {
                Some(password) => key.pack_with_password(&password, &config.password)?,
                None => key.pack(),
            };
            write_file(&out, &packed)?;
            info!(bits, "generated key");
            Ok(format!("{}\n", key.fingerprint().to_hex()))
        }
        Command::Public { key, out, password } => {
            let key = load_key(&key, password.as_deref())?;
            write_file(&out, &key.public_key().pack())?;
            Ok(format!("{}\n", key.fingerprint().to_hex()))
        }
        Command::Inspect { key, password } => {
            let key = load_key(&key, password.as_deref())?;
            Ok(describe(&key))
        }
        Command::Protect {
            key,
            out,
            password,
            rounds,
            current_password,
        } => {
            let key = load_private(&key, current_password.as_deref())?;
            let mut password_config = config.password.clone();
            if let Some(rounds) = rounds {
                password_config = password_config.with_kdf_rounds(rounds);
            }
            write_file(&out, &key.pack_with_password(&password, &password_config)?)?;
            Ok(format!("{}\n", key.fingerprint().to_hex()))
        }
        Command::Sign {
            key,
            data,
            out,
            embed_public_key,
            password,
        } => {
            let key = load_private(&key, password.as_deref())?;
            let data = read_file(&data)?;
            let signature = extended_signature::sign(&key, &data, embed_public_key)?;
            write_file(&out, &signature)?;
            Ok(format!("{}\n", key.fingerprint().to_hex()))
        }
        Command::Verify {
            key,
            data,
            signature,
        } => {
            let signature = read_file(&signature)?;
            let (public_key, embedded) = match key {
                Some(path) => (load_key(&path, None)?.public_key().clone(), false),
                None => match extended_signature::extract_public_key(&signature)? {
                    Some(key) => (key, true),
                    None => bail!("signature carries no public key; pass --key"),
                },
            };
            let data = read_file(&data)?;
            let Some(verified) = extended_signature::verify(&public_key, &signature, &data)? else {
                bail!("signature does not verify");
            };

            let mut out = String::from("valid\n");
            let _ = writeln!(out, "signer:     {}", public_key.fingerprint().to_hex());
            let _ = writeln!(out, "key id:     {}", hex::encode(verified.key_id()));
            let _ = writeln!(out, "created at: {}", verified.created_at().to_rfc3339());
            if embedded {
                let _ = writeln!(
                    out,
                    "note:       key taken from the signature itself; check the signer \
                     fingerprint against a key you trust"
                );
            }
            Ok(out)
        }
    }
}

/// Human-readable summary of a key's identity.
fn describe(key: &AnyKey) -> String {
    let kind = if key.is_private() { "private" } else { "public" };
    let mut out = String::new();
    let _ = writeln!(out, "kind:          {kind}");
    let _ = writeln!(out, "bits:          {}", key.bit_strength());
    let _ = writeln!(out, "fingerprint:   {}", key.fingerprint().to_hex());
    let _ = writeln!(out, "short address: {}", key.short_address());
    let _ = writeln!(out, "long address:  {}", key.long_address());
    let _ = writeln!(out, "info:          {key}");
    out
}

// =============================================================================
// FILES
// =============================================================================

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn load_key(path: &Path, password: Option<&str>) -> Result<AnyKey> {
    let bytes = read_file(path)?;
    let key = match password {
        Some(password) => AnyKey::unpack_with_password(&bytes, password),
        None => AnyKey::unpack(&bytes),
    };
    key.with_context(|| format!("loading key {}", path.display()))
}

fn load_private(path: &Path, password: Option<&str>) -> Result<PrivateKey> {
    match load_key(path, password)? {
        AnyKey::Private(key) => Ok(key),
        AnyKey::Public(_) => bail!("{} holds a public key", path.display()),
    }
}
