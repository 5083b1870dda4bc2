use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
mod auth;
mod storage;
use log::debug;
use pwseal::{CipherPreference, Header, SealOptions, armor};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use storage::Storage;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CipherArg {
    /// AES-256-GCM if the CPU accelerates AES, ChaCha20-Poly1305 otherwise
    Auto,
    #[value(name = "aes256-gcm")]
    Aes256Gcm,
    #[value(name = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl From<CipherArg> for CipherPreference {
    fn from(arg: CipherArg) -> Self {
        match arg {
            CipherArg::Auto => CipherPreference::Auto,
            CipherArg::Aes256Gcm => CipherPreference::Aes256Gcm,
            CipherArg::ChaCha20Poly1305 => CipherPreference::ChaCha20Poly1305,
        }
    }
}

#[derive(Debug, clap::Args)]
struct IoArgs {
    /// Read from PATH instead of stdin
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Write atomically to PATH instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Sealed blobs are base64 text instead of raw bytes
    #[arg(short, long, default_value_t = false)]
    armor: bool,
}

#[derive(Debug, Parser)]
#[command(name = "pwseal")]
#[command(
    version,
    about = "Password-based authenticated encryption for configuration payloads."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seals plaintext under a password
    Encrypt {
        #[command(flatten)]
        io: IoArgs,

        /// Cipher for the new blob
        #[arg(long, value_enum, env = "PWSEAL_CIPHER", default_value_t = CipherArg::Auto)]
        cipher: CipherArg,
    },

    /// Opens a sealed blob
    Decrypt {
        #[command(flatten)]
        io: IoArgs,
    },

    /// Shows the algorithms a sealed blob uses
    Info {
        /// Read from PATH instead of stdin
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,

        /// The blob is base64 text instead of raw bytes
        #[arg(short, long, default_value_t = false)]
        armor: bool,
    },
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(p) => fs::read(p).with_context(|| format!("failed to read {}", p.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(p) => {
            let storage = Storage::new(p);
            storage
                .save(data)
                .with_context(|| format!("failed to write {}", storage.path().display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn unarmor(data: Vec<u8>, armored: bool) -> Result<Vec<u8>> {
    if !armored {
        return Ok(data);
    }
    let text = std::str::from_utf8(&data).context("armored input is not text")?;
    Ok(armor::decode(text)?)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    let _logger = flexi_logger::Logger::try_with_env_or_str("warn")?.start()?;

    match args.command {
        Commands::Encrypt { io, cipher } => {
            let password = auth::read_new_password(io.input.is_some())?;
            let plaintext = Zeroizing::new(read_input(io.input.as_ref())?);

            let options = SealOptions {
                cipher: cipher.into(),
            };
            let blob = pwseal::encrypt_with(&password, &plaintext, &options)
                .context("encryption failed")?;

            let out = if io.armor {
                let mut text = armor::encode(&blob).into_bytes();
                text.push(b'\n');
                text
            } else {
                blob
            };
            write_output(io.output, &out)?;
        }
        Commands::Decrypt { io } => {
            let password = auth::read_password(io.input.is_some())?;
            let data = read_input(io.input.as_ref())?;

            // Every failure looks the same to the caller.
            let plaintext = unarmor(data, io.armor)
                .and_then(|blob| Ok(pwseal::decrypt(&password, &blob)?))
                .map_err(|e| {
                    debug!("decryption failed: {e:#}");
                    anyhow!("decryption failed")
                })?;
            write_output(io.output, &plaintext)?;
        }
        Commands::Info { input, armor } => {
            let blob = unarmor(read_input(input.as_ref())?, armor)?;
            let header = pwseal::inspect(&blob).context("not a sealed blob")?;
            let suite = header.suite();

            println!("suite:        {suite} (id {:#04x})", suite.id());
            println!("kdf:          {}", suite.kdf().name());
            println!("cipher:       {}", suite.cipher().name());
            println!(
                "decode-only:  {}",
                if suite.is_decode_only() { "yes" } else { "no" }
            );
            println!("payload:      {} bytes", blob.len() - Header::LEN);
        }
    }

    Ok(())
}
