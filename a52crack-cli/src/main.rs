//! a52crack command-line tool
//!
//! Thin wrappers over the library crates: channel-code encoding and
//! decoding of files, A5/2 encryption, resolution-dictionary
//! precomputation, and the key recovery attack itself.
//!
//! Files are framed in whole blocks: 23 bytes per 184-bit source word and
//! 57 bytes per 456-bit codeword, MSB first.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use a52crack_attack::{build_to_file, recover_key, AttackOutcome, CipherTextBundle, Dictionary};
use a52crack_cipher::consts::{FRAME_ID_BITS, SECRET_KEY_BITS};
use a52crack_cipher::A52;
use a52crack_code::{ChannelCode, CODEWORD_BITS, SOURCEWORD_BITS};
use a52crack_common::{
    bits_to_bytes, bytes_to_bits, format_bits, init_logging, parse_bit_string, ToolConfig,
};

/// Bytes per source-word block in encoded/decoded files.
const SOURCE_BLOCK_BYTES: usize = SOURCEWORD_BITS / 8;
/// Bytes per codeword block in encoded/encrypted files.
const CODE_BLOCK_BYTES: usize = CODEWORD_BITS / 8;

/// a52crack - A5/2 key recovery tool
#[derive(Parser, Debug)]
#[command(name = "a52crack")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the tool configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a file through the GSM channel code
    Encode {
        /// Input file (23-byte source blocks, the last block zero-padded)
        source: PathBuf,
        /// Output file (57-byte codeword blocks)
        dest: PathBuf,
    },
    /// Decode a channel-coded file
    Decode {
        /// Input file (57-byte codeword blocks)
        source: PathBuf,
        /// Output file (23-byte source blocks)
        dest: PathBuf,
    },
    /// Encrypt or decrypt a channel-coded file with A5/2
    #[command(visible_alias = "decrypt")]
    Encrypt {
        /// Input file (57-byte codeword blocks)
        source: PathBuf,
        /// Output file
        dest: PathBuf,
        /// Secret key as 64 '0'/'1' characters
        #[arg(short, long)]
        key: String,
        /// Frame id as 22 '0'/'1' characters
        #[arg(short, long)]
        frame: String,
    },
    /// Recover the secret key from three encrypted codewords
    Attack {
        /// Input file holding exactly three 57-byte encrypted codewords
        source: PathBuf,
        /// Frame id as 22 '0'/'1' characters
        #[arg(short, long)]
        frame: String,
        /// Dictionary store path (overrides the configuration)
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Worker count (overrides the configuration)
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Precompute the resolution-matrix dictionary
    Precompute {
        /// Dictionary store path (overrides the configuration)
        #[arg(long)]
        dictionary: Option<PathBuf>,
        /// Worker count (overrides the configuration)
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.log_level);

    match run(args.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<ToolConfig> {
    match &args.config_file {
        Some(path) => ToolConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(ToolConfig::default()),
    }
}

fn run(command: Command, config: ToolConfig) -> Result<()> {
    match command {
        Command::Encode { source, dest } => encode_file(&source, &dest),
        Command::Decode { source, dest } => decode_file(&source, &dest),
        Command::Encrypt {
            source,
            dest,
            key,
            frame,
        } => encrypt_file(&source, &dest, &key, &frame),
        Command::Attack {
            source,
            frame,
            dictionary,
            workers,
        } => attack_file(
            &source,
            &frame,
            &dictionary.unwrap_or(config.dictionary),
            workers.unwrap_or(config.workers),
        ),
        Command::Precompute {
            dictionary,
            workers,
        } => {
            let path = dictionary.unwrap_or(config.dictionary);
            build_to_file(&path, workers.unwrap_or(config.workers))?;
            Ok(())
        }
    }
}

fn encode_file(source: &PathBuf, dest: &PathBuf) -> Result<()> {
    let input = fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    let code = ChannelCode::new();

    let mut output = Vec::with_capacity(input.len().div_ceil(SOURCE_BLOCK_BYTES) * CODE_BLOCK_BYTES);
    for chunk in input.chunks(SOURCE_BLOCK_BYTES) {
        let mut block = [0u8; SOURCE_BLOCK_BYTES];
        block[..chunk.len()].copy_from_slice(chunk);
        let codeword = code.encode(&bytes_to_bits(&block, SOURCEWORD_BITS))?;
        output.extend(bits_to_bytes(&codeword));
    }

    fs::write(dest, output)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    info!("file encoded to {}", dest.display());
    Ok(())
}

fn decode_file(source: &PathBuf, dest: &PathBuf) -> Result<()> {
    let input = fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    if input.is_empty() || input.len() % CODE_BLOCK_BYTES != 0 {
        bail!(
            "{} is not a multiple of {CODE_BLOCK_BYTES}-byte codeword blocks",
            source.display()
        );
    }
    let code = ChannelCode::new();

    let mut output = Vec::with_capacity(input.len() / CODE_BLOCK_BYTES * SOURCE_BLOCK_BYTES);
    for chunk in input.chunks(CODE_BLOCK_BYTES) {
        let sourceword = code.decode(&bytes_to_bits(chunk, CODEWORD_BITS))?;
        output.extend(bits_to_bytes(&sourceword));
    }

    fs::write(dest, output)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    info!("file decoded to {}", dest.display());
    Ok(())
}

fn encrypt_file(source: &PathBuf, dest: &PathBuf, key: &str, frame: &str) -> Result<()> {
    let key: [u8; SECRET_KEY_BITS] = parse_bit_string(key, SECRET_KEY_BITS)?
        .try_into()
        .expect("length checked");
    let frame_id: [u8; FRAME_ID_BITS] = parse_bit_string(frame, FRAME_ID_BITS)?
        .try_into()
        .expect("length checked");

    let input = fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    if input.is_empty() || input.len() % CODE_BLOCK_BYTES != 0 {
        bail!(
            "{} is not a multiple of {CODE_BLOCK_BYTES}-byte codeword blocks",
            source.display()
        );
    }

    let mut cipher = A52::new();
    cipher.key_setup(&key, &frame_id);

    let mut output = Vec::with_capacity(input.len());
    for chunk in input.chunks(CODE_BLOCK_BYTES) {
        let keystream = bits_to_bytes(&cipher.keystream(CODEWORD_BITS));
        output.extend(chunk.iter().zip(&keystream).map(|(c, k)| c ^ k));
    }

    fs::write(dest, output)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    info!("file encrypted to {}", dest.display());
    Ok(())
}

fn attack_file(source: &PathBuf, frame: &str, dictionary: &PathBuf, workers: usize) -> Result<()> {
    let frame_id = parse_bit_string(frame, FRAME_ID_BITS)?;

    let input = fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;
    if input.len() < 3 * CODE_BLOCK_BYTES {
        bail!(
            "{} holds {} bytes; the attack needs three {CODE_BLOCK_BYTES}-byte codewords",
            source.display(),
            input.len()
        );
    }
    let bursts: [Vec<u8>; 3] = std::array::from_fn(|m| {
        bytes_to_bits(
            &input[m * CODE_BLOCK_BYTES..(m + 1) * CODE_BLOCK_BYTES],
            CODEWORD_BITS,
        )
    });
    let bundle = CipherTextBundle::new(bursts, &frame_id)?;

    let dict = Dictionary::load(dictionary).context(
        "dictionary unavailable; run the precompute command before attacking",
    )?;

    match recover_key(&bundle, &dict, workers)? {
        AttackOutcome::KeyFound { index, key } => {
            info!(index, "attack succeeded");
            println!("{}", format_bits(&key));
            Ok(())
        }
        AttackOutcome::Exhausted => {
            bail!("attack failed: every hypothesis was rejected")
        }
    }
}
