//! Generate pseudorandom bits and print them as hex or binary text.

use hdrbg_crypto::drbg::{DrbgConfig, HashDrbg};
use hdrbg_crypto::entropy::{
    ConditionedEntropy, EntropyConfig, EntropySource, FixedEntropy, SystemEntropy,
};
use hdrbg_types::{BitString, CryptoError, SecurityStrength};

/// Largest output a single invocation produces (2^30 bits).
pub const MAX_OUTPUT_BITS: usize = 1 << 30;

pub struct GenOptions<'a> {
    pub bits: usize,
    pub format: &'a str,
    pub strength: u32,
    pub personalization: Option<&'a str>,
    pub additional: Option<&'a str>,
    pub entropy_hex: Option<&'a str>,
    pub conditioned: bool,
    pub reseed_interval: Option<u64>,
    pub verbose: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct GenStats {
    pub generate_calls: usize,
    pub reseeds: usize,
}

pub fn run(opts: &GenOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (bits, stats, strength) = produce(opts)?;
    if opts.verbose {
        eprintln!(
            "strength: {} bits, generate calls: {}, reseeds: {}",
            strength.bits(),
            stats.generate_calls,
            stats.reseeds
        );
    }
    println!("{}", render(&bits, opts.format)?);
    Ok(())
}

fn produce(
    opts: &GenOptions,
) -> Result<(BitString, GenStats, SecurityStrength), Box<dyn std::error::Error>> {
    if opts.bits == 0 || opts.bits > MAX_OUTPUT_BITS {
        return Err(format!("bits must be between 1 and {MAX_OUTPUT_BITS}").into());
    }
    if !matches!(opts.format, "hex" | "bin") {
        return Err(format!("unsupported format: {} (use hex or bin)", opts.format).into());
    }

    let personalization = parse_input(opts.personalization)?;
    let additional = parse_input(opts.additional)?;
    let config = DrbgConfig {
        reseed_interval: opts
            .reseed_interval
            .unwrap_or(DrbgConfig::default().reseed_interval),
        ..Default::default()
    };

    let source = entropy_source(opts)?;
    let mut drbg =
        HashDrbg::instantiate_with_config(config, source, opts.strength, &personalization)?;
    let (bits, stats) = generate_bits(&mut drbg, opts.bits, &additional)?;
    Ok((bits, stats, drbg.security_strength()))
}

fn entropy_source(opts: &GenOptions) -> Result<Box<dyn EntropySource>, Box<dyn std::error::Error>> {
    match (opts.entropy_hex, opts.conditioned) {
        (Some(_), true) => Err("--entropy-hex and --conditioned are mutually exclusive".into()),
        (Some(hex), false) => Ok(Box::new(FixedEntropy::from_hex(hex)?)),
        (None, true) => {
            let mut es = ConditionedEntropy::new(EntropyConfig::default());
            es.startup_test()?;
            Ok(Box::new(es))
        }
        (None, false) => Ok(Box::new(SystemEntropy)),
    }
}

/// Text is taken as its UTF-8 bytes; a `0b` prefix selects binary digits.
fn parse_input(value: Option<&str>) -> Result<BitString, CryptoError> {
    match value {
        None => Ok(BitString::new()),
        Some(s) => match s.strip_prefix("0b") {
            Some(digits) => BitString::from_binary_str(digits),
            None => Ok(BitString::from_bytes(s.as_bytes())),
        },
    }
}

/// Call `generate` until `bits` bits are collected, reseeding whenever the
/// DRBG asks for it.
fn generate_bits(
    drbg: &mut HashDrbg,
    bits: usize,
    additional: &BitString,
) -> Result<(BitString, GenStats), CryptoError> {
    let max = drbg.config().max_bits_per_request;
    let mut out = BitString::with_capacity(bits);
    let mut stats = GenStats::default();

    while out.len() < bits {
        let chunk = (bits - out.len()).min(max);
        match drbg.generate(chunk, additional) {
            Ok(block) => {
                out.append(&block);
                stats.generate_calls += 1;
            }
            Err(e) if e.is_recoverable() => {
                drbg.reseed(&BitString::new())?;
                stats.reseeds += 1;
            }
            Err(e) => return Err(e),
        }
    }

    out.truncate(bits);
    Ok((out, stats))
}

fn render(bits: &BitString, format: &str) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        "hex" => {
            let mut hex = bits.to_hex();
            hex.truncate(bits.len().div_ceil(4));
            Ok(hex)
        }
        "bin" => Ok(bits.to_string()),
        _ => Err(format!("unsupported format: {format} (use hex or bin)").into()),
    }
}
