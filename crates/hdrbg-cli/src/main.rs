use clap::{Parser, Subcommand};

mod dgst;
mod gen;
mod selftest_cmd;

/// Hash_DRBG command-line tool.
#[derive(Parser)]
#[command(name = "hdrbg")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate pseudorandom bits.
    Gen {
        /// Number of bits to output.
        #[arg(short, long)]
        bits: usize,
        /// Output format (hex, bin).
        #[arg(short, long, default_value = "hex")]
        format: String,
        /// Requested security strength in bits (rounded up to 112/128/192/256).
        #[arg(short, long, default_value_t = 256)]
        strength: u32,
        /// Personalization string (text, or 0b-prefixed binary).
        #[arg(short, long)]
        personalization: Option<String>,
        /// Additional input for every generate call (text, or 0b-prefixed binary).
        #[arg(short, long)]
        additional: Option<String>,
        /// Use these hex bytes as entropy instead of the system source.
        #[arg(long, conflicts_with = "conditioned")]
        entropy_hex: Option<String>,
        /// Draw entropy through the health-tested conditioning pipeline.
        #[arg(long)]
        conditioned: bool,
        /// Generate calls allowed between reseeds.
        #[arg(long)]
        reseed_interval: Option<u64>,
        /// Report strength, generate calls and reseeds on stderr.
        #[arg(short, long)]
        verbose: bool,
    },
    /// SHA-256 digest of a file.
    Dgst {
        /// Input file (use - for stdin).
        file: String,
    },
    /// Run the power-on self tests.
    Selftest,
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Gen {
            bits,
            format,
            strength,
            personalization,
            additional,
            entropy_hex,
            conditioned,
            reseed_interval,
            verbose,
        } => gen::run(&gen::GenOptions {
            bits: *bits,
            format,
            strength: *strength,
            personalization: personalization.as_deref(),
            additional: additional.as_deref(),
            entropy_hex: entropy_hex.as_deref(),
            conditioned: *conditioned,
            reseed_interval: *reseed_interval,
            verbose: *verbose,
        }),
        Commands::Dgst { file } => dgst::run(file),
        Commands::Selftest => selftest_cmd::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
