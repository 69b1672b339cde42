use clap::{Parser, Subcommand};

use lat_cli::commands::{config_ops, ctm_ops, score_ops, wer_ops};
use lat_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "lattool", about = "Lattice scoring and transcript tools")]
struct Cli {
    /// Custom settings TOML (replaces the embedded defaults)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run forward-backward, link posteriors and rescoring on an HTK lattice
    Score {
        /// HTK lattice file
        lattice: String,
        /// log, probability or tropical (default: [scoring] semiring)
        #[arg(long)]
        semiring: Option<String>,
        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the forward topological node order
    Order {
        /// HTK lattice file
        lattice: String,
    },
    /// Write a CTM transcript for a path of links
    Ctm {
        /// HTK lattice file
        lattice: String,
        /// Comma-separated link indices, e.g. 0,3,5
        #[arg(long)]
        links: String,
        /// Output CTM file
        #[arg(short, long)]
        output: String,
        /// Append rescored link confidences
        #[arg(long)]
        confidence: bool,
        /// Semiring used for --confidence
        #[arg(long)]
        semiring: Option<String>,
    },
    /// Compute WER of a CTM hypothesis against an STM reference with sclite
    Wer {
        /// Hypothesis CTM file
        #[arg(long)]
        hyp: String,
        /// Reference STM file
        #[arg(long)]
        reference: String,
        /// Directory for sclite reports
        #[arg(long)]
        out_dir: String,
        /// Path to the sclite executable
        #[arg(long, default_value = "./sclite")]
        sclite: String,
    },
    /// Print the default settings TOML
    Config,
    /// Validate a custom settings TOML file
    ConfigValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    if let Some(file) = &cli.settings {
        config_ops::load_settings(file);
    }

    match cli.command {
        Command::Score {
            lattice,
            semiring,
            json,
        } => score_ops::score_cmd(&lattice, semiring.as_deref(), json),
        Command::Order { lattice } => score_ops::order_cmd(&lattice),
        Command::Ctm {
            lattice,
            links,
            output,
            confidence,
            semiring,
        } => ctm_ops::ctm_cmd(&lattice, &links, &output, confidence, semiring.as_deref()),
        Command::Wer {
            hyp,
            reference,
            out_dir,
            sclite,
        } => wer_ops::wer_cmd(&hyp, &reference, &out_dir, &sclite),
        Command::Config => config_ops::settings_export(),
        Command::ConfigValidate { file } => config_ops::settings_validate(&file),
    }
}
