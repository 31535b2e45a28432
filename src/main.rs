use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use keyhop::cli::{
    embed_file, extract_from_file, show_derived, show_info, DeriveOptions, EmbedOptions,
    ExtractOptions, SchemeFlags,
};
use keyhop::scheme::{CodecKind, Framing, HashAlgorithm, StepFold, StrategyKind};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("KEYHOP_VERSION");
const BUILD: &str = env!("KEYHOP_BUILD");
const PROFILE: &str = env!("KEYHOP_PROFILE");
const GIT_HASH: &str = env!("KEYHOP_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "keyhop")]
#[command(author, about = "Password-keyed LSB covert channel for images and WAV audio", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SchemeArgs {
    /// TOML scheme file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Traversal strategy (fixed-step, permutation, chained-hop)
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<StrategyKind>,

    /// Password hash (sha256, md5, sha3, blake3)
    #[arg(long, value_parser = parse_hash)]
    hash: Option<HashAlgorithm>,

    /// Step fold for fixed-step (xor, crc8, crc16, crc32)
    #[arg(long, value_parser = parse_fold)]
    fold: Option<StepFold>,

    /// Bit codec; red-lsb hides one bit per unit (otherwise the media type decides)
    #[arg(long, value_parser = parse_codec)]
    codec: Option<CodecKind>,

    /// Embed the bare payload without markers; extraction then needs --length
    #[arg(long)]
    unframed: bool,

    /// Most bytes read while searching for the markers
    #[arg(long)]
    safety_bound: Option<usize>,
}

impl From<SchemeArgs> for SchemeFlags {
    fn from(args: SchemeArgs) -> Self {
        SchemeFlags {
            config: args.config,
            strategy: args.strategy,
            hash: args.hash,
            fold: args.fold,
            codec: args.codec,
            framing: args.unframed.then_some(Framing::Raw),
            safety_bound: args.safety_bound,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a payload in an image or WAV file
    #[command(alias = "e")]
    Embed {
        /// Password keying the unit sequence
        #[arg(long, required = true)]
        password: String,

        /// Carrier file to read
        input: PathBuf,

        /// Where to write the modified carrier
        output: PathBuf,

        /// Text to hide
        payload: String,

        /// Trailing metadata field
        #[arg(long, conflicts_with = "timestamp")]
        metadata: Option<String>,

        /// Use the current local time as metadata
        #[arg(long)]
        timestamp: bool,

        #[command(flatten)]
        scheme: SchemeArgs,
    },

    /// Recover a hidden payload
    #[command(alias = "x")]
    Extract {
        /// Password used when embedding
        #[arg(long, required = true)]
        password: String,

        /// Carrier file to read
        input: PathBuf,

        /// Read exactly this many payload bytes, skipping the end-marker search
        #[arg(long)]
        length: Option<usize>,

        #[command(flatten)]
        scheme: SchemeArgs,
    },

    /// Show the parameters a password derives
    #[command(alias = "d")]
    Derive {
        #[arg(long, required = true)]
        password: String,

        #[arg(long, default_value = "sha256", value_parser = parse_hash)]
        hash: HashAlgorithm,

        #[arg(long, default_value = "xor", value_parser = parse_fold)]
        fold: StepFold,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show carrier capacity
    #[command(alias = "i")]
    Info {
        /// Carrier file to inspect
        file: PathBuf,
    },
}

fn parse_hash(s: &str) -> Result<HashAlgorithm, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_strategy(s: &str) -> Result<StrategyKind, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_codec(s: &str) -> Result<CodecKind, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_fold(s: &str) -> Result<StepFold, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if cli.version {
        println!("keyhop {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Embed {
            password,
            input,
            output,
            payload,
            metadata,
            timestamp,
            scheme,
        } => SchemeFlags::from(scheme).into_scheme().and_then(|scheme| {
            let options = EmbedOptions {
                password,
                scheme,
                metadata,
                timestamp,
            };
            let report = embed_file(&input, &output, &payload, &options)?;
            println!(
                "Embedded {}-byte frame into {} ({} units touched)",
                report.frame_len,
                output.display(),
                report.addresses.len()
            );
            Ok(())
        }),

        Commands::Extract {
            password,
            input,
            length,
            scheme,
        } => SchemeFlags::from(scheme).into_scheme().and_then(|scheme| {
            let options = ExtractOptions {
                password,
                scheme,
                length,
            };
            let found = extract_from_file(&input, &options)?;
            println!("{}", found.payload);
            if let Some(metadata) = found.metadata {
                println!("Metadata: {}", metadata);
            }
            Ok(())
        }),

        Commands::Derive {
            password,
            hash,
            fold,
            json,
        } => {
            let options = DeriveOptions {
                password,
                hash,
                fold,
            };
            show_derived(&options, json).map(|out| print!("{}", out))
        }

        Commands::Info { file } => show_info(&file).map(|info| print!("{}", info)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
