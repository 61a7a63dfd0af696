/// huffpack – command-line front end for the huffpack library.
///
///   huffpack compress notes.txt              → writes `compressed`
///   huffpack compress notes.txt -o notes.hp  → writes `notes.hp`
///   huffpack decompress notes.hp             → writes `decompressed`
///   huffpack info notes.hp                   → prints header summary
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};

use huffpack::container::Mode;
use huffpack::file;
use huffpack::pipeline::CompressOptions;
use huffpack::HuffResult;

#[derive(Parser, Debug)]
#[command(
    name = "huffpack",
    version,
    about = "Byte-oriented Huffman compression",
    after_help = "Existing output files are kept unless -f/--force is given."
)]
struct Cli {
    /// Overwrite an existing output file (refused by default)
    #[arg(short, long, global = true)]
    force: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a file into a huffpack container
    Compress {
        input: PathBuf,
        #[arg(short, long, default_value = "compressed")]
        output: PathBuf,
        /// Store inputs of at most this many bytes verbatim
        #[arg(long, default_value_t = huffpack::container::PASSTHROUGH_THRESHOLD)]
        threshold: usize,
    },
    /// Restore the original bytes from a container
    Decompress {
        input: PathBuf,
        #[arg(short, long, default_value = "decompressed")]
        output: PathBuf,
    },
    /// Describe a container without decoding its payload
    Info { input: PathBuf },
}

/// Writes log records to stderr as `huffpack: <message>`.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            log::Level::Error | log::Level::Info => eprintln!("huffpack: {}", record.args()),
            level => eprintln!(
                "huffpack: {}: {}",
                level.as_str().to_ascii_lowercase(),
                record.args()
            ),
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    // Only fails if a logger is already installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn check_output(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists; use -f to overwrite",
            path.display()
        ));
    }
    Ok(())
}

fn with_path<T>(path: &Path, result: HuffResult<T>) -> Result<T, String> {
    result.map_err(|e| format!("{}: {e}", path.display()))
}

fn process_compress(
    cli: &Cli,
    input: &Path,
    output: &Path,
    threshold: usize,
) -> Result<(), String> {
    check_output(output, cli.force)?;
    let options = CompressOptions {
        passthrough_threshold: threshold,
    };
    let report = with_path(input, file::compress_file(input, output, &options))?;

    if !cli.quiet {
        println!("original size:   {} bytes", report.input_len);
        println!("compressed size: {} bytes", report.output_len);
        println!("space saving:    {:.2}%", report.space_saving());
    }
    Ok(())
}

fn process_decompress(cli: &Cli, input: &Path, output: &Path) -> Result<(), String> {
    check_output(output, cli.force)?;
    let report = with_path(input, file::decompress_file(input, output))?;

    if let Some(t) = report.truncation {
        log::warn!(
            "{}: wrote {} of {} bytes to {}",
            input.display(),
            t.decoded,
            t.expected,
            output.display()
        );
    } else {
        log::debug!(
            "{}: {} -> {} bytes",
            input.display(),
            report.input_len,
            report.output_len
        );
    }
    Ok(())
}

fn process_info(cli: &Cli, input: &Path) -> Result<(), String> {
    let info = with_path(input, file::inspect_file(input))?;

    println!("mode:            {}", info.mode);
    println!("original size:   {} bytes", info.original_len);
    println!("compressed size: {} bytes", info.compressed_len());
    if info.mode == Mode::Huffman {
        println!("unique symbols:  {}", info.unique_symbols);
    }
    println!("space saving:    {:.2}%", info.space_saving());

    if cli.verbose > 0 {
        println!("header:          {} bytes", info.header_len);
        println!("payload:         {} bytes", info.payload_len);
        if let Some(h) = info.entropy {
            let bound = (h * info.original_len as f64 / 8.0).ceil();
            println!("entropy:         {h:.4} bits/byte (payload >= {bound} bytes)");
        }
    }
    Ok(())
}

fn execute(cli: &Cli) -> Result<(), String> {
    match &cli.command {
        Command::Compress {
            input,
            output,
            threshold,
        } => process_compress(cli, input, output, *threshold),
        Command::Decompress { input, output } => process_decompress(cli, input, output),
        Command::Info { input } => process_info(cli, input),
    }
}

fn run() -> Result<(), ()> {
    let cli = Cli::parse();
    init_logging(&cli);
    execute(&cli).map_err(|e| eprintln!("huffpack: {e}"))
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
