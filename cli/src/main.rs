//! xlpatch CLI - bulk-upload spreadsheet row patching
//!
//! A command-line tool for patching the CODE/DECODE/FUNCTION fields of
//! bulk-upload workbooks and inspecting their records.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use xlpatch::render::JsonFormat;
use xlpatch::{BlankRowPolicy, Patch, RowPatcher, UploadOptions, UploadType};

/// Patch bulk-upload spreadsheets
#[derive(Parser)]
#[command(
    name = "xlpatch",
    author = "iyulab",
    version,
    about = "Patch the first data row of bulk-upload spreadsheets",
    long_about = "xlpatch - bulk-upload spreadsheet row patching.\n\n\
                  Rewrites the CODE, DECODE and FUNCTION fields of the first data row \
                  of an XLSX workbook and re-encodes it."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch the first data row of a workbook
    Patch {
        /// Input file path
        input: PathBuf,

        /// New CODE value
        #[arg(long)]
        code: String,

        /// New DECODE value
        #[arg(long)]
        decode: String,

        /// Operation written to FUNCTION (add, update, delete, "new category")
        #[arg(long, value_parser = parse_upload_type)]
        function: UploadType,

        /// Output file path (default: the configured temp path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep blank rows so the first physical data row is patched
        #[arg(long)]
        keep_blank_rows: bool,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Dump a workbook's header and records as JSON or a text table
    Records {
        /// Input file path
        input: PathBuf,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Output an aligned text table instead of JSON
        #[arg(long, conflicts_with = "compact")]
        table: bool,
    },

    /// Show workbook information
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Generate a random code value
    Random {
        /// Number of characters
        #[arg(short, long, default_value = "5")]
        length: usize,
    },

    /// Show version information
    Version,
}

fn parse_upload_type(s: &str) -> Result<UploadType, String> {
    s.parse().map_err(|e: xlpatch::Error| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Patch {
            input,
            code,
            decode,
            function,
            output,
            keep_blank_rows,
            config,
        } => {
            let mut options = match config {
                Some(path) => UploadOptions::from_json_file(path)?,
                None => UploadOptions::default(),
            };
            if keep_blank_rows {
                options.patch.blank_rows = BlankRowPolicy::Positional;
            }
            debug!(?options, "resolved options");

            let pb = create_spinner("Patching workbook...");

            let data = fs::read(&input)?;
            let patch = Patch::new(code, decode, function);
            let bytes = RowPatcher::new(options.patch).patch_bytes(&data, &patch)?;

            let output = output.unwrap_or(options.temp_path);
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, bytes)?;

            pb.finish_and_clear();
            println!(
                "{} Patched {} as {}: {}",
                "✓".green().bold(),
                display_name(&input),
                patch.function,
                output.display()
            );
        }

        Commands::Records {
            input,
            compact,
            table,
        } => {
            let pb = create_spinner("Reading workbook...");

            let data = fs::read(&input)?;
            let set = xlpatch::read_records_from_bytes(&data)?;

            let rendered = if table {
                pb.set_message("Rendering table...");
                xlpatch::render::to_text_table(&set)
            } else {
                pb.set_message("Rendering to JSON...");
                let format = if compact {
                    JsonFormat::Compact
                } else {
                    JsonFormat::Pretty
                };
                xlpatch::render::to_json(&set, format)?
            };

            pb.finish_and_clear();
            write_stdout(rendered.trim_end())?;
        }

        Commands::Info { input } => {
            let pb = create_spinner("Analyzing workbook...");

            let data = fs::read(&input)?;
            let format = xlpatch::detect_format_from_bytes(&data)?;
            let sheets = xlpatch::xlsx::XlsxReader::from_bytes(data.clone())?.sheet_count();
            let set = xlpatch::read_records_from_bytes(&data)?;

            pb.finish_and_clear();

            println!("{}", "Workbook Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "File".bold(), display_name(&input));
            println!("{}: {}", "Format".bold(), format);
            println!("{}: {}", "Sheets".bold(), sheets);
            println!("{}: {}", "Sheet".bold(), set.name);
            println!(
                "{}: {}",
                "Columns".bold(),
                set.header.names().collect::<Vec<_>>().join(", ")
            );
            println!("{}: {}", "Records".bold(), set.records.len());

            if let Some(first) = set.records.first() {
                println!("\n{}", "First Record".cyan().bold());
                println!("{}", "─".repeat(40));
                println!("{}: {}", "Row".bold(), first.source_row);
                for name in xlpatch::patch::REQUIRED_COLUMNS {
                    println!("{}: {}", name.bold(), first.get(name));
                }
            }
        }

        Commands::Random { length } => {
            println!("{}", xlpatch::generate_random_value(length));
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "xlpatch".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Bulk-upload spreadsheet row patching");
    println!();
    println!("Supported formats: XLSX");
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_stdout(content: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_patch_args() {
        let cli = Cli::try_parse_from([
            "xlpatch",
            "patch",
            "codes.xlsx",
            "--code",
            "X9Z12",
            "--decode",
            "Q7R33",
            "--function",
            "new category",
            "--keep-blank-rows",
        ])
        .unwrap();

        match cli.command {
            Commands::Patch {
                function,
                keep_blank_rows,
                output,
                ..
            } => {
                assert_eq!(function, UploadType::NewCategory);
                assert!(keep_blank_rows);
                assert!(output.is_none());
            }
            _ => panic!("expected patch command"),
        }
    }

    #[test]
    fn test_records_table_args() {
        let cli = Cli::try_parse_from(["xlpatch", "records", "codes.xlsx", "--table"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Records {
                table: true,
                compact: false,
                ..
            }
        ));

        let result =
            Cli::try_parse_from(["xlpatch", "records", "codes.xlsx", "--table", "--compact"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_function_rejected() {
        let result = Cli::try_parse_from([
            "xlpatch", "patch", "codes.xlsx", "--code", "A", "--decode", "B", "--function", "archive",
        ]);
        assert!(result.is_err());
    }
}
