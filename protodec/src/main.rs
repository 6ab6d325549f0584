//! CLI entry point (spec.md §6, SPEC_FULL.md §4.I).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use protodec::error::CliError;
use protodec::java::unescape_java;
use protodec::{parse_message, print, scan, schema};

/// PROTObuf2 DECompiler.
///
/// Decompiles protobuf (version 2) messages with no schema of their own:
/// parse a standalone message and print its tag tree or an inferred
/// schema, or scan an arbitrary blob for embedded file descriptors and
/// regenerate the `.proto` files they describe.
#[derive(Parser, Debug)]
#[command(name = "protodec", version, about, long_about = None)]
struct Cli {
    /// File to decompile. With no path and no mode flag, usage is printed.
    path: Option<PathBuf>,

    /// Scan the file for embedded `FileDescriptorProto` data and write
    /// `.proto` files (the default action when no mode flag is given).
    #[arg(long, conflicts_with_all = ["print", "schema"])]
    grab: bool,

    /// Parse the file as a single message and print its tag/value tree.
    #[arg(long, conflicts_with = "schema")]
    print: bool,

    /// Parse the file as a single message and print an inferred `.proto`
    /// schema.
    #[arg(long, conflicts_with = "print")]
    schema: bool,

    /// Pre-process the input with Java string unescaping before parsing
    /// (`\n \t \r \" \\ \'` and `\uHHHH` for code points `<= 0xFF`).
    #[arg(long)]
    java: bool,

    /// Directory `--grab` writes `.proto` files into (defaults to the
    /// current directory, matching the original tool exactly).
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let Some(path) = cli.path.clone() else {
        print_usage();
        return ExitCode::SUCCESS;
    };

    match run(&cli, &path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, path: &PathBuf) -> Result<(), CliError> {
    let mut data = std::fs::read(path).unwrap_or_default();
    if data.is_empty() {
        return Err(CliError::EmptyOrMissingFile { path: path.clone() });
    }
    debug!(bytes = data.len(), path = %path.display(), "read input file");

    if cli.java {
        data = unescape_java(&data)?;
        debug!(bytes = data.len(), "unescaped --java input");
    }

    data.push(0);
    data.push(0);

    if cli.print || cli.schema {
        let msg = parse_message(&data);
        if cli.print {
            print!("{}", print::print(msg.root()));
        } else {
            print!("{}", schema::print(msg.root()));
        }
        if let Some(error) = msg.error() {
            return Err(CliError::Parse(error.clone()));
        }
        Ok(())
    } else {
        debug!(explicit_grab = cli.grab, "scanning for embedded descriptors");
        let out_dir = cli.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        if !out_dir.exists() {
            std::fs::create_dir_all(&out_dir).map_err(|source| CliError::OutDir {
                path: out_dir.clone(),
                source,
            })?;
        }

        let count = scan::grab(&data, &out_dir, report_outcome);
        info!(files_written = count, "scan complete");
        if count == 0 {
            return Err(CliError::NothingFound);
        }
        Ok(())
    }
}

fn report_outcome(outcome: &scan::GrabOutcome) {
    match outcome {
        scan::GrabOutcome::Written { path } => {
            println!(" [+] {}", path.display());
        }
        scan::GrabOutcome::Rejected { filename, error } => {
            let name = filename.as_deref().unwrap_or("<unknown>");
            println!(" [-] {name} ERROR: {error}");
        }
        scan::GrabOutcome::IoError { path, error } => {
            println!(" [-] {} ERROR: can't create file path: {error}", path.display());
        }
    }
}

fn print_usage() {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    let _ = cmd.print_help();
    println!();
}
