#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use unlock_office::batch::{read_list_file, run_batch};
use unlock_office::consts;
use unlock_office::inspect::inspect;
use unlock_office::{Context, Options, ProtectionMode, UnlockResult};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mode to run in
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the protection in an Office file without changing it
    Inspect(InspectArgs),

    /// Save an unlocked copy of the file with all protection removed
    Unlock(UnlockArgs),
}

#[derive(Args)]
struct InspectArgs {
    /// Office file to read
    filename: PathBuf,
}

#[derive(Args)]
struct UnlockArgs {
    /// Excel files: unlock the worksheets only, leaving the workbook protection in place
    #[arg(short = 's', long, default_value_t = false, conflicts_with = "workbook")]
    worksheet: bool,

    /// Excel files: unlock the workbook only, leaving the worksheet protection in place
    #[arg(short, long, default_value_t = false)]
    workbook: bool,

    /// Also remove the protection on the VBA project
    #[arg(short = 'm', long, default_value_t = false)]
    vba: bool,

    /// Keep the temp folder the file was unpacked into. Useful for debugging failures
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Treat the filename as a text file listing the files to unlock, one per line
    #[arg(short, long, default_value_t = false)]
    list: bool,

    /// Folder the unlocked copies are saved in
    #[arg(long, default_value = consts::DEFAULT_SAVE_DIR)]
    save_dir: PathBuf,

    /// Folder the files are unpacked into while they are worked on
    #[arg(long, default_value = consts::DEFAULT_TEMP_DIR)]
    temp_dir: PathBuf,

    /// Office file to unlock, or list of files with --list
    filename: PathBuf,
}

fn main() -> UnlockResult<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("unlock_office", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    match cli.command {
        Commands::Inspect(args) => {
            let report = inspect(&args.filename)?;
            println!("{report}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Unlock(args) => {
            let options = Options {
                mode: ProtectionMode::from_flags(args.worksheet, args.workbook)?,
                strip_macro: args.vba,
                keep_scratch: args.debug,
            };
            let ctx = Context::new(args.save_dir, args.temp_dir);
            ctx.ensure_dirs()?;

            let targets = if args.list {
                let targets = read_list_file(&args.filename)?;
                println!("List mode enabled, {} files detected", targets.len());
                targets
            } else {
                vec![args.filename]
            };

            let summary = run_batch(&ctx, &targets, options);
            println!("\nSummary: {summary}");
            Ok(if summary.all_unlocked() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
