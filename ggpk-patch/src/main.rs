//! Main entry point for the ggpk-patch CLI

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;
use std::process::ExitCode;

use ggpk_patch::cli::{Cli, Commands};
use ggpk_patch::commands;

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments; usage errors exit with 1, help and version with 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    // Set verbosity
    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Extract {
            target,
            internal_path,
            out_file,
        } => commands::extract::extract_file(&target, &internal_path, &out_file),
        Commands::Replace {
            target,
            internal_path,
            in_file,
        } => commands::replace::replace_one(&target, &internal_path, &in_file),
        Commands::ReplaceZip { target, zip_file } => {
            commands::replace::replace_zip(&target, &zip_file)
        }
        Commands::ReplaceZencZip { target, zenc_file } => {
            commands::replace::replace_zenc_zip(&target, &zenc_file)
        }
        Commands::ExtractDir {
            target,
            internal_dir,
            out_dir,
            threads,
        } => commands::extract::extract_dir(&target, &internal_dir, &out_dir, threads),
        Commands::PackZenc {
            zip_file,
            out_file,
            iterations,
        } => commands::pack::pack_zenc(&zip_file, &out_file, iterations),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
