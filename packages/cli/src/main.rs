mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, outline, tag, watch, InitArgs, OutlineArgs, TagArgs, WatchArgs};

/// Reshaper CLI - inspect and watch files for the visual editor
#[derive(Parser, Debug)]
#[command(name = "reshaper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a reshaper.config.json
    Init(InitArgs),

    /// Print the node tree the editor builds for a file
    Outline(OutlineArgs),

    /// Print a file with every element tagged for the preview
    Tag(TagArgs),

    /// Reload source files as they change
    Watch(WatchArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Outline(args) => outline(args, &cwd),
        Command::Tag(args) => tag(args, &cwd),
        Command::Watch(args) => watch(args, &cwd),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
