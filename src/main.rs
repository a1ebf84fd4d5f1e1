use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imrad_codegen::config::CodeGenSettings;
use imrad_codegen::draw::{LiteralSizes, draw_at};
use imrad_codegen::export::export_source;
use imrad_codegen::import::import_source;
use imrad_codegen::session::Session;
use std::path::{Path, PathBuf};

/// Regenerates designer widget code in Dear ImGui sources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Code generation settings (JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbosity: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the widget tree found in FILE as JSON
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Import FILE and print the regenerated source
    Regen {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn report(session: &Session) {
    for d in session.diagnostics() {
        eprintln!("{}", d);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
    log::debug!("Command-line args: {:?}", args);

    let settings = match &args.config {
        Some(path) => CodeGenSettings::load(path)?,
        None => CodeGenSettings::default(),
    };
    let mut session = Session::new(settings);

    match &args.command {
        Command::Import { file } => {
            let src = read_source(file)?;
            let outcome = import_source(&src, &mut session)
                .with_context(|| format!("failed to import {}", file.display()))?;
            log::info!("{} widgets imported", outcome.widgets.len());
            println!("{}", serde_json::to_string_pretty(&outcome.widgets)?);
        }
        Command::Regen { file } => {
            let src = read_source(file)?;
            let mut outcome = import_source(&src, &mut session)
                .with_context(|| format!("failed to import {}", file.display()))?;
            if outcome.window_menu_bar {
                log::info!("window needs ImGuiWindowFlags_MenuBar");
            }
            draw_at(
                &mut outcome.widgets,
                egui::Pos2::ZERO,
                egui::vec2(800.0, 600.0),
                &mut LiteralSizes::default(),
            );
            print!("{}", export_source(&outcome.widgets, &mut session));
        }
    }
    report(&session);
    Ok(())
}
