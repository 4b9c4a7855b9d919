//! markedit - drive the annotated markdown editor from the command line.
//!
//! # Usage
//!
//! ```bash
//! markedit normalize NOTES.md
//! markedit inspect NOTES.md
//! markedit replay session.txt
//! markedit --task-box-color '#FF8800' --save
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use markedit::annotation::Annotation;
use markedit::config::{
    ConfigFlags, Rgb, TaskPalette, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use markedit::editor::Editor;
use markedit::perf;

/// Annotated markdown editing from the command line
#[derive(Parser, Debug)]
#[command(name = "markedit", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Task check box color (#RRGGBB)
    #[arg(long, global = true, value_name = "COLOR")]
    task_box_color: Option<Rgb>,

    /// Task check box outline color (#RRGGBB)
    #[arg(long, global = true, value_name = "COLOR")]
    task_outline_color: Option<Rgb>,

    /// Task check box background color (#RRGGBB)
    #[arg(long, global = true, value_name = "COLOR")]
    task_background_color: Option<Rgb>,

    /// Enable timing logs
    #[arg(long, global = true)]
    perf: bool,

    /// Write editor debug events to a file
    #[arg(long, global = true, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a markdown file into the editor and print it back out
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the rendered buffer and its annotations as JSON
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run an input script through an empty editor and print the markdown
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },
}

#[derive(Serialize)]
struct Inspection<'a> {
    text: String,
    annotations: Vec<&'a Annotation>,
    palette: TaskPalette,
    markdown: String,
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_editor(path: &Path, palette: TaskPalette) -> Result<Editor> {
    let markdown = read_input(path)?;
    let mut editor = Editor::with_palette(palette);
    editor
        .render_markdown(&markdown)
        .with_context(|| format!("Failed to render {}", path.display()))?;
    Ok(editor)
}

fn run(command: Command, palette: TaskPalette) -> Result<()> {
    match command {
        Command::Normalize { file } => {
            let editor = load_editor(&file, palette)?;
            println!("{}", editor.to_markdown());
        }
        Command::Inspect { file } => {
            let editor = load_editor(&file, palette)?;
            let inspection = Inspection {
                text: editor.text(),
                annotations: editor.store().iter().collect(),
                palette: *editor.palette(),
                markdown: editor.to_markdown(),
            };
            let json =
                serde_json::to_string_pretty(&inspection).context("Failed to encode JSON")?;
            println!("{json}");
        }
        Command::Replay { script } => {
            let source = read_input(&script)?;
            let mut editor = Editor::with_palette(palette);
            editor
                .run_script(&source)
                .with_context(|| format!("Failed to replay {}", script.display()))?;
            println!("{}", editor.to_markdown());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = ConfigFlags {
        task_box_color: cli.task_box_color,
        task_outline_color: cli.task_outline_color,
        task_background_color: cli.task_background_color,
        perf: cli.perf,
        debug_log: cli.debug_log.clone(),
    };

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("MARKEDIT_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        tracing::warn!(
            path = %debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to initialize debug log"
        );
    }

    match cli.command {
        Some(command) => run(command, effective.palette()),
        None if cli.save || cli.clear => Ok(()),
        None => anyhow::bail!("No command given (try --help)"),
    }
}
