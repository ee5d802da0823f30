//! PosterKit command-line entry point.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use posterkit_core::storage::Project;
use posterkit_core::{EditorConfig, ShortcutRegistry, StaticLayout, export_html, import_elements, sanitize_html};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export, import and sanitize HTML posters", long_about = None)]
struct Cli {
    /// Editor configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved project as a standalone HTML page
    Export {
        /// Project file, `{ "elements": [...] }`
        #[arg(value_name = "PROJECT")]
        project: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Convert HTML markup into a project
    Import {
        #[arg(value_name = "HTML_FILE")]
        input: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Print the sanitized form of HTML markup
    Sanitize {
        #[arg(value_name = "HTML_FILE")]
        input: PathBuf,
    },
    /// List editor keyboard shortcuts
    Shortcuts,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Export { project, output } => {
            let json = read(&project)?;
            emit(output.as_deref(), &export_project(&json, &config)?)
        }
        Command::Import { input, output } => {
            let markup = read(&input)?;
            emit(output.as_deref(), &import_markup(&markup, &config)?)
        }
        Command::Sanitize { input } => {
            let markup = read(&input)?;
            emit(None, &sanitize_html(&markup).to_html())
        }
        Command::Shortcuts => emit(None, &ShortcutRegistry::help_text()),
    }
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let json = read(path)?;
    let config = EditorConfig::from_json(&json)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn emit(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}

fn export_project(json: &str, config: &EditorConfig) -> Result<String> {
    let project = Project::from_json(json).context("Malformed project")?;
    let document = project.into_document();
    Ok(export_html(&document, config.canvas_size))
}

fn import_markup(markup: &str, config: &EditorConfig) -> Result<String> {
    let layout = StaticLayout::new(config.canvas_size);
    let elements = import_elements(markup, &layout, config.canvas_size);
    if elements.is_empty() {
        bail!("No importable elements found");
    }
    let project = Project { elements };
    Ok(serde_json::to_string_pretty(&project)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_then_export() {
        let config = EditorConfig::default();
        let markup = r#"<div style="position:absolute;left:20px;top:30px;color:#333">Hello</div>"#;
        let json = import_markup(markup, &config).unwrap();
        let html = export_project(&json, &config).unwrap();
        assert!(html.contains("left: 20px; top: 30px"));
        assert!(html.contains(">Hello</div>"));
    }

    #[test]
    fn test_import_nothing_fails() {
        let config = EditorConfig::default();
        assert!(import_markup("<script>x()</script>", &config).is_err());
    }

    #[test]
    fn test_export_malformed_project_fails() {
        assert!(export_project("{", &EditorConfig::default()).is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "canvas_size": 1080 }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.canvas_size, 1080.0);
        assert_eq!(config.grid_size, 10.0);

        fs::write(&path, r#"{ "min_zoom": -1 }"#).unwrap();
        assert!(load_config(Some(&path)).is_err());
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.html");
        emit(Some(&path), "<p>x</p>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["posterkit", "--config", "c.json", "export", "p.json", "-o", "out.html"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Command::Export { output: Some(_), .. }));
    }
}
