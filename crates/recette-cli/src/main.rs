//! `recette` - render, inspect and convert sprint report records.

mod table;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use recette::{default_record, extract, load_record, EngineConfig, Record, ReportEngine};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "recette", version, about = "Sprint acceptance report engine")]
struct Cli {
    /// Log pipeline steps (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine configuration file (YAML).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a record into an HTML report.
    Render {
        /// Record JSON file, `-` for stdin.
        #[arg(short, long, value_name = "FILE")]
        record: PathBuf,

        #[command(flatten)]
        template: TemplateArgs,

        /// Write the report here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not wrap fields in their links.
        #[arg(long)]
        no_links: bool,
    },
    /// Read scalar values back out of a rendered report.
    Extract {
        /// Rendered HTML file, `-` for stdin.
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
    /// List the fields a template exposes.
    Catalog {
        #[command(flatten)]
        template: TemplateArgs,
    },
    /// Upgrade a persisted record to the current shape.
    Migrate {
        /// Record JSON file, `-` for stdin.
        #[arg(short, long, value_name = "FILE")]
        record: PathBuf,
    },
    /// Print the empty record.
    Defaults,
}

#[derive(Debug, Args)]
struct TemplateArgs {
    /// Template name (default: the configured one).
    #[arg(short, long, value_name = "NAME")]
    template: Option<String>,

    /// Additional template directory, searched before configured ones.
    #[arg(long = "template-dir", value_name = "DIR")]
    template_dirs: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "recette=debug" } else { "recette=info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("invalid configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn build_engine(mut config: EngineConfig, args: TemplateArgs) -> Result<ReportEngine> {
    if let Some(name) = args.template {
        config.template = name;
    }
    let mut dirs = args.template_dirs;
    dirs.append(&mut config.template_dirs);
    config.template_dirs = dirs;
    debug!(?config, "engine configuration");
    ReportEngine::from_config(&config).context("failed to set up the template store")
}

fn print_json(record: &Record) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Render {
            record,
            template,
            output,
            no_links,
        } => {
            let raw = read_input(&record)?;
            let mut config = config;
            if no_links {
                config.annotate_links = false;
            }
            let mut engine = build_engine(config, template)?;
            let html = engine.render(&load_record(&raw))?;
            match output {
                Some(path) => fs::write(&path, html)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{}", html),
            }
        }
        Command::Extract { input } => print_json(&extract(&read_input(&input)?))?,
        Command::Catalog { template } => {
            let mut engine = build_engine(config, template)?;
            print!("{}", table::render_catalog(&engine.catalog()?));
        }
        Command::Migrate { record } => print_json(&load_record(&read_input(&record)?))?,
        Command::Defaults => print_json(&default_record())?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render() {
        let cli = Cli::try_parse_from([
            "recette",
            "render",
            "--record",
            "r.json",
            "--template-dir",
            "a",
            "--template-dir",
            "b",
            "--no-links",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                record,
                template,
                no_links,
                ..
            } => {
                assert_eq!(record, PathBuf::from("r.json"));
                assert_eq!(template.template_dirs.len(), 2);
                assert!(no_links);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn missing_configured_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            template_dirs: vec![dir.path().join("missing")],
            ..EngineConfig::default()
        };
        let args = TemplateArgs {
            template: Some("x".into()),
            template_dirs: vec![dir.path().to_path_buf()],
        };
        let err = build_engine(config, args).unwrap_err();
        assert!(format!("{err:#}").contains("missing"));
    }

    #[test]
    fn render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(templates.join("mini.html"), r#"<b data-field="sprint">0</b>"#).unwrap();
        let record = dir.path().join("record.json");
        fs::write(&record, r#"{"sprint": "9"}"#).unwrap();
        let output = dir.path().join("out.html");

        let args: [&OsStr; 10] = [
            OsStr::new("recette"),
            OsStr::new("render"),
            OsStr::new("--record"),
            record.as_os_str(),
            OsStr::new("--template"),
            OsStr::new("mini"),
            OsStr::new("--template-dir"),
            templates.as_os_str(),
            OsStr::new("--output"),
            output.as_os_str(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        run(cli).unwrap();

        assert_eq!(
            fs::read_to_string(output).unwrap(),
            r#"<b data-field="sprint">9</b>"#
        );
    }
}
