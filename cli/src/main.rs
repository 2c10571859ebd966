mod build;
mod config;
mod error;
mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use mdblocks::ParseError;
use tracing::info;

use crate::build::BuildOptions;
use crate::config::BuildSettings;
use crate::error::CliError;

#[derive(Parser)]
#[command(
    name = "docs",
    version,
    about = "Build documentation sites with the shared theme and block extensions"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the project configuration merged with the shared base config
    Config(ConfigArgs),

    /// Render every page of the site
    Build(BuildArgs),

    /// Render a single markdown page to stdout
    Render(RenderArgs),
}

#[derive(clap::Args)]
struct ConfigFileArg {
    /// Provide a specific config file instead of mkdocs.yml / mkdocs.yaml
    #[arg(short = 'f', long, value_name = "FILE")]
    config_file: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ConfigArgs {
    #[command(flatten)]
    config: ConfigFileArg,

    /// Write the merged config here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct BuildArgs {
    #[command(flatten)]
    config: ConfigFileArg,

    /// Abort the build on configuration warnings and block errors
    #[arg(short, long, overrides_with = "no_strict")]
    strict: bool,

    /// Ignore `strict: true` from the config
    #[arg(long, overrides_with = "strict")]
    no_strict: bool,

    /// Directory to write the site to, overriding `site_dir`
    #[arg(short = 'd', long, value_name = "DIR")]
    site_dir: Option<PathBuf>,

    /// Remove the site directory before building
    #[arg(short, long)]
    clean: bool,
}

impl BuildArgs {
    fn strict_override(&self) -> Option<bool> {
        match (self.strict, self.no_strict) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Markdown page to render
    file: PathBuf,

    /// Parse only, report diagnostics (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the element tree instead of HTML
    #[arg(long)]
    tree: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.no_color);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let result = match cli.command {
        Command::Config(args) => do_config(args),
        Command::Build(args) => do_build(args, color_choice),
        Command::Render(args) => do_render(args, color_choice),
    };

    if let Err(err) = result {
        eprintln!("error: {}", err);
        process::exit(err.exit_code());
    }
}

/// Discover, load, and merge the project config with the base config.
fn merged_config(args: &ConfigFileArg) -> Result<(PathBuf, serde_yaml::Mapping), CliError> {
    let cwd = std::env::current_dir().map_err(|e| CliError::io(".", e))?;
    let path = config::discover(args.config_file.as_deref(), &cwd)?;
    info!(config = %path.display(), "loading configuration");

    let mut project = config::load(&path)?;
    config::merge(&mut project, &config::base()?)?;
    Ok((path, project))
}

fn do_config(args: ConfigArgs) -> Result<(), CliError> {
    let (_, merged) = merged_config(&args.config)?;
    let yaml = config::to_yaml(&merged)?;
    match args.output {
        Some(path) => std::fs::write(&path, yaml).map_err(|e| CliError::io(path, e)),
        None => {
            print!("{}", yaml);
            Ok(())
        }
    }
}

fn do_build(args: BuildArgs, color_choice: ColorChoice) -> Result<(), CliError> {
    let (path, merged) = merged_config(&args.config)?;
    let root = path.parent().unwrap_or(Path::new("."));
    let settings = BuildSettings::from_config(&merged, root)?;
    let strict = args.strict_override().unwrap_or(settings.strict);

    config::check(&merged, strict)?;

    let registry = extensions::registry();
    let options = BuildOptions {
        docs_dir: settings.docs_dir,
        site_dir: args.site_dir.unwrap_or(settings.site_dir),
        clean: args.clean,
    };
    let output = build::build(&options, &registry)?;

    emit_diagnostics(color_choice, &output.files, &output.diagnostics);

    if output.failed_pages > 0 {
        return Err(CliError::Render {
            failed: output.failed_pages,
        });
    }
    if strict && !output.diagnostics.is_empty() {
        return Err(CliError::Render {
            failed: pages_with_diagnostics(&output.diagnostics),
        });
    }

    eprintln!(
        "ok: {} page(s) written to {}",
        output.pages,
        options.site_dir.display()
    );
    Ok(())
}

fn pages_with_diagnostics(diagnostics: &[ParseError]) -> usize {
    let mut ids: Vec<usize> = diagnostics.iter().map(|d| d.file_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.len()
}

fn do_render(args: RenderArgs, color_choice: ColorChoice) -> Result<(), CliError> {
    let source = std::fs::read_to_string(&args.file).map_err(|e| CliError::io(&args.file, e))?;

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.display().to_string(), source.clone());

    let registry = extensions::registry();
    let parsed = mdblocks::Parser::new(source, file_id, &registry).parse();
    emit_diagnostics(color_choice, &files, &parsed.diagnostics);

    if parsed.has_errors() {
        return Err(CliError::Render { failed: 1 });
    }

    if args.check {
        eprintln!("ok: {} parsed successfully", args.file.display());
    } else if args.tree {
        println!("{:#?}", parsed.document);
    } else {
        print!("{}", parsed.document);
    }
    Ok(())
}

fn emit_diagnostics(
    color_choice: ColorChoice,
    files: &SimpleFiles<String, String>,
    diagnostics: &[ParseError],
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for error in diagnostics {
        let diagnostic = error.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}
