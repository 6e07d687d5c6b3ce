use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use organizer_cli::logging::init_logging;
use organizer_cli::{
    classification_lines, config_lines, report_lines, run_check_config, run_classify,
    run_organize, ClassifyInput, OrganizeInput, DEFAULT_CONFIG,
};

#[derive(Parser)]
#[command(
    name = "vault-organize",
    version,
    about = "Organize a tagged markdown vault into folders derived from its tags"
)]
struct Cli {
    /// Rule configuration file (.yaml, .yml or .toml)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG, global = true)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean stubs, retag, move every document and rebuild the tag indexes
    Organize(OrganizeArgs),
    /// Show where a tag set or a single file would be placed
    Classify(ClassifyArgs),
    /// Load and validate the configuration
    CheckConfig(CheckConfigArgs),
}

#[derive(Parser)]
struct OrganizeArgs {
    /// Vault root (default: vault_root from the config)
    #[arg(long, value_name = "PATH")]
    vault: Option<PathBuf>,

    /// Report what would change without touching the vault
    #[arg(long)]
    dry_run: bool,

    /// Keep redirect and template stubs
    #[arg(long)]
    no_cleanup: bool,

    /// Skip rebuilding the index folder
    #[arg(long)]
    no_indexes: bool,

    /// Output JSON instead of key=value lines
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ClassifyArgs {
    /// Markdown file whose frontmatter tags are classified
    #[arg(value_name = "FILE", conflicts_with = "tags", required_unless_present = "tags")]
    file: Option<PathBuf>,

    /// Raw tags to classify (comma-separated)
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,

    /// Output JSON instead of key=value lines
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct CheckConfigArgs {
    /// Output JSON instead of key=value lines
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Organize(args) => run_organize_command(&cli.config, args),
        Commands::Classify(args) => run_classify_command(&cli.config, args),
        Commands::CheckConfig(args) => run_check_config_command(&cli.config, args),
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|err| format!("json encode: {}", err))?;
    println!("{}", json);
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn run_organize_command(config: &Path, args: OrganizeArgs) -> Result<(), String> {
    let report = run_organize(&OrganizeInput {
        config: config.to_path_buf(),
        vault: args.vault,
        dry_run: args.dry_run,
        no_cleanup: args.no_cleanup,
        no_indexes: args.no_indexes,
    })?;

    if args.json {
        print_json(&report)?;
    } else {
        print_lines(report_lines(&report));
    }

    if !report.failures.is_empty() {
        return Err(format!("{} document(s) failed", report.failures.len()));
    }
    Ok(())
}

fn run_classify_command(config: &Path, args: ClassifyArgs) -> Result<(), String> {
    let input = match (args.file, args.tags) {
        (Some(file), _) => ClassifyInput::File(file),
        (None, Some(tags)) => ClassifyInput::Tags(tags),
        (None, None) => return Err("classify needs a FILE or --tags".to_string()),
    };
    let result = run_classify(config, &input)?;

    if args.json {
        print_json(&result)
    } else {
        print_lines(classification_lines(&result));
        Ok(())
    }
}

fn run_check_config_command(config: &Path, args: CheckConfigArgs) -> Result<(), String> {
    let summary = run_check_config(config)?;

    if args.json {
        print_json(&summary)
    } else {
        print_lines(config_lines(&summary));
        Ok(())
    }
}
