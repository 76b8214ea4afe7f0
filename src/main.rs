use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use json_node_patcher::config::load_or_default;
use json_node_patcher::engine::{EngineError, FormatMode, JsonNodeEditor};
use json_node_patcher::format::{to_pretty_string, FormattingOptions};
use json_node_patcher::locate::{LocateError, ParsedDocument};
use json_node_patcher::path::JsonPath;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "JSON_NODE_PATCHER_LOG";

#[derive(Parser)]
#[command(name = "json-node-patcher")]
#[command(about = "Targeted single-node updates inside JSON documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace (or merge into) the node at a path
    Set {
        /// Document to edit, `-` for stdin
        #[arg(short, long)]
        file: PathBuf,

        /// Path as a JSON array, e.g. '["customer", 0, "name"]'
        #[arg(short, long)]
        path: JsonPath,

        /// Replacement text; written as a string when it is not valid JSON
        #[arg(long, required_unless_present = "value_file", conflicts_with = "value_file")]
        value: Option<String>,

        /// Read the replacement text from a file
        #[arg(long)]
        value_file: Option<PathBuf>,

        /// Editor config (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep the bytes outside the node instead of re-formatting
        #[arg(long)]
        preserve: bool,

        /// Write the result back to the file
        #[arg(short, long)]
        in_place: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Dry run - report what would be written without touching the file
        #[arg(short = 'n', long, requires = "in_place")]
        dry_run: bool,
    },

    /// Show the node at a path
    Get {
        /// Document to read, `-` for stdin
        #[arg(short, long)]
        file: PathBuf,

        /// Path as a JSON array
        #[arg(short, long)]
        path: JsonPath,
    },

    /// Print the display form of a path
    Render {
        /// Path as a JSON array
        #[arg(short, long)]
        path: JsonPath,
    },

    /// Check that a document is well-formed JSON
    Check {
        /// Document to check, `-` for stdin
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Set {
            file,
            path,
            value,
            value_file,
            config,
            preserve,
            in_place,
            diff,
            dry_run,
        } => {
            let raw = match (value, value_file) {
                (Some(value), _) => value,
                (None, Some(value_file)) => read_value_file(&value_file)?,
                (None, None) => anyhow::bail!("one of --value or --value-file is required"),
            };
            cmd_set(SetArgs {
                file,
                path,
                raw,
                config,
                preserve,
                in_place,
                show_diff: diff,
                dry_run,
            })
        }

        Commands::Get { file, path } => cmd_get(&file, &path),

        Commands::Render { path } => {
            println!("{}", path.render());
            Ok(())
        }

        Commands::Check { file } => cmd_check(&file),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

struct SetArgs {
    file: PathBuf,
    path: JsonPath,
    raw: String,
    config: Option<PathBuf>,
    preserve: bool,
    in_place: bool,
    show_diff: bool,
    dry_run: bool,
}

fn cmd_set(args: SetArgs) -> Result<()> {
    if args.in_place && is_stdin(&args.file) {
        anyhow::bail!("--in-place cannot be used when reading from stdin");
    }

    let mut options = load_or_default(args.config.as_deref())?.to_options();
    if args.preserve {
        options.mode = FormatMode::Preserve;
    }

    let document = read_document(&args.file)?;
    let editor = JsonNodeEditor::new(options);
    let update = match editor.update(&document, &args.path, &args.raw) {
        Ok(update) => update,
        Err(err) => {
            report_engine_error(&args.file, &err);
            std::process::exit(1);
        }
    };
    debug!(
        merged = update.merged,
        value_changed = update.value_changed,
        "update computed"
    );

    if args.show_diff {
        display_diff(&args.file, &document, &update.document);
    }

    if !args.in_place {
        if !args.show_diff {
            print_document(&update.document)?;
        }
        return Ok(());
    }

    if update.document == document {
        println!(
            "{} {}: Already up to date in {}",
            "⊙".yellow(),
            args.path,
            args.file.display()
        );
        return Ok(());
    }

    if args.dry_run {
        println!("{}", "  [DRY RUN - file not modified]".cyan());
        println!(
            "{} {}: Would update {}",
            "✓".green(),
            args.path,
            args.file.display()
        );
    } else {
        atomic_write(&args.file, update.document.as_bytes())
            .with_context(|| format!("failed to write {}", args.file.display()))?;
        let action = if update.merged { "Merged into" } else { "Updated" };
        println!(
            "{} {}: {} {}",
            "✓".green(),
            args.path,
            action,
            args.file.display()
        );
    }

    Ok(())
}

fn cmd_get(file: &Path, path: &JsonPath) -> Result<()> {
    let document = read_document(file)?;
    let located = match ParsedDocument::parse(&document).and_then(|doc| doc.locate(path)) {
        Ok(located) => located,
        Err(err) => {
            report_engine_error(file, &EngineError::from(err));
            std::process::exit(1);
        }
    };

    let chars = located.char_range(&document);
    println!("{} {}", "path:".bold(), path.render());
    println!(
        "{} {}..{} (chars {}..{})",
        "span:".bold(),
        located.byte_start,
        located.byte_end,
        chars.start,
        chars.end
    );
    println!("{} {}", "kind:".bold(), located.kind.as_str());
    println!("{}", "value:".bold());
    println!(
        "{}",
        to_pretty_string(&located.value, &FormattingOptions::default())?
    );
    Ok(())
}

fn cmd_check(file: &Path) -> Result<()> {
    let document = read_document(file)?;
    match ParsedDocument::parse(&document) {
        Ok(parsed) => {
            println!(
                "{} {}: valid JSON ({} root)",
                "✓".green(),
                file.display(),
                parsed.root().kind().as_str()
            );
            Ok(())
        }
        Err(err @ LocateError::Malformed { .. }) => {
            report_engine_error(file, &EngineError::from(err));
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

/// Helper: Print an engine failure with its diagnostics
fn report_engine_error(file: &Path, err: &EngineError) {
    eprintln!("{} {}: {}", "✗".red(), file.display(), err);
    match err {
        EngineError::PathNotFound {
            suggestion: Some(suggestion),
            ..
        } => {
            eprintln!("  {}", format!("Did you mean {suggestion:?}?").yellow());
        }
        EngineError::Malformed { line, column, .. } => {
            eprintln!("  {}", format!("at line {line}, column {column}").dimmed());
        }
        EngineError::InternalConsistency { .. } => {
            eprintln!("  {}", "The document was not modified.".dimmed());
        }
        _ => {}
    }
}

fn is_stdin(file: &Path) -> bool {
    file.as_os_str() == "-"
}

fn read_document(file: &Path) -> Result<String> {
    if is_stdin(file) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read document from stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

/// Helper: Read replacement text, dropping one trailing line break
fn read_value_file(path: &Path) -> Result<String> {
    let mut text = fs::read_to_string(path)
        .with_context(|| format!("failed to read value from {}", path.display()))?;
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}

fn print_document(document: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(document.as_bytes())?;
    if !document.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (updated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
    if !modified.ends_with('\n') {
        println!();
    }
}
