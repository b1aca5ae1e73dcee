//! # promptmig: prompt migration CLI
//!
//! One subcommand per batch operation: extract hardcoded prompts into a
//! migration SQL script, generate full-content UPDATE statements, split a
//! combined script into per-statement files, apply a generated script
//! directly to the database, verify generated payloads against source,
//! inspect the database rows, strip commented-out blocks from the old
//! application file, and convert static pages into templates.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promptmig::config::{database_url, Manifest, PromptSource};
use promptmig::extract::extract_prompt;
use promptmig::generate::{migration_script, update_script, UpdateSection};
use promptmig::split::split_file;
use promptmig::status::{connect, run_status_report};
use promptmig::templates::{convert_batch, TemplateDefaults};
use promptmig::types::PromptRecord;
use promptmig::{apply, cleanup, split, verify};
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract prompts from source and generate the INSERT migration script
    Extract(ExtractArgs),
    /// Generate full-content UPDATE statements for existing rows
    Update(UpdateArgs),
    /// Split a combined UPDATE script into one file per statement
    Split(SplitArgs),
    /// Execute a generated SQL script directly against the database
    Apply(ApplyArgs),
    /// Compare generated SQL payloads against freshly-extracted source text
    Verify(VerifyArgs),
    /// Report prompt row counts and details from the database
    Status(StatusArgs),
    /// Remove banner-delimited commented-out blocks from a source file
    Cleanup(CleanupArgs),
    /// Convert static HTML pages into server-side templates
    Templates(TemplatesArgs),
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Path to the prompt source manifest
    #[arg(long, default_value = "prompts.toml")]
    manifest: PathBuf,
    /// Where to write the combined migration script
    #[arg(long, default_value = "prompts_migration_generated.sql")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct UpdateArgs {
    /// Path to the prompt source manifest
    #[arg(long, default_value = "prompts.toml")]
    manifest: PathBuf,
    /// Where to write the combined UPDATE script
    #[arg(long, default_value = "update_prompts_full.sql")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct SplitArgs {
    /// The combined UPDATE script to split
    #[arg(long, default_value = "update_prompts_full.sql")]
    input: PathBuf,
    /// Directory for the per-statement files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// The generated SQL script to execute
    #[arg(long, default_value = "update_prompts_full.sql")]
    input: PathBuf,
    /// Skip the interactive confirmation
    #[arg(long)]
    yes: bool,
}

#[derive(Parser, Debug)]
struct VerifyArgs {
    /// Path to the prompt source manifest
    #[arg(long, default_value = "prompts.toml")]
    manifest: PathBuf,
    /// Directory holding the split per-statement files
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Parser, Debug)]
struct StatusArgs {
    /// SQL LIKE pattern selecting the migrated rows
    #[arg(long, default_value = promptmig::MIGRATION_NAME_FILTER)]
    filter: String,
}

#[derive(Parser, Debug)]
struct CleanupArgs {
    /// The file to clean
    #[arg(long, default_value = "main.py")]
    file: PathBuf,
    /// Skip the interactive confirmation
    #[arg(long)]
    yes: bool,
}

#[derive(Parser, Debug)]
struct TemplatesArgs {
    /// Directory holding the static HTML pages
    #[arg(long, default_value = "industries")]
    input_dir: PathBuf,
    /// Directory to write the converted templates into
    #[arg(long, default_value = "templates/industries")]
    output_dir: PathBuf,
    /// Page filenames to convert (defaults to the industry page list)
    pages: Vec<String>,
    /// Fallback page title when the HTML has none
    #[arg(long, default_value = "Untitled")]
    title: String,
    /// Fallback meta description when the HTML has none
    #[arg(long, default_value = "")]
    description: String,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging to a file so console output stays a clean report.
    let log_file = File::create("promptmig.log")?;
    let subscriber = fmt::Subscriber::builder()
        .with_writer(log_file)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract(args) => handle_extract(args),
        Commands::Update(args) => handle_update(args),
        Commands::Split(args) => handle_split(args),
        Commands::Apply(args) => handle_apply(args).await,
        Commands::Verify(args) => handle_verify(args),
        Commands::Status(args) => handle_status(args).await,
        Commands::Cleanup(args) => handle_cleanup(args),
        Commands::Templates(args) => handle_templates(args),
    }
}

// --- Command Handlers ---

/// Reads one source file and extracts its prompt, printing the per-item
/// outcome. Returns `None` on any per-item failure; those never abort a batch.
fn extract_from_source(source: &PromptSource) -> Option<String> {
    let content = match fs::read_to_string(&source.path) {
        Ok(content) => content,
        Err(_) => {
            println!("  [WARNING] File not found: {}", source.path);
            return None;
        }
    };
    match extract_prompt(&content, &source.function) {
        Ok(text) => {
            println!("  [OK] Extracted {} characters", text.chars().count());
            Some(text)
        }
        Err(e) => {
            println!("  [ERROR] {e}");
            None
        }
    }
}

fn handle_extract(args: &ExtractArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    println!("Extracting prompts and generating SQL INSERT statements");

    let mut entries = Vec::new();
    let mut failures = 0usize;
    for source in &manifest.prompts {
        println!("Extracting {} prompt...", source.key);
        match extract_from_source(source) {
            Some(text) => {
                let mut record = PromptRecord::migrated(
                    &source.name,
                    &source.scope,
                    &source.doc_type,
                    text,
                );
                record.priority = source.priority;
                let origin = format!("{} -> {}()", source.path, source.function);
                entries.push((record, origin));
            }
            None => failures += 1,
        }
    }

    let sql = migration_script(&entries);
    fs::write(&args.output, &sql)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(output = %args.output.display(), records = entries.len(), "wrote migration script");

    println!();
    println!(
        "✅ Generated {} INSERT statements -> {}",
        entries.len(),
        args.output.display()
    );
    if failures > 0 {
        println!("⚠️  {failures} prompt(s) could not be extracted; see messages above.");
    }
    Ok(())
}

fn handle_update(args: &UpdateArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    println!("Extracting full prompts and generating UPDATE statements");

    let mut sections = Vec::new();
    let mut failures = 0usize;
    for source in &manifest.prompts {
        println!("Extracting {}...", source.path);
        match extract_from_source(source) {
            Some(text) => sections.push(UpdateSection {
                db_name: source.db_name.clone(),
                prompt_text: text,
                label: source.tag.clone(),
            }),
            None => failures += 1,
        }
    }

    let sql = update_script(&sections);
    fs::write(&args.output, &sql)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!();
    println!(
        "✅ Wrote {} UPDATE statements -> {}",
        sections.len(),
        args.output.display()
    );
    println!("Execute each UPDATE statement separately in a database tool.");
    if failures > 0 {
        println!("⚠️  {failures} prompt(s) could not be extracted; see messages above.");
    }
    Ok(())
}

fn handle_split(args: &SplitArgs) -> Result<()> {
    let report = split_file(&args.input, &args.out_dir)?;

    for path in &report.created {
        println!("Created: {}", path.display());
    }
    for reason in &report.skipped {
        println!("⚠️  Skipped {reason}");
    }
    println!();
    println!(
        "✅ Created {} individual SQL file(s) from {}.",
        report.created.len(),
        args.input.display()
    );
    Ok(())
}

async fn handle_apply(args: &ApplyArgs) -> Result<()> {
    let size = fs::metadata(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?
        .len();
    println!("Executing {} against the database", args.input.display());
    println!("File size: {size} bytes");
    println!();

    if !args.yes && !confirm("Execute against the database? (yes/no): ")? {
        println!("Apply cancelled.");
        return Ok(());
    }

    let url = database_url()?;
    let pool = connect(&url).await?;
    let report = apply::apply_file(&pool, &args.input).await?;

    println!("✅ Executed {} statement(s) in one transaction.", report.executed);
    if report.queries_skipped > 0 {
        println!(
            "Skipped {} embedded verification query(ies); results below.",
            report.queries_skipped
        );
    }

    if report.rows.is_empty() {
        println!();
        println!("⚠️  No document-type prompt rows found after the run.");
        return Ok(());
    }

    println!();
    println!("Verification results:");
    for row in &report.rows {
        println!();
        println!("{}", row.name);
        println!("  Doc Type: {}", row.doc_type.as_deref().unwrap_or("N/A"));
        println!("  Length: {} characters", row.prompt_length);
        if row.looks_like_placeholder() {
            println!("  ⚠️  Very short; this may still be a placeholder, not a full prompt.");
        }
        println!("  Active: {}", row.is_active);
        if let Some(updated) = row.updated_at {
            println!("  Updated: {updated}");
        }
    }
    Ok(())
}

fn handle_verify(args: &VerifyArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    println!("Verifying generated SQL payloads against source");

    let mut mismatches = 0usize;
    for source in &manifest.prompts {
        println!("Checking {}...", source.key);
        let Some(text) = extract_from_source(source) else {
            continue;
        };

        let sql_path = args.dir.join(split::section_filename(&source.db_name));
        let sql = match fs::read_to_string(&sql_path) {
            Ok(sql) => sql,
            Err(_) => {
                println!("  [WARNING] File not found: {}", sql_path.display());
                continue;
            }
        };
        let Some(payload) = verify::recover_payload(&sql) else {
            println!(
                "  [ERROR] No dollar-quoted payload found in {}",
                sql_path.display()
            );
            continue;
        };

        let outcome = verify::compare(&text, &payload);
        if outcome.matched {
            println!("  [OK] Payload matches source ({} characters)", outcome.source_len);
        } else {
            mismatches += 1;
            println!(
                "  [MISMATCH] source {} chars, payload {} chars",
                outcome.source_len, outcome.payload_len
            );
            if let Some(excerpt) = &outcome.excerpt {
                print!("{excerpt}");
            }
        }
    }

    println!();
    if mismatches == 0 {
        println!("✅ All payloads match their source prompts.");
    } else {
        println!("⚠️  {mismatches} payload(s) differ from source. Nothing was modified.");
    }
    Ok(())
}

async fn handle_status(args: &StatusArgs) -> Result<()> {
    let url = database_url()?;
    let pool = connect(&url).await?;
    let report = run_status_report(&pool, &args.filter).await?;

    println!("Prompt status in database");
    println!();
    println!("Total prompts in database: {}", report.total);
    println!("Migrated prompts (matching filter): {}", report.migrated);
    println!("  Active: {}", report.active);
    println!("  Inactive: {}", report.inactive);

    if report.rows.is_empty() {
        println!();
        println!("⚠️  No migrated prompts found. Run the migration SQL first.");
        return Ok(());
    }

    println!();
    println!("Migrated prompt details:");
    for row in &report.rows {
        let badge = if row.is_active {
            "✓ ACTIVE"
        } else {
            "✗ INACTIVE"
        };
        println!();
        println!("ID: {}", row.id);
        println!("  Name: {}", row.name);
        println!("  Scope: {}", row.scope);
        println!("  Doc Type: {}", row.doc_type.as_deref().unwrap_or("N/A"));
        println!("  Length: {} characters", row.prompt_length);
        println!("  Priority: {}", row.priority);
        println!("  Status: {badge}");
        if let Some(created) = row.created_at {
            println!("  Created: {created}");
        }
    }

    if report.inactive > 0 {
        println!();
        println!(
            "⚠️  {} migrated prompt(s) are inactive. Activate them after testing:",
            report.inactive
        );
        println!(
            "  UPDATE prompt_templates SET is_active = true WHERE name LIKE '{}';",
            args.filter
        );
    } else if report.active > 0 {
        println!();
        println!("✅ All migrated prompts are ACTIVE.");
    }
    Ok(())
}

fn handle_cleanup(args: &CleanupArgs) -> Result<()> {
    println!("Cleanup: remove commented-out code blocks from {}", args.file.display());
    println!("A timestamped backup will be created before any change.");

    if !args.yes && !confirm("Proceed with cleanup? (yes/no): ")? {
        println!("Cleanup cancelled.");
        return Ok(());
    }

    let report = cleanup::cleanup_file(&args.file)?;
    println!("✓ Created backup: {}", report.backup.display());
    println!("✓ Original file: {} lines", report.original_lines);
    println!("✓ Cleaned file: {} lines", report.cleaned_lines);
    println!(
        "✓ Removed: {} lines of commented code",
        report.removed_lines
    );
    println!();
    println!("Review the changes, then commit.");
    Ok(())
}

fn handle_templates(args: &TemplatesArgs) -> Result<()> {
    let defaults = TemplateDefaults {
        title: args.title.clone(),
        description: args.description.clone(),
    };
    let pages: Vec<String> = if args.pages.is_empty() {
        promptmig::templates::DEFAULT_PAGES
            .iter()
            .map(|p| p.to_string())
            .collect()
    } else {
        args.pages.clone()
    };
    let report = convert_batch(&args.input_dir, &args.output_dir, &pages, &defaults)?;

    for page in &report.processed {
        println!("Converted {page}");
    }
    for reason in &report.skipped {
        println!("⚠️  {reason}");
    }
    println!();
    println!(
        "✅ Converted {} page(s) into {}.",
        report.processed.len(),
        args.output_dir.display()
    );
    Ok(())
}

/// Blocking yes/no gate. Only `yes` or `y` proceeds.
fn confirm(question: &str) -> Result<bool> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "yes" | "y"))
}
