mod config;
mod corpus;
mod fix;
mod index;
mod links;
mod report;
mod verify;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use corpus::Corpus;
use fix::Fixer;
use index::NameIndex;
use report::{ConsoleReporter, Reporter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use verify::Verifier;

/// relink - Audit and repair relative links in a numbered spec tree
#[derive(Parser)]
#[command(name = "relink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = ".relink.toml")]
    config: PathBuf,

    /// Corpus root (overrides the config file)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Quiet mode - suppress per-link output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite broken links using the name index
    Fix {
        /// Report fixes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Report broken links without changing anything
    Verify {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error when any link is broken
        #[arg(long)]
        deny: bool,
    },

    /// Show the name index
    Index {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli.config, cli.root.clone()).and_then(|config| match cli.command {
        Commands::Fix { dry_run } => cmd_fix(&config, dry_run, cli.quiet),
        Commands::Verify { json, deny } => cmd_verify(&config, json, deny, cli.quiet),
        Commands::Index { json } => cmd_index(&config, json),
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path, root: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load(path)?;
    if let Some(root) = root {
        config.root = root;
    }
    config.resolve_root()?;
    Ok(config)
}

fn build_index(config: &Config, corpus: &Corpus) -> Result<NameIndex, Box<dyn std::error::Error>> {
    Ok(NameIndex::build(corpus, &config.fix_directories(), &config.overrides)?)
}

/// In strict mode, every derived-key collision is reported before fixing.
fn report_collisions(config: &Config, index: &NameIndex, reporter: &mut dyn Reporter) {
    if !config.strict {
        return;
    }
    for collision in index.collisions() {
        reporter.collision(collision);
    }
}

fn cmd_fix(config: &Config, dry_run: bool, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let corpus = Corpus::new(&config.root, &config.document_glob)?;
    let index = build_index(config, &corpus)?;
    let mut reporter = ConsoleReporter { quiet };

    report_collisions(config, &index, &mut reporter);

    let fixer = Fixer::new(&corpus, &index, config, dry_run)?;
    let summary = fixer.run(&config.fix_directories(), &mut reporter);

    println!();
    if dry_run {
        println!("{}", "Dry run - no files written".yellow());
    }
    println!("Total files updated: {}", summary.files_changed.to_string().cyan().bold());
    if !quiet {
        println!("  Files scanned:    {}", summary.files_scanned.to_string().cyan());
        println!("  Links fixed:      {}", summary.links_fixed.to_string().cyan());
        println!("  Time elapsed:     {:.2?}", start.elapsed());
    }

    Ok(())
}

fn cmd_verify(
    config: &Config,
    json: bool,
    deny: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = Corpus::new(&config.root, &config.document_glob)?;
    let verifier = Verifier::new(&corpus, &config.root_uri)?;
    let mut reporter = ConsoleReporter { quiet };

    if !json && !quiet {
        println!("{} {}...", "Starting link verification in".cyan().bold(), config.root.display());
    }

    let report = verifier.run(&config.directories, &mut reporter);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{}", "Audit Summary".green().bold());
        println!("  Total internal links scanned: {}", report.total_links.to_string().cyan());
        println!("  Total broken links found:     {}", report.broken_links.len().to_string().cyan());

        if report.broken_links.is_empty() {
            println!("\n{}", "No broken links found!".green());
        } else if !quiet {
            println!("\n{}", "Broken Links Detail".red().bold());
            for (i, link) in report.broken_links.iter().enumerate() {
                println!("{}. Source: {}", i + 1, link.source.cyan());
                println!("   Link: [{}]({})", link.label, link.target.yellow());
                println!("   Resolved Path: {}", link.resolved.dimmed());
                println!("{}", "-".repeat(20));
            }
        }
    }

    if deny && !report.broken_links.is_empty() {
        return Err(format!("{} broken links", report.broken_links.len()).into());
    }

    Ok(())
}

fn cmd_index(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = Corpus::new(&config.root, &config.document_glob)?;
    let index = build_index(config, &corpus)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    if index.is_empty() {
        println!("{}", "No documents found.".yellow());
        return Ok(());
    }

    let width = index.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, location) in index.iter() {
        println!("  {:<width$} {}", key.cyan(), location, width = width);
    }

    println!();
    println!("{} keys", index.len().to_string().green().bold());

    if !index.collisions().is_empty() {
        println!();
        println!("{} ({})", "Collisions".yellow().bold(), index.collisions().len());
        for c in index.collisions() {
            println!("  {} {} -> {}", c.key.cyan(), c.previous.dimmed(), c.replacement);
        }
    }

    Ok(())
}
