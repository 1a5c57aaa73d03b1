//! qctc CLI - QC test-case ingestion and validation
//!
//! # Main Commands
//!
//! ```bash
//! qctc ingest basic_web.csv -p "Basic Verification"   # Add a project to the archive
//! qctc verify                                         # Check the combined dataset
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! qctc preview basic_web.csv -p "Basic Verification"  # Show groups, write nothing
//! qctc scope Login Form ""                            # Show derived scope_of_dev
//! qctc devices "Web and Mobile"                       # Show devices for a purpose
//! ```

use clap::{Parser, Subcommand};
use qctc::config::{combined_path, DEFAULT_ARCHIVE_DIR, DEFAULT_COMBINED_FILE, DEFAULT_INPUT_DIR};
use qctc::{
    generate_scope_of_dev, ingest, log_report, preview, set_device_relevancy, validate_file,
    IngestConfig, IngestError,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "qctc")]
#[command(about = "Ingest and verify QC test-case archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a raw spreadsheet to the archive as a new project
    Ingest {
        /// Raw CSV file (relative to the input directory)
        input: PathBuf,

        /// Project name for every test case group
        #[arg(short, long, env = "QCTC_PROJECT_NAME")]
        project: String,

        /// Directory holding raw spreadsheets
        #[arg(long, env = "QCTC_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Directory for snapshots and the combined file
        #[arg(long, env = "QCTC_ARCHIVE_DIR", default_value = DEFAULT_ARCHIVE_DIR)]
        archive_dir: PathBuf,

        /// Combined file name inside the archive directory
        #[arg(long, default_value = DEFAULT_COMBINED_FILE)]
        combined_file: String,
    },

    /// Transform a raw spreadsheet and print the groups as JSON
    Preview {
        /// Raw CSV file (relative to the input directory)
        input: PathBuf,

        /// Project name for every test case group
        #[arg(short, long, env = "QCTC_PROJECT_NAME")]
        project: String,

        /// Directory holding raw spreadsheets
        #[arg(long, env = "QCTC_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run data-quality checks on the combined file
    Verify {
        /// Combined file (default: <archive-dir>/<combined-file>)
        file: Option<PathBuf>,

        /// Directory for snapshots and the combined file
        #[arg(long, env = "QCTC_ARCHIVE_DIR", default_value = DEFAULT_ARCHIVE_DIR)]
        archive_dir: PathBuf,

        /// Combined file name inside the archive directory
        #[arg(long, default_value = DEFAULT_COMBINED_FILE)]
        combined_file: String,

        /// Print the report as JSON instead of the console checklist
        #[arg(long)]
        json: bool,
    },

    /// Show the scope_of_dev derived from a category hierarchy
    Scope {
        main: String,
        sub: String,
        component: String,
    },

    /// Show the devices enabled by a purpose text
    Devices {
        purpose: String,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest {
            input,
            project,
            input_dir,
            archive_dir,
            combined_file,
        } => {
            let config = IngestConfig::new(input, project)
                .with_input_dir(input_dir)
                .with_archive_dir(archive_dir)
                .with_combined_file(combined_file);
            cmd_ingest(&config)
        }

        Commands::Preview {
            input,
            project,
            input_dir,
            output,
        } => {
            let config = IngestConfig::new(input, project).with_input_dir(input_dir);
            cmd_preview(&config, output.as_deref())
        }

        Commands::Verify {
            file,
            archive_dir,
            combined_file,
            json,
        } => {
            let path = file.unwrap_or_else(|| combined_path(&archive_dir, &combined_file));
            cmd_verify(&path, json)
        }

        Commands::Scope {
            main,
            sub,
            component,
        } => {
            println!("{}", generate_scope_of_dev(&main, sub.trim(), component.trim()));
            Ok(())
        }

        Commands::Devices { purpose } => cmd_devices(&purpose),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_ingest(config: &IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    print_banner("QC Test Case Processor");

    let summary = match ingest(config) {
        Ok(summary) => summary,
        Err(e) if e.is_recoverable() => {
            report_ingest_error(config, &e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_banner(&format!(
        "✅ Done! Project '{}' added successfully.",
        summary.project_name
    ));
    eprintln!("📊 Summary:");
    eprintln!("   - Raw rows read: {}", summary.rows_read);
    eprintln!("   - Test case groups added: {}", summary.groups_added);
    eprintln!("   - Per-project file: {}", summary.snapshot_path.display());
    eprintln!(
        "   - Combined file: {} ({} rows{})",
        summary.combined_path.display(),
        summary.combined_rows,
        if summary.created_combined { ", new" } else { "" }
    );
    Ok(())
}

fn report_ingest_error(config: &IngestConfig, error: &IngestError) {
    eprintln!("❌ ERROR: {}", error);
    match error {
        IngestError::InputNotFound { available, .. } => {
            eprintln!(
                "   Make sure the file is in the '{}' folder",
                config.input_dir.display()
            );
            eprintln!("   Current contents:");
            for name in available {
                eprintln!("     - {}", name);
            }
        }
        IngestError::Schema { .. } => {
            eprintln!(
                "   Required columns: {}",
                config.columns.required_sources().join(", ")
            );
        }
        _ => {}
    }
}

fn cmd_preview(config: &IngestConfig, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Previewing: {}", config.input_path().display());

    let result = preview(config)?;
    eprintln!("   {} raw rows", result.rows_read);
    eprintln!("   {} test case groups", result.groups.len());

    let json = serde_json::to_string_pretty(&result.groups)?;
    write_output(&json, output)
}

fn cmd_verify(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !json {
        print_banner("Data Verification Script");
        eprintln!("📁 Checking: {}", path.display());
    }

    let report = match validate_file(path) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ ERROR: {}", e);
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        log_report(&report);
    }
    Ok(())
}

fn cmd_devices(purpose: &str) -> Result<(), Box<dyn std::error::Error>> {
    let devices: Vec<&str> = set_device_relevancy(purpose)
        .iter()
        .map(|d| d.column())
        .collect();
    println!("{}", serde_json::to_string(&devices)?);
    Ok(())
}

fn print_banner(title: &str) {
    eprintln!("{}", "=".repeat(60));
    eprintln!("{}", title);
    eprintln!("{}", "=".repeat(60));
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
