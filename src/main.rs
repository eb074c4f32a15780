use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

use saju_constitution::store::{lookup_label, save_registry, setup_registry_table};
use saju_constitution::{
    analyze, build_registry_with, load_records, write_registry, ClassifierConfig,
    ConstitutionLabel, DataFormat,
};

#[derive(Parser)]
#[command(name = "saju-constitution", version, about = "Birth-date constitution classifier")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one birth date
    Classify {
        /// Birth date, YYYY-MM-DD (use -YYYY for years before 1)
        #[arg(allow_hyphen_values = true)]
        date: String,
        /// Birth hour, 0-23
        #[arg(long, allow_hyphen_values = true)]
        hour: Option<i64>,
        /// Print pillars, balance and scores as JSON
        #[arg(long)]
        explain: bool,
    },
    /// Build the id → label registry for a roster file
    Batch {
        /// Roster file (.csv with id,birth_date,birth_hour or .json array)
        input: PathBuf,
        /// Roster format when the extension does not say
        #[arg(long)]
        input_format: Option<DataFormat>,
        /// Registry output file (stdout JSON when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Registry output format when the extension does not say
        #[arg(long)]
        format: Option<DataFormat>,
        /// Also store the registry in this SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,
        /// Label for records that cannot be classified
        #[arg(long)]
        fallback: Option<ConstitutionLabel>,
        /// Classify on a single thread
        #[arg(long)]
        sequential: bool,
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Look up a stored label by id
    Lookup {
        /// SQLite database written by `batch --sqlite`
        database: PathBuf,
        id: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Classify { date, hour, explain } => run_classify(&date, hour, explain),
        Commands::Batch {
            input,
            input_format,
            output,
            format,
            sqlite,
            fallback,
            sequential,
            config,
        } => {
            let mut config = match config {
                Some(path) => ClassifierConfig::from_file(path)?,
                None => ClassifierConfig::default(),
            };
            if let Some(label) = fallback {
                config.fallback_label = label;
            }
            if sequential {
                config.parallel = false;
            }

            run_batch(&input, input_format, output, format, sqlite, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lookup { database, id } => run_lookup(&database, &id),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_classify(date: &str, hour: Option<i64>, explain: bool) -> Result<ExitCode> {
    let analysis = match analyze(date, hour) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("❌ Could not classify input: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    if explain {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", analysis.label);
    }

    Ok(ExitCode::SUCCESS)
}

fn run_batch(
    input: &Path,
    input_format: Option<DataFormat>,
    output: Option<PathBuf>,
    format: Option<DataFormat>,
    sqlite: Option<PathBuf>,
    config: &ClassifierConfig,
) -> Result<()> {
    // 1. Load roster
    eprintln!("📂 Loading records from {:?}...", input);
    let records = load_records(input, input_format)?;
    eprintln!("✓ Loaded {} records", records.len());

    // 2. Classify
    let build = build_registry_with(&records, config);
    eprintln!("✓ {}", build.report.summary());
    for fallback in &build.report.fallbacks {
        eprintln!("  ⚠️  {} → {} ({})", fallback.id, build.report.fallback_label, fallback.reason);
    }

    // 3. Write registry
    match output {
        Some(path) => {
            write_registry(&path, &build.registry, format)?;
            eprintln!("💾 Registry written to {:?}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&build.registry)?),
    }

    // 4. Optional SQLite table
    if let Some(db_path) = sqlite {
        let mut conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        setup_registry_table(&conn)?;
        let written = save_registry(&mut conn, &build.registry)?;
        eprintln!("🗄️  Stored {} entries in {:?}", written, db_path);
    }

    eprintln!("🔑 Digest: {}", build.report.digest);
    Ok(())
}

fn run_lookup(database: &Path, id: &str) -> Result<ExitCode> {
    if !database.exists() {
        eprintln!("❌ Database not found: {:?}", database);
        eprintln!("   Run: saju-constitution batch <roster> --sqlite {:?}", database);
        return Ok(ExitCode::FAILURE);
    }

    let conn = Connection::open(database)
        .with_context(|| format!("Failed to open database: {:?}", database))?;

    match lookup_label(&conn, id)? {
        Some(label) => {
            println!("{}", label);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("❌ No entry for id '{}'", id);
            Ok(ExitCode::FAILURE)
        }
    }
}
