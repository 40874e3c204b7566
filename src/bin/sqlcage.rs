//! sqlcage — compile JSON request documents to SQL.
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL for a request
//! sqlcage compile request.json
//!
//! # Read from stdin
//! echo '{"action":"count","table":"users"}' | sqlcage compile -
//!
//! # Execute against a database
//! sqlcage run request.json --database-url sqlite://app.db
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::Value as Json;
use sqlcage::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlcage")]
#[command(version)]
#[command(about = "Compile declarative JSON filters into SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqlcage compile request.json
    sqlcage compile - --format json < request.json
    sqlcage run request.json --database-url sqlite://app.db")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database connection URL
    #[arg(long, env = "SQLCAGE_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Configuration file (defaults to ./sqlcage.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Sql,
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL for a request document
    Compile {
        /// Request file, or `-` for stdin
        input: String,

        #[arg(short, long, value_enum, default_value = "sql")]
        format: OutputFormat,
    },
    /// Compile and execute a request document
    Run {
        /// Request file, or `-` for stdin
        input: String,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show how a request document was understood
    Explain {
        /// Request file, or `-` for stdin
        input: String,
    },
    /// Show the key syntax reference
    Syntax,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    }
    .with_database_url(cli.database_url.clone());

    init_tracing(&config.log_filter, cli.verbose);

    match &cli.command {
        Commands::Compile { input, format } => compile(input, *format),
        Commands::Run { input, format } => run(input, *format, &config).await,
        Commands::Explain { input } => explain(input),
        Commands::Syntax => {
            show_syntax();
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sqlcage=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_request(input: &str) -> Result<Request> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };
    Request::from_json_str(&text).with_context(|| format!("parsing request {}", input))
}

fn compile(input: &str, format: OutputFormat) -> Result<()> {
    let request = read_request(input)?;
    let sql = request.statement()?.sql()?;

    match format {
        OutputFormat::Json => {
            let doc = serde_json::json!({ "action": request.action(), "sql": sql });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Sql | OutputFormat::Table => {
            for statement in sql {
                println!("{};", statement);
            }
        }
    }
    Ok(())
}

async fn run(input: &str, format: OutputFormat, config: &Config) -> Result<()> {
    let request = read_request(input)?;
    let statement = request.statement()?;

    if config.database_url.is_none() {
        println!("{}", "Generated SQL:".green().bold());
        for sql in statement.sql()? {
            println!("{}", sql.white());
        }
        println!();
        println!(
            "{}",
            "⚠ No database URL. Use --database-url or set SQLCAGE_DATABASE_URL".yellow()
        );
        return Ok(());
    }

    let db = Database::connect(config).await?;
    let outcome = db.run(&statement).await?;

    match (format, outcome) {
        (OutputFormat::Table, Outcome::Rows(rows)) => print_table(&rows),
        (OutputFormat::Table, Outcome::Row(row)) => print_table(&row.into_iter().collect::<Vec<_>>()),
        (OutputFormat::Table, Outcome::Exists(found)) => println!("{}", found.to_string().cyan()),
        (OutputFormat::Table, Outcome::Scalar(value)) => println!("{}", val_to_string(&value).cyan()),
        (OutputFormat::Table, Outcome::Inserted(ids)) => {
            println!("{} {} row(s) inserted", "✓".green(), ids.len());
            for id in ids.into_iter().flatten() {
                println!("  id {}", id.to_string().cyan());
            }
        }
        (OutputFormat::Table, Outcome::Affected(n)) => {
            println!("{} {} rows affected", "✓".green(), n)
        }
        (_, outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

fn print_table(results: &[serde_json::Map<String, Json>]) {
    if results.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    let columns: Vec<&String> = results[0].keys().collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    for row in results {
        for (w, col) in widths.iter_mut().zip(&columns) {
            let len = row.get(*col).map(val_to_string).unwrap_or_default().len();
            *w = (*w).max(len);
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in results {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| {
                let val = row.get(*c).map(val_to_string).unwrap_or_default();
                format!("{:width$}", val, width = *w)
            })
            .collect();
        println!("{}", cells.join(" │ "));
    }

    println!();
    println!("{} row(s) returned", results.len().to_string().cyan());
}

fn val_to_string(val: &Json) -> String {
    match val {
        Json::Null => "NULL".to_string(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn explain(input: &str) -> Result<()> {
    let request = read_request(input)?;
    let statement = request.statement()?;

    println!("{}", "Request".cyan().bold());
    println!("  {} {}", "Action:".dimmed(), request.action().cyan());
    println!();
    println!("{}", "Parsed Structure:".green().bold());
    println!("{:#?}", statement);
    println!();
    println!("{}", "Generated SQL:".green().bold());
    for sql in statement.sql()? {
        println!("  {}", sql.white());
    }
    Ok(())
}

fn show_syntax() {
    println!("{}", "sqlcage key syntax".cyan().bold());
    println!();

    let keys = [
        ("col", "equality, NULL or list", "= / IS NULL / IN (...)"),
        ("col[!]", "negation", "!= / IS NOT NULL / NOT IN"),
        ("col[>] [>=] [<] [<=]", "number or date", "> >= < <="),
        ("col[<>]", "range", "BETWEEN a AND b"),
        ("col[><]", "excluded range", "NOT BETWEEN a AND b"),
        ("AND / OR #tag", "nested group", "( ... OR ... )"),
        ("[>]t [<]t [<>]t [><]t", "join", "LEFT/RIGHT/FULL/INNER JOIN"),
        ("expr(alias)", "column alias", "\"expr\" AS \"alias\""),
        ("(JSON) col", "mutation as JSON", "'{\"k\":1}'"),
        ("col[+] [-] [*] [/]", "arithmetic update", "\"c\" = \"c\" + n"),
        ("GROUP ORDER HAVING LIMIT LIKE MATCH", "modifiers", "GROUP BY ... LIMIT"),
    ];

    println!(
        "{:38} {:24} {}",
        "Key".white().bold(),
        "Meaning".white().bold(),
        "SQL".white().bold()
    );
    println!("{}", "─".repeat(90).dimmed());

    for (key, meaning, sql) in keys {
        println!("{:38} {:24} {}", key.cyan().bold(), meaning.yellow(), sql.dimmed());
    }
}
