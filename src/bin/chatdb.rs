//! chatdb — ask a table questions in plain English
//!
//! # Usage
//!
//! ```bash
//! # Translate and execute
//! chatdb "total units sold by country" --table sales
//!
//! # Dry run against an offline schema (show SQL only)
//! chatdb "price greater than 10" --table sales --column price_per_unit:float --dry-run
//!
//! # Show how a question was read
//! chatdb explain "highest price" --table sales --column price_per_unit:float
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chatdb::prelude::*;
use chatdb::templates::TemplateKind;
use chatdb::vocabulary;

#[derive(Parser)]
#[command(name = "chatdb")]
#[command(version)]
#[command(about = "Translate plain-English questions into SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    chatdb 'total units sold by country' --table sales
    chatdb 'price between 1 and 5' --table sales --column price_per_unit:float --dry-run
    chatdb explain 'count of product per country' --table sales")]
struct Cli {
    /// The question to translate
    question: Option<String>,

    /// Table to query (overrides the config file)
    #[arg(short, long, global = true)]
    table: Option<String>,

    /// Offline column as name:type, repeatable (skips schema introspection)
    #[arg(short, long = "column", value_name = "NAME:TYPE", global = true)]
    columns: Vec<String>,

    /// Path to chatdb.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection URL
    #[arg(long, env = "CHATDB_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Don't execute, just show the generated SQL
    #[arg(short, long)]
    dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a question is read and which route produced the SQL
    Explain {
        /// The question to explain
        question: String,
    },
    /// Show the keywords, templates and synonyms the translator knows
    Vocabulary,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match &cli.command {
        Some(Commands::Explain { question }) => explain_question(question, &cli).await,
        Some(Commands::Vocabulary) => show_vocabulary(&cli),
        None => match &cli.question {
            Some(question) => run_question(question, &cli).await,
            None => {
                println!("{}", "chatdb — plain-English questions to SQL".cyan().bold());
                println!();
                println!("Usage: chatdb <QUESTION> --table <TABLE> [OPTIONS]");
                println!();
                println!("Try: chatdb --help");
                Ok(())
            }
        },
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "chatdb=debug" } else { "chatdb=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything a command needs, gathered from flags and the config file.
struct Session {
    config: ChatDbConfig,
    translator: Translator,
    database_url: Option<String>,
}

impl Session {
    fn load(cli: &Cli) -> Result<Self> {
        let config = ChatDbConfig::discover(cli.config.as_deref())?;
        let translator = Translator::new(config.synonym_table());
        let database_url = cli.database_url.clone().or_else(|| config.database.url.clone());
        Ok(Self {
            config,
            translator,
            database_url,
        })
    }

    fn table_name(&self, cli: &Cli) -> Result<String> {
        cli.table
            .clone()
            .or_else(|| self.config.table.as_ref().map(|t| t.name.clone()))
            .context("No table given. Use --table or set [table] name in chatdb.toml")
    }

    /// `--column` flags first, then the config's column list.
    fn offline_schema(&self, cli: &Cli) -> Result<Option<Schema>> {
        if !cli.columns.is_empty() {
            let table = self.table_name(cli)?;
            let mut columns = Vec::with_capacity(cli.columns.len());
            for spec in &cli.columns {
                let (name, declared) = spec.split_once(':').unwrap_or((spec.as_str(), ""));
                columns.push((name.trim(), ColumnType::from_declared(declared)));
            }
            return Ok(Some(Schema::new(&table, columns)?));
        }
        match self.config.offline_schema()? {
            Some(schema) if cli.table.as_deref().is_none_or(|t| t == schema.table().as_str()) => {
                Ok(Some(schema))
            }
            _ => Ok(None),
        }
    }

    /// The offline schema if there is one, else the live one.
    async fn schema(&self, cli: &Cli, db: Option<&ChatDb>) -> Result<Schema> {
        if let Some(schema) = self.offline_schema(cli)? {
            return Ok(schema);
        }
        let table = self.table_name(cli)?;
        match db {
            Some(db) => Ok(db.table_schema(&table).await?),
            None => bail!(
                "No schema for '{}'. Pass --column, list columns in chatdb.toml, or set CHATDB_DATABASE_URL",
                table
            ),
        }
    }

    async fn connect(&self, cli: &Cli) -> Result<Option<ChatDb>> {
        match &self.database_url {
            Some(url) => {
                if cli.verbose {
                    println!("{} {}", "Connecting to:".dimmed(), url);
                }
                Ok(Some(ChatDb::connect(url).await?))
            }
            None => Ok(None),
        }
    }
}

async fn run_question(question: &str, cli: &Cli) -> Result<()> {
    if cli.verbose {
        println!("{} {}", "Question:".dimmed(), question.yellow());
    }

    let session = Session::load(cli)?;
    let offline = session.offline_schema(cli)?;
    let db = if cli.dry_run && offline.is_some() {
        None
    } else {
        session.connect(cli).await?
    };
    let schema = match offline {
        Some(schema) => schema,
        None => session.schema(cli, db.as_ref()).await?,
    };

    let translation = session.translator.explain(question, &schema)?;
    let query = translation.query.to_translated();

    let Some(db) = db.filter(|_| !cli.dry_run) else {
        print_sql(&query);
        if session.database_url.is_none() && !cli.dry_run {
            println!();
            println!(
                "{}",
                "⚠ No database URL. Use --database-url or set CHATDB_DATABASE_URL".yellow()
            );
        }
        return Ok(());
    };

    if cli.verbose {
        print_sql(&query);
        println!();
    }

    let rows = db.execute(&translation.query, &schema).await?;
    format_output(&rows, &cli.format)
}

fn print_sql(query: &TranslatedQuery) {
    println!("{}", "Generated SQL:".green().bold());
    println!("{}", query.sql.white());

    if !query.params.is_empty() {
        println!();
        println!("{}", "Parameters:".cyan());
        for (i, p) in query.params.iter().enumerate() {
            println!("  %s#{} = {}", i + 1, p.yellow());
        }
    }
}

fn format_output(rows: &[ResultRow], format: &OutputFormat) -> Result<()> {
    if rows.is_empty() {
        println!("{}", "(no results)".dimmed());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Table => {
            // Column order is the select-list order of the first row.
            let columns: Vec<&String> = rows[0].keys().collect();

            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in rows {
                for (i, col) in columns.iter().enumerate() {
                    let len = row.get(*col).map(val_to_string).unwrap_or_default().chars().count();
                    widths[i] = widths[i].max(len);
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

            for row in rows {
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
            println!("{} row(s) returned", rows.len().to_string().cyan());
        }
    }
    Ok(())
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}

async fn explain_question(question: &str, cli: &Cli) -> Result<()> {
    let session = Session::load(cli)?;
    let db = match session.offline_schema(cli)? {
        Some(_) => None,
        None => session.connect(cli).await?,
    };
    let schema = session.schema(cli, db.as_ref()).await?;
    let translation = session.translator.explain(question, &schema)?;

    if matches!(cli.format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&translation)?);
        return Ok(());
    }

    println!("{}", "chatdb Question Explanation".cyan().bold());
    println!();
    println!("{} {}", "Question:".dimmed(), question.yellow());
    println!("{} {}", "Tokens:".dimmed(), translation.tokens.join(" ").white());
    println!();

    match &translation.path {
        TranslationPath::Template { kind } => {
            println!("{} {}", "Route:".green().bold(), "template".cyan());
            println!("  {} {}", "Template:".dimmed(), kind.to_string().white());
        }
        TranslationPath::Generic {
            discarded,
            extraction,
        } => {
            println!("{} {}", "Route:".green().bold(), "generic extraction".cyan());
            if let Some(found) = discarded {
                println!(
                    "  {} {} (A={:?}, B={:?})",
                    "Unresolved template:".dimmed(),
                    found.kind.to_string().yellow(),
                    found.subject.as_deref().unwrap_or(""),
                    found.group
                );
            }
            if !extraction.columns.is_empty() {
                println!("  {}", "Columns:".dimmed());
                for col in &extraction.columns {
                    println!("    • {}", col.as_str().white());
                }
            }
            if !extraction.conditions.is_empty() {
                println!("  {}", "Conditions:".dimmed());
                for cond in &extraction.conditions {
                    println!(
                        "    {} {} {}",
                        cond.column().as_str().white(),
                        cond.op().to_string().cyan(),
                        cond.values().join(", ").yellow()
                    );
                }
            }
            if let Some(func) = extraction.aggregate {
                println!("  {} {}", "Aggregate:".dimmed(), func.to_string().cyan());
            }
            if !extraction.group_by.is_empty() {
                let groups: Vec<&str> = extraction.group_by.iter().map(|g| g.as_str()).collect();
                println!("  {} {}", "Group by:".dimmed(), groups.join(", ").white());
            }
            if let Some(order) = &extraction.order {
                println!(
                    "  {} {} {} (limit {})",
                    "Order:".dimmed(),
                    order.column.as_str().white(),
                    order.order.to_string().cyan(),
                    order.limit
                );
            }
        }
    }

    println!();
    print_sql(&translation.query.to_translated());
    Ok(())
}

fn show_vocabulary(cli: &Cli) -> Result<()> {
    let session = Session::load(cli)?;

    println!("{}", "chatdb Vocabulary".cyan().bold());
    println!();

    println!("{}", "Templates (tried in order):".green().bold());
    for kind in TemplateKind::ALL {
        println!("  {}", kind.to_string().white());
    }
    println!();

    println!(
        "{:30} {}",
        "Operator phrase".white().bold(),
        "SQL".white().bold()
    );
    println!("{}", "─".repeat(40).dimmed());
    for (phrase, op) in vocabulary::OPERATOR_PHRASES {
        println!("{:30} {}", phrase.yellow(), op.to_string().cyan());
    }
    println!("{:30} {}", vocabulary::BETWEEN_PHRASE.yellow(), "BETWEEN".cyan());
    println!();

    println!("{:30} {}", "Aggregate".white().bold(), "SQL".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (word, func) in vocabulary::AGGREGATE_KEYWORDS {
        println!("{:30} {}", word.yellow(), func.to_string().cyan());
    }
    println!();

    println!("{:30} {}", "Superlative".white().bold(), "ORDER BY".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (word, order, limit) in vocabulary::SUPERLATIVES {
        println!("{:30} {} LIMIT {}", word.yellow(), order.to_string().cyan(), limit);
    }
    println!();

    println!(
        "{} {}",
        "Grouping keywords:".green().bold(),
        vocabulary::GROUP_KEYWORDS.join(", ").white()
    );
    println!();

    println!("{:30} {}", "Synonym".white().bold(), "Column".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (phrase, column) in session.translator.synonyms().iter() {
        println!("{:30} {}", phrase.yellow(), column.dimmed());
    }
    Ok(())
}
