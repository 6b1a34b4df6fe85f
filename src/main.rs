use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use trino_migrate::runner::{
    BatchSummary, ConnectionArgs, DescribeArgs, ExecuteArgs, GenerateArgs, run_describe,
    run_execute, run_generate,
};

#[derive(Parser, Clone)]
#[command(about = "Generate and run table migration statements against Trino")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Clone)]
struct Connection {
    /// Trino coordinator hostname or IP address (a URL scheme may be included)
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Trino coordinator port
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Username for Trino
    #[arg(long, default_value = "admin")]
    user: String,

    /// Timeout for each statement, in seconds
    #[arg(long, default_value = "180")]
    timeout_secs: u64,

    /// Quiet mode - minimal output, only show summary
    #[arg(short, long)]
    quiet: bool,
}

impl Connection {
    fn args(&self) -> ConnectionArgs {
        ConnectionArgs {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            query_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Clone, Subcommand)]
enum Command {
    /// Generate CTAS / CTASND / IIS statements from a job list CSV
    Generate {
        /// Job list to read
        #[arg(short, long, default_value = "trino_input.csv")]
        input: PathBuf,

        /// CSV to write, with the generated statement appended to each row
        #[arg(short, long, default_value = "output_data.csv")]
        output: PathBuf,

        #[command(flatten)]
        connection: Connection,
    },
    /// Execute the generated statements of a CSV, one row at a time
    Execute {
        /// CSV containing the generated statements
        #[arg(short, long, default_value = "output_data.csv")]
        input: PathBuf,

        #[command(flatten)]
        connection: Connection,
    },
    /// Show a table's columns as the generator sees them
    Describe {
        /// Fully-qualified table name (catalog.schema.table)
        #[arg(short, long)]
        table: String,

        /// Partition columns to move last (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        partition_columns: Vec<String>,

        #[command(flatten)]
        connection: Connection,
    },
}

impl Command {
    fn quiet(&self) -> bool {
        match self {
            Command::Generate { connection, .. }
            | Command::Execute { connection, .. }
            | Command::Describe { connection, .. } => connection.quiet,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing based on quiet mode
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if args.command.quiet() {
        EnvFilter::new("trino_migrate=warn,reqwest=off,hyper=off")
    } else {
        EnvFilter::new("trino_migrate=info,reqwest=off,hyper=off")
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match args.command {
        Command::Generate {
            input,
            output,
            connection,
        } => {
            if !connection.quiet {
                println!("Trino Statement Generator");
                println!("=========================");
                println!("Input: {}", input.display());
                println!("Output: {}", output.display());
                println!("Engine: {}:{} as {}", connection.host, connection.port, connection.user);
                println!();
            }

            let summary = run_generate(GenerateArgs {
                connection: connection.args(),
                input_csv: input,
                output_csv: output.clone(),
                quiet: connection.quiet,
            })
            .await?;

            print_summary("Generate Summary", "Statements generated", &summary);
            println!("Output saved to: {}", output.display());
            exit_status(&summary)
        }
        Command::Execute { input, connection } => {
            if !connection.quiet {
                println!("Trino Statement Executor");
                println!("========================");
                println!("Input: {}", input.display());
                println!("Engine: {}:{} as {}", connection.host, connection.port, connection.user);
                println!();
            }

            let summary = run_execute(ExecuteArgs {
                connection: connection.args(),
                input_csv: input,
                quiet: connection.quiet,
            })
            .await?;

            print_summary("Execute Summary", "Statements succeeded", &summary);
            exit_status(&summary)
        }
        Command::Describe {
            table,
            partition_columns,
            connection,
        } => {
            let result = run_describe(DescribeArgs {
                connection: connection.args(),
                table,
                partition_columns,
            })
            .await?;

            println!("Columns of {}:", result.table);
            for column in &result.columns {
                println!("  {}", column);
            }
            if let Some(reordered) = result.reordered {
                println!();
                println!("SELECT list with partition columns last:");
                println!("  {}", reordered.join(", "));
            }
            Ok(())
        }
    }
}

fn print_summary(title: &str, statements_label: &str, summary: &BatchSummary) {
    println!();
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!("Rows read: {}", summary.rows_read);
    println!("{}: {}", statements_label, summary.statements);
    println!("Rows failed: {}", summary.rows_failed);
    println!("Duration: {:.2}s", summary.duration.as_secs_f64());
    if let Some(ref latency) = summary.latency {
        println!("Row latency: {}", latency);
    }

    if !summary.failures.is_empty() {
        println!();
        println!("Failed rows:");
        for failure in &summary.failures {
            println!(
                "  line {} [{}] {}: {}",
                failure.line,
                failure.error.kind(),
                failure.description,
                failure.error
            );
        }
    }
}

fn exit_status(summary: &BatchSummary) -> anyhow::Result<()> {
    if summary.rows_failed > 0 {
        anyhow::bail!("{} of {} rows failed", summary.rows_failed, summary.rows_read);
    }
    Ok(())
}
