use clap::{Parser, Subcommand};

/// Command-line interface definition for pomolog
/// Ingestion backend for pomodoro timer transitions over SQLite
#[derive(Parser)]
#[command(
    name = "pomolog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pomodoro transition ingestion backend: reconcile device events into SQLite sessions",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Run the HTTP ingestion server
    Serve {
        #[arg(long, help = "Bind address (overrides config)")]
        host: Option<String>,

        #[arg(long, help = "Bind port (overrides config)")]
        port: Option<u16>,

        #[arg(
            long = "received-dir",
            help = "Directory for per-event audit files (overrides config)"
        )]
        received_dir: Option<String>,
    },

    /// List reconciled sessions or logged transitions
    List {
        #[arg(long = "events", help = "List raw transition events instead of sessions")]
        events: bool,

        #[arg(
            long = "session",
            help = "Restrict --events to a single session key"
        )]
        session: Option<i64>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}
