mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wordlink::shortener::{DEFAULT_CONFLICT_RETRIES, DEFAULT_WORD_COUNT};

#[derive(Parser)]
#[command(
    name = "wl",
    version,
    about = "URL shortener that hands out human-readable word paths"
)]
struct Cli {
    /// Path to the database file (default: .wordlink/wordlink.db in current dir)
    #[arg(long, env = "WORDLINK_DB", global = true)]
    db: Option<PathBuf>,

    /// Output as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log filter used when RUST_LOG is unset (e.g. info, wordlink=debug)
    #[arg(long, env = "WORDLINK_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a wordlink database
    Init {
        /// Number of words in each generated short path
        #[arg(long, default_value_t = DEFAULT_WORD_COUNT as u32)]
        words: u32,
        /// Fresh allocation rounds after losing an insert race (0 = report conflict at once)
        #[arg(long, default_value_t = DEFAULT_CONFLICT_RETRIES)]
        conflict_retries: u32,
    },
    /// Shorten a URL
    Shorten {
        /// URL to shorten (any non-empty string is accepted)
        url: String,
    },
    /// Print the URL stored under a short path
    Resolve {
        /// Short path, with or without the /go/ prefix
        short_path: String,
    },
    /// List the most recently created links
    List {
        /// Maximum number of links to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Run the HTTP service
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();
    wordlink::logging::init(&cli.log_level);

    let db_path = cli.db.unwrap_or_else(|| {
        let mut p = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        p.push(".wordlink");
        p.push("wordlink.db");
        p
    });

    let result = match cli.command {
        Commands::Init {
            words,
            conflict_retries,
        } => commands::init::run(&db_path, words, conflict_retries),
        Commands::Shorten { url } => commands::shorten::run(&db_path, &url, cli.json),
        Commands::Resolve { short_path } => commands::resolve::run(&db_path, &short_path, cli.json),
        Commands::List { limit } => commands::list::run(&db_path, limit, cli.json),
        Commands::Serve { host, port } => commands::serve::run(&db_path, &host, port),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
