use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod util;

use commands::quiz::QuizCommands;
use commands::recommend::RecommendCommands;
use commands::{questions, quiz, recommend, schema};
use util::{exit_error, load_questions};

#[derive(Parser)]
#[command(
    name = "wealthpath",
    version,
    about = "WealthPath CLI — risk quiz scoring and plan/bucket recommendations"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "WEALTHPATH_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Bearer token for listing endpoints
    #[arg(long, env = "WEALTHPATH_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Question bank override (JSON array of {text, name, options})
    #[arg(long, env = "WEALTHPATH_QUESTIONS_FILE")]
    questions_file: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the risk question bank
    Questions,
    /// Risk quiz scoring, completeness and restore
    Quiz {
        #[command(subcommand)]
        command: QuizCommands,
    },
    /// Plan and bucket recommendation
    Recommend {
        #[command(subcommand)]
        command: RecommendCommands,
    },
    /// Print the JSON schemas of emitted payloads
    Schema,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wealthpath=info,wealthpath_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let code = match cli.command {
        Commands::Questions => {
            let bank = load_questions(cli.questions_file.as_deref())
                .unwrap_or_else(|e| exit_error(&e, Some("Check WEALTHPATH_QUESTIONS_FILE.")));
            questions::run(&bank)
        }
        Commands::Quiz { command } => {
            let bank = load_questions(cli.questions_file.as_deref())
                .unwrap_or_else(|e| exit_error(&e, Some("Check WEALTHPATH_QUESTIONS_FILE.")));
            quiz::run(&bank, command)
        }
        Commands::Recommend { command } => {
            recommend::run(&cli.api_url, cli.api_token.as_deref(), command).await
        }
        Commands::Schema => schema::run(),
    };

    std::process::exit(code);
}
