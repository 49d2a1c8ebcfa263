use anyhow::{Context, Result};
use clap::Parser;
use sentiment_client::{
    report, validation, ApiClient, Endpoint, Explanation, Outcome, Prediction, DEFAULT_BASE_URL,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// sentiment - query a sentiment-analysis API from the terminal
///
/// Texts are checked locally before they are sent: at most 280 characters
/// and at least one letter or digit.
///
/// Examples:
///   sentiment health
///   sentiment predict "J'adore ce produit"
///   sentiment explain-lime "Service déplorable" --html-out lime.html
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the API
    #[arg(
        long = "api-url",
        env = "API_BASE_URL",
        value_name = "URL",
        default_value = DEFAULT_BASE_URL,
        global = true
    )]
    api_url: String,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check that the API is up and show the loaded model
    Health,

    /// Predict the sentiment of one text
    Predict(TextArgs),

    /// Explain a prediction with LIME (can take 30-60 s)
    ExplainLime(ExplainLimeArgs),

    /// Predict several texts in one request
    PredictBatch(BatchArgs),

    /// Call the plain explanation endpoint
    Explain(TextArgs),

    /// Print sample texts
    Samples,
}

#[derive(clap::Args, Debug)]
struct TextArgs {
    /// The text to analyse
    #[arg(value_name = "TEXT")]
    text: String,
}

#[derive(clap::Args, Debug)]
struct ExplainLimeArgs {
    /// The text to analyse
    #[arg(value_name = "TEXT")]
    text: String,

    /// Write the HTML visualization to this file
    #[arg(long = "html-out", value_name = "PATH")]
    html_out: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct BatchArgs {
    /// The texts to analyse
    #[arg(value_name = "TEXT", required = true)]
    texts: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Samples = cli.command {
        for sample in report::SAMPLE_TEXTS {
            println!("{}", sample);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let client = ApiClient::builder()
        .base_url(&cli.api_url)
        .with_context(|| format!("invalid API base URL: {}", cli.api_url))?
        .default_header("User-Agent", concat!("sentiment/", env!("CARGO_PKG_VERSION")))?
        .build()?;

    match cli.command {
        Commands::Health => health(&client).await,
        Commands::Predict(args) => predict(&client, &args.text).await,
        Commands::ExplainLime(args) => explain_lime(&client, &args).await,
        Commands::PredictBatch(args) => {
            let result = client.predict_batch(args.texts).await;
            print_json("predict", Outcome::from_result(Endpoint::PredictBatch, result))
        }
        Commands::Explain(args) => {
            if let Some(code) = refuse_invalid(&args.text) {
                return Ok(code);
            }
            let result = client.explain(args.text).await;
            print_json("explain", Outcome::from_result(Endpoint::Explain, result))
        }
        Commands::Samples => Ok(ExitCode::SUCCESS),
    }
}

async fn health(client: &ApiClient) -> Result<ExitCode> {
    println!("API: {}", client.base_url());
    match client.health().await {
        Ok(response) => {
            print!("{}", report::render_health(&response.data));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("API DOWN: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn predict(client: &ApiClient, text: &str) -> Result<ExitCode> {
    if let Some(code) = refuse_invalid(text) {
        return Ok(code);
    }

    let started = Instant::now();
    let outcome = match client.predict_one(text).await {
        Ok(envelope) => envelope.classify::<Prediction>(),
        Err(e) => Err(e),
    };

    finish("predict", outcome, |prediction| {
        print!("{}", report::render_prediction(&prediction, started.elapsed()));
        Ok(())
    })
}

async fn explain_lime(client: &ApiClient, args: &ExplainLimeArgs) -> Result<ExitCode> {
    if let Some(code) = refuse_invalid(&args.text) {
        return Ok(code);
    }

    eprintln!("Generating LIME explanation...");
    let outcome = match client.explain_lime(args.text.as_str()).await {
        Ok(envelope) => envelope.classify::<Explanation>(),
        Err(e) => Err(e),
    };

    finish("LIME", outcome, |explanation| {
        print!("{}", report::render_explanation(&explanation));
        if let Some(path) = &args.html_out {
            std::fs::write(path, &explanation.html_explanation)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("HTML explanation written to {}", path.display());
        }
        Ok(())
    })
}

fn print_json(
    operation: &str,
    outcome: sentiment_client::Result<Outcome<serde_json::Value>>,
) -> Result<ExitCode> {
    finish(operation, outcome, |payload| {
        println!("{}", serde_json::to_string_pretty(&payload)?);
        Ok(())
    })
}

/// Prints the counter and, for an invalid text, the reason; returns the exit code to use.
fn refuse_invalid(text: &str) -> Option<ExitCode> {
    eprintln!("{}", report::render_char_counter(text));
    match validation::validate_text(text) {
        Ok(()) => None,
        Err(e) => {
            eprintln!("Cannot submit: {}", e);
            Some(ExitCode::from(2))
        }
    }
}

fn finish<T>(
    operation: &str,
    outcome: sentiment_client::Result<Outcome<T>>,
    on_success: impl FnOnce(T) -> Result<()>,
) -> Result<ExitCode> {
    match outcome {
        Ok(Outcome::Success(data)) => {
            on_success(data)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(other) => {
            if let Some(message) = report::render_failure(operation, &other) {
                eprintln!("{}", message);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("{}", report::render_error(operation, &e));
            Ok(ExitCode::FAILURE)
        }
    }
}
