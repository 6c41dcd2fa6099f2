//! Blood Donation Service Operator CLI

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bd-admin")]
#[command(about = "Operator tooling for the blood donation coordination service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the API server
    #[arg(long, global = true, default_value = "http://localhost:5000")]
    api: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset the blood inventory to the standard seed values
    Seed,

    /// Broadcast a notification to all connected clients
    Broadcast {
        /// Notification message
        #[arg(short, long)]
        message: String,

        /// Notification type (general, emergency, announcement, reminder)
        #[arg(short = 't', long, default_value = "general")]
        category: String,
    },

    /// Print the inventory forecast
    Forecast {
        /// Forecast horizon in days
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },

    /// List active notifications
    Notifications,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let client = reqwest::Client::new();

    let result = match cli.command {
        Commands::Seed => {
            post_json(
                &client,
                &format!("{}/api/ai/inventory/seed", cli.api),
                serde_json::json!({}),
            )
            .await
        }
        Commands::Broadcast { message, category } => {
            post_json(
                &client,
                &format!("{}/api/notify/send", cli.api),
                serde_json::json!({ "message": message, "type": category }),
            )
            .await
        }
        Commands::Forecast { days } => {
            get_json(
                &client,
                &format!("{}/api/ai/inventory/predict?days={}", cli.api, days),
            )
            .await
        }
        Commands::Notifications => {
            get_json(&client, &format!("{}/api/notify/all", cli.api)).await
        }
    };

    match result {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value, reqwest::Error> {
    client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

async fn post_json(
    client: &reqwest::Client,
    url: &str,
    body: serde_json::Value,
) -> Result<serde_json::Value, reqwest::Error> {
    client
        .post(url)
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}
