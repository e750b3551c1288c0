//! FAQ Bot — chat front-end for a hosted LLM with search-link augmentation.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use faqbot_chat::{GenerationConfig, InferenceClient, InferenceConfig, Responder, EXAMPLE_PROMPTS};
use faqbot_core::FaqBotConfig;

mod routes;
mod state;

use state::AppState;

fn build_responder(inference: &InferenceConfig) -> anyhow::Result<Responder> {
    let client = InferenceClient::new(inference.clone())?;
    Ok(Responder::new(Arc::new(client)))
}

fn print_help() {
    println!("FAQ Bot — chat front-end for a hosted LLM");
    println!();
    println!("Usage: faqbot [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve           Start the server");
    println!("  ask <message...>         Answer one message and print the reply");
    println!("  help                     Show this help message");
    println!();
    println!("Environment:");
    println!("  PORT, FAQBOT_HOST        Listen address (default 0.0.0.0:7860)");
    println!("  FAQBOT_INFERENCE_URL     Inference API base URL");
    println!("  FAQBOT_MODEL             Model id (default HuggingFaceH4/zephyr-7b-beta)");
    println!("  HF_TOKEN                 Inference API token");
    println!("  RUST_LOG                 Log filter (default info)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "ask" => {
                let message = if args.len() > 2 {
                    args[2..].join(" ")
                } else {
                    EXAMPLE_PROMPTS[0].to_string()
                };
                let responder = build_responder(&InferenceConfig::load()?)?;
                let output = responder
                    .respond(&message, &[], &GenerationConfig::default())
                    .await;
                println!("{}", output);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'faqbot help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let config = FaqBotConfig::from_env()?;
    let inference = InferenceConfig::load()?;
    let responder = build_responder(&inference)?;
    let addr = config.bind_addr();

    let state = Arc::new(AppState::new(inference, responder));

    // Build router
    let app = routes::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("FAQ Bot server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
