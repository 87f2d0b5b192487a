use anyhow::Result;
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use std::sync::Arc;

use m365_agent::agent::{Agent, AgentConfig, ESCALATION_PHRASE};
use m365_agent::graph::auth::GraphAuth;
use m365_agent::graph::client::GraphClient;
use m365_agent::providers::configs::{OpenAiProviderConfig, ProviderConfig};
use m365_agent::providers::openai::OpenAiProvider;
use m365_agent::systems::calendar::CalendarSystem;
use m365_agent::systems::drive::DriveSystem;
use m365_agent::systems::mail::MailSystem;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenAI API Key (can also be set via OPENAI_API_KEY environment variable)
    #[arg(short, long)]
    api_key: Option<String>,

    /// Model to use (overrides OPENAI_MODEL)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "m365_agent=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut provider_config = OpenAiProviderConfig::from_env()?;
    if let Some(api_key) = cli.api_key {
        provider_config.api_key = api_key;
    }
    if let Some(model) = cli.model {
        provider_config.model = model;
    }
    let provider = OpenAiProvider::new(provider_config)?;

    let graph = Arc::new(GraphClient::new(GraphAuth::from_env()?)?);

    let agent_config = AgentConfig::from_env();
    let supervisor_email = agent_config.supervisor_email.clone();

    let mut agent = Agent::new(Box::new(provider), &agent_config)?;
    agent.add_system(Box::new(MailSystem::new(
        graph.clone(),
        agent_config.mailbox.clone(),
    )));
    agent.add_system(Box::new(CalendarSystem::new(graph.clone())));
    agent.add_system(Box::new(DriveSystem::new(graph)));

    let mut transcript = agent.new_transcript();

    println!(
        "Microsoft 365 agent {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!("\n");

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;

        if message_text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spin = spinner();
        spin.start("awaiting reply");

        let reply = agent.process_message(&mut transcript, &message_text).await;

        spin.stop("");

        render(&reply);
        if reply.contains(ESCALATION_PHRASE) {
            println!(
                "{}",
                style(format!("(Automatic escalation to {})", supervisor_email)).dim()
            );
        }
        println!("\n");
    }
    Ok(())
}

fn render(content: &str) {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .unwrap();
}
