//! sreagent command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use sreagent_agent::{
    AgentFactory, AgentKind, AgentMemory, ConversationState, CoordinatorAgent,
    SpecializationRegistry, ToolContext, ToolInvoker,
};
use sreagent_config::{self, CompletionKind, Config};
use sreagent_provider::openai::OpenAiProvider;
use sreagent_provider::{CompletionOptions, Provider};

const AGENT_LABEL: &str = "Azure Support Agent";
const GREETING: &str = "How can I help you with your application today?";

/// Initialize config
pub async fn init_command() -> Result<()> {
    println!("◆ Initializing sreagent...");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    sreagent_config::init().await?;

    println!("\n◆ sreagent initialized");
    println!("\nNext steps:");
    println!("  1. Add your completion API key to ~/.sreagent/config.json");
    println!("     (or export SREAGENT_API_KEY)");
    println!("  2. Add azure.subscription_id and azure.access_token to let tools read and change resources");
    println!("  3. Start a session: sreagent chat");

    Ok(())
}

/// Show configuration status
pub async fn status_command() -> Result<()> {
    let config_path = sreagent_config::config_path();
    let patterns_path = sreagent_config::paths::patterns_path();

    println!("◆ sreagent Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!(
        "Config:       {} {}",
        config_path.display(),
        if config_path.exists() { "[OK]" } else { "[Missing]" }
    );

    if config_path.exists() {
        let config = Config::load().await?;
        let kind = match config.completion.kind {
            CompletionKind::OpenAi => "openai",
            CompletionKind::Azure => "azure",
        };
        println!("Completion:   {}", kind);
        println!("Model:        {}", config.model());
        println!("API Key:      {}", set_or_missing(config.has_api_key()));
        println!(
            "Subscription: {}",
            set_or_missing(config.subscription_id().is_some())
        );
        println!(
            "ARM Token:    {}",
            set_or_missing(config.access_token().is_some())
        );

        let patterns = config.patterns_file().unwrap_or(patterns_path);
        println!(
            "Patterns:     {} {}",
            patterns.display(),
            if patterns.exists() { "[OK]" } else { "[Built-in only]" }
        );
    }

    println!("\n◆ Ready");

    Ok(())
}

fn set_or_missing(present: bool) -> &'static str {
    if present {
        "[Set]"
    } else {
        "[Missing]"
    }
}

/// List troubleshooting patterns for a category
pub async fn patterns_command(category: String) -> Result<()> {
    let config = Config::load().await?;
    let memory = load_memory(&config).await?;

    let patterns = memory.get(&category);
    if patterns.is_empty() {
        println!("No patterns for '{}'", category);
        println!("Known categories: {}", memory.categories().join(", "));
        return Ok(());
    }

    println!("◆ {} patterns", category.trim().to_lowercase());
    for pattern in patterns {
        println!("  - {}", pattern);
    }

    Ok(())
}

/// List the tools each specialization can run
pub async fn tools_command(category: Option<String>) -> Result<()> {
    let config = Config::load().await?;
    let registry = SpecializationRegistry::builtin(&ToolContext::from_config(&config));

    let names = match category {
        Some(category) => vec![registry.resolve(&category).name().to_string()],
        None => registry.names(),
    };

    for name in names {
        let specialization = registry.resolve(&name);
        println!("◆ {}", specialization.name());
        println!("{}\n", specialization.tools().describe());
    }

    Ok(())
}

/// Talk to the support agent
pub async fn chat_command(message: Option<String>) -> Result<()> {
    let config = Config::load().await?;
    let coordinator = build_coordinator(&config).await?;
    let mut state = ConversationState::new();
    info!("◆ Session {} started", state.id());

    if let Some(msg) = message {
        let reply = coordinator.process(&msg, &mut state).await;
        println!("{}: {}", AGENT_LABEL, reply);
        return Ok(());
    }

    println!("{}: {}", AGENT_LABEL, GREETING);

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = coordinator.process(input, &mut state).await;
        println!("\n{}: {}\n", AGENT_LABEL, reply);
    }

    info!("◆ Session {} ended", state.id());
    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let api_key = config.api_key().context(
        "No API key configured. Set completion.api_key in ~/.sreagent/config.json or export SREAGENT_API_KEY",
    )?;

    let provider = match config.completion.kind {
        CompletionKind::OpenAi => OpenAiProvider::new(api_key, config.api_base(), Some(config.model())),
        CompletionKind::Azure => {
            let endpoint = config
                .api_base()
                .context("Azure completion needs completion.api_base set to the resource endpoint")?;
            OpenAiProvider::azure(
                api_key,
                endpoint,
                config.model(),
                config.completion.api_version.clone(),
            )
        }
    };
    Ok(Arc::new(provider))
}

/// Built-in patterns with the configured pattern file merged over them
async fn load_memory(config: &Config) -> Result<AgentMemory> {
    let mut memory = AgentMemory::builtin();

    match config.patterns_file() {
        Some(path) => memory
            .merge_file(&path)
            .await
            .with_context(|| format!("Failed to load patterns from {}", path.display()))?,
        None => {
            let path = sreagent_config::paths::patterns_path();
            if path.exists() {
                if let Err(e) = memory.merge_file(&path).await {
                    warn!("◆ Ignoring {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(memory)
}

async fn build_coordinator(config: &Config) -> Result<CoordinatorAgent> {
    let provider = build_provider(config)?;
    let memory = Arc::new(load_memory(config).await?);
    let registry = Arc::new(SpecializationRegistry::builtin(&ToolContext::from_config(config)));
    let invoker = ToolInvoker::new(Duration::from_secs(config.agent.tool_timeout_secs));

    let specialist_options = CompletionOptions {
        model: config.model(),
        temperature: config.agent.temperature,
        max_tokens: config.agent.max_tokens,
        timeout: Duration::from_secs(config.agent.completion_timeout_secs),
    };
    let coordinator_options = CompletionOptions {
        temperature: config.agent.coordinator_temperature,
        ..specialist_options.clone()
    };

    let factory = |kind: AgentKind| {
        Arc::new(AgentFactory::new(
            kind,
            registry.clone(),
            provider.clone(),
            memory.clone(),
            invoker.clone(),
            specialist_options.clone(),
        ))
    };
    let diagnostic = factory(AgentKind::Diagnostic);
    let mitigation = factory(AgentKind::Mitigation);

    Ok(CoordinatorAgent::new(
        provider,
        registry,
        diagnostic,
        mitigation,
        coordinator_options,
    ))
}
