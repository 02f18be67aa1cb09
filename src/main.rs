use anyhow::Context;
use relay::{
    AppState, RelayConfig, RelayConfigManager,
    agents::AgentRegistry,
    api::routes::create_app,
    cli::{Cli, Commands, output::Output},
    utils::toml_config::{LogFormat, ProviderConfig},
};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        None => serve(&cli, &output).await,
        Some(Commands::Agents) => probe_agents(&cli, &output).await,
        Some(Commands::Config { full, validate }) => show_config(&cli, &output, full, validate),
    }
}

fn init_tracing(level: &str, format: LogFormat, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", level)));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn serve(cli: &Cli, output: &Output) -> anyhow::Result<()> {
    let config_manager = Arc::new(
        RelayConfigManager::new(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config.display()))?,
    );
    let config = config_manager.config();

    init_tracing(
        &config.server.log_level,
        config.server.log_format,
        cli.verbose,
    );
    output.banner();

    let state = AppState::from_config(Arc::clone(&config_manager))?;

    let report = state.registry.discover(&config.agents).await;
    if report.registered.is_empty() {
        tracing::warn!("No remote agents registered; every query will fail until one comes up");
    }

    if let Err(e) = config_manager.start_watching() {
        tracing::warn!("Config hot-reload disabled: {}", e);
    }
    spawn_rediscovery(&config_manager, Arc::clone(&state.registry));

    let app = create_app(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Relay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    config_manager.stop_watching();
    tracing::info!("Relay stopped");
    Ok(())
}

/// Register agents added to the config file while the server runs
fn spawn_rediscovery(config_manager: &RelayConfigManager, registry: Arc<AgentRegistry>) {
    let mut updates = config_manager.subscribe();

    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let config = Arc::clone(&updates.borrow_and_update());
            tracing::info!("Configuration changed; re-running agent discovery");
            registry.discover(&config.agents).await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

async fn probe_agents(cli: &Cli, output: &Output) -> anyhow::Result<()> {
    let config = RelayConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing("warn", config.server.log_format, cli.verbose);

    let http = relay::a2a::build_http_client(config.server.timeout())?;
    let registry = AgentRegistry::new(http, config.relay.card_path.clone());

    output.header("Remote Agents");
    if config.agents.is_empty() {
        output.warning("No agents configured");
        output.hint("Add an [agents.<key>] table with host and port to the config file");
        return Ok(());
    }

    output.info(&format!(
        "Fetching agent cards from {} endpoint(s)",
        config.agents.len()
    ));
    let report = registry.discover(&config.agents).await;

    output.newline();
    output.table_header(&["Name", "URL", "Streaming"]);
    for agent in registry.agents() {
        let streaming = if agent.streaming { "yes" } else { "no" };
        output.table_row(&[
            agent.summary.name.as_str(),
            agent.summary.url.as_str(),
            streaming,
        ]);
    }
    output.newline();

    for failure in &report.failed {
        output.error(&failure.to_string());
    }

    if report.is_complete() {
        output.success(&format!("{} agent(s) reachable", report.registered.len()));
    } else {
        output.warning(&format!(
            "{} of {} agent(s) reachable",
            report.registered.len(),
            config.agents.len()
        ));
    }

    Ok(())
}

fn show_config(cli: &Cli, output: &Output, full: bool, validate: bool) -> anyhow::Result<()> {
    let config = match RelayConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("{}: {}", cli.config.display(), e));
            if validate {
                std::process::exit(1);
            }
            return Err(e.into());
        }
    };

    if validate {
        output.success(&format!("{} is valid", cli.config.display()));
        if !full {
            return Ok(());
        }
    }

    output.header("Server");
    output.kv("address", &config.bind_address());
    output.kv("timeout", &format!("{}s", config.server.timeout_secs));
    output.kv("log level", &config.server.log_level);

    output.header("Selector");
    match &config.selector.provider {
        ProviderConfig::Ollama { base_url, model } => {
            output.kv("provider", "ollama");
            output.kv("base url", base_url);
            output.kv("model", model);
        }
        ProviderConfig::OpenAI {
            api_key_env,
            api_base,
            model,
        } => {
            output.kv("provider", "openai");
            output.kv("api base", api_base);
            output.kv("api key env", api_key_env);
            output.kv("model", model);
        }
    }
    if full {
        for rule in &config.selector.rules {
            output.list_item(&format!("{} → {}", rule.category, rule.agent));
        }
    }

    output.header("Agents");
    for (key, agent) in &config.agents {
        if full && !agent.description.is_empty() {
            output.list_item(&format!("{} ({}): {}", key, agent.url(), agent.description));
        } else {
            output.list_item(&format!("{} ({})", key, agent.url()));
        }
    }

    if full {
        output.header("Relay");
        output.kv(
            "processing placeholder",
            if config.relay.emit_processing_placeholder {
                "on"
            } else {
                "off"
            },
        );
        output.kv("card path", &config.relay.card_path);
    }

    Ok(())
}
