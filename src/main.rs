use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billdesk::{
  adapters::{Cli, CliDependencies, cli},
  domain::document::{
    SessionFactory, SessionPorts, SessionSettings, StackedTaxCalculator, TotalsCalculator,
  },
  domain::recents::{RecentsRepository, RecentsService},
  infrastructure::{
    api::{
      ApiClient, HttpCounterApi, HttpDocumentRecordsApi, HttpDocumentRenderer,
      HttpProjectArchiveApi, HttpTotalsCalculator,
    },
    assets::FileLogoSource,
    config::Config,
    output::FileArtifactSink,
    persistence::{InMemoryRecentsRepository, JsonFileRecentsRepository},
    render::TeraMarkupRenderer,
  },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Logs go to stderr so command output on stdout stays machine readable
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billdesk=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let args = Cli::parse();

  let config = Config::load().context("Failed to load configuration")?;
  tracing::debug!("Configuration loaded, backend at {}", config.api.base_url);

  let levies = config
    .taxes
    .levies()
    .context("Invalid levy configuration")?;

  let api = ApiClient::new(config.api.base_url.clone(), config.api.timeout())
    .context("Failed to build HTTP client")?;

  let calculator: Arc<dyn TotalsCalculator> = if config.totals.remote {
    let levy_order = levies.iter().map(|levy| levy.name().to_string()).collect();
    Arc::new(HttpTotalsCalculator::new(api.clone(), levy_order))
  } else {
    tracing::info!("Remote totals disabled, reconciling in process");
    Arc::new(StackedTaxCalculator::new(levies.clone()))
  };

  let recents_repository: Arc<dyn RecentsRepository> = if config.recents.persist {
    Arc::new(JsonFileRecentsRepository::new(config.recents_path()))
  } else {
    Arc::new(InMemoryRecentsRepository::new())
  };
  let recents = Arc::new(RecentsService::new(
    recents_repository,
    config.recents.max_entries,
  ));

  let markup = TeraMarkupRenderer::new().context("Failed to load document templates")?;

  let ports = SessionPorts {
    counter: Arc::new(HttpCounterApi::new(api.clone())),
    calculator: Some(calculator),
    markup: Arc::new(markup),
    renderer: Arc::new(HttpDocumentRenderer::new(api.clone())),
    sink: Arc::new(FileArtifactSink::new(config.export.output_dir.clone())),
    assets: Arc::new(FileLogoSource::new(config.export.logo_path.clone())),
    records: Arc::new(HttpDocumentRecordsApi::new(api.clone())),
    recents,
  };
  let settings = SessionSettings {
    levies,
    debounce: config.totals.debounce(),
    currency_symbol: config.totals.currency_symbol.clone(),
  };
  let sessions = Arc::new(SessionFactory::new(ports, settings));
  let archive = Arc::new(HttpProjectArchiveApi::new(api));

  let deps = CliDependencies::new(sessions, archive);
  let code = cli::run(args.command, &deps).await;

  std::process::exit(code);
}
