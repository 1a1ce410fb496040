//! tvdb - command-line front end for TheTVDB API.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use url::Url;

use crate::config::{AppConfig, resolve_config_path};
#[cfg(feature = "keyring")]
use tvdb_api::KeyringCredentials;
use tvdb_api::{ChainedCredentials, EnvCredentials, LocalTvdbApi, Show, ShowStatus, TvdbClient};

/// Keychain service name the secrets are stored under.
#[cfg(feature = "keyring")]
const KEYRING_SERVICE: &str = "tvdb";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Login secrets (fall back to config, `LIBTVDB_*` env vars, then keychain).
    #[command(flatten)]
    credentials: CredentialArgs,

    /// Per-request timeout in seconds (default: config or 10).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Login secrets given on the command line.
#[derive(clap::Args)]
struct CredentialArgs {
    /// TVDB API key.
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// TVDB user key.
    #[arg(long, global = true)]
    user_key: Option<String>,
    /// TVDB user name.
    #[arg(long, global = true)]
    user_name: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search series by name.
    Search(SearchArgs),
    /// Show the details of one series.
    Show(SeriesArgs),
    /// List the actors of one series.
    Actors(SeriesArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Series name (e.g. "Game of Thrones").
    #[arg(long, required = true)]
    name: String,
}

/// Arguments for the `show` and `actors` subcommands.
#[derive(clap::Args)]
struct SeriesArgs {
    /// TVDB series ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the config file path.
    Path,
    /// Write a default config file if none exists.
    Init,
}

/// Builds the API client from flags, config, environment and keychain.
///
/// # Errors
///
/// Returns an error if the base URL is invalid, a secret cannot be resolved,
/// or the client fails to build.
#[instrument(skip_all)]
fn build_tvdb_client(args: &CredentialArgs, config: &AppConfig) -> Result<TvdbClient> {
    let sources = ChainedCredentials::new()
        .with(config.credentials.clone())
        .with(EnvCredentials);
    #[cfg(feature = "keyring")]
    let sources = sources.with(KeyringCredentials::new(KEYRING_SERVICE));

    let mut builder = TvdbClient::builder()
        .credential_source(sources)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

    if let Some(key) = &args.api_key {
        builder = builder.api_key(key);
    }
    if let Some(key) = &args.user_key {
        builder = builder.user_key(key);
    }
    if let Some(name) = &args.user_name {
        builder = builder.user_name(name);
    }
    if let Some(raw) = &config.tvdb.base_url {
        let url = Url::parse(raw).with_context(|| format!("invalid base_url: {raw}"))?;
        builder = builder.base_url(url);
    }
    if let Some(timeout) = config.tvdb.auth_timeout() {
        builder = builder.auth_timeout(timeout);
    }

    builder.build().context("failed to build TVDB client")
}

/// Resolves the per-request timeout: flag, then config, then default.
fn request_timeout(flag: Option<u64>, config: &AppConfig) -> Duration {
    flag.map_or_else(|| config.tvdb.timeout(), Duration::from_secs)
}

/// Loads the config and builds a client plus the request timeout.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the client fails to build.
fn connect(
    args: &CredentialArgs,
    dir: Option<&PathBuf>,
    timeout: Option<u64>,
) -> Result<(TvdbClient, Duration)> {
    let config = AppConfig::load(&resolve_config_path(dir)?)?;
    let client = build_tvdb_client(args, &config)?;
    Ok((client, request_timeout(timeout, &config)))
}

/// Renders an optional field for tabular output.
fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, mut client: TvdbClient, timeout: Duration) -> Result<()> {
    let shows = client
        .search_show(Some(&args.name), timeout)
        .await
        .context("TVDB series search failed")?;

    tracing::info!("Total: {} shows", shows.len());
    tracing::info!("ID\tName\t\t\tFirstAired\tNetwork\tStatus");
    for show in &shows {
        tracing::info!(
            "{}\t{}\t{}\t{}\t{}",
            show.identifier,
            or_dash(show.name.as_deref()),
            show.first_aired
                .map_or_else(|| String::from("-"), |d| d.to_string()),
            or_dash(show.network.as_deref()),
            or_dash(show.status.as_ref().map(ShowStatus::as_str)),
        );
    }

    Ok(())
}

/// Logs the details of one show.
fn print_show(show: &Show) {
    tracing::info!("ID: {}", show.identifier);
    tracing::info!("Name: {}", or_dash(show.name.as_deref()));
    tracing::info!("Slug: {}", or_dash(show.slug.as_deref()));
    if !show.aliases.is_empty() {
        tracing::info!("Aliases: {}", show.aliases.join(", "));
    }
    tracing::info!(
        "First Aired: {}",
        show.first_aired
            .map_or_else(|| String::from("-"), |d| d.to_string())
    );
    tracing::info!("Network: {}", or_dash(show.network.as_deref()));
    tracing::info!(
        "Status: {}",
        or_dash(show.status.as_ref().map(ShowStatus::as_str))
    );
    if let Some(runtime) = show.runtime {
        tracing::info!("Runtime: {runtime} min");
    }
    if !show.genres.is_empty() {
        tracing::info!("Genres: {}", show.genres.join(", "));
    }
    tracing::info!(
        "Airs: {} {}",
        or_dash(show.airs_day_of_week.as_deref()),
        or_dash(show.airs_time.as_deref())
    );
    tracing::info!("Rating: {}", or_dash(show.rating.as_deref()));
    tracing::info!("IMDb: {}", or_dash(show.imdb_identifier.as_deref()));
    if let Some(rating) = show.site_rating {
        tracing::info!(
            "Site Rating: {rating} ({} votes)",
            show.site_rating_count.unwrap_or(0)
        );
    }
    if let Some(updated) = show.last_updated {
        tracing::info!("Last Updated: {updated}");
    }
    if let Some(overview) = &show.overview {
        tracing::info!("Overview: {overview}");
    }
}

/// Runs the `show` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_show(args: &SeriesArgs, mut client: TvdbClient, timeout: Duration) -> Result<()> {
    let show = client
        .show_info(args.id, timeout)
        .await
        .with_context(|| format!("TVDB series request failed for id {}", args.id))?;

    print_show(&show);
    Ok(())
}

/// Runs the `actors` subcommand.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip_all)]
async fn run_actors(args: &SeriesArgs, mut client: TvdbClient, timeout: Duration) -> Result<()> {
    let mut actors = client
        .actors_from_show_id(args.id, timeout)
        .await
        .with_context(|| format!("TVDB actors request failed for id {}", args.id))?;
    actors.sort_by_key(|actor| actor.sort_order);

    tracing::info!("Total: {} actors", actors.len());
    tracing::info!("ID\tSortOrder\tName\t\t\tRole");
    for actor in &actors {
        tracing::info!(
            "{}\t{}\t\t{}\t{}",
            actor.identifier,
            actor.sort_order,
            actor.name,
            actor.role,
        );
    }

    Ok(())
}

/// Runs the `config path` subcommand.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved.
fn run_config_path(dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    tracing::info!("{}", path.display());
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or written.
fn run_config_init(dir: Option<&PathBuf>) -> Result<()> {
    let path = resolve_config_path(dir)?;
    if path.exists() {
        tracing::info!("Config already exists: {}", path.display());
        return Ok(());
    }

    AppConfig::default().save(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let Cli {
        dir,
        credentials,
        timeout,
        command,
    } = Cli::parse();
    let dir = dir.as_ref();

    match command {
        Commands::Search(args) => {
            let (client, timeout) = connect(&credentials, dir, timeout)?;
            run_search(&args, client, timeout).await
        }
        Commands::Show(args) => {
            let (client, timeout) = connect(&credentials, dir, timeout)?;
            run_show(&args, client, timeout).await
        }
        Commands::Actors(args) => {
            let (client, timeout) = connect(&credentials, dir, timeout)?;
            run_actors(&args, client, timeout).await
        }
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Path => run_config_path(dir),
            ConfigSubcommands::Init => run_config_init(dir),
        },
    }
}
