//! Mini Sentry CLI
//!
//! Console for the Mini Sentry error-tracking backend: lists projects,
//! issues, events, releases, deployments, and alert rules; reproduces
//! dashboard deep links; and sends test events through the capture SDK.
//!
//! # Usage
//!
//! ```bash
//! minisentry projects
//! minisentry --project my-app events --level error --range 30m
//! minisentry link '#view=events&project=my-app&offset=40'
//! minisentry capture --token tok-123 "test event"
//! ```

#![deny(unsafe_code)]

use anyhow::{ensure, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::{fetch_snapshot, ApiClient, EventQuery, Sdk, SdkConfig};
use shared::models::Level;
use shared::routing::{RoutingStore, Tab};
use shared::storage::FileSlugStore;
use shared::time::{resolve_window, CustomRange, TimeSelection};

/// Mini Sentry console - command-line interface for the error-tracking backend
#[derive(Parser)]
#[command(name = "minisentry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend API URL
    #[arg(
        short,
        long,
        env = "MINISENTRY_API_URL",
        default_value = "http://localhost:8000"
    )]
    api_url: String,

    /// File remembering the last selected project slug
    #[arg(
        long,
        env = "MINISENTRY_STATE_FILE",
        default_value = ".minisentry/last_project"
    )]
    state_file: String,

    /// Project slug; defaults to the remembered or first project
    #[arg(short, long, env = "MINISENTRY_PROJECT")]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects
    Projects,

    /// List issue groups for the selected project
    Issues,

    /// Query events for the selected project
    Events {
        /// Filter by level
        #[arg(long)]
        level: Option<Level>,

        /// Filter by environment
        #[arg(long)]
        env: Option<String>,

        /// Filter by release version
        #[arg(long)]
        release: Option<String>,

        /// Free-text search query
        #[arg(short, long)]
        query: Option<String>,

        /// Relative window such as 30m, 6h, 7d
        #[arg(long)]
        range: Option<String>,

        /// Absolute window start (ISO-8601, requires --to)
        #[arg(long)]
        from: Option<String>,

        /// Absolute window end (ISO-8601, requires --from)
        #[arg(long)]
        to: Option<String>,

        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// List releases, or create one
    Releases {
        /// Create a release with this version instead of listing
        #[arg(long)]
        create: Option<String>,
    },

    /// List deployments, or record one
    Deploys {
        /// Record a deployment of this release version instead of listing
        #[arg(long)]
        release: Option<String>,

        /// Target environment for --release
        #[arg(long, default_value = "production")]
        environment: String,
    },

    /// List alert rules, or toggle snooze state
    Rules {
        /// Snooze the rule with this id
        #[arg(long)]
        snooze: Option<u64>,

        /// Snooze duration in minutes
        #[arg(long, default_value_t = 60)]
        minutes: u32,

        /// Clear the snooze on the rule with this id
        #[arg(long)]
        unsnooze: Option<u64>,
    },

    /// Fetch the consolidated snapshot for the selected project
    Overview,

    /// Reproduce a dashboard deep link and fetch its view
    Link {
        /// The URL fragment, e.g. '#view=events&project=my-app&offset=40'
        fragment: String,
    },

    /// Send a test event through the capture SDK
    Capture {
        /// Project ingestion token
        #[arg(long, env = "MINISENTRY_TOKEN")]
        token: String,

        /// The event message
        message: String,

        /// Event level
        #[arg(long, default_value = "error")]
        level: Level,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new(cli.api_url.clone());
    let mut store = RoutingStore::new(FileSlugStore::new(&cli.state_file));

    match cli.command {
        Commands::Projects => {
            let projects = api.projects().await.context("Failed to list projects")?;
            print_json(&projects)?;
        }

        Commands::Issues => {
            let project = select_project(&api, &mut store, cli.project.as_deref()).await?;
            let groups = api
                .groups(&project)
                .await
                .context("Failed to list issue groups")?;
            print_json(&groups)?;
        }

        Commands::Events {
            level,
            env,
            release,
            query,
            range,
            from,
            to,
            limit,
            offset,
        } => {
            let project = select_project(&api, &mut store, cli.project.as_deref()).await?;

            store.set_tab(Tab::Events);
            store.set_filter_level(level);
            store.set_filter_env(env);
            store.set_filter_release(release);
            if let Some(q) = query {
                store.set_search(q);
            }
            if let Some(range) = range {
                let parsed = CustomRange::parse(&range)
                    .with_context(|| format!("Invalid range '{range}', expected e.g. 30m, 6h, 7d"))?;
                store.set_custom_range(Some(parsed));
            }
            if let Some(selection) = window_selection(from, to)? {
                store.set_time_selection(Some(selection));
            }
            store.set_limit(limit);
            store.set_offset(offset);

            let state = store.state();
            let window = resolve_window(
                state.time_selection.as_ref(),
                state.custom_range.as_ref(),
                &state.range,
                Utc::now(),
            );
            let mut events_query = EventQuery::new()
                .with_window(window)
                .with_page(state.event_limit, state.event_offset);
            if let Some(level) = state.filter_level {
                events_query = events_query.with_level(level.to_string());
            }
            if let Some(env) = &state.filter_env {
                events_query = events_query.with_environment(env.clone());
            }
            if let Some(release) = &state.filter_release {
                events_query = events_query.with_release(release.clone());
            }
            if !state.search.is_empty() {
                events_query = events_query.with_search(state.search.clone());
            }

            let page = api
                .events(&project, &events_query)
                .await
                .context("Failed to query events")?;
            eprintln!("deep link: {}", store.fragment());
            print_json(&page)?;
        }

        Commands::Releases { create } => {
            let project = select_project(&api, &mut store, cli.project.as_deref()).await?;
            if let Some(version) = create {
                let release = api
                    .create_release(&project, &version)
                    .await
                    .context("Failed to create release")?;
                print_json(&release)?;
            } else {
                let releases = api
                    .releases(&project)
                    .await
                    .context("Failed to list releases")?;
                print_json(&releases)?;
            }
        }

        Commands::Deploys {
            release,
            environment,
        } => {
            let project = select_project(&api, &mut store, cli.project.as_deref()).await?;
            if let Some(version) = release {
                let deploy = api
                    .create_deployment(&project, &version, &environment)
                    .await
                    .context("Failed to record deployment")?;
                print_json(&deploy)?;
            } else {
                let deploys = api
                    .deployments(&project)
                    .await
                    .context("Failed to list deployments")?;
                print_json(&deploys)?;
            }
        }

        Commands::Rules {
            snooze,
            minutes,
            unsnooze,
        } => {
            if let Some(id) = snooze {
                let rule = api
                    .snooze_rule(id, minutes)
                    .await
                    .context("Failed to snooze rule")?;
                print_json(&rule)?;
            } else if let Some(id) = unsnooze {
                let rule = api
                    .unsnooze_rule(id)
                    .await
                    .context("Failed to unsnooze rule")?;
                print_json(&rule)?;
            } else {
                let project = select_project(&api, &mut store, cli.project.as_deref()).await?;
                let rules = api
                    .alert_rules(&project)
                    .await
                    .context("Failed to list alert rules")?;
                print_json(&rules)?;
            }
        }

        Commands::Overview => {
            select_project(&api, &mut store, cli.project.as_deref()).await?;
            let snapshot = fetch_snapshot(&api, store.state(), Utc::now()).await;
            eprintln!("deep link: {}", store.fragment());
            print_json(&snapshot)?;
        }

        Commands::Link { fragment } => {
            store.hydrate(&fragment);
            let projects = api.projects().await.context("Failed to list projects")?;
            store.resolve_project(&projects);
            ensure!(
                store.state().selected_project.is_some(),
                "No projects available; create one first"
            );
            let snapshot = fetch_snapshot(&api, store.state(), Utc::now()).await;
            eprintln!("deep link: {}", store.fragment());
            print_json(&snapshot)?;
        }

        Commands::Capture {
            token,
            message,
            level,
        } => {
            let sdk = Sdk::init(SdkConfig::new(token, cli.api_url).with_app("minisentry-cli"));
            sdk.capture_message(message, level);
            sdk.close().await;
            println!("event queued and flushed");
        }
    }

    Ok(())
}

/// Applies the project-selection precedence: explicit flag, else the
/// remembered slug, else the first project.
async fn select_project(
    api: &ApiClient,
    store: &mut RoutingStore<FileSlugStore>,
    explicit: Option<&str>,
) -> Result<String> {
    let projects = api.projects().await.context("Failed to list projects")?;

    if let Some(slug) = explicit {
        ensure!(
            projects.iter().any(|p| p.slug == slug),
            "Unknown project '{slug}'"
        );
        store.select_project(slug);
    } else {
        store.resolve_project(&projects);
    }

    store
        .state()
        .selected_project
        .clone()
        .context("No projects available; create one first")
}

/// Turns the `--from`/`--to` pair into an absolute window, rejecting a
/// lone bound so a half-specified window cannot silently widen the query.
fn window_selection(from: Option<String>, to: Option<String>) -> Result<Option<TimeSelection>> {
    match (from, to) {
        (Some(from), Some(to)) => Ok(Some(TimeSelection { from, to })),
        (None, None) => Ok(None),
        _ => anyhow::bail!("--from and --to must be given together"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
