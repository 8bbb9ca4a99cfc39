use clap::Parser;
use serde::Serialize;
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use metatest_client::config::{
    AnalyticsCommand, CliArgs, Command, ExtractCommand, GenerateCommand, MetadataCommand,
    ResultsCommand, TestCommand,
};
use metatest_client::models::{
    BulkGenerateRequest, ExtractGithubRequest, FieldGenerateRequest, GenerateRequest,
    StartTestRequest,
};
use metatest_client::{
    export, realtime, use_app_store, ApiClient, ApiError, AppStore, ClientConfig,
    NotificationDraft,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    let config = ClientConfig::from_args(&args);
    let _log_guard = init_tracing(config.log_file.as_deref());

    info!("Starting metatest v{}", env!("CARGO_PKG_VERSION"));
    info!("Backend: {} ({} mode)", config.base_url, config.mode_label());

    let client = ApiClient::new(config.clone())?;
    let store = AppStore::new();

    let result = store.provide(run(args.command, &client)).await;

    // Oldest first reads naturally on a terminal.
    for n in store.snapshot().notifications.iter().rev() {
        eprintln!("[{}] {}: {}", n.kind.as_str(), n.title, n.message);
    }

    if let Err(e) = result {
        error!("{}", e);
        // Returning, not exiting, lets the log guard flush the file writer.
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "metatest_client=info,metatest=info".into());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "metatest.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Wrap a request with the loading flag, connectivity tracking and an error
/// notification on failure. Canned responses leave the store disconnected.
async fn track<T, F>(
    store: &AppStore,
    client: &ApiClient,
    label: &str,
    request: F,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let canned_before = client.substituted_responses();
    store.set_loading(true);
    let result = request.await;
    store.set_loading(false);

    match &result {
        Ok(_) => store.set_connected(client.substituted_responses() == canned_before),
        Err(e) => {
            if e.is_offline() {
                store.set_connected(false);
            }
            store.add_notification(NotificationDraft::error(
                format!("{} failed", label),
                e.to_string(),
            ));
        }
    }
    result
}

async fn run(command: Command, client: &ApiClient) -> anyhow::Result<()> {
    let store = use_app_store()?;

    match command {
        Command::Health => {
            let health = track(&store, client, "Health check", client.health()).await?;
            if !health.is_healthy() {
                store.set_connected(false);
            }
            print_json(&health)?;
        }
        Command::Metadata(cmd) => run_metadata(cmd, client, &store).await?,
        Command::Extract(cmd) => run_extract(cmd, client, &store).await?,
        Command::Test(cmd) => run_test(cmd, client, &store).await?,
        Command::Results(cmd) => run_results(cmd, client, &store).await?,
        Command::Analytics(cmd) => run_analytics(cmd, client, &store).await?,
        Command::Generate(cmd) => run_generate(cmd, client, &store).await?,
        Command::Watch => {
            let channel = realtime::subscribe_updates(client.config(), |message| {
                if let Ok(line) = serde_json::to_string(&message) {
                    println!("{}", line);
                }
            })?;
            info!("Watching {}", channel.url());
            tokio::task::spawn_blocking(move || channel.join()).await?;
        }
    }
    Ok(())
}

async fn run_metadata(
    cmd: MetadataCommand,
    client: &ApiClient,
    store: &AppStore,
) -> anyhow::Result<()> {
    match cmd {
        MetadataCommand::List => {
            let records = track(store, client, "Loading metadata", client.list_metadata()).await?;
            print_json(&records)
        }
        MetadataCommand::Show { id } => {
            let record = track(store, client, "Loading metadata", client.get_metadata(&id)).await?;
            print_json(&record)
        }
        MetadataCommand::Delete { id } => {
            let resp = track(
                store,
                client,
                "Deleting metadata",
                client.delete_metadata(&id),
            )
            .await?;
            store.add_notification(NotificationDraft::success(
                "Metadata deleted",
                format!("Deleted {}", id),
            ));
            print_json(&resp)
        }
        MetadataCommand::Clear => {
            let resp = track(store, client, "Clearing metadata", client.clear_metadata()).await?;
            store.add_notification(NotificationDraft::success(
                "Metadata cleared",
                resp.message.clone(),
            ));
            print_json(&resp)
        }
    }
}

async fn run_extract(
    cmd: ExtractCommand,
    client: &ApiClient,
    store: &AppStore,
) -> anyhow::Result<()> {
    let resp = match cmd {
        ExtractCommand::Url { url } => {
            if url.trim().is_empty() {
                anyhow::bail!("A URL is required");
            }
            track(store, client, "Extraction", client.extract_url(&url)).await?
        }
        ExtractCommand::Github {
            repo_url,
            branch,
            path,
        } => {
            if repo_url.trim().is_empty() {
                anyhow::bail!("A repository URL is required");
            }
            let request = ExtractGithubRequest {
                repo_url,
                branch,
                path,
            };
            track(store, client, "Extraction", client.extract_github(&request)).await?
        }
    };
    store.add_notification(NotificationDraft::success(
        "Extraction complete",
        format!("{} form(s) found", resp.forms_found),
    ));
    print_json(&resp)
}

async fn run_test(cmd: TestCommand, client: &ApiClient, store: &AppStore) -> anyhow::Result<()> {
    match cmd {
        TestCommand::Start {
            metadata_id,
            scenario,
            browser,
            headed,
        } => {
            let request = StartTestRequest {
                scenario,
                browser,
                headless: !headed,
            };
            let resp = track(
                store,
                client,
                "Starting test",
                client.start_test(&metadata_id, &request),
            )
            .await?;
            store.add_notification(NotificationDraft::success(
                "Test started",
                format!("Test run {} is {}", resp.test_run_id, resp.status),
            ));
            print_json(&resp)
        }
        TestCommand::Status { id } => {
            let run = track(store, client, "Loading test status", client.test_status(&id)).await?;
            print_json(&run)
        }
        TestCommand::Stop { id } => {
            let resp = track(store, client, "Stopping test", client.stop_test(&id)).await?;
            store.add_notification(NotificationDraft::info(
                "Test stopped",
                format!("Stopped {}", id),
            ));
            print_json(&resp)
        }
        TestCommand::Delete { id } => {
            let resp = track(store, client, "Deleting test", client.delete_test(&id)).await?;
            store.add_notification(NotificationDraft::success(
                "Test deleted",
                format!("Deleted {}", id),
            ));
            print_json(&resp)
        }
        TestCommand::Runs { metadata_id } => {
            let runs = track(
                store,
                client,
                "Loading test runs",
                client.metadata_test_runs(&metadata_id),
            )
            .await?;
            print_json(&runs)
        }
        TestCommand::Recent { limit, status } => {
            let runs = track(
                store,
                client,
                "Loading test runs",
                client.get_test_runs(limit, status),
            )
            .await?;
            print_json(&runs)
        }
    }
}

async fn run_results(
    cmd: ResultsCommand,
    client: &ApiClient,
    store: &AppStore,
) -> anyhow::Result<()> {
    match cmd {
        ResultsCommand::List => {
            let results = track(store, client, "Loading results", client.list_results()).await?;
            print_json(&results)
        }
        ResultsCommand::Show { id } => {
            let result = track(store, client, "Loading result", client.get_result(&id)).await?;
            print_json(&result)
        }
        ResultsCommand::Screenshots { id } => {
            let shots = track(
                store,
                client,
                "Loading screenshots",
                client.result_screenshots(&id),
            )
            .await?;
            print_json(&shots)
        }
        ResultsCommand::Summary { id } => {
            let summary = track(
                store,
                client,
                "Loading summary",
                client.result_summary(&id),
            )
            .await?;
            print_json(&summary)
        }
        ResultsCommand::Export { id } => {
            let export = track(store, client, "Export", client.export_result(&id)).await?;
            print_json(&export)
        }
        ResultsCommand::Save { id, out_dir } => {
            let result = track(store, client, "Loading result", client.get_result(&id)).await?;
            let path = export::write_result_export(&result, &out_dir)?;
            store.add_notification(NotificationDraft::success(
                "Export complete",
                format!("Saved {}", path.display()),
            ));
            Ok(())
        }
    }
}

async fn run_analytics(
    cmd: AnalyticsCommand,
    client: &ApiClient,
    store: &AppStore,
) -> anyhow::Result<()> {
    match cmd {
        AnalyticsCommand::Global => {
            let analytics = track(
                store,
                client,
                "Loading analytics",
                client.global_analytics(),
            )
            .await?;
            print_json(&analytics)
        }
        AnalyticsCommand::Trends { days } => {
            let trends = track(
                store,
                client,
                "Loading trends",
                client.trend_analytics(days),
            )
            .await?;
            print_json(&trends)
        }
        AnalyticsCommand::Metadata { id } => {
            let analytics = track(
                store,
                client,
                "Loading analytics",
                client.metadata_analytics(&id),
            )
            .await?;
            print_json(&analytics)
        }
        AnalyticsCommand::Dashboard => {
            let dashboard = track(
                store,
                client,
                "Loading dashboard",
                client.dashboard_report(),
            )
            .await?;
            print_json(&dashboard)
        }
        AnalyticsCommand::Summary => {
            let report = track(store, client, "Loading report", client.summary_report()).await?;
            print_json(&report)
        }
    }
}

async fn run_generate(
    cmd: GenerateCommand,
    client: &ApiClient,
    store: &AppStore,
) -> anyhow::Result<()> {
    match cmd {
        GenerateCommand::Data {
            metadata_id,
            count,
            scenario,
        } => {
            let request = GenerateRequest { count, scenario };
            let data = track(
                store,
                client,
                "Data generation",
                client.generate_data(&metadata_id, &request),
            )
            .await?;
            store.add_notification(NotificationDraft::success(
                "Data generated",
                format!("{} record(s)", data.records.len()),
            ));
            print_json(&data)
        }
        GenerateCommand::Bulk {
            metadata_ids,
            count,
        } => {
            if metadata_ids.is_empty() {
                anyhow::bail!("At least one metadata id is required");
            }
            let request = BulkGenerateRequest {
                metadata_ids,
                count,
            };
            let data = track(
                store,
                client,
                "Bulk generation",
                client.generate_bulk(&request),
            )
            .await?;
            print_json(&data)
        }
        GenerateCommand::Field {
            field_name,
            field_type,
            count,
        } => {
            let request = FieldGenerateRequest {
                field_name,
                field_type,
                count,
            };
            let values = track(
                store,
                client,
                "Field generation",
                client.generate_field(&request),
            )
            .await?;
            print_json(&values)
        }
        GenerateCommand::Scenarios => {
            let scenarios = track(
                store,
                client,
                "Loading scenarios",
                client.generation_scenarios(),
            )
            .await?;
            print_json(&scenarios)
        }
    }
}
