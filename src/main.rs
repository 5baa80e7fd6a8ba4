mod cli;

use cli::{Args, RunSettings};
use ecr_scan_audit::adapters::outbound::console::StderrProgressReporter;
use ecr_scan_audit::adapters::outbound::filesystem::{
    FileSystemReader, ReportDirectoryWriter, SnapshotRegistry,
};
use ecr_scan_audit::adapters::outbound::network::EcrRegistryClient;
use ecr_scan_audit::application::dto::AuditResponse;
use ecr_scan_audit::application::factories::FormatterFactory;
use ecr_scan_audit::application::use_cases::AuditImagesUseCase;
use ecr_scan_audit::config::{discover_config, load_config_from_path, ConfigFile};
use ecr_scan_audit::ports::outbound::{RegistryClient, ReportWriter};
use ecr_scan_audit::shared::error::{AuditError, ExitCode};
use ecr_scan_audit::shared::Result;
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_logging(args.verbose);

    match run(args).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

/// `-v` raises the default filter to debug; `RUST_LOG` overrides both
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let settings = args.resolve(&config)?;

    let response = match &settings.snapshot_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(AuditError::Configuration {
                    message: format!("snapshot directory {} does not exist", dir.display()),
                    hint: "Pass a directory exported from the registry to --snapshot-dir".to_string(),
                }
                .into());
            }
            eprintln!("📂 Reading registry snapshot from {}", dir.display());
            audit(SnapshotRegistry::new(dir.clone()), &settings).await?
        }
        None => {
            let client = EcrRegistryClient::new(settings.ecr.clone())?;
            audit(client, &settings).await?
        }
    };

    write_reports(&response, &settings)?;
    Ok(exit_code(&response, &settings))
}

fn load_config(args: &Args) -> Result<ConfigFile> {
    if let Some(path) = &args.config {
        return load_config_from_path(path);
    }
    let cwd = std::env::current_dir()?;
    Ok(discover_config(&cwd)?.unwrap_or_default())
}

async fn audit<R: RegistryClient>(registry: R, settings: &RunSettings) -> Result<AuditResponse> {
    // Create adapters (Dependency Injection)
    let use_case = AuditImagesUseCase::new(
        registry,
        FileSystemReader::new(),
        FileSystemReader::new(),
        StderrProgressReporter::new(),
    );
    use_case.execute(settings.request.clone()).await
}

fn write_reports(response: &AuditResponse, settings: &RunSettings) -> Result<()> {
    if response.reports.is_empty() {
        return Ok(());
    }

    eprintln!("{}", FormatterFactory::progress_message(settings.format));
    let formatter = FormatterFactory::create(settings.format);
    let file_name = FormatterFactory::report_file_name(settings.format);
    let writer = ReportDirectoryWriter::new(settings.output_dir.clone());

    for report in &response.reports {
        let content = formatter.format(report)?;
        writer.write_report(&report.image_name, &file_name, &content)?;
    }

    eprintln!(
        "✅ Wrote {} report(s) to {}",
        response.reports.len(),
        writer.output_dir().display()
    );
    Ok(())
}

fn exit_code(response: &AuditResponse, settings: &RunSettings) -> ExitCode {
    if settings.fail_on_findings && response.has_failures() {
        eprintln!(
            "❌ {} finding(s) at or above cutoff {}",
            response.total_failures(),
            settings.request.cutoff
        );
        return ExitCode::FindingsDetected;
    }
    if settings.fail_on_scan_error && response.has_scan_errors() {
        eprintln!(
            "❌ {} image(s) could not be scanned",
            response.scan_error_count()
        );
        return ExitCode::ScanErrors;
    }
    ExitCode::Success
}
