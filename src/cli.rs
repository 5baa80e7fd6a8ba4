use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

use ecr_scan_audit::adapters::outbound::network::EcrClientConfig;
use ecr_scan_audit::application::dto::{AuditRequest, AuditTarget, ReportFormat, TagSelection};
use ecr_scan_audit::config::ConfigFile;
use ecr_scan_audit::scan_audit::domain::SeverityLevel;
use ecr_scan_audit::shared::error::AuditError;
use ecr_scan_audit::shared::Result;

const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Turn container registry scan findings into pass/fail reports for CI gating
#[derive(Parser, Debug)]
#[command(name = "ecr-scan-audit")]
#[command(version)]
#[command(about = "Turn container registry scan findings into pass/fail reports for CI gating", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["composition", "all_repositories", "container"]),
))]
pub struct Args {
    /// Composition file listing the component tags to audit
    #[arg(long, env = "ESA_COMPOSITION_FILE", value_name = "PATH")]
    pub composition: Option<PathBuf>,

    /// Audit the latest tag of every repository under the base repository
    #[arg(long)]
    pub all_repositories: bool,

    /// Single component to audit
    #[arg(long, env = "ESA_ECR_CONTAINER_NAME", value_name = "NAME")]
    pub container: Option<String>,

    /// Tag of the single component
    #[arg(
        long,
        env = "ESA_ECR_CONTAINER_IDENTIFIER",
        requires = "container",
        conflicts_with = "latest"
    )]
    pub tag: Option<String>,

    /// Audit the most recently pushed tag of the single component
    #[arg(long, requires = "container")]
    pub latest: bool,

    /// Skip tags containing this substring when resolving the latest tag
    #[arg(long, env = "ESA_LATEST_FILTER", value_name = "SUBSTRING")]
    pub latest_filter: Option<String>,

    /// Registry (AWS account) id; defaults to the caller's registry
    #[arg(long, env = "ESA_ECR_REGISTRY_ID")]
    pub registry_id: Option<String>,

    /// Repository prefix shared by all components
    #[arg(long, env = "ESA_ECR_BASE_REPO")]
    pub base_repo: Option<String>,

    /// Minimum severity counted as a failure: INFORMATIONAL, LOW, MEDIUM, HIGH or CRITICAL
    #[arg(long, env = "ESA_SEVERITY_CUTOFF")]
    pub cutoff: Option<SeverityLevel>,

    /// Allowlist file (YAML)
    #[arg(long, env = "ESA_ALLOWLIST", value_name = "PATH")]
    pub allowlist: Option<PathBuf>,

    /// Directory receiving one report per component
    #[arg(short, long, env = "ESA_OUTPUT_DIR", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report format: junit or json
    #[arg(short, long, env = "ESA_REPORTERS")]
    pub format: Option<ReportFormat>,

    /// AWS region of the registry, named in the endpoint hint
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Registry endpoint, e.g. a gateway that SigV4-signs requests (required unless --snapshot-dir)
    #[arg(long, env = "ESA_ECR_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Bearer token sent to the registry endpoint
    #[arg(long, env = "ESA_ECR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Read registry data from an exported snapshot directory instead of the network
    #[arg(long, env = "ESA_SNAPSHOT_DIR", value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Maximum number of images fetched concurrently
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Timeout for each registry request, in seconds
    #[arg(long, default_value_t = EcrClientConfig::DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_secs: u64,

    /// Exit with code 1 when any finding fails the cutoff
    #[arg(long)]
    pub fail_on_findings: bool,

    /// Exit with code 4 when any image could not be scanned
    #[arg(long)]
    pub fail_on_scan_error: bool,

    /// Config file (defaults to ./ecr-scan-audit.config.yml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs, merged from flags, environment and config file
#[derive(Debug)]
pub struct RunSettings {
    pub request: AuditRequest,
    pub format: ReportFormat,
    pub output_dir: PathBuf,
    pub ecr: EcrClientConfig,
    pub snapshot_dir: Option<PathBuf>,
    pub fail_on_findings: bool,
    pub fail_on_scan_error: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Merges the arguments with the config file
    ///
    /// Flags and environment variables take precedence over the config
    /// file, which takes precedence over the built-in defaults.
    pub fn resolve(&self, config: &ConfigFile) -> Result<RunSettings> {
        let cutoff = match self.cutoff {
            Some(cutoff) => cutoff,
            None => config.cutoff_level()?.unwrap_or(SeverityLevel::Medium),
        };
        let format = match self.format {
            Some(format) => format,
            None => config.report_format()?.unwrap_or_default(),
        };
        let concurrency = self
            .concurrency
            .map(usize::from)
            .or(config.concurrency)
            .unwrap_or(8);

        let request = AuditRequest::new(self.audit_target()?, cutoff)
            .with_base_repo(
                self.base_repo
                    .clone()
                    .or_else(|| config.base_repo.clone())
                    .unwrap_or_default(),
            )
            .with_registry_id(self.registry_id.clone().or_else(|| config.registry_id.clone()))
            .with_allowlist_path(self.allowlist.clone().or_else(|| config.allowlist.clone()))
            .with_latest_filter(
                self.latest_filter
                    .clone()
                    .or_else(|| config.latest_filter.clone()),
            )
            .with_concurrency(concurrency);

        let mut ecr = EcrClientConfig::new(
            self.region
                .clone()
                .or_else(|| config.region.clone())
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| EcrClientConfig::DEFAULT_REGION.to_string()),
        );
        ecr.endpoint = self.endpoint.clone().or_else(|| config.endpoint.clone());
        ecr.token = self.token.clone();
        ecr.timeout = Duration::from_secs(self.timeout_secs.max(1));

        Ok(RunSettings {
            request,
            format,
            output_dir: self
                .output_dir
                .clone()
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            ecr,
            snapshot_dir: self.snapshot_dir.clone(),
            fail_on_findings: self.fail_on_findings || config.fail_on_findings.unwrap_or(false),
            fail_on_scan_error: self.fail_on_scan_error
                || config.fail_on_scan_error.unwrap_or(false),
        })
    }

    fn audit_target(&self) -> Result<AuditTarget> {
        if self.all_repositories {
            return Ok(AuditTarget::AllRepositories);
        }
        if let Some(path) = &self.composition {
            return Ok(AuditTarget::Composition { path: path.clone() });
        }

        let container = self
            .container
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuditError::Configuration {
                message: "no images selected".to_string(),
                hint: "Pass --composition, --all-repositories or --container".to_string(),
            })?;

        let tag = match (&self.tag, self.latest) {
            (_, true) => TagSelection::Latest,
            (Some(tag), false) if !tag.trim().is_empty() => TagSelection::Fixed(tag.trim().to_string()),
            _ => {
                return Err(AuditError::Configuration {
                    message: format!("no tag given for container '{}'", container),
                    hint: "Pass --tag <TAG> or --latest".to_string(),
                }
                .into())
            }
        };

        Ok(AuditTarget::Image {
            container: container.to_string(),
            tag,
        })
    }
}
