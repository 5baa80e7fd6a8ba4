use super::ecr_types::{
    details_for, identifiers_from, scan_findings_from, DescribeImageScanFindingsRequest,
    DescribeImageScanFindingsResponse, DescribeImagesRequest, DescribeImagesResponse,
    DescribeRepositoriesRequest, DescribeRepositoriesResponse, ErrorBody, ImageIdDto,
    ListImagesFilter, ListImagesRequest, ListImagesResponse,
};
use crate::ports::outbound::{RegistryClient, RegistryResult};
use crate::scan_audit::domain::{
    ImageDetail, ImageIdentifier, ImageIdentity, RepositoryRef, ScanFindings,
};
use crate::shared::error::{AuditError, RegistryError};
use crate::shared::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Connection settings for `EcrRegistryClient`
#[derive(Debug, Clone)]
pub struct EcrClientConfig {
    pub region: String,
    /// Overrides the regional endpoint, e.g. a signing proxy
    pub endpoint: Option<String>,
    /// Sent as `Authorization: Bearer <token>` when set
    pub token: Option<String>,
    pub timeout: Duration,
}

impl EcrClientConfig {
    pub const DEFAULT_REGION: &'static str = "eu-west-1";
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            token: None,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECONDS),
        }
    }

    /// Public ECR endpoint of the configured region
    ///
    /// It only accepts SigV4-signed requests, which this client does not
    /// produce, so it is never used as a default.
    pub fn regional_endpoint(&self) -> String {
        format!("https://api.ecr.{}.amazonaws.com", self.region)
    }

    /// Endpoint requests are sent to
    ///
    /// # Errors
    /// `AuditError::Configuration` when no endpoint is configured
    pub fn resolved_endpoint(&self) -> Result<String> {
        match &self.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => {
                Ok(endpoint.trim().trim_end_matches('/').to_string())
            }
            _ => Err(AuditError::Configuration {
                message: "no registry endpoint configured".to_string(),
                hint: format!(
                    "Pass --endpoint <URL> of a gateway that signs requests for {}, or --snapshot-dir <DIR> to audit an exported snapshot",
                    self.regional_endpoint()
                ),
            }
            .into()),
        }
    }
}

/// EcrRegistryClient adapter speaking the ECR JSON 1.1 protocol
///
/// Every action is a `POST /` with an `X-Amz-Target` header naming it.
/// Requests are not SigV4-signed here; point `endpoint` at a gateway that
/// signs them, optionally authenticated with a bearer token.
///
/// # Security
/// - Implements timeout (30 seconds by default)
/// - Does not retry failed requests; a failed image is reported, not retried
pub struct EcrRegistryClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl EcrRegistryClient {
    const TARGET_PREFIX: &'static str = "AmazonEC2ContainerRegistry_V20150921";
    const CONTENT_TYPE: &'static str = "application/x-amz-json-1.1";
    const REPOSITORIES_PAGE_SIZE: u32 = 1000;
    const LIST_IMAGES_PAGE_SIZE: u32 = 100;
    const FINDINGS_PAGE_SIZE: u32 = 1000;
    /// DescribeImages accepts at most 100 image ids per call
    const DESCRIBE_IMAGES_BATCH: usize = 100;

    /// Creates a new ECR client
    pub fn new(config: EcrClientConfig) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("ecr-scan-audit/{}", version);
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .build()?;

        let endpoint = config.resolved_endpoint()?;
        log::debug!("Using ECR endpoint {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            token: config.token.filter(|t| !t.is_empty()),
        })
    }

    /// Invokes one ECR action and decodes its response
    async fn call<Req, Resp>(&self, action: &str, subject: &str, request: &Req) -> RegistryResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|e| RegistryError::InvalidParameter(format!("{}: {}", action, e)))?;

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", Self::CONTENT_TYPE)
            .header("X-Amz-Target", format!("{}.{}", Self::TARGET_PREFIX, action))
            .body(body);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        log::debug!("{} {}", action, subject);
        let response = builder.send().await.map_err(|e| map_transport_error(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| map_transport_error(&e))?;

        if !status.is_success() {
            return Err(map_error_response(status, &text, subject));
        }

        serde_json::from_str(&text)
            .map_err(|e| RegistryError::MalformedResponse(format!("{} response: {}", action, e)))
    }
}

/// Maps a failed HTTP exchange onto a registry error
///
/// Timeouts stay scoped to the request; connection failures mean the
/// registry cannot be reached at all.
fn map_transport_error(error: &reqwest::Error) -> RegistryError {
    if error.is_timeout() {
        RegistryError::ServerError(format!("request timed out: {}", error))
    } else if error.is_decode() {
        RegistryError::MalformedResponse(error.to_string())
    } else {
        RegistryError::Transport(error.to_string())
    }
}

/// Maps an ECR error response onto a registry error
pub(crate) fn map_error_response(status: StatusCode, body: &str, subject: &str) -> RegistryError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let error_type = parsed
        .error_type
        .as_deref()
        .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
        .unwrap_or_default();
    let message = match parsed.message.filter(|m| !m.is_empty()) {
        Some(message) => format!("{}: {}", subject, message),
        None => format!("{}: HTTP {}", subject, status),
    };

    match error_type.as_str() {
        "RepositoryNotFoundException" => RegistryError::RepositoryNotFound(message),
        "ImageNotFoundException" => RegistryError::ImageNotFound(message),
        "ScanNotFoundException" => RegistryError::ScanNotFound(message),
        "InvalidParameterException" | "ValidationException" => {
            RegistryError::InvalidParameter(message)
        }
        "UnrecognizedClientException"
        | "AccessDeniedException"
        | "ExpiredTokenException"
        | "InvalidSignatureException"
        | "IncompleteSignature"
        | "MissingAuthenticationTokenException" => RegistryError::Authentication(message),
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            RegistryError::Authentication(message)
        }
        "" => RegistryError::ServerError(message),
        other => RegistryError::ServerError(format!("{} ({})", message, other)),
    }
}

#[async_trait]
impl RegistryClient for EcrRegistryClient {
    async fn list_repositories(
        &self,
        registry_id: Option<&str>,
    ) -> RegistryResult<Vec<RepositoryRef>> {
        let mut repositories = Vec::new();
        let mut next_token = None;
        loop {
            let request = DescribeRepositoriesRequest {
                registry_id,
                max_results: Self::REPOSITORIES_PAGE_SIZE,
                next_token: next_token.take(),
            };
            let page: DescribeRepositoriesResponse = self
                .call("DescribeRepositories", registry_id.unwrap_or("default registry"), &request)
                .await?;
            repositories.extend(page.repositories.into_iter().map(|r| r.into_domain()));
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(repositories)
    }

    async fn list_image_identifiers(
        &self,
        repository: &RepositoryRef,
    ) -> RegistryResult<Vec<ImageIdentifier>> {
        let mut identifiers = Vec::new();
        let mut next_token = None;
        loop {
            let request = ListImagesRequest {
                registry_id: repository.registry_id(),
                repository_name: repository.repository_name(),
                filter: ListImagesFilter {
                    tag_status: "TAGGED",
                },
                max_results: Self::LIST_IMAGES_PAGE_SIZE,
                next_token: next_token.take(),
            };
            let page: ListImagesResponse = self
                .call("ListImages", repository.repository_name(), &request)
                .await?;
            identifiers.extend(identifiers_from(page.image_ids));
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(identifiers)
    }

    async fn get_image_details(
        &self,
        repository: &RepositoryRef,
        identifiers: &[ImageIdentifier],
    ) -> RegistryResult<Vec<ImageDetail>> {
        let mut details = Vec::new();
        for chunk in identifiers.chunks(Self::DESCRIBE_IMAGES_BATCH) {
            let mut next_token = None;
            loop {
                let request = DescribeImagesRequest {
                    registry_id: repository.registry_id(),
                    repository_name: repository.repository_name(),
                    image_ids: chunk.iter().map(|id| ImageIdDto::for_tag(&id.tag)).collect(),
                    next_token: next_token.take(),
                };
                let page: DescribeImagesResponse = self
                    .call("DescribeImages", repository.repository_name(), &request)
                    .await?;
                details.extend(details_for(&page.image_details, chunk));
                match page.next_token {
                    Some(token) if !token.is_empty() => next_token = Some(token),
                    _ => break,
                }
            }
        }
        Ok(details)
    }

    async fn get_scan_findings(&self, image: &ImageIdentity) -> RegistryResult<ScanFindings> {
        let subject = image.to_string();
        let mut pages: Vec<DescribeImageScanFindingsResponse> = Vec::new();
        let mut next_token = None;
        loop {
            let request = DescribeImageScanFindingsRequest {
                registry_id: image.registry_id(),
                repository_name: image.repository_name(),
                image_id: ImageIdDto::for_tag(image.tag()),
                max_results: Self::FINDINGS_PAGE_SIZE,
                next_token: next_token.take(),
            };
            let mut page: DescribeImageScanFindingsResponse = self
                .call("DescribeImageScanFindings", &subject, &request)
                .await?;
            let token = page.next_token.take();
            pages.push(page);
            match token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        Ok(scan_findings_from(pages))
    }
}
