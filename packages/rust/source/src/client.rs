//! HTTP client for `Proposicoes.asmx`.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use civis_shared::{CivisError, PropositionKey, Result, SourceConfig};

use crate::PropositionSource;
use crate::xml::parse_xml;

/// User-Agent string for upstream requests.
const USER_AGENT: &str = concat!("Civis/", env!("CARGO_PKG_VERSION"));

/// Service path under the configured base URL.
const SERVICE_PATH: &str = "Proposicoes.asmx";

/// Accepted response media types.
const ACCEPT_XML: &str = "application/xml, text/xml, */*";

/// [`PropositionSource`] backed by the live web service.
///
/// Requests are plain idempotent GETs with a per-request timeout; there are
/// no retries at this layer.
#[derive(Debug, Clone)]
pub struct CamaraClient {
    client: Client,
    base_url: String,
}

impl CamaraClient {
    /// Create a new client from the source configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_XML));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CivisError::Network(format!("failed to build HTTP client: {e}")))?;

        // Reject a malformed base URL up front.
        Url::parse(&config.base_url)
            .map_err(|e| {
                CivisError::config(format!("invalid base_url '{}': {e}", config.base_url))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build `{base}/Proposicoes.asmx/{operation}?{params}`.
    fn endpoint(&self, operation: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}/{SERVICE_PATH}/{operation}", self.base_url);
        let mut url = Url::parse(&raw)
            .map_err(|e| CivisError::config(format!("invalid endpoint '{raw}': {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// GET an endpoint and parse the XML body into a generic tree.
    async fn request_xml(&self, url: Url) -> Result<Value> {
        debug!(%url, "requesting");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                CivisError::Network(format!("{url}: request timed out"))
            } else {
                CivisError::Network(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CivisError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CivisError::Network(format!("{url}: body read timed out"))
            } else {
                CivisError::Network(format!("{url}: failed to read body: {e}"))
            }
        })?;

        parse_xml(&body).map_err(|e| CivisError::parse(format!("{url}: {e}")))
    }
}

impl PropositionSource for CamaraClient {
    #[instrument(skip(self))]
    async fn list_voted_in_plenary(&self, year: i32) -> Result<Value> {
        let year = year.to_string();
        let url = self.endpoint(
            "ListarProposicoesVotadasEmPlenario",
            &[("ano", year.as_str()), ("tipo", "")],
        )?;
        self.request_xml(url).await
    }

    #[instrument(skip_all, fields(proposition = %key))]
    async fn proposition_detail(&self, key: &PropositionKey) -> Result<Value> {
        let url = self.endpoint(
            "ObterProposicao",
            &[
                ("tipo", key.kind.as_str()),
                ("numero", key.number.as_str()),
                ("ano", key.year.as_str()),
            ],
        )?;
        self.request_xml(url).await
    }

    #[instrument(skip_all, fields(proposition = %key))]
    async fn proposition_votes(&self, key: &PropositionKey) -> Result<Value> {
        let url = self.endpoint(
            "ObterVotacaoProposicao",
            &[
                ("tipo", key.kind.as_str()),
                ("numero", key.number.as_str()),
                ("ano", key.year.as_str()),
            ],
        )?;
        self.request_xml(url).await
    }
}
