//! In-memory [`PropositionSource`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use civis_shared::{CivisError, PropositionKey, Result};
use civis_source::{PropositionSource, parse_xml};

/// Serves canned XML payloads. Anything not registered answers with a
/// network error, like an upstream 404.
#[derive(Debug, Default)]
pub struct FakeSource {
    listings: HashMap<i32, String>,
    details: HashMap<String, String>,
    votes: HashMap<String, String>,
    delay: Option<Duration>,
    detail_delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    detail_requests: AtomicUsize,
    vote_requests: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, year: i32, xml: &str) -> Self {
        self.listings.insert(year, xml.to_string());
        self
    }

    pub fn with_detail(mut self, key: &PropositionKey, xml: &str) -> Self {
        self.details.insert(key.composite(), xml.to_string());
        self
    }

    pub fn with_votes(mut self, key: &PropositionKey, xml: &str) -> Self {
        self.votes.insert(key.composite(), xml.to_string());
        self
    }

    /// Hold every detail and vote request open for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold detail requests for `key` open for `delay`, on top of any
    /// shared delay.
    pub fn with_detail_delay(mut self, key: &PropositionKey, delay: Duration) -> Self {
        self.detail_delays.insert(key.composite(), delay);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn detail_requests(&self) -> usize {
        self.detail_requests.load(Ordering::SeqCst)
    }

    pub fn vote_requests(&self) -> usize {
        self.vote_requests.load(Ordering::SeqCst)
    }

    async fn serve(
        &self,
        payload: Option<&String>,
        extra_delay: Option<Duration>,
        what: &str,
    ) -> Result<Value> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        for delay in [self.delay, extra_delay].into_iter().flatten() {
            tokio::time::sleep(delay).await;
        }

        let result = match payload {
            Some(xml) => parse_xml(xml),
            None => Err(CivisError::Network(format!("{what}: HTTP 404 Not Found"))),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Minimal detail payload for `key`.
pub fn detail_xml(key: &PropositionKey) -> String {
    format!(
        r#"<proposicao tipo="{} " numero="{}" ano="{}">
            <nomeProposicao>{key}</nomeProposicao>
            <Autor>Poder Executivo</Autor>
            <Ementa>Dispõe sobre o assunto.</Ementa>
        </proposicao>"#,
        key.kind, key.number, key.year
    )
}

/// Vote payload for `key` with one roll call per `(date, time, ballots)`.
pub fn votes_xml(key: &PropositionKey, events: &[(&str, &str, &[(&str, &str, &str)])]) -> String {
    let events: String = events
        .iter()
        .map(|(date, time, ballots)| {
            let ballots: String = ballots
                .iter()
                .map(|(name, party, vote)| {
                    format!(r#"<Deputado Nome="{name}" Partido="{party}" UF="SP" Voto="{vote}"/>"#)
                })
                .collect();
            format!(
                r#"<Votacao Resumo="Aprovado." Data="{date}" Hora="{time}" ObjVotacao="MATÉRIA"><votos>{ballots}</votos></Votacao>"#
            )
        })
        .collect();

    format!(
        "<proposicao><Sigla>{}</Sigla><Numero>{}</Numero><Ano>{}</Ano><Votacoes>{events}</Votacoes></proposicao>",
        key.kind, key.number, key.year
    )
}

impl PropositionSource for FakeSource {
    async fn list_voted_in_plenary(&self, year: i32) -> Result<Value> {
        match self.listings.get(&year) {
            Some(xml) => parse_xml(xml),
            None => Err(CivisError::Network(format!("listing {year}: HTTP 500"))),
        }
    }

    async fn proposition_detail(&self, key: &PropositionKey) -> Result<Value> {
        self.detail_requests.fetch_add(1, Ordering::SeqCst);
        let composite = key.composite();
        let delay = self.detail_delays.get(&composite).copied();
        self.serve(self.details.get(&composite), delay, "detail").await
    }

    async fn proposition_votes(&self, key: &PropositionKey) -> Result<Value> {
        self.vote_requests.fetch_add(1, Ordering::SeqCst);
        self.serve(self.votes.get(&key.composite()), None, "votes").await
    }
}
