//! HTTP(S) probes through a proxy using reqwest

use async_trait::async_trait;
use reqwest::{Client, Proxy, header};
use std::time::Duration;

use super::{ProbeFailure, ProbeTransport};
use crate::config::ProbeConfig;
use crate::types::ProxyCandidate;

/// Sends a GET through the candidate proxy and expects a 2xx answer
///
/// Builds a fresh client per probe: reqwest binds proxies to a client, and a
/// fresh connection is what the latency measurement should include.
#[derive(Debug, Clone)]
pub struct HttpProbeTransport {
    user_agent: String,
    accept_invalid_certs: bool,
}

impl HttpProbeTransport {
    #[must_use]
    pub fn new(user_agent: impl Into<String>, accept_invalid_certs: bool) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept_invalid_certs,
        }
    }

    #[must_use]
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(config.user_agent.clone(), config.accept_invalid_certs)
    }

    fn client_for(
        &self,
        candidate: &ProxyCandidate,
        timeout: Duration,
    ) -> Result<Client, ProbeFailure> {
        let mut proxy = Proxy::all(candidate.proxy_base_url())
            .map_err(|e| ProbeFailure::Proxy(e.to_string()))?;
        if let Some(credential) = candidate.credential() {
            proxy = proxy.basic_auth(credential.username.as_str(), &credential.password);
        }

        Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| ProbeFailure::Request(e.to_string()))
    }
}

#[async_trait]
impl ProbeTransport for HttpProbeTransport {
    async fn probe(
        &self,
        candidate: &ProxyCandidate,
        target_url: &str,
        timeout: Duration,
    ) -> Result<(), ProbeFailure> {
        let client = self.client_for(candidate, timeout)?;

        let response = client
            .get(target_url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeFailure::BadStatus(status.as_u16()))
        }
    }
}

/// Map a reqwest error onto the probe failure taxonomy
fn classify(err: reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::Timeout
    } else if err.is_connect() {
        ProbeFailure::Connect(root_cause(&err))
    } else if let Some(status) = err.status() {
        ProbeFailure::BadStatus(status.as_u16())
    } else {
        ProbeFailure::Request(root_cause(&err))
    }
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
