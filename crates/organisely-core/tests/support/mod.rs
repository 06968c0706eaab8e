//! Shared test doubles for the request engine.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use organisely_core::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use organisely_core::ClientConfig;
use tokio::time::Instant;

type Scripted = Result<TransportResponse, TransportError>;

/// Transport replaying a fixed script of outcomes. Once the script runs out
/// the last entry repeats. Every call is recorded with the (tokio) time it
/// was made.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Mutex<Option<Scripted>>,
    calls: Mutex<Vec<(Instant, TransportRequest)>>,
    latency: Duration,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Always answer with `status` and an empty body.
    pub fn always(status: u16) -> Self {
        Self::new(vec![Ok(TransportResponse::new(status))])
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Gaps between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls
            .windows(2)
            .map(|pair| pair[1].0.duration_since(pair[0].0))
            .collect()
    }

    fn next_outcome(&self) -> Scripted {
        let mut script = self.script.lock().unwrap();
        let mut fallback = self.fallback.lock().unwrap();
        match script.pop_front() {
            Some(outcome) => {
                *fallback = Some(outcome.clone());
                outcome
            }
            None => fallback
                .clone()
                .unwrap_or_else(|| Err(TransportError::Network("empty script".to_string()))),
        }
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push((Instant::now(), request));
        let outcome = self.next_outcome();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        outcome
    }
}

/// Config pointed at a fake host with the default retry settings.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        base_url: "https://api.test/v1".to_string(),
        ..ClientConfig::default()
    }
}
