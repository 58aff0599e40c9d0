//! Scripted probe transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use streampick::error::ProbeResult;
use streampick::{
    CandidateSource, ProbeError, ProbeTransport, SegmentSample, SelectionConfig, Throughput,
};

pub const DESKTOP_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";
pub const IPAD_UA: &str =
    "Mozilla/5.0 (iPad; CPU OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/604.1";

/// How the transport answers a given URL.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer after `delay_ms` of wall time, reporting the given metrics.
    Ok {
        delay_ms: u64,
        ping_ms: u64,
        width: Option<u32>,
        throughput: Throughput,
    },
    /// Fail after `delay_ms`.
    Fail { delay_ms: u64 },
    /// Never answer.
    Hang,
}

impl Reply {
    pub fn ping(ping_ms: u64) -> Self {
        Reply::Ok {
            delay_ms: 0,
            ping_ms,
            width: None,
            throughput: Throughput::Pending,
        }
    }

    pub fn full(width: u32, kbps: f64, ping_ms: u64) -> Self {
        Reply::Ok {
            delay_ms: 0,
            ping_ms,
            width: Some(width),
            throughput: Throughput::Measured(kbps),
        }
    }

    pub fn fail() -> Self {
        Reply::Fail { delay_ms: 0 }
    }

    /// Same reply, delivered after `delay_ms` of wall time.
    pub fn after(self, delay_ms: u64) -> Self {
        match self {
            Reply::Ok {
                ping_ms,
                width,
                throughput,
                ..
            } => Reply::Ok {
                delay_ms,
                ping_ms,
                width,
                throughput,
            },
            Reply::Fail { .. } => Reply::Fail { delay_ms },
            Reply::Hang => Reply::Hang,
        }
    }
}

/// Transport answering from a URL -> [`Reply`] table and recording how it
/// was used.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: HashMap<String, Reply>,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    started: Mutex<Vec<String>>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = (String, Reply)>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    async fn answer(&self, url: &str) -> ProbeResult<(u64, Option<u32>, Throughput)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(Arc::clone(&self.in_flight));

        match self.replies.get(url).cloned().unwrap_or(Reply::fail()) {
            Reply::Ok {
                delay_ms,
                ping_ms,
                width,
                throughput,
            } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok((ping_ms, width, throughput))
            }
            Reply::Fail { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Err(ProbeError::Unclassifiable("scripted failure".into()))
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProbeError::Unclassifiable("hung".into()))
            }
        }
    }
}

#[async_trait]
impl ProbeTransport for ScriptedTransport {
    async fn ping(&self, url: &str) -> ProbeResult<Duration> {
        let (ping_ms, _, _) = self.answer(url).await?;
        Ok(Duration::from_millis(ping_ms))
    }

    async fn measure(&self, url: &str) -> ProbeResult<SegmentSample> {
        let (ping_ms, width, throughput) = self.answer(url).await?;
        Ok(SegmentSample {
            latency: Duration::from_millis(ping_ms),
            width,
            throughput,
        })
    }
}

/// URL probed for candidate `id` (its second sample unit).
pub fn target(id: &str) -> String {
    format!("https://{id}.example.com/seg1.ts")
}

/// Candidate with an init segment and one media segment.
pub fn candidate(id: &str, name: &str) -> CandidateSource {
    CandidateSource::new(
        id,
        name,
        vec![
            format!("https://{id}.example.com/init.mp4"),
            target(id),
        ],
    )
}

/// Short timeouts so failure paths finish quickly.
pub fn fast_config() -> SelectionConfig {
    SelectionConfig {
        light_timeout_ms: 200,
        probe_timeout_ms: 200,
        settle_delay_ms: 10,
        ..SelectionConfig::default()
    }
}
