//! HTTP probe transport
//!
//! Features:
//! - HTTP/2 when the CDN offers it, HTTP/1.1 otherwise
//! - TLS 1.3 via rustls
//! - DNS caching + Happy Eyeballs (IPv4/IPv6 racing)
//! - Connection pooling, so a full probe reuses the playlist connection
//!   for the segment it times
//! - Bounded downloads: a probe stops at the byte cap or the read budget,
//!   whichever comes first, and rates what it received

use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::config::SelectionConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::playlist::{self, Playlist};
use crate::probe::{ProbeTransport, SegmentSample, Throughput};

/// reqwest-backed [`ProbeTransport`]
pub struct ProbeClient {
    client: Client,
    max_probe_bytes: u64,
    max_download: Duration,
}

impl ProbeClient {
    /// Create a client with default limits.
    pub fn new() -> Result<Self> {
        Self::with_config(&SelectionConfig::default())
    }

    /// Create a client honouring the configured byte cap and timeouts.
    pub fn with_config(config: &SelectionConfig) -> Result<Self> {
        let client = Client::builder()
            // Don't assume HTTP/2 - let the CDN negotiate
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            // Lower latency for tiny HEAD probes
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .user_agent(concat!("streampick/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.probe_timeout().max(config.light_timeout()))
            // Backstop only; strategies enforce the real per-probe timeout
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            max_probe_bytes: config.max_probe_bytes,
            max_download: config.max_download(),
        })
    }

    async fn get(&self, url: &Url) -> ProbeResult<Response> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ProbeError::Status(response.status()));
        }
        Ok(response)
    }

    /// Read a body until it ends, `max_probe_bytes` arrived, or
    /// `max_download` elapsed. A budget cut is not an error.
    async fn read_capped(&self, response: Response) -> ProbeResult<Vec<u8>> {
        let cap = usize::try_from(self.max_probe_bytes).unwrap_or(usize::MAX);
        let deadline = tokio::time::Instant::now() + self.max_download;
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();

        while body.len() < cap {
            let Ok(next) = tokio::time::timeout_at(deadline, stream.next()).await else {
                debug!(bytes = body.len(), budget = ?self.max_download, "Read budget spent");
                break;
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;
            let room = cap - body.len();
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        Ok(body)
    }

    /// Download `url` and time the whole transfer.
    async fn timed_download(&self, url: &Url) -> ProbeResult<Throughput> {
        let start = Instant::now();
        let response = self.get(url).await?;
        let body = self.read_capped(response).await?;
        Ok(rate(body.len(), start.elapsed()))
    }

    /// First segment of a media playlist.
    async fn first_segment(&self, url: &Url) -> ProbeResult<Url> {
        let response = self.get(url).await?;
        let body = self.read_capped(response).await?;
        match playlist::parse(&String::from_utf8_lossy(&body), url) {
            Some(Playlist::Media(segments)) => segments
                .first()
                .ok_or_else(|| ProbeError::Unclassifiable("media playlist has no segments".into()))
                .and_then(|s| Ok(Url::parse(s)?)),
            Some(Playlist::Master(_)) => Err(ProbeError::Unclassifiable(
                "variant points at another master playlist".into(),
            )),
            None => Err(ProbeError::Unclassifiable(
                "variant URI is not a playlist".into(),
            )),
        }
    }
}

#[async_trait]
impl ProbeTransport for ProbeClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn ping(&self, url: &str) -> ProbeResult<Duration> {
        let start = Instant::now();
        let response = self.client.head(url).send().await?;
        let elapsed = start.elapsed();

        // Some CDNs refuse HEAD but still answered: the host is reachable
        let status = response.status();
        if !status.is_success() && status != StatusCode::METHOD_NOT_ALLOWED {
            return Err(ProbeError::Status(status));
        }

        debug!(status = %status, elapsed_ms = elapsed.as_millis(), "HEAD answered");
        Ok(elapsed)
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn measure(&self, url: &str) -> ProbeResult<SegmentSample> {
        let target = Url::parse(url)?;

        let start = Instant::now();
        let response = self.get(&target).await?;
        let latency = start.elapsed();
        let body = self.read_capped(response).await?;

        let sample = match playlist::parse(&String::from_utf8_lossy(&body), &target) {
            Some(Playlist::Master(variants)) => {
                let best = variants.first().ok_or_else(|| {
                    ProbeError::Unclassifiable("master playlist lists no variants".into())
                })?;
                let variant_url = Url::parse(&best.uri)?;
                let segment = self.first_segment(&variant_url).await?;
                SegmentSample {
                    latency,
                    width: best.width,
                    throughput: self.timed_download(&segment).await?,
                }
            }
            Some(Playlist::Media(segments)) => {
                let segment = segments.first().ok_or_else(|| {
                    ProbeError::Unclassifiable("media playlist has no segments".into())
                })?;
                SegmentSample {
                    latency,
                    width: None,
                    throughput: self.timed_download(&Url::parse(segment)?).await?,
                }
            }
            // Not a playlist: the unit itself was the timed download
            None => SegmentSample {
                latency,
                width: None,
                throughput: rate(body.len(), start.elapsed()),
            },
        };

        debug!(
            latency_ms = sample.latency.as_millis(),
            width = ?sample.width,
            throughput = %sample.throughput,
            "Probe measured"
        );
        Ok(sample)
    }
}

/// KB/s over `elapsed`; empty or untimeable transfers are still pending.
fn rate(bytes: usize, elapsed: Duration) -> Throughput {
    let secs = elapsed.as_secs_f64();
    if bytes == 0 || secs <= 0.0 {
        return Throughput::Pending;
    }
    Throughput::from_kbps(bytes as f64 / 1024.0 / secs)
}
