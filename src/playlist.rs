//! HLS playlist inspection for probes
//!
//! Just enough of RFC 8216 to answer two questions about a sample unit:
//! - what resolution does the best variant advertise?
//! - which media segment can be downloaded to time delivery?

use url::Url;

/// A variant stream from a master playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Peak bitrate in bits per second.
    pub bandwidth: u64,
    /// Frame width from `RESOLUTION`, if advertised.
    pub width: Option<u32>,
    /// Frame height from `RESOLUTION`, if advertised.
    pub height: Option<u32>,
    /// Absolute URI of the variant's media playlist.
    pub uri: String,
}

/// What a fetched body turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playlist {
    /// Multi-variant playlist, variants sorted best first.
    Master(Vec<Variant>),
    /// Media playlist; absolute segment URIs in order.
    Media(Vec<String>),
}

/// Cheap sniff for an HLS body.
#[must_use]
pub fn is_playlist(body: &str) -> bool {
    body.trim_start_matches('\u{feff}').trim_start().starts_with("#EXTM3U")
}

/// Parse a playlist body fetched from `base`.
///
/// Returns `None` if the body is not an HLS playlist at all.
#[must_use]
pub fn parse(body: &str, base: &Url) -> Option<Playlist> {
    if !is_playlist(body) {
        return None;
    }

    if body.contains("#EXT-X-STREAM-INF:") {
        Some(Playlist::Master(parse_master(body, base)))
    } else {
        Some(Playlist::Media(parse_media(body, base)))
    }
}

fn parse_master(body: &str, base: &Url) -> Vec<Variant> {
    let mut variants = Vec::new();
    let mut lines = body.lines().map(str::trim);

    while let Some(line) = lines.next() {
        let Some(rest) = line.strip_prefix("#EXT-X-STREAM-INF:") else {
            continue;
        };
        let mut bandwidth = 0;
        let (mut width, mut height) = (None, None);
        for (key, value) in attributes(rest) {
            match key {
                "BANDWIDTH" => bandwidth = value.parse().unwrap_or(0),
                "RESOLUTION" => {
                    if let Some((w, h)) = value.split_once('x') {
                        width = w.parse().ok();
                        height = h.parse().ok();
                    }
                }
                _ => {}
            }
        }

        // The URI is the next non-blank, non-tag line.
        let uri_line = lines.by_ref().find(|l| !l.is_empty() && !l.starts_with('#'));
        if let Some(uri) = uri_line.and_then(|l| resolve(base, l)) {
            variants.push(Variant {
                bandwidth,
                width,
                height,
                uri,
            });
        }
    }

    // Best first: widest frame, then highest bitrate
    variants.sort_by(|a, b| {
        b.width
            .unwrap_or(0)
            .cmp(&a.width.unwrap_or(0))
            .then(b.bandwidth.cmp(&a.bandwidth))
    });
    variants
}

fn parse_media(body: &str, base: &Url) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| resolve(base, l))
        .collect()
}

/// `KEY=value` pairs of an attribute list. Commas inside quoted values
/// (`CODECS="avc1,mp4a"`) do not split; quotes are stripped.
fn attributes(list: &str) -> impl Iterator<Item = (&str, &str)> + '_ {
    let mut quoted = false;
    list.split(move |c: char| {
        if c == '"' {
            quoted = !quoted;
        }
        c == ',' && !quoted
    })
    .filter_map(|pair| pair.split_once('='))
    .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
}

fn resolve(base: &Url, reference: &str) -> Option<String> {
    base.join(reference).ok().map(String::from)
}
