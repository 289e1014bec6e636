//! Asynchronous HTTP geometry loading.
//!
//! Fetches a PLY file over HTTP(S) with streaming, reporting progress while
//! bytes arrive and a terminal parsed/failed event at the end. Each call is
//! fire-and-forget: the transfer runs on ehttp's worker thread and talks
//! back over an `mpsc` channel the UI drains once per frame.

use plyview_data::{PlyGeometry, parse_ply};
use std::cell::RefCell;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::sync::mpsc::Sender;
use tracing::{debug, warn};

/// Progress or terminal outcome of one geometry download.
#[derive(Debug)]
pub enum LoadEvent {
    /// Bytes received so far; `total` is absent when the server sent no
    /// content-length header.
    Progress { received: u64, total: Option<u64> },
    /// The payload arrived and parsed.
    Loaded(PlyGeometry),
    /// Transport, HTTP, or parse failure; the message is user-displayable.
    Failed(String),
}

/// A [`LoadEvent`] tagged with the load generation that produced it, so
/// receivers can discard completions a newer request has superseded.
#[derive(Debug)]
pub struct LoadMessage {
    pub generation: u64,
    pub event: LoadEvent,
}

/// Fractional completion in percent.
///
/// When the total size is unknown the ratio is computed against zero and
/// comes out non-finite; callers display the percentage only when finite.
pub fn progress_percent(received: u64, total: Option<u64>) -> f32 {
    received as f32 / total.unwrap_or(0) as f32 * 100.0
}

struct Download {
    bytes: Vec<u8>,
    total: Option<u64>,
}

/// Start downloading `url` and stream [`LoadMessage`]s to `tx`.
///
/// There is no cancellation primitive; a superseded transfer runs to
/// completion and its terminal event is dropped by generation checks on the
/// receiving side (or by the channel closing).
pub fn fetch_geometry(url: String, generation: u64, tx: Sender<LoadMessage>) {
    debug!("Fetching geometry from {url:?}");

    let download = RefCell::new(Download {
        bytes: Vec::new(),
        total: None,
    });

    let send = move |event: LoadEvent| -> ControlFlow<()> {
        match tx.send(LoadMessage { generation, event }) {
            Ok(()) => ControlFlow::Continue(()),
            // Receiver gone: the viewer shut down, stop the transfer.
            Err(_) => ControlFlow::Break(()),
        }
    };

    ehttp::streaming::fetch(ehttp::Request::get(&url), move |part| match part {
        Ok(ehttp::streaming::Part::Response(response)) => {
            if response.ok {
                download.borrow_mut().total = response
                    .headers
                    .get("content-length")
                    .and_then(|value| value.parse().ok());
                ControlFlow::Continue(())
            } else {
                warn!(
                    "Failed to fetch {url}: {} {}",
                    response.status, response.status_text
                );
                let _ = send(LoadEvent::Failed(format!(
                    "Failed to fetch {url}: HTTP {} {}",
                    response.status, response.status_text
                )));
                ControlFlow::Break(())
            }
        }
        Ok(ehttp::streaming::Part::Chunk(chunk)) => {
            if chunk.is_empty() {
                // End of stream: hand the whole payload to the parser.
                let bytes = std::mem::take(&mut download.borrow_mut().bytes);
                debug!("Fetched {} bytes from {url}, parsing", bytes.len());
                let event = match parse_ply(Cursor::new(bytes)) {
                    Ok(geometry) => LoadEvent::Loaded(geometry),
                    Err(err) => {
                        warn!("Failed to parse geometry from {url}: {err}");
                        LoadEvent::Failed(format!("Failed to parse {url}: {err}"))
                    }
                };
                let _ = send(event);
                return ControlFlow::Break(());
            }

            let (received, total) = {
                let mut download = download.borrow_mut();
                download.bytes.extend_from_slice(&chunk);
                (download.bytes.len() as u64, download.total)
            };
            send(LoadEvent::Progress { received, total })
        }
        Err(err) => {
            warn!("Failed to fetch {url}: {err}");
            let _ = send(LoadEvent::Failed(format!("Failed to fetch {url}: {err}")));
            ControlFlow::Break(())
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_with_known_total() {
        assert_eq!(progress_percent(50, Some(200)), 25.0);
        assert_eq!(progress_percent(200, Some(200)), 100.0);
    }

    #[test]
    fn test_progress_percent_with_unknown_total_is_non_finite() {
        assert!(!progress_percent(50, None).is_finite());
        assert!(!progress_percent(0, None).is_finite());
        assert!(!progress_percent(50, Some(0)).is_finite());
    }
}
