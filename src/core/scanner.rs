use crate::config::toml_config::ScannerConfig;
use crate::domain::ports::{FrameSource, QrDecoder};
use crate::utils::error::{ClientError, Result};
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Holds the capture device for the duration of one scan and releases it on
/// every exit path, including when the scan future is dropped.
struct CaptureGuard<'a, F: FrameSource> {
    source: &'a mut F,
}

impl<F: FrameSource> Drop for CaptureGuard<'_, F> {
    fn drop(&mut self) {
        self.source.stop();
    }
}

/// Frame reads and decoding are synchronous; on a multi-threaded runtime they
/// run under `block_in_place` so other tasks keep running meanwhile.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|h| h.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(f),
        _ => f(),
    }
}

pub struct QrScanner<D: QrDecoder> {
    decoder: D,
    frame_interval: Duration,
    timeout: Duration,
}

impl<D: QrDecoder> QrScanner<D> {
    pub fn new(decoder: D, config: &ScannerConfig) -> Self {
        Self::with_timing(decoder, config.frame_interval(), config.timeout())
    }

    pub fn with_timing(decoder: D, frame_interval: Duration, timeout: Duration) -> Self {
        Self {
            decoder,
            frame_interval,
            timeout,
        }
    }

    /// Poll frames until one decodes, returning the first decoded text.
    pub async fn scan<F: FrameSource>(
        &self,
        source: &mut F,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if !source.is_available() {
            return Err(ClientError::CameraUnavailable {
                reason: "no camera or image source available".to_string(),
            });
        }

        let mut guard = CaptureGuard { source };
        guard.source.start()?;
        tracing::info!("📷 Scanning for QR code...");

        let deadline = tokio::time::sleep_until(Instant::now() + self.timeout);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Scan cancelled after {} frame(s)", frames);
                    return Err(ClientError::ScanCancelled);
                }
                _ = &mut deadline => {
                    return Err(ClientError::ScanTimeout {
                        seconds: self.timeout.as_secs(),
                    });
                }
                _ = ticker.tick() => {
                    let polled = run_blocking(|| -> Result<Option<String>> {
                        let Some(frame) = guard.source.next_frame()? else {
                            return Ok(None);
                        };
                        frames += 1;
                        Ok(self.decoder.decode(&frame))
                    });
                    if let Some(code) = polled? {
                        tracing::info!("✅ QR code detected after {} frame(s)", frames);
                        return Ok(code);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Frame;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Frames whose first pixel is 0 "contain" the code.
    struct MarkerDecoder;

    impl QrDecoder for MarkerDecoder {
        fn decode(&self, frame: &Frame) -> Option<String> {
            (frame.luma.first() == Some(&0)).then(|| "ASN-0007".to_string())
        }
    }

    fn frame(marker: u8) -> Frame {
        Frame {
            width: 1,
            height: 1,
            luma: vec![marker],
        }
    }

    struct ScriptedCamera {
        available: bool,
        frames: VecDeque<Result<Option<Frame>>>,
        stops: Arc<AtomicUsize>,
        started: bool,
    }

    impl ScriptedCamera {
        fn new(frames: Vec<Result<Option<Frame>>>) -> (Self, Arc<AtomicUsize>) {
            let stops = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    available: true,
                    frames: frames.into(),
                    stops: stops.clone(),
                    started: false,
                },
                stops,
            )
        }
    }

    impl FrameSource for ScriptedCamera {
        fn is_available(&self) -> bool {
            self.available
        }

        fn start(&mut self) -> Result<()> {
            self.started = true;
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Option<Frame>> {
            self.frames.pop_front().unwrap_or(Ok(None))
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scanner(timeout_ms: u64) -> QrScanner<MarkerDecoder> {
        QrScanner::with_timing(
            MarkerDecoder,
            Duration::from_millis(1),
            Duration::from_millis(timeout_ms),
        )
    }

    #[tokio::test]
    async fn test_first_decoded_frame_wins_and_releases_camera() {
        let (mut camera, stops) = ScriptedCamera::new(vec![
            Ok(None),
            Ok(Some(frame(255))),
            Ok(Some(frame(0))),
            Ok(Some(frame(0))),
        ]);
        let code = scanner(5_000)
            .scan(&mut camera, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(code, "ASN-0007");
        assert!(camera.started);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        // 成功後不再讀取
        assert_eq!(camera.frames.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_scan_on_multi_thread_runtime() {
        let (mut camera, stops) =
            ScriptedCamera::new(vec![Ok(Some(frame(255))), Ok(Some(frame(0)))]);
        let code = scanner(5_000)
            .scan(&mut camera, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(code, "ASN-0007");
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unavailable_camera_is_not_started() {
        let (mut camera, stops) = ScriptedCamera::new(vec![]);
        camera.available = false;
        let err = scanner(100)
            .scan(&mut camera, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::CameraUnavailable { .. }));
        assert!(!camera.started);
        assert_eq!(stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_frame_error_releases_camera() {
        let (mut camera, stops) = ScriptedCamera::new(vec![Err(ClientError::ScanFailed {
            message: "device lost".into(),
        })]);
        let err = scanner(5_000)
            .scan(&mut camera, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ScanFailed { .. }));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_releases_camera() {
        let (mut camera, stops) = ScriptedCamera::new(vec![]);
        let err = scanner(30)
            .scan(&mut camera, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ScanTimeout { .. }));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_releases_camera() {
        let (mut camera, stops) = ScriptedCamera::new(vec![]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = scanner(5_000).scan(&mut camera, &cancel).await.unwrap_err();
        assert!(matches!(err, ClientError::ScanCancelled));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_scan_releases_camera() {
        let (mut camera, stops) = ScriptedCamera::new(vec![]);
        let cancel = CancellationToken::new();
        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            scanner(5_000).scan(&mut camera, &cancel),
        )
        .await;
        assert!(outcome.is_err());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
