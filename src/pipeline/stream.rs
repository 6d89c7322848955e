use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use anyhow::{Result, anyhow};
use crossbeam_channel::{SendTimeoutError, Sender};

use super::LandmarkSource;
use crate::types::LandmarkFrame;

const SEND_POLL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct LandmarkStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl LandmarkStream {
    /// Stops the producer and joins it, returning the error that ended the
    /// stream early, if any.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        self.stop.store(true, Ordering::SeqCst);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("landmark stream thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for LandmarkStream {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::error!("landmark stream failed: {err:?}");
        }
    }
}

/// Pulls frames from `source` on a background thread and forwards them in
/// order. The thread blocks while the consumer is busy instead of dropping
/// frames, since a skipped frame could hide a release. A source error ends
/// the stream and is returned by [`LandmarkStream::stop`].
pub fn start_landmark_stream<S: LandmarkSource>(
    mut source: S,
    frame_tx: Sender<LandmarkFrame>,
) -> LandmarkStream {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let mut forwarded = 0usize;
        while !stop_flag.load(Ordering::Relaxed) {
            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("landmark stream finished after {forwarded} frames");
                    return Ok(());
                }
                Err(err) => {
                    return Err(err.context(format!(
                        "landmark source failed after {forwarded} frames"
                    )));
                }
            };

            let mut pending = frame;
            loop {
                match frame_tx.send_timeout(pending, SEND_POLL) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Timeout(frame)) => {
                        if stop_flag.load(Ordering::Relaxed) {
                            return Ok(());
                        }
                        pending = frame;
                    }
                    Err(SendTimeoutError::Disconnected(_)) => return Ok(()),
                }
            }
            forwarded += 1;
        }
        Ok(())
    });

    LandmarkStream {
        stop,
        handle: Some(handle),
    }
}
