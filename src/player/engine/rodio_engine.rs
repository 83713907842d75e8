//! Audio output through rodio.
//!
//! The output stream lives on its own thread for the whole engine lifetime;
//! the engine only holds the stream's mixer and the current sink, so it can
//! be moved across threads.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStreamBuilder, Sink, Source};

use super::{EngineError, PlaybackEngine};

/// Plays audio files on the default output device.
pub struct RodioEngine {
    mixer: Mixer,
    shutdown_tx: Option<mpsc::Sender<()>>,
    output_thread: Option<JoinHandle<()>>,
    path: Option<PathBuf>,
    sink: Option<Sink>,
    /// Sink position at the most recent play/resume
    anchor: Duration,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, EngineError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<Mixer, String>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let output_thread = thread::Builder::new()
            .name("srtp-audio-out".to_string())
            .spawn(move || match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(stream.mixer().clone()));
                    // Keep the stream alive until the engine is dropped
                    let _ = shutdown_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| EngineError::Output(e.to_string()))?;

        let mixer = ready_rx
            .recv()
            .map_err(|_| EngineError::Output("audio thread exited".to_string()))?
            .map_err(EngineError::Output)?;

        Ok(Self {
            mixer,
            shutdown_tx: Some(shutdown_tx),
            output_thread: Some(output_thread),
            path: None,
            sink: None,
            anchor: Duration::ZERO,
        })
    }

    fn open_decoder(path: &Path) -> Result<Decoder<std::io::BufReader<File>>, EngineError> {
        let file = File::open(path).map_err(|e| EngineError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Decoder::try_from(file).map_err(|e| EngineError::Decode(e.to_string()))
    }
}

impl PlaybackEngine for RodioEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        // Fail early on unreadable or undecodable files
        Self::open_decoder(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self, start: f64) -> Result<(), EngineError> {
        let path = self.path.clone().ok_or(EngineError::NotLoaded)?;
        self.stop();

        let start = Duration::from_secs_f64(start.max(0.0));
        let sink = Sink::connect_new(&self.mixer);
        sink.append(Self::open_decoder(&path)?);

        self.anchor = Duration::ZERO;
        if !start.is_zero() {
            match sink.try_seek(start) {
                Ok(()) => self.anchor = start,
                Err(e) => {
                    // Not every format supports seeking: skip samples instead,
                    // the sink then counts from zero
                    tracing::debug!(error = %e, "Seek unsupported, skipping ahead");
                    sink.clear();
                    sink.append(Self::open_decoder(&path)?.skip_duration(start));
                }
            }
        }

        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(sink) = &self.sink {
            self.anchor = sink.get_pos();
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.anchor = Duration::ZERO;
    }

    fn is_active(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }

    fn elapsed_since_play(&self) -> Option<Duration> {
        let sink = self.sink.as_ref()?;
        let pos = sink.get_pos();
        // Before the seek lands the sink may still report its old position
        if pos < self.anchor {
            return None;
        }
        Some(pos - self.anchor)
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        self.stop();
        // Closing the channel releases the output thread
        self.shutdown_tx.take();
        if let Some(handle) = self.output_thread.take() {
            let _ = handle.join();
        }
    }
}
