//! In-process sound playback on a dedicated audio thread

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Sound file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Audio thread has stopped")]
    Closed,
}

/// Fire-and-forget player. Requests go to a worker thread that owns the
/// output stream; overlapping cues play side by side.
#[derive(Debug, Clone)]
pub struct AudioPlayer {
    tx: Sender<PathBuf>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<PathBuf>();
        let spawned = thread::Builder::new()
            .name("audio".into())
            .spawn(move || playback_loop(rx));
        if let Err(e) = spawned {
            warn!("Failed to start audio thread, cues will be silent: {}", e);
        }
        Self { tx }
    }

    /// Queue `path` for playback and return immediately.
    /// Undecodable files and a missing output device are only logged.
    pub fn play(&self, path: &Path) -> Result<(), AudioError> {
        if !path.is_file() {
            return Err(AudioError::MissingFile(path.to_path_buf()));
        }
        debug!("Queueing {}", path.display());
        self.tx
            .send(path.to_path_buf())
            .map_err(|_| AudioError::Closed)
    }
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn playback_loop(rx: Receiver<PathBuf>) {
    let mut output = OutputStream::try_default().ok();
    match output {
        Some(_) => info!("Audio output ready"),
        None => warn!("Audio output unavailable; cues stay silent until a device appears"),
    }
    let mut active_sinks: Vec<Sink> = Vec::new();

    while let Ok(path) = rx.recv() {
        active_sinks.retain(|sink| !sink.empty());

        if output.is_none() {
            output = OutputStream::try_default().ok();
        }
        let Some((_, handle)) = output.as_ref() else {
            debug!(path = %path.display(), "no audio output, skipping sound");
            continue;
        };

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                warn!(?err, path = %path.display(), "failed opening sound file");
                continue;
            }
        };
        let decoder = match Decoder::new(BufReader::new(file)) {
            Ok(decoder) => decoder,
            Err(err) => {
                warn!(?err, path = %path.display(), "failed decoding sound file");
                continue;
            }
        };

        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.append(decoder);
                active_sinks.push(sink);
                debug!(path = %path.display(), "playing");
            }
            Err(err) => {
                warn!(?err, "failed to create audio sink");
                output = None;
            }
        }
    }
    debug!("Audio channel closed, stopping playback thread");
}
