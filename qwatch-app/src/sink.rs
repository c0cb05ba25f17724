//! Terminal and audio implementation of the notification sink.
//!
//! The banner is a highlighted stdout line, the title channel uses the OSC
//! terminal title escape, and the audio cue plays through rodio. Rodio's
//! output stream is not `Send`, so playback lives on a dedicated thread fed
//! over a std mpsc channel; a `Play` command while a cue is sounding stops
//! the old sink and starts a fresh one, restarting the cue from zero.

use qwatch_core::processors::{CueError, NotificationSink};
use rodio::Source;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, warn};

const BASE_TITLE: &str = "qwatch";

enum AudioCommand {
    Play,
}

/// Notification sink writing to the controlling terminal.
pub struct TerminalSink {
    audio_tx: mpsc::Sender<AudioCommand>,
}

impl TerminalSink {
    /// Create the sink and start its audio thread. `audio_cue` selects the
    /// cue file; without one a synthesized tone is used.
    pub fn new(audio_cue: Option<PathBuf>) -> Self {
        Self {
            audio_tx: spawn_audio_thread(audio_cue),
        }
    }
}

impl NotificationSink for TerminalSink {
    fn show_banner(&self, message: &str) {
        println!("\x1b[1;33m>>> {message}\x1b[0m");
    }

    fn clear_banner(&self) {
        debug!("Banner expired");
    }

    fn set_title(&self, title: &str) {
        print!("\x1b]0;{title}\x07");
        let _ = std::io::stdout().flush();
    }

    fn restore_title(&self) {
        self.set_title(BASE_TITLE);
    }

    fn play_cue(&self) -> Result<(), CueError> {
        self.audio_tx
            .send(AudioCommand::Play)
            .map_err(|_| CueError::new("audio thread is not running"))
    }
}

fn spawn_audio_thread(cue_path: Option<PathBuf>) -> mpsc::Sender<AudioCommand> {
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("qwatch-audio".to_string())
        .spawn(move || audio_loop(rx, cue_path));
    if let Err(e) = spawned {
        warn!(error = %e, "Failed to start audio thread, alerts will be silent");
    }
    tx
}

/// Playback loop. Exits when the sink is dropped and the channel closes.
fn audio_loop(rx: mpsc::Receiver<AudioCommand>, cue_path: Option<PathBuf>) {
    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "No audio output available, alerts will be silent");
            while rx.recv().is_ok() {}
            return;
        }
    };

    let mut active: Option<rodio::Sink> = None;
    while let Ok(AudioCommand::Play) = rx.recv() {
        if let Some(previous) = active.take() {
            previous.stop();
        }
        let sink = rodio::Sink::connect_new(stream.mixer());
        append_cue(&sink, cue_path.as_deref());
        active = Some(sink);
    }
}

/// Queue the configured cue file, or the synthesized tone as fallback.
fn append_cue(sink: &rodio::Sink, cue_path: Option<&Path>) {
    if let Some(path) = cue_path {
        match std::fs::File::open(path) {
            Ok(file) => match rodio::Decoder::new(std::io::BufReader::new(file)) {
                Ok(source) => {
                    sink.append(source);
                    return;
                }
                Err(e) => warn!(error = %e, ?path, "Failed to decode audio cue, using tone"),
            },
            Err(e) => warn!(error = %e, ?path, "Failed to open audio cue, using tone"),
        }
    }

    let tone = rodio::source::SineWave::new(880.0)
        .take_duration(Duration::from_millis(600))
        .amplify(0.20);
    sink.append(tone);
}
