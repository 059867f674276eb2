//! `rodio` backed media element for local files.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use super::{MediaElement, MediaError, MediaEvent, MediaEventKind, local_path};

pub struct LocalElement {
    stream: OutputStream,
    sink: Option<Sink>,
    path: Option<String>,
    load_id: u64,
    volume: f64,
    muted: bool,
    playing: bool,
    pending: Vec<MediaEvent>,
}

impl LocalElement {
    /// Open the default output device.
    pub fn open() -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            path: None,
            load_id: 0,
            volume: 1.0,
            muted: false,
            playing: false,
            pending: Vec::new(),
        })
    }

    fn emit(&mut self, kind: MediaEventKind) {
        self.pending.push(MediaEvent {
            load_id: self.load_id,
            kind,
        });
    }

    /// Put the loaded file back into a sink that played to its end.
    fn rewind_if_finished(&mut self) -> Result<(), MediaError> {
        let (Some(sink), Some(path)) = (&self.sink, &self.path) else {
            return Ok(());
        };
        if refill(sink, self.playing, || decode(path))? {
            debug!(path, playing = self.playing, "source reopened");
        }
        Ok(())
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume as f32 }
    }

    fn apply_volume(&mut self) {
        let v = self.effective_volume();
        if let Some(sink) = &self.sink {
            sink.set_volume(v);
        }
        self.emit(MediaEventKind::VolumeChange {
            volume: self.volume,
            muted: self.muted,
        });
    }
}

impl MediaElement for LocalElement {
    fn load(&mut self, load_id: u64, url: &str) -> Result<(), MediaError> {
        self.unload();
        self.load_id = load_id;

        let path = local_path(url).ok_or_else(|| MediaError::UnsupportedUrl(url.to_string()))?;
        let source = decode(path)?;
        let duration = source.total_duration().map(|d| d.as_secs_f64());

        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        sink.set_volume(self.effective_volume());
        sink.append(source);
        self.sink = Some(sink);
        self.path = Some(path.to_string());

        debug!(load_id, path, ?duration, "source loaded");
        self.emit(MediaEventKind::LoadedMetadata { duration });
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.path = None;
        self.playing = false;
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.rewind_if_finished()?;
        let Some(sink) = &self.sink else {
            return Err(MediaError::NoSource);
        };
        sink.play();
        if !self.playing {
            self.playing = true;
            self.emit(MediaEventKind::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        if self.playing {
            self.playing = false;
            self.emit(MediaEventKind::Pause);
        }
    }

    fn seek(&mut self, position: f64) {
        if let Err(e) = self.rewind_if_finished() {
            warn!("cannot reopen source for seek: {e}");
            self.emit(MediaEventKind::Error(e.to_string()));
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };
        let Ok(target) = Duration::try_from_secs_f64(position.max(0.0)) else {
            return;
        };
        match sink.try_seek(target) {
            Ok(()) => {
                let position = sink.get_pos().as_secs_f64();
                self.emit(MediaEventKind::TimeUpdate { position });
            }
            Err(e) => warn!(position, "seek failed: {e}"),
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if self.playing {
            let finished = self.sink.as_ref().map(Sink::empty).unwrap_or(true);
            if finished {
                self.playing = false;
                self.emit(MediaEventKind::Pause);
                self.emit(MediaEventKind::Ended);
            } else if let Some(sink) = &self.sink {
                let position = sink.get_pos().as_secs_f64();
                self.emit(MediaEventKind::TimeUpdate { position });
            }
        }
        std::mem::take(&mut self.pending)
    }
}

/// Append a fresh source to `sink` if it has run dry. Returns whether it did.
///
/// A drained sink is still unpaused, so the new source would start sounding
/// at once; unless the element is meant to be playing it is paused first.
fn refill<S, F>(sink: &Sink, playing: bool, reopen: F) -> Result<bool, MediaError>
where
    S: Source + Send + 'static,
    F: FnOnce() -> Result<S, MediaError>,
{
    if !sink.empty() {
        return Ok(false);
    }
    let source = reopen()?;
    if !playing {
        sink.pause();
    }
    sink.append(source);
    Ok(true)
}

fn decode(path: &str) -> Result<Decoder<BufReader<File>>, MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_string(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rodio::buffer::SamplesBuffer;

    use super::*;

    fn short_source() -> SamplesBuffer {
        SamplesBuffer::new(1, 44_100, vec![0.25_f32; 64])
    }

    /// A sink with no device behind it whose only source has been played out.
    fn drained_sink() -> (Sink, impl Iterator<Item = f32>) {
        let (sink, mut output) = Sink::new();
        sink.append(short_source());
        for _ in 0..10_000 {
            if sink.empty() {
                break;
            }
            output.next();
        }
        assert!(sink.empty());
        assert!(!sink.is_paused());
        (sink, output)
    }

    #[test]
    fn refill_after_end_stays_silent_when_not_playing() {
        let (sink, _output) = drained_sink();

        let refilled = refill(&sink, false, || Ok(short_source())).unwrap();
        assert!(refilled);
        assert!(!sink.empty());
        assert!(sink.is_paused());
    }

    #[test]
    fn refill_after_end_keeps_running_when_playing() {
        let (sink, _output) = drained_sink();

        assert!(refill(&sink, true, || Ok(short_source())).unwrap());
        assert!(!sink.is_paused());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn refill_leaves_a_busy_sink_alone() {
        let (sink, _output) = Sink::new();
        sink.append(short_source());

        let refilled = refill(&sink, false, || -> Result<SamplesBuffer, MediaError> {
            Err(MediaError::NoSource)
        })
        .unwrap();
        assert!(!refilled);
        assert_eq!(sink.len(), 1);
        assert!(!sink.is_paused());
    }

    #[test]
    fn refill_reports_a_source_that_cannot_be_reopened() {
        let (sink, _output) = drained_sink();

        let result = refill(&sink, false, || -> Result<SamplesBuffer, MediaError> {
            Err(MediaError::NoSource)
        });
        assert!(matches!(result, Err(MediaError::NoSource)));
        assert!(sink.empty());
    }
}
