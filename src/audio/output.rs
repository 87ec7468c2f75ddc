//! Audio output backend: one cpal stream playing decoded WAV tracks.
//!
//! The stream is opened once and kept alive; it plays silence while nothing
//! is loaded. Tracks are decoded on a loader thread so the frame loop never
//! blocks on file IO, and the output callback only ever `try_lock`s the
//! shared voice.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, error, info, warn};

use super::analyser::{AnalysisTap, SpectrumAnalyser};
use super::playback::{BackendEvent, PlayResult, PlaybackBackend, RequestId, StartKind};
use super::ring::{SampleRing, SharedRing};
use crate::error::PlaybackError;
use crate::params::{AnalyserConfig, PlaybackConfig};

/// Decoded track, mixed down to mono
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTrack {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Read a WAV file into mono f32 samples in -1..=1
pub fn decode_wav(path: &Path) -> Result<DecodedTrack, PlaybackError> {
    let decode_error = |source| PlaybackError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = hound::WavReader::open(path).map_err(decode_error)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_error)?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(decode_error)?
        }
    };

    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    if samples.is_empty() {
        return Err(PlaybackError::EmptyTrack {
            path: path.to_path_buf(),
        });
    }

    Ok(DecodedTrack {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Playback cursor shared with the output callback
#[derive(Debug)]
struct Voice {
    samples: Vec<f32>,
    /// Source frames advanced per output frame
    step: f64,
    position: f64,
    playing: bool,
    /// Request that started what the voice is playing
    request: RequestId,
    volume: f32,
    limiter: f32,
}

impl Voice {
    fn new(config: &PlaybackConfig) -> Self {
        Self {
            samples: Vec::new(),
            step: 1.0,
            position: 0.0,
            playing: false,
            request: 0,
            volume: config.volume,
            limiter: config.limiter.abs(),
        }
    }

    fn install(&mut self, request: RequestId, track: DecodedTrack, output_rate: u32) {
        self.request = request;
        self.step = f64::from(track.sample_rate) / f64::from(output_rate.max(1));
        self.samples = track.samples;
        self.position = 0.0;
        self.playing = true;
    }

    /// Continue from the cursor, rewinding a track that already ended
    fn resume(&mut self, request: RequestId) -> bool {
        if self.samples.is_empty() {
            return false;
        }
        self.request = request;
        if self.position as usize >= self.samples.len() {
            self.position = 0.0;
        }
        self.playing = true;
        true
    }

    /// Next output sample; `None` once the track has run out
    fn next_sample(&mut self) -> Option<f32> {
        if !self.playing {
            return Some(0.0);
        }
        let index = self.position as usize;
        let sample = *self.samples.get(index)?;
        self.position += self.step;
        Some((sample * self.volume).clamp(-self.limiter, self.limiter))
    }

    /// Fill one interleaved output buffer, feeding the mono mix to `ring`
    ///
    /// Returns true when the track ended during this buffer.
    fn render(&mut self, data: &mut [f32], channels: usize, mut ring: Option<&mut SampleRing>) -> bool {
        let mut ended = false;
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = match self.next_sample() {
                Some(sample) => sample,
                None => {
                    self.playing = false;
                    ended = true;
                    0.0
                }
            };
            frame.fill(sample);
            if let Some(ring) = ring.as_deref_mut() {
                ring.push(sample);
            }
        }
        ended
    }
}

type LoadJob = (RequestId, PathBuf);
type LoadResult = (RequestId, Result<DecodedTrack, PlaybackError>);

fn spawn_loader(jobs: Receiver<LoadJob>, results: Sender<LoadResult>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for (request, path) in jobs {
            debug!("Decoding {}", path.display());
            if results.send((request, decode_wav(&path))).is_err() {
                break;
            }
        }
        debug!("Track loader exiting");
    })
}

/// Playback backend on the default cpal output device
pub struct CpalBackend {
    voice: Arc<Mutex<Voice>>,
    ring: SharedRing,
    analyser_config: AnalyserConfig,
    output_rate: u32,

    load_tx: Sender<LoadJob>,
    loaded_rx: Receiver<LoadResult>,
    /// End of track, tagged with the request that started it
    ended_rx: Receiver<RequestId>,

    /// Load request currently in flight
    pending: Option<RequestId>,
    queue: VecDeque<BackendEvent>,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,

    _loader: thread::JoinHandle<()>,
}

impl CpalBackend {
    /// Open the default output device and start a silent stream
    pub fn new(
        playback: &PlaybackConfig,
        analyser_config: AnalyserConfig,
    ) -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;

        let config = device.default_output_config()?;
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(PlaybackError::UnsupportedFormat(config.sample_format()));
        }

        let output_rate = config.sample_rate().0;
        let channels = usize::from(config.channels());
        info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            output_rate,
            channels
        );

        let voice = Arc::new(Mutex::new(Voice::new(playback)));
        let ring = SampleRing::shared(analyser_config.fft_size);
        let (ended_tx, ended_rx) = crossbeam_channel::bounded::<RequestId>(4);

        let voice_cb = Arc::clone(&voice);
        let ring_cb = Arc::clone(&ring);
        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let Ok(mut voice) = voice_cb.try_lock() else {
                    data.fill(0.0);
                    return;
                };
                let mut ring = ring_cb.try_lock().ok();
                if voice.render(data, channels, ring.as_deref_mut()) {
                    let _ = ended_tx.try_send(voice.request);
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )?;
        stream.play()?;

        let (load_tx, load_rx) = crossbeam_channel::unbounded();
        let (loaded_tx, loaded_rx) = crossbeam_channel::unbounded();
        let loader = spawn_loader(load_rx, loaded_tx);

        Ok(Self {
            voice,
            ring,
            analyser_config,
            output_rate,
            load_tx,
            loaded_rx,
            ended_rx,
            pending: None,
            queue: VecDeque::new(),
            _stream: stream,
            _loader: loader,
        })
    }

    /// Supersede the in-flight load, if any
    fn abort_pending(&mut self) {
        if let Some(request) = self.pending.take() {
            self.queue.push_back(BackendEvent::Settled {
                request,
                result: PlayResult::Aborted,
            });
        }
    }

    fn drain_channels(&mut self) {
        loop {
            match self.loaded_rx.try_recv() {
                Ok((request, result)) => self.install(request, result),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Track loader stopped");
                    if let Some(request) = self.pending.take() {
                        self.queue.push_back(BackendEvent::Settled {
                            request,
                            result: PlayResult::Failed("track loader stopped".into()),
                        });
                    }
                    break;
                }
            }
        }
        while let Ok(request) = self.ended_rx.try_recv() {
            self.queue.push_back(BackendEvent::Ended { request });
        }
    }

    fn install(&mut self, request: RequestId, result: Result<DecodedTrack, PlaybackError>) {
        if self.pending != Some(request) {
            // Already reported as aborted when it was superseded
            debug!("Dropping stale load {}", request);
            return;
        }
        self.pending = None;

        let result = match result {
            Ok(track) => match self.voice.lock() {
                Ok(mut voice) => {
                    voice.install(request, track, self.output_rate);
                    if let Ok(mut ring) = self.ring.lock() {
                        ring.clear();
                    }
                    PlayResult::Started
                }
                Err(_) => PlayResult::Failed("audio voice poisoned".into()),
            },
            Err(err) => PlayResult::Failed(err.to_string()),
        };
        self.queue
            .push_back(BackendEvent::Settled { request, result });
    }
}

impl PlaybackBackend for CpalBackend {
    fn start(&mut self, request: RequestId, kind: StartKind<'_>) {
        self.abort_pending();

        match kind {
            StartKind::Load(path) => {
                // Stop the old track while the new one decodes
                if let Ok(mut voice) = self.voice.lock() {
                    voice.playing = false;
                }
                match self.load_tx.send((request, path.to_path_buf())) {
                    Ok(()) => self.pending = Some(request),
                    Err(_) => self.queue.push_back(BackendEvent::Settled {
                        request,
                        result: PlayResult::Failed("track loader stopped".into()),
                    }),
                }
            }
            StartKind::Resume => {
                let result = match self.voice.lock() {
                    Ok(mut voice) => {
                        if voice.resume(request) {
                            PlayResult::Started
                        } else {
                            PlayResult::Failed("nothing to resume".into())
                        }
                    }
                    Err(_) => PlayResult::Failed("audio voice poisoned".into()),
                };
                self.queue
                    .push_back(BackendEvent::Settled { request, result });
            }
        }
    }

    fn pause(&mut self) {
        self.abort_pending();
        if let Ok(mut voice) = self.voice.lock() {
            voice.playing = false;
        }
    }

    fn poll_event(&mut self) -> Option<BackendEvent> {
        self.drain_channels();
        self.queue.pop_front()
    }

    fn analysis_tap(&mut self) -> Option<Box<dyn AnalysisTap>> {
        Some(Box::new(SpectrumAnalyser::new(
            self.analyser_config.clone(),
            Arc::clone(&self.ring),
        )))
    }
}
