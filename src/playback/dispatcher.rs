//! Background playback with at most one session in flight.
//!
//! `start` returns immediately. Rendering and output run on a dedicated
//! executor; when they finish (or fail, or panic) the session returns to
//! `Idle` first and only then is the completion callback run.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tokio::sync::oneshot;

use super::sink::{AudioSink, Clip, PlaybackOutcome, default_chain, select_sink};
use crate::config::AudioConfig;
use crate::dsp::renderer::render_pcm;
use crate::error::{MorseError, Result};

const TEMP_FILE_NAME: &str = "morsewave-playback.wav";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Rendering the clip.
    Starting,
    /// The sink has the clip.
    Playing,
}

/// Returned by a successful `start`.
#[derive(Debug)]
pub struct PlaybackHandle {
    done: oneshot::Receiver<()>,
}

impl PlaybackHandle {
    /// Block until the session has ended and its callback has returned.
    /// Must not be called from inside an async context.
    pub fn wait(self) {
        let _ = self.done.blocking_recv();
    }

    /// Await the end of the session.
    pub async fn finished(self) {
        let _ = self.done.await;
    }
}

/// Resets the session to `Idle` when dropped, whatever path the worker
/// leaves by.
struct SessionGuard(Arc<Mutex<SessionState>>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        *self.0.lock() = SessionState::Idle;
    }
}

pub struct PlaybackDispatcher {
    session: Arc<Mutex<SessionState>>,
    sink: Arc<dyn AudioSink>,
    temp_path: PathBuf,
    runtime: Runtime,
}

impl PlaybackDispatcher {
    /// Build a dispatcher around `sink`. Sinks that need a file use
    /// `temp_path`.
    pub fn new(sink: Box<dyn AudioSink>, temp_path: PathBuf) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("morsewave-playback")
            .enable_all()
            .build()
            .map_err(|e| MorseError::Playback(format!("failed to start playback executor: {e}")))?;

        Ok(PlaybackDispatcher {
            session: Arc::new(Mutex::new(SessionState::Idle)),
            sink: Arc::from(sink),
            temp_path,
            runtime,
        })
    }

    /// Build a dispatcher with the best sink this machine offers.
    pub fn detect() -> Result<Self> {
        Self::new(select_sink(default_chain()), default_temp_path())
    }

    pub fn state(&self) -> SessionState {
        *self.session.lock()
    }

    pub fn is_active(&self) -> bool {
        self.state() != SessionState::Idle
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Start playing `morse` in the background.
    ///
    /// Fails without side effects if the input is blank or a session is
    /// already active; `on_done` is not called in that case. Otherwise
    /// `on_done` runs exactly once, after the session is back to `Idle`,
    /// with the outcome or the error that ended the session. It may start
    /// the next session and wait on it.
    pub fn start<F>(&self, morse: &str, config: AudioConfig, on_done: F) -> Result<PlaybackHandle>
    where
        F: FnOnce(Result<PlaybackOutcome>) + Send + 'static,
    {
        let morse = morse.trim().to_string();
        if morse.is_empty() {
            return Err(MorseError::EmptyMorse);
        }

        {
            let mut state = self.session.lock();
            if *state != SessionState::Idle {
                return Err(MorseError::AlreadyPlaying);
            }
            *state = SessionState::Starting;
        }

        let (tx, rx) = oneshot::channel();
        let guard = SessionGuard(self.session.clone());
        let sink = self.sink.clone();
        let temp_path = self.temp_path.clone();

        info!("playback started with sink '{}'", sink.name());
        self.runtime.spawn_blocking(move || {
            let result = catch_unwind(AssertUnwindSafe(|| {
                run_session(&guard.0, sink.as_ref(), &morse, &config, &temp_path)
            }))
            .unwrap_or_else(|_| Err(MorseError::Playback("playback worker panicked".to_string())));

            drop(guard);
            match &result {
                Ok(outcome) => info!("playback finished: {outcome:?}"),
                Err(e) => warn!("playback failed: {e}"),
            }
            on_done(result);
            let _ = tx.send(());
        });

        Ok(PlaybackHandle { done: rx })
    }
}

fn run_session(
    session: &Mutex<SessionState>,
    sink: &dyn AudioSink,
    morse: &str,
    config: &AudioConfig,
    temp_path: &Path,
) -> Result<PlaybackOutcome> {
    let clip = Clip {
        pcm: render_pcm(morse, config)?,
        sample_rate: config.sample_rate_hz,
    };
    *session.lock() = SessionState::Playing;
    sink.play(&clip, temp_path)
}

/// Per-user cache location for clips that have to go through a file.
pub fn default_temp_path() -> PathBuf {
    directories::ProjectDirs::from("net", "MorseWave", "morsewave")
        .map(|dirs| dirs.cache_dir().join(TEMP_FILE_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(TEMP_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::renderer::WavHeader;
    use crate::playback::sink::FileSink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    type Outcomes = Arc<Mutex<Vec<Result<PlaybackOutcome>>>>;

    /// Records every clip it is given.
    #[derive(Default)]
    struct Recorder {
        clips: Mutex<Vec<Clip>>,
    }

    impl AudioSink for Arc<Recorder> {
        fn name(&self) -> &str {
            "recorder"
        }
        fn play(&self, clip: &Clip, _temp_path: &Path) -> Result<PlaybackOutcome> {
            self.clips.lock().push(clip.clone());
            Ok(PlaybackOutcome::Played)
        }
    }

    /// Holds playback open until the test releases it.
    struct Gate {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl AudioSink for Gate {
        fn name(&self) -> &str {
            "gate"
        }
        fn play(&self, _clip: &Clip, _temp_path: &Path) -> Result<PlaybackOutcome> {
            let _ = self.entered.lock().send(());
            let _ = self.release.lock().recv_timeout(Duration::from_secs(10));
            Ok(PlaybackOutcome::Played)
        }
    }

    struct Broken;

    impl AudioSink for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn play(&self, _clip: &Clip, _temp_path: &Path) -> Result<PlaybackOutcome> {
            Err(MorseError::Playback("device unplugged".to_string()))
        }
    }

    struct Panicky;

    impl AudioSink for Panicky {
        fn name(&self) -> &str {
            "panicky"
        }
        fn play(&self, _clip: &Clip, _temp_path: &Path) -> Result<PlaybackOutcome> {
            panic!("driver crashed");
        }
    }

    fn config() -> AudioConfig {
        AudioConfig::new(700.0, 20, 8000)
    }

    fn dispatcher(sink: impl AudioSink + 'static) -> PlaybackDispatcher {
        PlaybackDispatcher::new(Box::new(sink), std::env::temp_dir().join("morsewave-test.wav"))
            .unwrap()
    }

    fn collector() -> (Outcomes, impl FnOnce(Result<PlaybackOutcome>) + Send + 'static) {
        let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = outcomes.clone();
        (outcomes, move |r| sink.lock().push(r))
    }

    #[test]
    fn plays_and_notifies_once() {
        let recorder = Arc::new(Recorder::default());
        let d = dispatcher(recorder.clone());
        let (outcomes, on_done) = collector();

        d.start("... --- ...", config(), on_done).unwrap().wait();

        assert_eq!(d.state(), SessionState::Idle);
        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].as_ref().unwrap(), &PlaybackOutcome::Played);

        let clips = recorder.clips.lock();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].sample_rate, 8000);
        assert!((clips[0].duration_secs() - 27.0 * 0.06).abs() < 1e-3);
    }

    #[test]
    fn second_start_fails_while_first_is_playing() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let d = dispatcher(Gate {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });

        let calls = Arc::new(AtomicUsize::new(0));
        let first_calls = calls.clone();
        let handle = d
            .start("...", config(), move |r| {
                assert!(r.is_ok());
                first_calls.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        entered_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(d.state(), SessionState::Playing);
        assert!(d.is_active());

        let second_calls = calls.clone();
        let second = d.start("---", config(), move |_| {
            second_calls.fetch_add(100, Ordering::SeqCst);
        });
        assert!(matches!(second, Err(MorseError::AlreadyPlaying)));

        release_tx.send(()).unwrap();
        handle.wait();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(d.state(), SessionState::Idle);
    }

    #[test]
    fn idle_is_restored_before_callback() {
        let d = Arc::new(dispatcher(Arc::new(Recorder::default())));
        let seen = Arc::new(Mutex::new(None));
        let (d2, seen2) = (d.clone(), seen.clone());
        d.start(".-", config(), move |_| {
            *seen2.lock() = Some(d2.state());
        })
        .unwrap()
        .wait();
        assert_eq!(*seen.lock(), Some(SessionState::Idle));
    }

    #[test]
    fn callback_can_start_and_wait_on_next_session() {
        let d = Arc::new(dispatcher(Arc::new(Recorder::default())));
        let (nested, nested_done) = collector();
        let d2 = d.clone();
        let handle = d
            .start("...", config(), move |first| {
                assert!(first.is_ok());
                d2.start("---", config(), nested_done).unwrap().wait();
            })
            .unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            handle.wait();
            let _ = done_tx.send(());
        });
        done_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("session started from a callback never finished");

        let nested = nested.lock();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].as_ref().unwrap(), &PlaybackOutcome::Played);
        assert_eq!(d.state(), SessionState::Idle);
    }

    #[test]
    fn sink_error_is_reported_and_session_recovers() {
        let d = dispatcher(Broken);
        let (outcomes, on_done) = collector();
        d.start("...", config(), on_done).unwrap().wait();

        assert_eq!(d.state(), SessionState::Idle);
        assert!(matches!(outcomes.lock()[0], Err(MorseError::Playback(_))));

        // A new session can start afterwards.
        let (outcomes, on_done) = collector();
        d.start("...", config(), on_done).unwrap().wait();
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[test]
    fn sink_panic_is_reported_and_session_recovers() {
        let d = dispatcher(Panicky);
        let (outcomes, on_done) = collector();
        d.start("...", config(), on_done).unwrap().wait();

        assert_eq!(d.state(), SessionState::Idle);
        assert!(matches!(outcomes.lock()[0], Err(MorseError::Playback(_))));
    }

    #[test]
    fn synthesis_error_goes_to_callback() {
        let recorder = Arc::new(Recorder::default());
        let d = dispatcher(recorder.clone());

        let (outcomes, on_done) = collector();
        d.start("..x--", config(), on_done).unwrap().wait();
        assert!(matches!(
            outcomes.lock()[0],
            Err(MorseError::MalformedMorse { ch: 'x', pos: 2 })
        ));

        let (outcomes, on_done) = collector();
        d.start("...", AudioConfig::new(700.0, 0, 8000), on_done).unwrap().wait();
        assert!(matches!(outcomes.lock()[0], Err(MorseError::InvalidWpm(0))));

        assert!(recorder.clips.lock().is_empty());
        assert_eq!(d.state(), SessionState::Idle);
    }

    #[test]
    fn blank_input_is_rejected_synchronously() {
        let d = dispatcher(Arc::new(Recorder::default()));
        let called = Arc::new(AtomicUsize::new(0));
        let c = called.clone();
        let result = d.start("  \t ", config(), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(matches!(result, Err(MorseError::EmptyMorse)));
        assert_eq!(d.state(), SessionState::Idle);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn file_fallback_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallback.wav");
        let d = PlaybackDispatcher::new(Box::new(FileSink), path.clone()).unwrap();
        assert_eq!(d.sink_name(), "file");

        let (outcomes, on_done) = collector();
        d.start(" .- ", config(), on_done).unwrap().wait();
        assert_eq!(
            outcomes.lock()[0].as_ref().unwrap(),
            &PlaybackOutcome::SavedTo(path.clone())
        );

        let header = WavHeader::parse(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!((header.channels, header.sample_rate), (1, 8000));
    }

    #[test]
    fn default_temp_path_names_wav() {
        let path = default_temp_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(TEMP_FILE_NAME));
    }
}
