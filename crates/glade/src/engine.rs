//! The playback session state machine.
//!
//! A session takes a [`CuePlan`] (cues with their audio already in memory),
//! resets the transport to zero, and arms one timer task per cue. Loop cues
//! retrigger on a fixed period until the session ends; emitter cues fire
//! once. Stopping tears the whole thing down in one lock scope: every handle
//! halted, every timer aborted, both registries emptied.
//!
//! **Key invariant:** a timer that has already passed its sleep can never
//! fire into a stopped or newer session. Stop bumps the epoch under the
//! lock, and every timer callback re-checks the epoch under the same lock
//! before touching audio. Task aborts are cleanup, not the guarantee.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::task::JoinHandle;
use underproto::{AudioEvent, EventKind};

use crate::output::{AudioHandle, AudioOutput, OutputError};
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("a playback session is already running")]
    AlreadyRunning,

    #[error("nothing to play: the plan has no cues")]
    EmptyPlan,

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Where the session is. `Armed` has no representation here: a [`CuePlan`]
/// in hand and `Idle` is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
}

/// One scheduled sound: the event's identity, when it enters the timeline,
/// and the audio bytes to play.
#[derive(Debug, Clone)]
pub struct Cue {
    pub name: String,
    pub kind: EventKind,
    /// Offset from the start of the video.
    pub start: Duration,
    /// Nominal event length; only previews use it as a stop window.
    pub duration: Duration,
    pub audio: Bytes,
}

impl Cue {
    /// Build a cue for `event` with its audio already fetched.
    pub fn for_event(event: &AudioEvent, audio: Bytes) -> Self {
        Self {
            name: event.name.clone(),
            kind: event.kind,
            // The service has produced negative offsets before; clamp.
            start: Duration::from_secs_f64(event.timing.start.max(0.0)),
            duration: Duration::from_secs_f64(event.timing.duration_or_default().max(0.0)),
            audio,
        }
    }
}

/// Everything a session needs, fetched ahead of time so network latency
/// cannot skew cue timing.
#[derive(Debug, Clone, Default)]
pub struct CuePlan {
    pub cues: Vec<Cue>,
    /// Length of the video; `None` means no natural end and the session
    /// runs until stopped.
    pub video_duration: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Period between loop retriggers.
    pub loop_period: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loop_period: Duration::from_secs(10),
        }
    }
}

struct EngineInner {
    /// Bumped on every session boundary. Timer callbacks compare against it
    /// before acting; a mismatch means their session is over.
    epoch: u64,
    state: SessionState,
    transport: Transport,
    /// Live audio, one handle per cue name.
    handles: HashMap<String, Box<dyn AudioHandle>>,
    /// Timer tasks, one per cue name.
    timers: HashMap<String, JoinHandle<()>>,
    /// Stops the session when the video would end.
    end_watch: Option<JoinHandle<()>>,
}

/// Schedules cues against the transport and owns everything a running
/// session holds. Cloning shares the session.
///
/// Methods spawn tokio tasks, so they must be called from within a runtime.
#[derive(Clone)]
pub struct CueEngine {
    inner: Arc<Mutex<EngineInner>>,
    output: Arc<dyn AudioOutput>,
    config: EngineConfig,
}

impl CueEngine {
    pub fn new(output: Arc<dyn AudioOutput>, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                epoch: 0,
                state: SessionState::Idle,
                transport: Transport::new(),
                handles: HashMap::new(),
                timers: HashMap::new(),
                end_watch: None,
            })),
            output,
            config,
        }
    }

    /// Start a playback session.
    ///
    /// The transport resets to zero before any cue is armed, so cue offsets
    /// always mean "seconds from the top of the video" regardless of where
    /// a previous session or preview left the clock.
    pub fn play(&self, plan: CuePlan) -> Result<(), PlayError> {
        let CuePlan {
            cues,
            video_duration,
        } = plan;

        let mut inner = self.inner.lock().unwrap();
        if inner.state == SessionState::Running {
            return Err(PlayError::AlreadyRunning);
        }
        if cues.is_empty() {
            return Err(PlayError::EmptyPlan);
        }

        inner.epoch = inner.epoch.wrapping_add(1);
        let epoch = inner.epoch;
        inner.state = SessionState::Running;
        inner.transport.stop();
        inner.transport.set_duration(video_duration);
        inner.transport.start();

        let cue_count = cues.len();
        for cue in cues {
            let name = cue.name.clone();
            let timer = self.spawn_cue_timer(epoch, cue);
            inner.timers.insert(name, timer);
        }

        if let Some(total) = video_duration {
            let engine = self.clone();
            inner.end_watch = Some(tokio::spawn(async move {
                tokio::time::sleep(total).await;
                engine.stop_if_current(epoch);
            }));
        }

        tracing::info!(
            cues = cue_count,
            video = ?video_duration,
            "playback session started"
        );
        Ok(())
    }

    /// Stop the session: halt every handle, abort every timer, reset the
    /// transport. One lock scope, so the user never observes a half-stopped
    /// session. Harmless when already idle.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        let was_running = inner.state == SessionState::Running;
        Self::teardown(&mut inner);
        if was_running {
            tracing::info!("playback session stopped");
        }
    }

    /// Play one cue's audio against its slice of the timeline: transport
    /// seeks to the cue's offset, audio fires immediately, and the session
    /// stops itself after the cue's duration.
    ///
    /// Replaces whatever was running.
    pub fn preview(&self, cue: Cue) -> Result<(), PlayError> {
        let mut inner = self.inner.lock().unwrap();
        Self::teardown(&mut inner);
        let epoch = inner.epoch;

        let handle = self.output.start(&cue.name, cue.audio.clone())?;
        inner.state = SessionState::Running;
        inner.transport.set_duration(None);
        inner.transport.seek(cue.start);
        inner.transport.start();
        inner.handles.insert(cue.name.clone(), handle);

        let engine = self.clone();
        let window = cue.duration;
        inner.end_watch = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            engine.stop_if_current(epoch);
        }));

        tracing::info!(cue = %cue.name, window = ?window, "preview started");
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state
    }

    /// Current transport position.
    pub fn position(&self) -> Duration {
        self.inner.lock().unwrap().transport.tick()
    }

    pub fn video_duration(&self) -> Option<Duration> {
        self.inner.lock().unwrap().transport.duration()
    }

    /// Whether the transport has reached the end of a known video duration.
    /// Always false when the duration is unknown, and after a stop.
    pub fn is_finished(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.transport.tick();
        inner.transport.is_finished()
    }

    /// Names of cues whose audio is still sounding, sorted.
    pub fn active_cues(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner
            .handles
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Number of registered audio handles. Zero after a stop.
    pub fn handle_count(&self) -> usize {
        self.inner.lock().unwrap().handles.len()
    }

    /// Number of registered timer tasks. Zero after a stop.
    pub fn timer_count(&self) -> usize {
        self.inner.lock().unwrap().timers.len()
    }

    fn spawn_cue_timer(&self, epoch: u64, cue: Cue) -> JoinHandle<()> {
        let engine = self.clone();
        let loop_period = self.config.loop_period;
        tokio::spawn(async move {
            tokio::time::sleep(cue.start).await;
            if !engine.fire_if_current(epoch, &cue) {
                return;
            }
            if cue.kind.is_loop() {
                loop {
                    tokio::time::sleep(loop_period).await;
                    if !engine.replay_if_current(epoch, &cue.name) {
                        return;
                    }
                }
            }
        })
    }

    /// Timer callback for a cue's first trigger. Returns false when the
    /// session moved on and the timer should die.
    fn fire_if_current(&self, epoch: u64, cue: &Cue) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch || inner.state != SessionState::Running {
            tracing::debug!(cue = %cue.name, "timer fired for a dead session, ignoring");
            return false;
        }

        match self.output.start(&cue.name, cue.audio.clone()) {
            Ok(handle) => {
                tracing::debug!(
                    cue = %cue.name,
                    kind = %cue.kind,
                    position = ?inner.transport.tick(),
                    "cue fired"
                );
                inner.handles.insert(cue.name.clone(), handle);
                true
            }
            Err(e) => {
                tracing::warn!(cue = %cue.name, error = %e, "cue could not start");
                false
            }
        }
    }

    /// Timer callback for a loop retrigger.
    fn replay_if_current(&self, epoch: u64, name: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch || inner.state != SessionState::Running {
            return false;
        }
        if let Some(handle) = inner.handles.get_mut(name) {
            handle.replay();
            tracing::debug!(cue = %name, position = ?inner.transport.tick(), "loop retriggered");
        }
        true
    }

    /// End-watch callback; a user stop in the meantime moved the epoch and
    /// makes this a no-op.
    fn stop_if_current(&self, epoch: u64) {
        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            return;
        }
        tracing::info!(position = ?inner.transport.tick(), "end of video reached");
        Self::teardown(&mut inner);
    }

    fn teardown(inner: &mut EngineInner) {
        inner.epoch = inner.epoch.wrapping_add(1);
        inner.state = SessionState::Idle;
        inner.transport.stop();
        for handle in inner.handles.values_mut() {
            handle.halt();
        }
        inner.handles.clear();
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
        if let Some(watch) = inner.end_watch.take() {
            watch.abort();
        }
    }
}
