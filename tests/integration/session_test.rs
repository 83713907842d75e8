//! Session playback with a live poller thread

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use srtp::player::{
    EngineError, ManualClock, PlaybackEngine, SessionEvent, SessionState, SilentEngine,
};

use crate::helpers::{fixtures_dir, loaded_session, write_file, TestSession};

const SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello\n\n2\n00:00:04,000 --> 00:00:06,000\nWorld\n\n3\n00:00:08,000 --> 00:00:09,000\nLast\n";

/// Wait up to two seconds for an event matching `pred`, skipping others.
fn wait_for(
    session: &mut srtp::player::Session,
    pred: impl Fn(&SessionEvent) -> bool,
) -> Option<SessionEvent> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(event) = session.next_event(Duration::from_millis(50)) {
            if pred(&event) {
                return Some(event);
            }
        }
    }
    None
}

fn shows(id: &'static str) -> impl Fn(&SessionEvent) -> bool {
    move |event| match event {
        SessionEvent::Render(render) => render
            .transition
            .as_ref()
            .is_some_and(|t| t.id.as_deref() == Some(id)),
        _ => false,
    }
}

#[test]
fn poller_reports_subtitles_as_the_clock_advances() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();

    t.clock.advance_secs(1.5);
    let event = wait_for(&mut t.session, shows("1")).expect("subtitle 1 never shown");
    let SessionEvent::Render(render) = event else {
        unreachable!()
    };
    assert_eq!(render.time, "00:00:01,500");
    assert!((render.seek_percent - 15.0).abs() < 1e-9);
    let transition = render.transition.unwrap();
    assert_eq!(transition.text, "Hello");
    assert_eq!(transition.appended.unwrap().timecode, "[00:00:01,000 --> 00:00:03,000]");

    t.clock.advance_secs(3.0);
    assert!(wait_for(&mut t.session, shows("2")).is_some());

    let history = t.session.history();
    let ids: Vec<&str> = history.iter().map(|h| h.subtitle_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn end_of_media_stops_the_session() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();
    t.clock.advance_secs(1.5);
    assert!(wait_for(&mut t.session, shows("1")).is_some());

    t.engine.finish();
    let event = wait_for(&mut t.session, |e| matches!(e, SessionEvent::EndOfMedia));
    assert!(event.is_some());
    assert_eq!(t.session.state(), SessionState::Ready);
    assert_eq!(t.session.position(), 0.0);
    assert!(t.session.history().is_empty());
}

#[test]
fn reaching_the_track_length_ends_playback() {
    let mut t = TestSession::loaded(SRT, 2.0);
    t.session.play().unwrap();

    t.clock.advance_secs(2.5);
    assert!(wait_for(&mut t.session, |e| matches!(e, SessionEvent::EndOfMedia)).is_some());
    assert_eq!(t.session.state(), SessionState::Ready);
}

#[test]
fn replay_after_end_starts_from_zero_with_fresh_history() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();
    t.clock.advance_secs(1.5);
    assert!(wait_for(&mut t.session, shows("1")).is_some());
    t.engine.finish();
    assert!(wait_for(&mut t.session, |e| matches!(e, SessionEvent::EndOfMedia)).is_some());

    t.session.play().unwrap();
    t.clock.advance_secs(1.5);
    let event = wait_for(&mut t.session, shows("1")).expect("subtitle 1 not shown again");
    let SessionEvent::Render(render) = event else {
        unreachable!()
    };
    assert!(render.transition.unwrap().appended.is_some());
    assert_eq!(t.engine.play_calls(), vec![0.0, 0.0]);
}

#[test]
fn seek_while_playing_skips_ahead() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();

    let target = t.session.seek(8.5).unwrap();
    assert_eq!(target, 8.5);
    assert!(wait_for(&mut t.session, shows("3")).is_some());
    assert_eq!(t.engine.play_calls(), vec![0.0, 8.5]);

    let ids: Vec<String> = t
        .session
        .history()
        .into_iter()
        .map(|h| h.subtitle_id)
        .collect();
    assert_eq!(ids, vec!["3".to_string()]);
}

#[test]
fn seek_after_unreported_end_keeps_producing_events() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();

    // The poller reports the end and exits before anyone drains it
    t.engine.finish();
    std::thread::sleep(Duration::from_millis(100));

    t.session.seek(5.0).unwrap();
    assert_eq!(t.session.state(), SessionState::Playing);
    assert!(wait_for(&mut t.session, shows("2")).is_some());

    t.clock.advance_secs(3.5);
    assert!(wait_for(&mut t.session, shows("3")).is_some());
    assert_eq!(t.session.state(), SessionState::Playing);
}

#[test]
fn resume_after_unreported_end_restarts_the_poller() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();
    t.engine.finish();
    std::thread::sleep(Duration::from_millis(100));

    t.session.pause().unwrap();
    t.session.seek(1.5).unwrap();
    t.session.play().unwrap();
    assert!(wait_for(&mut t.session, shows("1")).is_some());
}

#[test]
fn pause_freezes_position_and_resume_continues() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();
    t.clock.advance_secs(2.0);

    let frozen = t.session.pause().unwrap();
    assert_eq!(frozen, 2.0);
    assert!(t.engine.is_paused());

    t.clock.advance_secs(30.0);
    assert_eq!(t.session.position(), 2.0);

    t.session.play().unwrap();
    assert_eq!(t.session.state(), SessionState::Playing);
    t.clock.advance_secs(2.5);
    assert!(wait_for(&mut t.session, shows("2")).is_some());
}

#[test]
fn seek_while_paused_restarts_from_target_on_resume() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();
    t.clock.advance_secs(1.0);
    t.session.pause().unwrap();

    t.session.seek(4.5).unwrap();
    assert_eq!(t.session.position(), 4.5);
    assert_eq!(t.engine.play_calls(), vec![0.0]);

    t.session.play().unwrap();
    assert_eq!(t.engine.play_calls(), vec![0.0, 4.5]);
    assert!(wait_for(&mut t.session, shows("2")).is_some());
}

#[test]
fn reloading_subtitles_mid_playback_uses_the_new_entries() {
    let mut t = TestSession::loaded(SRT, 10.0);
    t.session.play().unwrap();

    let replacement = write_file(
        t.dir.path(),
        "other.srt",
        "A\n00:00:00,500 --> 00:00:02,000\nReplaced\n",
    );
    assert_eq!(t.session.load_subtitles(&replacement).unwrap(), 1);
    assert_eq!(t.session.state(), SessionState::Playing);

    t.clock.advance_secs(1.0);
    assert!(wait_for(&mut t.session, shows("A")).is_some());
}

#[test]
fn fixture_file_drives_a_session() {
    let mut t = TestSession::loaded("", 10.0);
    let count = t
        .session
        .load_subtitles(&fixtures_dir().join("basic.srt"))
        .unwrap();
    assert_eq!(count, 3);

    t.session.play().unwrap();
    t.clock.advance_secs(8.5);
    let event = wait_for(&mut t.session, shows("3")).expect("subtitle 3 never shown");
    let SessionEvent::Render(render) = event else {
        unreachable!()
    };
    assert_eq!(render.transition.unwrap().text, "Third");
}

/// Silent engine that panics on demand while reporting elapsed time, and
/// can refuse to start playback.
struct FaultyEngine {
    inner: SilentEngine,
    fail: Arc<AtomicBool>,
    reject_play: Arc<AtomicBool>,
}

impl FaultyEngine {
    fn new(clock: &ManualClock) -> (Self, Arc<AtomicBool>, Arc<AtomicBool>) {
        let fail = Arc::new(AtomicBool::new(false));
        let reject_play = Arc::new(AtomicBool::new(false));
        let engine = Self {
            inner: SilentEngine::new(Arc::new(clock.clone())),
            fail: Arc::clone(&fail),
            reject_play: Arc::clone(&reject_play),
        };
        (engine, fail, reject_play)
    }
}

impl PlaybackEngine for FaultyEngine {
    fn load(&mut self, path: &Path) -> Result<(), EngineError> {
        self.inner.load(path)
    }

    fn play(&mut self, start: f64) -> Result<(), EngineError> {
        if self.reject_play.load(Ordering::SeqCst) {
            self.inner.stop();
            return Err(EngineError::Open {
                path: "track.mp3".to_string(),
                message: "file removed".to_string(),
            });
        }
        self.inner.play(start)
    }

    fn pause(&mut self) {
        self.inner.pause()
    }

    fn resume(&mut self) {
        self.inner.resume()
    }

    fn stop(&mut self) {
        self.inner.stop()
    }

    fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    fn elapsed_since_play(&self) -> Option<Duration> {
        if self.fail.load(Ordering::SeqCst) {
            panic!("decoder exploded");
        }
        self.inner.elapsed_since_play()
    }

    fn set_duration_hint(&mut self, seconds: f64) {
        self.inner.set_duration_hint(seconds)
    }
}

#[test]
fn poller_panic_becomes_poll_failed_and_stops() {
    let clock = ManualClock::new();
    let (engine, fail, _) = FaultyEngine::new(&clock);
    let dir = tempfile::tempdir().unwrap();
    let mut session = loaded_session(Box::new(engine), &clock, dir.path(), SRT, 10.0);

    session.play().unwrap();
    clock.advance_secs(1.5);
    assert!(wait_for(&mut session, shows("1")).is_some());

    fail.store(true, Ordering::SeqCst);
    let event = wait_for(&mut session, |e| matches!(e, SessionEvent::PollFailed { .. }))
        .expect("poll failure not reported");
    let SessionEvent::PollFailed { reason } = event else {
        unreachable!()
    };
    assert!(reason.contains("decoder exploded"), "reason: {reason}");
    assert_eq!(session.state(), SessionState::Ready);

    // Recoverable: the next play starts a fresh poller
    fail.store(false, Ordering::SeqCst);
    session.play().unwrap();
    clock.advance_secs(1.5);
    assert!(wait_for(&mut session, shows("1")).is_some());
}

#[test]
fn failed_seek_leaves_position_and_history_alone() {
    let clock = ManualClock::new();
    let (engine, _, reject_play) = FaultyEngine::new(&clock);
    let dir = tempfile::tempdir().unwrap();
    let mut session = loaded_session(Box::new(engine), &clock, dir.path(), SRT, 10.0);

    session.play().unwrap();
    clock.advance_secs(1.5);
    assert!(wait_for(&mut session, shows("1")).is_some());

    reject_play.store(true, Ordering::SeqCst);
    let err = session.seek(8.5).unwrap_err();
    assert!(err.to_string().contains("file removed"), "error: {err}");

    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(session.position(), 1.5);
    let ids: Vec<String> = session.history().into_iter().map(|h| h.subtitle_id).collect();
    assert_eq!(ids, vec!["1".to_string()]);
}
