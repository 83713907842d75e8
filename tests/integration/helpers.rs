//! Shared helpers for integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use assert_cmd::Command;
use srtp::player::{
    ManualClock, MediaInspector, PlaybackEngine, Session, SessionOptions, SilentEngine,
};
use tempfile::TempDir;

/// Directory holding the checked-in fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Copy a fixture into a fresh temp dir. Keep the `TempDir` alive while
/// using the path.
pub fn temp_fixture(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dest = temp_dir.path().join(name);
    fs::copy(fixtures_dir().join(name), &dest).expect("Failed to copy fixture");
    (temp_dir, dest)
}

/// Write `content` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write file");
    path
}

/// Inspector reporting a fixed length for every file.
pub struct FixedInspector(pub Option<f64>);

impl MediaInspector for FixedInspector {
    fn duration(&self, _path: &Path) -> Option<f64> {
        self.0
    }
}

/// A session over a silent engine driven by a manual clock.
pub struct TestSession {
    pub session: Session,
    pub engine: SilentEngine,
    pub clock: ManualClock,
    pub dir: TempDir,
}

impl TestSession {
    /// Session with `srt` loaded and a silent track of `duration` seconds.
    pub fn loaded(srt: &str, duration: f64) -> Self {
        let clock = ManualClock::new();
        let engine = SilentEngine::new(Arc::new(clock.clone()));
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let session = loaded_session(Box::new(engine.clone()), &clock, dir.path(), srt, duration);
        Self {
            session,
            engine,
            clock,
            dir,
        }
    }
}

/// Build a session over `engine` with a fast poller, then load a dummy
/// track and `srt` from `dir`.
pub fn loaded_session(
    engine: Box<dyn PlaybackEngine>,
    clock: &ManualClock,
    dir: &Path,
    srt: &str,
    duration: f64,
) -> Session {
    let options = SessionOptions {
        poll_interval: Duration::from_millis(5),
        ..SessionOptions::default()
    };
    let mut session = Session::new(
        engine,
        Box::new(FixedInspector(Some(duration))),
        Arc::new(clock.clone()),
        options,
    );
    let audio = write_file(dir, "track.mp3", "");
    let subtitles = write_file(dir, "track.srt", srt);
    session.load_audio(&audio).expect("Failed to load audio");
    session
        .load_subtitles(&subtitles)
        .expect("Failed to load subtitles");
    session
}

/// The srtp binary with an isolated config file and log file in `dir`.
///
/// `extra_config` is appended to the generated config.
pub fn srtp_cmd(dir: &Path, extra_config: &str) -> Command {
    let log_file = dir.join("srtp.log");
    let config = format!(
        "[log]\nfile = {:?}\n{}",
        log_file.display().to_string(),
        extra_config
    );
    let config_path = write_file(dir, "config.toml", config);

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_srtp"));
    cmd.env("SRTP_CONFIG", config_path).env_remove("SRTP_LOG");
    cmd
}
