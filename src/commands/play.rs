//! Player command: TUI or headless playback

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use srtp::cli::PlayArgs;
use srtp::logging;
use srtp::player::{
    Clock, LoftyInspector, PlaybackEngine, Session, SessionEvent, SilentEngine, SystemClock,
};
use srtp::tui::{PlayerApp, ScreenOptions};
use srtp::Config;

/// How long the headless loop waits for an event before checking for Ctrl-C.
const HEADLESS_WAIT: Duration = Duration::from_millis(100);

/// Run the player.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &PlayArgs, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    if let Some(log_file) = config.log_file() {
        if let Err(e) = logging::init(&log_file, verbose) {
            eprintln!("Warning: logging disabled: {:#}", e);
        }
    }

    let mut options = config.session_options();
    if let Some(offset) = args.offset {
        options.sync_offset = offset;
    }
    if let Some(ms) = args.poll_interval {
        options.poll_interval = Duration::from_millis(ms.max(1));
    }

    let headless = args.runs_headless(atty::is(atty::Stream::Stdout));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let engine = build_engine(args.silent, &clock);
    let mut session = Session::new(engine, Box::new(LoftyInspector::new()), clock, options);
    preload(&mut session, args)?;

    if headless {
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = interrupted.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Failed to set Ctrl-C handler")?;
        let stdout = io::stdout();
        run_headless(session, &mut stdout.lock(), args.json, &interrupted)
    } else {
        let screen = ScreenOptions {
            tick_rate: Duration::from_millis(config.ui.tick_rate_ms.max(1)),
            seek_step: config.playback.seek_step_secs,
            autoscroll: config.ui.autoscroll,
        };
        PlayerApp::new(session, &screen)?.run()?;
        Ok(())
    }
}

/// Audio output when available, otherwise a clock-only engine.
#[cfg(feature = "audio")]
fn build_engine(silent: bool, clock: &Arc<dyn Clock>) -> Box<dyn PlaybackEngine> {
    if !silent {
        match srtp::player::RodioEngine::open_default() {
            Ok(engine) => return Box::new(engine),
            Err(e) => {
                tracing::warn!(error = %e, "No audio output, playing silently");
                eprintln!("Warning: {}; playing without sound", e);
            }
        }
    }
    Box::new(SilentEngine::new(Arc::clone(clock)))
}

#[cfg(not(feature = "audio"))]
fn build_engine(_silent: bool, clock: &Arc<dyn Clock>) -> Box<dyn PlaybackEngine> {
    Box::new(SilentEngine::new(Arc::clone(clock)))
}

/// Load the files given on the command line. Paths that don't exist are
/// skipped with a warning.
fn preload(session: &mut Session, args: &PlayArgs) -> Result<()> {
    if let Some(path) = existing(args.audio.as_deref(), "audio") {
        session
            .load_audio(path)
            .with_context(|| format!("Failed to load audio {}", path.display()))?;
    }
    if let Some(path) = existing(args.srt.as_deref(), "subtitle") {
        let count = session
            .load_subtitles(path)
            .with_context(|| format!("Failed to load subtitles {}", path.display()))?;
        tracing::info!(count, "Subtitles ready");
    }
    Ok(())
}

fn existing<'a>(path: Option<&'a Path>, kind: &str) -> Option<&'a Path> {
    let path = path?;
    if path.exists() {
        Some(path)
    } else {
        tracing::warn!(path = %path.display(), kind, "File not found, not loading");
        eprintln!("Warning: {} file not found: {}", kind, path.display());
        None
    }
}

/// Play once without a UI, writing each newly displayed subtitle to `out`.
///
/// Stops at end of media or when `interrupted` is set.
pub fn run_headless<W: Write>(
    mut session: Session,
    out: &mut W,
    json: bool,
    interrupted: &AtomicBool,
) -> Result<()> {
    session.play()?;

    let mut displayed = 0usize;
    while !interrupted.load(Ordering::SeqCst) {
        let Some(event) = session.next_event(HEADLESS_WAIT) else {
            continue;
        };
        let finished = matches!(
            event,
            SessionEvent::EndOfMedia | SessionEvent::PollFailed { .. }
        );

        let appended = match &event {
            SessionEvent::Render(render) => render
                .transition
                .as_ref()
                .and_then(|transition| transition.appended.as_ref()),
            _ => None,
        };
        if appended.is_some() {
            displayed += 1;
        }

        if json {
            // Position-only updates would flood the output
            if !matches!(&event, SessionEvent::Render(render) if render.transition.is_none()) {
                writeln!(out, "{}", serde_json::to_string(&event)?)?;
            }
        } else if let Some(logged) = appended {
            writeln!(out, "{}\n", logged)?;
        }
        if let SessionEvent::PollFailed { reason } = &event {
            anyhow::bail!("Playback failed: {}", reason);
        }
        if finished {
            break;
        }
    }

    let interrupted = interrupted.load(Ordering::SeqCst);
    if interrupted {
        // Still playing; stop cleanly before the session is dropped
        let _ = session.stop();
    }

    if json {
        let summary = serde_json::json!({
            "type": "summary",
            "displayed": displayed,
            "interrupted": interrupted,
        });
        writeln!(out, "{}", summary)?;
    } else {
        writeln!(out, "Displayed {} subtitle(s)", displayed)?;
    }
    out.flush()?;
    Ok(())
}
