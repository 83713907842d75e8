//! Track length lookup.

use std::path::Path;

use lofty::prelude::*;
use lofty::probe::Probe;

/// Looks up the length of a media file.
pub trait MediaInspector: Send + Sync {
    /// Length in seconds, or `None` when it can't be determined.
    fn duration(&self, path: &Path) -> Option<f64>;
}

/// Reads the length from the file's audio properties with lofty.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyInspector;

impl LoftyInspector {
    pub fn new() -> Self {
        Self
    }
}

impl MediaInspector for LoftyInspector {
    fn duration(&self, path: &Path) -> Option<f64> {
        let tagged_file = match Probe::open(path).and_then(|probe| probe.read()) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read audio properties");
                return None;
            }
        };
        let seconds = tagged_file.properties().duration().as_secs_f64();
        (seconds > 0.0).then_some(seconds)
    }
}
