use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::RodioEngine;
use crate::config::{LibrarySettings, Settings};
use crate::graph::AudioGraph;
use crate::library::{InputFile, expand_paths, read_inputs};
use crate::metadata::{MetadataFetcher, MetadataLookup, YoutubeLookup};
use crate::orbit::{OrbitConfig, OrbitDriver};
use crate::player::PlaybackController;
use crate::session::AudioSession;
use crate::ui::TuiView;

pub type Controller = PlaybackController<RodioEngine, TuiView>;

/// Expand arguments into files and read them. Unreadable files are skipped.
pub fn load_inputs(args: &[PathBuf], library: &LibrarySettings) -> Vec<InputFile> {
    let paths = expand_paths(args, library);
    let (files, failures) = read_inputs(&paths);
    for (path, err) in &failures {
        warn!(path = %path.display(), error = %err, "skipping unreadable file");
    }
    info!(files = files.len(), skipped = failures.len(), "inputs read");
    files
}

fn metadata_fetcher(settings: &Settings) -> MetadataFetcher {
    match YoutubeLookup::from_settings(&settings.metadata) {
        Ok(Some(lookup)) => {
            let lookup: Arc<dyn MetadataLookup> = Arc::new(lookup);
            MetadataFetcher::new(Some(lookup))
        }
        Ok(None) => {
            info!("metadata lookup disabled");
            MetadataFetcher::disabled()
        }
        Err(e) => {
            warn!(error = %e, "metadata client unavailable");
            MetadataFetcher::disabled()
        }
    }
}

/// Wire the controller. The audio device is not opened until the first play.
pub fn build_controller(settings: &Settings) -> Controller {
    let tone = settings
        .presets
        .resolve(&settings.presets.default)
        .unwrap_or_default();
    let graph = AudioGraph::new(settings.audio.clone(), tone, RodioEngine::open);
    let orbit = OrbitDriver::new(OrbitConfig::from(&settings.orbit));

    PlaybackController::new(
        AudioSession::new(graph),
        orbit,
        TuiView::new(settings.presets.default.clone()),
        metadata_fetcher(settings),
        settings.presets.clone(),
    )
}
