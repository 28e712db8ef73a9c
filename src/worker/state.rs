use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use url::Url;

use super::cursor::MediaCursor;
use crate::dash::{ManifestResolver, SegmentDescriptor};
use crate::domain::DirectoryPool;
use crate::run::{RunContext, StopReason};

/// `SelectTarget -> FetchManifest -> FetchInitSegments -> LoopMedia -> Stopped`.
#[derive(Debug)]
pub enum WorkerState {
    SelectTarget,
    FetchManifest {
        manifest_url: Url,
    },
    FetchInitSegments {
        init: Vec<SegmentDescriptor>,
        media: Vec<SegmentDescriptor>,
    },
    LoopMedia {
        cursor: MediaCursor,
    },
    Stopped(StopReason),
}

/// Uniform 1-based directory index.
pub fn pick_directory<R: Rng + ?Sized>(rng: &mut R, pool: &DirectoryPool) -> usize {
    rng.gen_range(1..=pool.count().get())
}

fn media_state(media: Vec<SegmentDescriptor>) -> WorkerState {
    MediaCursor::new(media).map_or(WorkerState::Stopped(StopReason::NoMediaSegments), |cursor| {
        WorkerState::LoopMedia { cursor }
    })
}

pub struct ClientWorker {
    id: usize,
    context: Arc<RunContext>,
    rng: StdRng,
}

impl ClientWorker {
    #[must_use]
    pub fn new(id: usize, context: Arc<RunContext>) -> Self {
        Self {
            id,
            context,
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn with_rng(id: usize, context: Arc<RunContext>, rng: StdRng) -> Self {
        Self { id, context, rng }
    }

    /// Plain mode skips straight to the media loop.
    #[must_use]
    pub fn initial_state(&self) -> WorkerState {
        self.context
            .plain_target()
            .map_or(WorkerState::SelectTarget, |target| {
                media_state(vec![target.clone()])
            })
    }

    /// Drives the state machine until `Stopped`. Failures stay inside this
    /// worker and only decide its stop reason.
    pub async fn run(mut self) -> StopReason {
        let mut state = self.initial_state();
        loop {
            state = match state {
                WorkerState::SelectTarget => self.select_target(),
                WorkerState::FetchManifest { manifest_url } => {
                    self.fetch_manifest(&manifest_url).await
                }
                WorkerState::FetchInitSegments { init, media } => {
                    self.fetch_init_segments(&init, media).await
                }
                WorkerState::LoopMedia { cursor } => self.loop_media(cursor).await,
                WorkerState::Stopped(reason) => {
                    debug!("client-{} stopped: {}", self.id, reason.as_str());
                    return reason;
                }
            };
        }
    }

    fn select_target(&mut self) -> WorkerState {
        let pool = self.context.directories();
        let directory = pool.directory(pick_directory(&mut self.rng, pool));
        match pool.manifest_url(self.context.target_url(), &directory) {
            Ok(manifest_url) => {
                info!("client-{} selected {}", self.id, directory);
                WorkerState::FetchManifest { manifest_url }
            }
            Err(err) => {
                warn!("client-{} cannot build manifest url: {}", self.id, err);
                WorkerState::Stopped(StopReason::InvalidTarget)
            }
        }
    }

    async fn fetch_manifest(&self, manifest_url: &Url) -> WorkerState {
        if let Err(reason) = self.context.begin_request() {
            return WorkerState::Stopped(reason);
        }
        let label = format!("client-{} manifest", self.id);
        let resolver = ManifestResolver::new(self.context.executor());
        let segments = match resolver.resolve(manifest_url, &label).await {
            Ok(segments) => segments,
            Err(err) => {
                warn!("client-{} {}: {}", self.id, err.label(), err);
                return WorkerState::Stopped(StopReason::ManifestUnavailable);
            }
        };
        if segments.is_empty() {
            warn!("client-{} manifest {} lists no segments", self.id, manifest_url);
            return WorkerState::Stopped(StopReason::EmptyManifest);
        }
        let (init, media): (Vec<_>, Vec<_>) =
            segments.into_iter().partition(SegmentDescriptor::is_init);
        WorkerState::FetchInitSegments { init, media }
    }

    async fn fetch_init_segments(
        &self,
        init: &[SegmentDescriptor],
        media: Vec<SegmentDescriptor>,
    ) -> WorkerState {
        for segment in init {
            if let Err(reason) = self.context.begin_request() {
                return WorkerState::Stopped(reason);
            }
            self.fetch(segment).await;
        }
        media_state(media)
    }

    async fn loop_media(&self, mut cursor: MediaCursor) -> WorkerState {
        loop {
            if let Err(reason) = self.context.begin_request() {
                return WorkerState::Stopped(reason);
            }
            let Some(segment) = cursor.next_segment() else {
                return WorkerState::Stopped(StopReason::NoMediaSegments);
            };
            self.fetch(segment).await;
            self.context.pause().await;
        }
    }

    async fn fetch(&self, segment: &SegmentDescriptor) {
        let label = format!("client-{} {}", self.id, segment.label());
        self.context.executor().execute(&segment.url, &label).await;
    }
}
