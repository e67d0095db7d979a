use formats::FeatureCollection;
use foundation::ids::Id;
use foundation::region::GeoRegion;
use runtime::LatestRequest;
use scene::World;

use crate::builder::{BuildOutcome, SceneBuilder};

/// A world plus the request bookkeeping around asynchronous feature fetches.
///
/// Each region request gets an id; when its features arrive, the build runs
/// only if no newer request was issued meanwhile. A failed or timed out fetch
/// completes with an empty collection.
#[derive(Debug, Default)]
pub struct SceneSession {
    builder: SceneBuilder,
    requests: LatestRequest,
    world: World,
}

impl SceneSession {
    pub fn new(builder: SceneBuilder) -> Self {
        Self {
            builder,
            requests: LatestRequest::new(),
            world: World::new(),
        }
    }

    /// Starts a request for a new region.
    pub fn request(&mut self) -> Id {
        self.requests.issue()
    }

    /// Applies the features fetched for request `id`. Returns `None` when a
    /// newer request superseded it.
    pub fn complete(
        &mut self,
        id: Id,
        region: &GeoRegion,
        features: &FeatureCollection,
    ) -> Option<BuildOutcome> {
        self.requests.accept(id, ())?;
        Some(self.builder.build_into(region, features, &mut self.world))
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
