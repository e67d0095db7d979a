use formats::{MeshParseError, mesh_text};
use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use gpu::{Camera3D, RenderFrame, Renderer};
use scene::components::{SceneBounds, Transform};
use scene::resources::{ResourceHandle, ResourceKind, Resources};
use scene::{IndexedMesh, SceneConfig, create_indexed_mesh};

use crate::preset::ViewPreset;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerError {
    Parse(MeshParseError),
    /// The operation needs a loaded mesh.
    NotLoaded,
    /// The viewer was torn down.
    Disposed,
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerError::Parse(err) => write!(f, "mesh rejected: {err}"),
            ViewerError::NotLoaded => write!(f, "no mesh loaded"),
            ViewerError::Disposed => write!(f, "viewer has been disposed"),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::Parse(err) => Some(err),
            ViewerError::NotLoaded | ViewerError::Disposed => None,
        }
    }
}

impl From<MeshParseError> for ViewerError {
    fn from(err: MeshParseError) -> Self {
        ViewerError::Parse(err)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewerPhase {
    Empty,
    Loaded,
    Disposed,
}

#[derive(Debug)]
struct ActiveMesh {
    mesh: IndexedMesh,
    source: String,
    translation: Vec3,
    geometry: ResourceHandle,
    material: ResourceHandle,
}

/// Single-mesh viewer: load, orient, frame, re-center.
///
/// At most one mesh is live. Loading releases the previous mesh's resources
/// before the new ones are allocated, and every transition that moves the
/// mesh reframes the camera from its world-space bounds.
#[derive(Debug)]
pub struct ViewerStateMachine {
    config: SceneConfig,
    resources: Resources,
    controls: Option<ResourceHandle>,
    renderer: Option<ResourceHandle>,
    active: Option<ActiveMesh>,
    rotation_deg: Vec3,
    view_center: Vec3,
    view_distance: f64,
    preset: ViewPreset,
    camera: Camera3D,
    disposed: bool,
}

impl ViewerStateMachine {
    pub fn new(config: SceneConfig) -> Self {
        let mut resources = Resources::new();
        let controls = Some(resources.allocate(ResourceKind::CameraControls));
        let renderer = Some(resources.allocate(ResourceKind::Renderer));
        let view_distance = config.fallback_camera_distance;
        let mut viewer = Self {
            config,
            resources,
            controls,
            renderer,
            active: None,
            rotation_deg: Vec3::ZERO,
            view_center: Vec3::ZERO,
            view_distance,
            preset: ViewPreset::Default,
            camera: Camera3D::default(),
            disposed: false,
        };
        viewer.place_camera();
        viewer
    }

    pub fn phase(&self) -> ViewerPhase {
        if self.disposed {
            ViewerPhase::Disposed
        } else if self.active.is_some() {
            ViewerPhase::Loaded
        } else {
            ViewerPhase::Empty
        }
    }

    pub fn load_mesh(&mut self, text: &str) -> Result<(), ViewerError> {
        self.ensure_live()?;
        let parsed = mesh_text::parse(text).map_err(|err| {
            tracing::warn!(error = %err, "mesh rejected");
            ViewerError::from(err)
        })?;
        let mesh = create_indexed_mesh(&parsed);

        self.release_active();
        let geometry = self.resources.allocate(ResourceKind::Geometry {
            vertices: mesh.vertex_count(),
            indices: mesh.indices.len(),
        });
        let material = self
            .resources
            .allocate(ResourceKind::Material { label: "mesh" });
        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh loaded"
        );
        self.active = Some(ActiveMesh {
            mesh,
            source: text.to_string(),
            translation: Vec3::ZERO,
            geometry,
            material,
        });
        self.reframe();
        Ok(())
    }

    /// Sets the mesh rotation (Euler XYZ, degrees) and reframes. Does
    /// nothing while no mesh is loaded.
    pub fn set_rotation(&mut self, x: f64, y: f64, z: f64) -> Result<(), ViewerError> {
        self.ensure_live()?;
        if self.active.is_none() {
            return Ok(());
        }
        self.rotation_deg = Vec3::new(x, y, z);
        self.reframe();
        Ok(())
    }

    /// Moves the mesh so its horizontal center is at the origin and its
    /// lowest point is on `y = 0`, then reframes.
    pub fn center_and_ground(&mut self) -> Result<(), ViewerError> {
        self.ensure_live()?;
        let bounds = self.world_bounds().ok_or(ViewerError::NotLoaded)?;
        let center = bounds.center();
        if let Some(active) = self.active.as_mut() {
            active.translation += Vec3::new(-center.x, -bounds.min.y, -center.z);
        }
        self.reframe();
        Ok(())
    }

    /// Moves the camera around the current view center and distance. The
    /// mesh is not touched.
    pub fn apply_view_preset(&mut self, preset: ViewPreset) -> Result<(), ViewerError> {
        self.ensure_live()?;
        self.preset = preset;
        self.place_camera();
        Ok(())
    }

    /// Releases the mesh, camera controls and renderer. No operation is
    /// valid afterwards. Returns how many resources were released.
    pub fn dispose(&mut self) -> usize {
        let before = self.resources.live_count();
        self.release_active();
        for handle in [self.controls.take(), self.renderer.take()].into_iter().flatten() {
            self.resources.release(handle);
        }
        let released = before - self.resources.live_count();
        if !self.disposed {
            tracing::info!(released, "viewer disposed");
        }
        self.disposed = true;
        released
    }

    pub fn rotation_deg(&self) -> Vec3 {
        self.rotation_deg
    }

    pub fn view_center(&self) -> Vec3 {
        self.view_center
    }

    pub fn view_distance(&self) -> f64 {
        self.view_distance
    }

    pub fn preset(&self) -> ViewPreset {
        self.preset
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn mesh(&self) -> Option<&IndexedMesh> {
        self.active.as_ref().map(|a| &a.mesh)
    }

    /// Original text of the loaded mesh.
    pub fn source_text(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.source.as_str())
    }

    /// Geometry and material handles of the loaded mesh.
    pub fn mesh_handles(&self) -> Option<(ResourceHandle, ResourceHandle)> {
        self.active.as_ref().map(|a| (a.geometry, a.material))
    }

    pub fn transform(&self) -> Transform {
        let translation = self.active.as_ref().map_or(Vec3::ZERO, |a| a.translation);
        Transform::translate(translation).with_rotation_deg(self.rotation_deg)
    }

    /// Bounds of the mesh after rotation and translation.
    pub fn world_bounds(&self) -> Option<Aabb3> {
        let active = self.active.as_ref()?;
        let transform = self.transform();
        Some(Aabb3::from_points(
            active.mesh.vertices().map(|v| transform.apply(v)),
        ))
    }

    pub fn render(&self, aspect: f64) -> Option<RenderFrame> {
        let mesh = self.mesh()?;
        Some(Renderer::collect_mesh(mesh, self.transform(), &self.camera, aspect))
    }

    fn ensure_live(&self) -> Result<(), ViewerError> {
        if self.disposed {
            Err(ViewerError::Disposed)
        } else {
            Ok(())
        }
    }

    fn release_active(&mut self) {
        if let Some(old) = self.active.take() {
            self.resources.release(old.geometry);
            self.resources.release(old.material);
        }
    }

    fn reframe(&mut self) {
        let Some(bounds) = self.world_bounds().and_then(SceneBounds::from_aabb) else {
            return;
        };
        self.view_center = bounds.center;
        self.view_distance = bounds.camera_distance(
            self.config.camera_distance_factor,
            self.config.fallback_camera_distance,
        );
        self.camera.fit_clip_planes(bounds.max_dim());
        self.place_camera();
        tracing::debug!(
            distance = self.view_distance,
            near = self.camera.near,
            far = self.camera.far,
            "view reframed"
        );
    }

    fn place_camera(&mut self) {
        let (position, up) = self.preset.placement(self.view_center, self.view_distance);
        self.camera.position = position;
        self.camera.target = self.view_center;
        self.camera.up = up;
    }
}
