use bytemuck::{Pod, Zeroable};
use foundation::math::{CameraRelative, Vec3};
use scene::components::{Primitive, Transform};
use scene::{IndexedMesh, LayerKind, World};

use crate::camera::Camera3D;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Camera-relative position.
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawGeometry {
    Triangles {
        vertices: Vec<MeshVertex>,
        indices: Vec<u32>,
    },
    LineStrip {
        vertices: Vec<LineVertex>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub color: [f32; 4],
    pub geometry: DrawGeometry,
}

impl DrawItem {
    pub fn vertex_bytes(&self) -> &[u8] {
        match &self.geometry {
            DrawGeometry::Triangles { vertices, .. } => bytemuck::cast_slice(vertices),
            DrawGeometry::LineStrip { vertices } => bytemuck::cast_slice(vertices),
        }
    }

    pub fn index_bytes(&self) -> &[u8] {
        match &self.geometry {
            DrawGeometry::Triangles { indices, .. } => bytemuck::cast_slice(indices),
            DrawGeometry::LineStrip { .. } => &[],
        }
    }
}

/// Everything needed to draw one frame. Vertex positions are relative to
/// `origin`, the camera position.
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub origin: Vec3,
    pub view_proj: [[f32; 4]; 4],
    pub items: Vec<DrawItem>,
}

pub fn layer_color(layer: LayerKind) -> [f32; 4] {
    match layer {
        LayerKind::Structures => [0.86, 0.85, 0.82, 1.0],
        LayerKind::Transport => [0.32, 0.32, 0.34, 1.0],
        LayerKind::Green => [0.45, 0.70, 0.40, 1.0],
        LayerKind::Water => [0.35, 0.55, 0.85, 1.0],
    }
}

pub const MESH_COLOR: [f32; 4] = [0.78, 0.80, 0.84, 1.0];

pub struct Renderer;

impl Renderer {
    /// Draw items for every group of the live scene generation.
    pub fn collect_scene(world: &World, camera: &Camera3D, aspect: f64) -> RenderFrame {
        let mut frame = Self::begin(camera, aspect);
        let rel = CameraRelative::new(frame.origin);
        for group in world.groups() {
            let color = layer_color(group.layer());
            let transform = group.transform();
            for primitive in group.primitives() {
                let geometry = match primitive {
                    Primitive::Volume { mesh, .. } | Primitive::FlatShape { mesh } => {
                        triangles(mesh, transform, rel)
                    }
                    Primitive::Polyline { points } => DrawGeometry::LineStrip {
                        vertices: points
                            .iter()
                            .map(|&p| LineVertex {
                                position: rel.to_f32(transform.apply(p)),
                            })
                            .collect(),
                    },
                };
                frame.items.push(DrawItem { color, geometry });
            }
        }
        frame
    }

    /// Draw item for a single transformed mesh.
    pub fn collect_mesh(
        mesh: &IndexedMesh,
        transform: Transform,
        camera: &Camera3D,
        aspect: f64,
    ) -> RenderFrame {
        let mut frame = Self::begin(camera, aspect);
        let rel = CameraRelative::new(frame.origin);
        frame.items.push(DrawItem {
            color: MESH_COLOR,
            geometry: triangles(mesh, transform, rel),
        });
        frame
    }

    fn begin(camera: &Camera3D, aspect: f64) -> RenderFrame {
        // The view matrix is built around the origin so camera-relative
        // positions stay small.
        let centered = Camera3D {
            position: Vec3::ZERO,
            target: camera.target - camera.position,
            ..*camera
        };
        RenderFrame {
            origin: camera.position,
            view_proj: centered.view_proj(aspect),
            items: Vec::new(),
        }
    }
}

fn triangles(mesh: &IndexedMesh, transform: Transform, rel: CameraRelative) -> DrawGeometry {
    let vertices = mesh
        .vertices()
        .zip(mesh.normals.chunks_exact(3))
        .map(|(p, n)| {
            let n = Vec3::new(n[0] as f64, n[1] as f64, n[2] as f64);
            MeshVertex {
                position: rel.to_f32(transform.apply(p)),
                normal: transform.rotate(n).to_f32(),
            }
        })
        .collect();
    DrawGeometry::Triangles {
        vertices,
        indices: mesh.indices.clone(),
    }
}
