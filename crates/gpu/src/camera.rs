use foundation::math::Vec3;

pub const DEFAULT_FOV_Y_RAD: f64 = std::f64::consts::FRAC_PI_4;

/// Perspective camera looking at a target point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera3D {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0))
    }
}

impl Camera3D {
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
            fov_y_rad: DEFAULT_FOV_Y_RAD,
            near: 0.05,
            far: 10_000.0,
        }
    }

    /// Sets near/far so both scale with the model: `near = max(0.01,
    /// max_dim / 1000)`, `far = max(10000, max_dim * 20)`.
    pub fn fit_clip_planes(&mut self, max_dim: f64) {
        let (near, far) = clip_planes(max_dim);
        self.near = near;
        self.far = far;
    }

    pub fn distance(&self) -> f64 {
        (self.position - self.target).length()
    }

    /// Column-major right-handed view matrix.
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let f = (self.target - self.position).normalize();
        let s = f.cross(self.up).normalize();
        let u = s.cross(f);
        let eye = self.position;
        [
            [s.x as f32, u.x as f32, -f.x as f32, 0.0],
            [s.y as f32, u.y as f32, -f.y as f32, 0.0],
            [s.z as f32, u.z as f32, -f.z as f32, 0.0],
            [-s.dot(eye) as f32, -u.dot(eye) as f32, f.dot(eye) as f32, 1.0],
        ]
    }

    /// Column-major right-handed perspective matrix, depth range `[0, 1]`.
    pub fn projection_matrix(&self, aspect: f64) -> [[f32; 4]; 4] {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect.max(1e-6)
        } else {
            1.0
        };
        let f = 1.0 / (0.5 * self.fov_y_rad).tan();
        let m22 = self.far / (self.near - self.far);
        let m23 = (self.near * self.far) / (self.near - self.far);
        [
            [(f / aspect) as f32, 0.0, 0.0, 0.0],
            [0.0, f as f32, 0.0, 0.0],
            [0.0, 0.0, m22 as f32, -1.0],
            [0.0, 0.0, m23 as f32, 0.0],
        ]
    }

    pub fn view_proj(&self, aspect: f64) -> [[f32; 4]; 4] {
        mat4_mul(self.projection_matrix(aspect), self.view_matrix())
    }
}

pub fn clip_planes(max_dim: f64) -> (f64, f64) {
    let max_dim = if max_dim.is_finite() { max_dim } else { 0.0 };
    ((max_dim / 1000.0).max(0.01), (max_dim * 20.0).max(10_000.0))
}

fn mat4_mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut c = [[0.0f32; 4]; 4];
    for (col, out) in c.iter_mut().enumerate() {
        for (row, v) in out.iter_mut().enumerate() {
            *v = a[0][row] * b[col][0]
                + a[1][row] * b[col][1]
                + a[2][row] * b[col][2]
                + a[3][row] * b[col][3];
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::{Camera3D, clip_planes};
    use foundation::math::Vec3;

    #[test]
    fn clip_planes_scale_with_model() {
        assert_eq!(clip_planes(1.0), (0.01, 10_000.0));
        assert_eq!(clip_planes(100_000.0), (100.0, 2_000_000.0));
        assert_eq!(clip_planes(f64::NAN), (0.01, 10_000.0));
    }

    #[test]
    fn view_matrix_moves_target_in_front() {
        let cam = Camera3D::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let m = cam.view_matrix();
        // Target at origin ends up 10 units down -Z in view space.
        let z = m[3][2];
        assert!((z + 10.0).abs() < 1e-5, "{z}");
        assert!((cam.distance() - 10.0).abs() < 1e-12);
    }
}
