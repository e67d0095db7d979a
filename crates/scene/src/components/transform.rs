use foundation::math::Vec3;

/// Translation plus an Euler rotation in degrees.
///
/// Rotation order is intrinsic X, then Y, then Z: the matrix is
/// `Rx * Ry * Rz`, applied before the translation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation_deg: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_deg: Vec3::ZERO,
        }
    }

    pub fn translate(position: Vec3) -> Self {
        Self {
            position,
            rotation_deg: Vec3::ZERO,
        }
    }

    pub fn with_rotation_deg(mut self, rotation_deg: Vec3) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }

    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let m = rotation_matrix(self.rotation_deg);
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.rotate(v) + self.position
    }
}

/// Row-major `Rx * Ry * Rz`.
fn rotation_matrix(deg: Vec3) -> [[f64; 3]; 3] {
    let (sx, cx) = deg.x.to_radians().sin_cos();
    let (sy, cy) = deg.y.to_radians().sin_cos();
    let (sz, cz) = deg.z.to_radians().sin_cos();
    [
        [cy * cz, -cy * sz, sy],
        [cx * sz + sx * sy * cz, cx * cz - sx * sy * sz, -sx * cy],
        [sx * sz - cx * sy * cz, sx * cz + cx * sy * sz, cx * cy],
    ]
}
