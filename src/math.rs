//! Row-major 4x4 matrices; vectors are columns.

use std::ops::Mul;

pub type Vec3 = [f32; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub rows: [[f32; 4]; 4],
}

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1].
pub const GL_TO_WGPU_CLIP: Mat4 = Mat4 {
    rows: [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.5, 0.5],
        [0.0, 0.0, 0.0, 1.0],
    ],
};

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self { rows }
    }

    /// `self · other`.
    pub fn multiply(&self, other: &Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, v) in row.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.rows[r][k] * other.rows[k][c]).sum();
            }
        }
        Mat4 { rows: out }
    }

    /// Perspective projection with OpenGL clip conventions.
    ///
    /// `fovy` is the vertical field of view in radians.
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fovy / 2.0).tan();
        let nf = 1.0 / (near - far);
        Mat4::from_rows([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + near) * nf, 2.0 * far * near * nf],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4::from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// `self · T(x, y, z)`.
    pub fn translate(&self, x: f32, y: f32, z: f32) -> Mat4 {
        self.multiply(&Mat4::translation(x, y, z))
    }

    /// `self · Rx(angle)`.
    pub fn rotate_x(&self, angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        self.multiply(&Mat4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// `self · Ry(angle)`.
    pub fn rotate_y(&self, angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        self.multiply(&Mat4::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }

    /// Right-handed view matrix; the camera looks down its local -Z.
    ///
    /// `eye == center` or `up` parallel to the view direction yields NaNs.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let z = normalize(sub(eye, center));
        let x = normalize(cross(up, z));
        let y = cross(z, x);
        Mat4::from_rows([
            [x[0], x[1], x[2], -dot(x, eye)],
            [y[0], y[1], y[2], -dot(y, eye)],
            [z[0], z[1], z[2], -dot(z, eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Transforms a point, including the perspective divide.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0f32; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|k| self.rows[r][k] * v[k]).sum();
        }
        let w = if out[3] == 0.0 { 1.0 } else { out[3] };
        [out[0] / w, out[1] / w, out[2] / w]
    }

    pub fn transpose(&self) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in self.rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                out[c][r] = *v;
            }
        }
        Mat4 { rows: out }
    }

    /// Column-major layout matching WGSL `mat4x4<f32>`.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.transpose().rows
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        self.multiply(&rhs)
    }
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn normalize(v: Vec3) -> Vec3 {
    let len = dot(v, v).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}
