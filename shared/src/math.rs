//! Math types for scene blocks
//!
//! POD (Plain Old Data) transform types stored with bitcode. Arithmetic goes
//! through `glam`.

use bitcode::{Decode, Encode};
use glam::{Mat3, Vec3};

/// Decimal places used when deciding whether a rotation is the identity.
const ROTATION_PRECISION: f32 = 1.0e4;

/// 3x3 rotation matrix (row-major storage, POD type)
#[derive(Clone, Copy, Debug, PartialEq, Encode, Decode)]
pub struct Matrix3 {
    pub rows: [[f32; 3]; 3],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Rotation about the Z axis by `radians`.
    pub fn from_rotation_z(radians: f32) -> Self {
        Self::from_mat3(Mat3::from_rotation_z(radians))
    }

    pub fn to_mat3(&self) -> Mat3 {
        // glam is column-major
        Mat3::from_cols_array_2d(&self.rows).transpose()
    }

    pub fn from_mat3(m: Mat3) -> Self {
        Self {
            rows: m.transpose().to_cols_array_2d(),
        }
    }

    /// Identity check after rounding every element to four decimal places.
    pub fn is_identity(&self) -> bool {
        self.rows.iter().enumerate().all(|(r, row)| {
            row.iter().enumerate().all(|(c, v)| {
                let expected = if r == c { 1.0 } else { 0.0 };
                (v * ROTATION_PRECISION).round() == expected * ROTATION_PRECISION
            })
        })
    }
}

/// Scale + rotation + translation of a scene block relative to its parent.
///
/// A point is transformed as `rotation * p * scale + translation`.
#[derive(Clone, Copy, Debug, PartialEq, Encode, Decode)]
pub struct Transform {
    pub rotation: Matrix3,
    pub translation: [f32; 3],
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotation: Matrix3::IDENTITY,
        translation: [0.0; 3],
        scale: 1.0,
    };

    pub fn new(rotation: Matrix3, translation: [f32; 3], scale: f32) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    pub fn has_zero_translation(&self) -> bool {
        self.translation.iter().all(|t| *t == 0.0)
    }

    /// True when applying this transform is a no-op.
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.has_zero_translation() && self.rotation.is_identity()
    }

    /// Transform a position: `rotation * v * scale + translation`.
    pub fn apply_point(&self, v: [f32; 3]) -> [f32; 3] {
        let rotated = self.rotation.to_mat3() * Vec3::from_array(v);
        (rotated * self.scale + Vec3::from_array(self.translation)).to_array()
    }

    /// Transform a direction. Normals are rotated only, never scaled or translated.
    pub fn apply_normal(&self, n: [f32; 3]) -> [f32; 3] {
        (self.rotation.to_mat3() * Vec3::from_array(n)).to_array()
    }
}
