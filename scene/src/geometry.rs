//! Geometry maintenance for inline triangle data: bounds and tangent space.

use glam::{Vec2, Vec3};

use crate::block::{Bounds, MeshData};
use crate::error::TangentError;

/// Bounding sphere centred on the axis-aligned box of `positions`.
pub fn bounds_of(positions: &[[f32; 3]]) -> Bounds {
    let Some(first) = positions.first() else {
        return Bounds::default();
    };
    let (min, max) = positions.iter().fold(
        (Vec3::from_array(*first), Vec3::from_array(*first)),
        |(min, max), p| {
            let p = Vec3::from_array(*p);
            (min.min(p), max.max(p))
        },
    );
    let center = (min + max) * 0.5;
    let radius = positions
        .iter()
        .map(|p| Vec3::from_array(*p).distance(center))
        .fold(0.0f32, f32::max);
    Bounds {
        center: center.to_array(),
        radius,
    }
}

impl MeshData {
    pub fn update_bounds(&mut self) {
        self.bounds = bounds_of(&self.positions);
    }

    /// Recompute per-vertex tangents and bitangents from positions, normals
    /// and uvs.
    ///
    /// On error the tangent arrays are left cleared.
    pub fn calc_tangent_space(&mut self) -> Result<(), TangentError> {
        self.tangents.clear();
        self.bitangents.clear();

        let vertices = self.positions.len();
        if self.uvs.len() != vertices {
            return Err(TangentError::UvCount {
                uvs: self.uvs.len(),
                vertices,
            });
        }
        if self.normals.len() != vertices {
            return Err(TangentError::NormalCount {
                normals: self.normals.len(),
                vertices,
            });
        }

        let mut tan = vec![Vec3::ZERO; vertices];
        let mut bitan = vec![Vec3::ZERO; vertices];

        for (t, tri) in self.triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertices) {
                return Err(TangentError::IndexOutOfRange {
                    triangle: t,
                    index,
                    vertices,
                });
            }
            let [i0, i1, i2] = tri.map(usize::from);
            let p0 = Vec3::from_array(self.positions[i0]);
            let e1 = Vec3::from_array(self.positions[i1]) - p0;
            let e2 = Vec3::from_array(self.positions[i2]) - p0;
            let uv0 = Vec2::from_array(self.uvs[i0]);
            let d1 = Vec2::from_array(self.uvs[i1]) - uv0;
            let d2 = Vec2::from_array(self.uvs[i2]) - uv0;

            let det = d1.x * d2.y - d2.x * d1.y;
            // Degenerate uv mapping contributes nothing
            if det.abs() <= f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let sdir = (e1 * d2.y - e2 * d1.y) * r;
            let tdir = (e2 * d1.x - e1 * d2.x) * r;

            for i in [i0, i1, i2] {
                tan[i] += sdir;
                bitan[i] += tdir;
            }
        }

        for i in 0..vertices {
            let n = Vec3::from_array(self.normals[i]);
            // Gram-Schmidt against the normal
            let t = (tan[i] - n * n.dot(tan[i])).normalize_or_zero();
            let b = bitan[i].normalize_or_zero();
            self.tangents.push(t.to_array());
            self.bitangents.push(b.to_array());
        }

        Ok(())
    }
}
