//! Voxel to world transforms as `nalgebra` matrices.
use crate::layout::ResolvedLayout;
use nalgebra::{Matrix4, Vector3, Vector4};

/// A 4x4 homogeneous transform.
pub type Affine4 = Matrix4<f64>;

impl ResolvedLayout {
    /// Voxel index to RAS transform, assuming the file is stored in LPS
    /// orientation. See `ijk_to_ras` for the plain array form.
    pub fn affine(&self) -> Affine4 {
        let [sx, sy, sz] = self.request().spacing();
        Affine4::from_diagonal(&Vector4::new(-sx, -sy, sz, 1.0))
    }

    /// Map a voxel index to its RAS position.
    pub fn voxel_to_ras(&self, ijk: [f64; 3]) -> Vector3<f64> {
        let p = self.affine() * Vector4::new(ijk[0], ijk[1], ijk[2], 1.0);
        Vector3::new(p[0], p[1], p[2])
    }
}
