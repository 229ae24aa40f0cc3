#[cfg(feature = "nalgebra_affine")]
mod nalgebra_affine {
    use approx::assert_abs_diff_eq;
    use nalgebra::{Vector3, Vector4};
    use rawguess::{affine::Affine4, resolve, LayoutRequest};

    #[test]
    fn lps_file_to_ras() {
        let request = LayoutRequest::builder("a.raw")
            .spacing(0.5, 0.8, 2.0)
            .build()
            .unwrap();
        let layout = resolve(&request, 0);
        let affine = layout.affine();
        assert_eq!(
            affine,
            Affine4::from_diagonal(&Vector4::new(-0.5, -0.8, 2.0, 1.0))
        );

        let plain = layout.ijk_to_ras();
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(affine[(r, c)], plain[r][c]);
            }
        }

        assert_abs_diff_eq!(
            layout.voxel_to_ras([10., 20., 3.]),
            Vector3::new(-5.0, -16.0, 6.0),
            epsilon = 1e-12
        );
    }
}
