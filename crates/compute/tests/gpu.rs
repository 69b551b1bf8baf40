// Golden tests: the wgpu kernel is checked against the CPU reference kernel.
// Skipped when the machine has no usable adapter.

#[cfg(feature = "gpu")]
mod wgpu_tests {
    use compute::layout::{workgroup_count, PIXEL_SIZE};
    use compute::types::encode_spheres;
    use compute::{
        BufferView, CameraUniform, ComputeBackend, ComputeError, CpuBackend, Kernel, SphereGpu,
        WgpuBackend,
    };

    fn gpu() -> Option<WgpuBackend> {
        match WgpuBackend::new() {
            Ok(backend) => Some(backend),
            Err(e) => {
                eprintln!("skipping gpu test: {e}");
                None
            }
        }
    }

    fn camera() -> CameraUniform {
        CameraUniform {
            position: [0.0, 0.0, -3.0],
            forward: [0.0, 0.0, 1.0],
            right: [1.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            up_sky_color: [1.0, 1.0, 1.0],
            down_sky_color: [0.5, 0.7, 1.0],
            min_distance: 0.001,
            max_distance: 1000.0,
            ..bytemuck::Zeroable::zeroed()
        }
    }

    fn binds(width: usize, height: usize, spheres: &[SphereGpu]) -> Vec<BufferView> {
        vec![
            BufferView::new(
                vec![0u8; width * height * PIXEL_SIZE].into(),
                vec![height, width],
                PIXEL_SIZE,
            ),
            BufferView::from_pod_slice(&[camera()]),
            BufferView::from_bytes(encode_spheres(spheres, spheres.len())),
        ]
    }

    /// Float evaluation order may differ between drivers, so channels may be
    /// one quantization step apart. A march that grazes a silhouette can land
    /// on either side of it, so a handful of pixels may differ outright.
    fn run_kernel_test(inputs: &[BufferView], workgroups: [u32; 3]) {
        let Some(wgpu_backend) = gpu() else { return };
        let cpu_backend = CpuBackend::new();

        let kernel = Kernel::SphereTrace;
        let expected = cpu_backend.dispatch(&kernel, inputs, workgroups).unwrap();
        let actual = wgpu_backend.dispatch(&kernel, inputs, workgroups).unwrap();

        assert_eq!(expected.len(), actual.len(), "Mismatched number of output buffers");
        assert_eq!(expected[0].len(), actual[0].len());
        let pixels = expected[0].len() / PIXEL_SIZE;
        let differing = expected[0]
            .chunks_exact(PIXEL_SIZE)
            .zip(actual[0].chunks_exact(PIXEL_SIZE))
            .filter(|(e, a)| e.iter().zip(a.iter()).any(|(e, a)| e.abs_diff(*a) > 1))
            .count();
        assert!(
            differing * 100 <= pixels,
            "{differing} of {pixels} pixels differ by more than one step"
        );
    }

    #[test]
    fn test_empty_scene_matches_cpu() {
        run_kernel_test(&binds(32, 32, &[]), workgroup_count(32, 32));
    }

    #[test]
    fn test_overshooting_tiles_match_cpu() {
        let spheres = [SphereGpu::new([0.0, 0.0, 0.0], 1.0, [1.0, 1.0, 1.0])];
        run_kernel_test(&binds(40, 23, &spheres), workgroup_count(40, 23));
    }

    #[test]
    fn test_shadowed_scene_matches_cpu() {
        let spheres = [
            SphereGpu::new([0.0, 0.0, 0.0], 1.0, [1.0, 0.3, 0.3]),
            SphereGpu::new([-0.6, 1.8, -0.8], 0.5, [0.3, 1.0, 0.3]),
            SphereGpu::new([0.0, -101.0, 0.0], 100.0, [0.8, 0.8, 0.8]),
        ];
        run_kernel_test(&binds(64, 48, &spheres), workgroup_count(64, 48));
    }

    #[test]
    fn test_partial_grid_keeps_prior_pixels() {
        run_kernel_test(&binds(48, 48, &[]), [1, 2, 1]);
    }

    #[test]
    fn test_wrong_binding_count_is_rejected() {
        let Some(wgpu_backend) = gpu() else { return };
        let inputs = binds(4, 4, &[]);
        let result = wgpu_backend.dispatch(&Kernel::SphereTrace, &inputs[..2], [1, 1, 1]);
        assert!(matches!(result, Err(ComputeError::ShapeMismatch(_))));
    }
}
