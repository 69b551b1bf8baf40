//! Binding slots and dispatch geometry shared by every backend.

pub const OUTPUT_IMAGE: u32 = 0;
pub const CAMERA: u32 = 1; // uniform
pub const SPHERES: u32 = 2; // header + runtime array

const _: () = assert!(SPHERES == 2);

/// Invocations per workgroup along x and y; must match `@workgroup_size` in the shader.
pub const WORKGROUP_SIZE: [u32; 2] = [16, 16];

/// Bytes per output pixel (RGBA8).
pub const PIXEL_SIZE: usize = 4;

/// Return expected number of bindings for each kernel.
pub const fn binding_count(kernel: &crate::Kernel) -> u32 {
    match kernel {
        crate::Kernel::SphereTrace => 3,
    }
}

/// Workgroups needed to cover a `width` x `height` image with whole tiles.
///
/// The last row and column of tiles may overshoot the image; the kernel's
/// bounds guard discards those invocations.
#[must_use]
pub const fn workgroup_count(width: u32, height: u32) -> [u32; 3] {
    [
        width.div_ceil(WORKGROUP_SIZE[0]),
        height.div_ceil(WORKGROUP_SIZE[1]),
        1,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_round_up() {
        assert_eq!(workgroup_count(16, 16), [1, 1, 1]);
        assert_eq!(workgroup_count(17, 16), [2, 1, 1]);
        assert_eq!(workgroup_count(800, 600), [50, 38, 1]);
        assert_eq!(workgroup_count(1, 1), [1, 1, 1]);
    }
}
