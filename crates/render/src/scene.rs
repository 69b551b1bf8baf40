//! Scene sphere storage and its GPU buffer encoding
//!
//! The spheres buffer holds a header with the live count followed by an array
//! of records. Its allocated size only grows, so adding or removing spheres
//! between frames usually only rewrites the buffer contents.

use compute::trace::Sphere;
use compute::types::{encode_spheres, SphereGpu, SPHERES_HEADER_SIZE, SPHERE_STRIDE};

use crate::RenderError;

/// Ordered list of the spheres in the scene.
///
/// Order matters: on an exact distance tie the kernel picks the earlier sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSpheres {
    spheres: Vec<Sphere>,
    /// Records allocated in the encoded buffer; never shrinks
    capacity: usize,
}

impl Default for SceneSpheres {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Sphere> for SceneSpheres {
    fn from_iter<I: IntoIterator<Item = Sphere>>(iter: I) -> Self {
        let mut scene = Self::new();
        for sphere in iter {
            scene.push(sphere);
        }
        scene
    }
}

impl SceneSpheres {
    #[must_use]
    pub fn new() -> Self {
        Self { spheres: Vec::new(), capacity: 1 }
    }

    /// The starting scene: one default sphere.
    #[must_use]
    pub fn with_default_sphere() -> Self {
        std::iter::once(Sphere::default()).collect()
    }

    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
        if self.spheres.len() > self.capacity {
            let grown = (self.capacity * 2).max(self.spheres.len());
            tracing::debug!(from = self.capacity, to = grown, "growing sphere buffer");
            self.capacity = grown;
        }
    }

    /// Removes and returns the sphere at `index`, shifting later spheres down.
    pub fn remove(&mut self, index: usize) -> Option<Sphere> {
        (index < self.spheres.len()).then(|| self.spheres.remove(index))
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sphere> {
        self.spheres.get_mut(index)
    }

    /// Sphere records the encoded buffer has room for.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Size of the buffer [`Self::to_bytes`] produces.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        SPHERES_HEADER_SIZE + self.capacity * SPHERE_STRIDE
    }

    /// # Errors
    ///
    /// Returns [`RenderError::InvalidSphere`] for the first sphere with a
    /// non-finite value or a negative radius.
    pub fn validate(&self) -> Result<(), RenderError> {
        for (index, sphere) in self.spheres.iter().enumerate() {
            if !sphere.position.is_finite() || !sphere.color.is_finite() {
                return Err(RenderError::InvalidSphere { index, reason: "values must be finite" });
            }
            if !sphere.radius.is_finite() || sphere.radius < 0.0 {
                return Err(RenderError::InvalidSphere {
                    index,
                    reason: "radius must be finite and non-negative",
                });
            }
        }
        Ok(())
    }

    /// Encodes the live spheres into a buffer of [`Self::buffer_size`] bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let records: Vec<SphereGpu> = self.spheres.iter().map(SphereGpu::from).collect();
        encode_spheres(&records, self.capacity)
    }
}
