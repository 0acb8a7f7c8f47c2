//! Overlay weight layers - texture coverage maps painted over the heightfield

/// Index of an overlay layer within a surface
pub type OverlayId = usize;

/// A single overlay layer: one normalized weight (0.0 = bare, 1.0 = fully
/// covered) per cell, in the same grid as the heightfield it sits on.
pub struct OverlayLayer {
    /// Layer name, unique within a surface
    pub name: String,
    width: u32,
    height: u32,
    weights: Vec<f32>,
}

impl OverlayLayer {
    /// Create a new overlay layer with zero coverage everywhere
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        let cell_count = (width as usize) * (height as usize);
        Self {
            name: name.into(),
            width,
            height,
            weights: vec![0.0; cell_count],
        }
    }

    /// Reset every cell to the given coverage
    pub fn clear(&mut self, value: f32) {
        self.weights.fill(value.clamp(0.0, 1.0));
    }

    /// Get the coverage at the given cell
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn weight(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(self.weights[index])
    }

    /// Set the coverage at the given cell, clamped to 0..1
    #[inline]
    pub fn set_weight(&mut self, x: u32, y: u32, value: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.weights[index] = value.clamp(0.0, 1.0);
    }

    /// Blend the cell toward a target coverage
    /// Formula: out = current + (target - current) * amount
    #[inline]
    pub fn blend_weight(&mut self, x: u32, y: u32, target: f32, amount: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let current = self.weights[index];
        self.weights[index] = (current + (target - current) * amount).clamp(0.0, 1.0);
    }

    /// Get direct access to weight data
    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Get mutable access to weight data
    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }
}
