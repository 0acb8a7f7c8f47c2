//! CPU heightfield storage - normalized f32 heights

/// A CPU heightfield for terrain shaping
/// Stores one normalized height (0.0 = floor, 1.0 = ceiling) per cell
pub struct Heightfield {
    /// Grid dimensions in cells
    pub width: u32,
    pub height: u32,
    /// Height data in row-major order
    cells: Vec<f32>,
}

impl Heightfield {
    /// Create a new heightfield with the given dimensions, initialized flat at zero
    pub fn new(width: u32, height: u32) -> Self {
        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![0.0; cell_count],
        }
    }

    /// Reset every cell to the given height
    pub fn clear(&mut self, value: f32) {
        self.cells.fill(value);
    }

    /// Get the height at the given cell
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(self.cells[index])
    }

    /// Set the height at the given cell, clamped to 0..1
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[index] = value.clamp(0.0, 1.0);
    }

    /// Add a signed delta to the height at the given cell, clamped to 0..1
    #[inline]
    pub fn add(&mut self, x: u32, y: u32, delta: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[index] = (self.cells[index] + delta).clamp(0.0, 1.0);
    }

    /// Get raw height data for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    /// Get the total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get direct access to height data (for advanced operations)
    #[inline]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Get mutable access to height data (for advanced operations)
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [f32] {
        &mut self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_heightfield() {
        let field = Heightfield::new(100, 100);
        assert_eq!(field.width, 100);
        assert_eq!(field.height, 100);
        assert_eq!(field.cell_count(), 10000);
        assert_eq!(field.get(50, 50), Some(0.0));
    }

    #[test]
    fn test_get_set() {
        let mut field = Heightfield::new(10, 10);

        field.set(5, 5, 0.25);
        assert_eq!(field.get(5, 5), Some(0.25));

        // Out of bounds should return None
        assert_eq!(field.get(100, 100), None);
    }

    #[test]
    fn test_set_clamps() {
        let mut field = Heightfield::new(10, 10);

        field.set(1, 1, 2.0);
        assert_eq!(field.get(1, 1), Some(1.0));

        field.set(1, 1, -0.5);
        assert_eq!(field.get(1, 1), Some(0.0));
    }

    #[test]
    fn test_add_delta() {
        let mut field = Heightfield::new(10, 10);
        field.clear(0.5);

        field.add(3, 3, 0.2);
        assert!((field.get(3, 3).unwrap() - 0.7).abs() < 1e-6);

        field.add(3, 3, -0.9);
        assert_eq!(field.get(3, 3), Some(0.0));
    }

    #[test]
    fn test_clear() {
        let mut field = Heightfield::new(10, 10);
        field.clear(0.75);

        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(field.get(x, y), Some(0.75));
            }
        }
    }

    #[test]
    fn test_as_bytes() {
        let field = Heightfield::new(2, 2);
        let bytes = field.as_bytes();
        // 4 cells * 4 bytes per f32 = 16 bytes
        assert_eq!(bytes.len(), 16);
    }
}
