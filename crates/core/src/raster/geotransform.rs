//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

/// North-up affine transformation for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and geographic coordinates
/// (x, y):
/// ```text
/// x = origin_x + col * cell_size
/// y = origin_y - row * cell_size
/// ```
///
/// The origin is the upper-left corner of the upper-left cell. Rows grow
/// southward, so y decreases with row. All analysis rasters in this
/// library are square-celled and unrotated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size (same in both axes, always positive)
    pub cell_size: f64,
}

impl GeoTransform {
    /// Create a new transform from the upper-left corner and cell size
    pub fn new(origin_x: f64, origin_y: f64, cell_size: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_size,
        }
    }

    /// Geographic coordinates of the center of pixel (col, row)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.cell_size;
        let y = self.origin_y - (row as f64 + 0.5) * self.cell_size;
        (x, y)
    }

    /// Fractional pixel coordinates (col, row) of a geographic point.
    ///
    /// Use `.floor()` to obtain integer cell indices; results may be
    /// negative or beyond the grid for points outside the raster.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.origin_x) / self.cell_size;
        let row = (self.origin_y - y) / self.cell_size;
        (col, row)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0);

        let (x, y) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y);

        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }
}
