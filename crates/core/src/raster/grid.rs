//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// A georeferenced 2D raster grid.
///
/// `Raster<T>` stores values of type `T` in a row-major grid with an
/// associated [`GeoTransform`] and optional no-data value. Binary masks in
/// the analysis pipeline are `Raster<u8>` with nodata 0; continuous bands
/// are `Raster<f64>` where NaN marks missing cells.
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
    transform: GeoTransform,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// Create a raster with the same shape and transform but a different
    /// cell type, filled with zeros
    pub fn with_same_meta<U: RasterElement>(&self) -> Raster<U> {
        Raster {
            data: Array2::zeros(self.data.dim()),
            transform: self.transform,
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Set value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn set_unchecked(&mut self, row: usize, col: usize, value: T) {
        unsafe {
            *self.data.uget_mut((row, col)) = value;
        }
    }

    /// Mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    // Coordinate conversion

    /// Geographic coordinates of the center of pixel (col, row)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Fractional pixel coordinates of a geographic point
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.transform.geo_to_pixel(x, y)
    }

    /// Cell value at a geographic point, or `None` outside the grid or on
    /// a no-data cell
    pub fn value_at(&self, x: f64, y: f64) -> Option<T> {
        let (col, row) = self.geo_to_pixel(x, y);
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col.floor() as usize, row.floor() as usize);
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let value = unsafe { self.get_unchecked(row, col) };
        if self.is_nodata(value) {
            None
        } else {
            Some(value)
        }
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }
}

impl Raster<u8> {
    /// Combine two binary masks cell-wise with logical AND.
    ///
    /// Both rasters must share the same shape. Output nodata is 0.
    pub fn mask_and(&self, other: &Raster<u8>) -> Result<Raster<u8>> {
        let (rows, cols) = self.shape();
        let (or, oc) = other.shape();
        if (rows, cols) != (or, oc) {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: or,
                ac: oc,
            });
        }

        let mut out = self.with_same_meta::<u8>();
        out.set_nodata(Some(0));
        for row in 0..rows {
            for col in 0..cols {
                let a = unsafe { self.get_unchecked(row, col) };
                let b = unsafe { other.get_unchecked(row, col) };
                if a == 1 && b == 1 {
                    unsafe { out.set_unchecked(row, col, 1) };
                }
            }
        }
        Ok(out)
    }

    /// Count of cells set to 1
    pub fn count_ones(&self) -> usize {
        self.data.iter().filter(|&&v| v == 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<f32> = Raster::new(10, 10);
        raster.set(5, 5, 42.0).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42.0);
        assert!(raster.get(10, 0).is_err());
    }

    #[test]
    fn test_value_at_geo() {
        let mut raster: Raster<f64> = Raster::new(10, 10);
        raster.set_transform(GeoTransform::new(0.0, 100.0, 10.0));
        raster.set(0, 0, 7.0).unwrap();

        // Center of the top-left cell is (5, 95)
        assert_eq!(raster.value_at(5.0, 95.0), Some(7.0));
        // Outside the grid
        assert_eq!(raster.value_at(-5.0, 95.0), None);
        assert_eq!(raster.value_at(500.0, 95.0), None);
    }

    #[test]
    fn test_value_at_skips_nodata() {
        let mut raster: Raster<f64> = Raster::filled(4, 4, f64::NAN);
        raster.set_transform(GeoTransform::new(0.0, 4.0, 1.0));
        assert_eq!(raster.value_at(0.5, 3.5), None);
    }

    #[test]
    fn test_mask_and() {
        let mut a: Raster<u8> = Raster::new(2, 2);
        let mut b: Raster<u8> = Raster::new(2, 2);
        a.set(0, 0, 1).unwrap();
        a.set(0, 1, 1).unwrap();
        b.set(0, 0, 1).unwrap();
        b.set(1, 1, 1).unwrap();

        let c = a.mask_and(&b).unwrap();
        assert_eq!(c.get(0, 0).unwrap(), 1);
        assert_eq!(c.get(0, 1).unwrap(), 0);
        assert_eq!(c.get(1, 1).unwrap(), 0);
        assert_eq!(c.count_ones(), 1);
    }

    #[test]
    fn test_mask_and_shape_mismatch() {
        let a: Raster<u8> = Raster::new(2, 2);
        let b: Raster<u8> = Raster::new(3, 2);
        assert!(a.mask_and(&b).is_err());
    }
}
