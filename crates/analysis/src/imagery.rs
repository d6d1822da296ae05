//! Spectral indices
//!
//! Normalized difference indices computed from the monthly observation
//! bands. All indices operate on single-band rasters; invalid or
//! zero-denominator pixels come out as NaN.

use castorgis_core::{Error, Raster, Result};
use ndarray::Array2;
use rayon::prelude::*;

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in the range [-1, 1]. Pixels where either band is nodata or
/// the denominator vanishes are set to NaN.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for col in 0..cols {
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum.abs() < 1e-10 {
                    continue; // Avoid division by zero
                }

                row_data[col] = (a - b) / sum;
            }
            row_data
        })
        .collect();

    build_output(band_a, rows, cols, data)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(nir, red)
}

/// Normalized Difference Water Index (McFeeters, 1996)
///
/// `NDWI = (Green - NIR) / (Green + NIR)`
///
/// Positive values indicate open water.
pub fn ndwi(green: &Raster<f64>, nir: &Raster<f64>) -> Result<Raster<f64>> {
    normalized_difference(green, nir)
}

fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    if value.is_nan() {
        return true;
    }
    match nodata {
        Some(nd) => (value - nd).abs() < f64::EPSILON,
        None => false,
    }
}

fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

fn build_output(
    template: &Raster<f64>,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
) -> Result<Raster<f64>> {
    let mut output = template.with_same_meta::<f64>();
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use castorgis_core::GeoTransform;

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0));
        r
    }

    #[test]
    fn test_ndvi_values() {
        let nir = make_band(4, 4, 0.6);
        let red = make_band(4, 4, 0.2);
        let index = ndvi(&nir, &red).unwrap();
        assert_relative_eq!(index.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_ndwi_water_is_positive() {
        let green = make_band(2, 2, 0.3);
        let nir = make_band(2, 2, 0.1);
        let index = ndwi(&green, &nir).unwrap();
        assert_relative_eq!(index.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_denominator_yields_nan() {
        let a = make_band(2, 2, 0.0);
        let b = make_band(2, 2, 0.0);
        let index = normalized_difference(&a, &b).unwrap();
        assert!(index.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_nodata_propagates() {
        let mut nir = make_band(2, 2, 0.6);
        nir.set(0, 1, f64::NAN).unwrap();
        let red = make_band(2, 2, 0.2);
        let index = ndvi(&nir, &red).unwrap();
        assert!(index.get(0, 1).unwrap().is_nan());
        assert!(!index.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = make_band(2, 2, 0.5);
        let b = make_band(3, 2, 0.5);
        assert!(normalized_difference(&a, &b).is_err());
    }
}
