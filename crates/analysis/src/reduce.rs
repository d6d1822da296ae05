//! Masked metric reduction
//!
//! Averages an index band over the cells of a binary region mask. The
//! band and the mask may use different grids; each band cell is tested by
//! looking the mask up at the cell's center, so coarse thermal bands and
//! fine optical bands reduce against the same mask without resampling.

use castorgis_core::Raster;

/// Mean of the band's valid cells whose centers fall on a set mask cell.
///
/// Returns `None` when no cell qualifies, so an empty region is
/// distinguishable from a region that averages to zero.
pub fn reduce_mean(band: &Raster<f64>, mask: &Raster<u8>) -> Option<f64> {
    let (rows, cols) = band.shape();
    let mut sum = 0.0;
    let mut count: usize = 0;

    for row in 0..rows {
        for col in 0..cols {
            let value = unsafe { band.get_unchecked(row, col) };
            if value.is_nan() || band.is_nodata(value) {
                continue;
            }
            let (x, y) = band.pixel_to_geo(col, row);
            if mask.value_at(x, y) == Some(1) {
                sum += value;
                count += 1;
            }
        }
    }

    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}
