//! Test data generators for raster layers.
//!
//! These generators create predictable, verifiable value patterns in
//! row-major order that can be written out with any band encoding.

/// Creates the sequence `first, first + 1, ...` of `len` values.
///
/// Handy when a test wants the value to equal the tile position.
pub fn create_sequence(first: i64, len: usize) -> Vec<i64> {
    (0..len as i64).map(|i| first + i).collect()
}

/// Creates an elevation-like grid where every cell for which `is_sea`
/// returns true holds `no_data`.
///
/// Land cells rise with distance from the top-left corner.
pub fn create_masked_grid<F>(width: usize, height: usize, no_data: i64, is_sea: F) -> Vec<i64>
where
    F: Fn(usize, usize) -> bool,
{
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            if is_sea(col, row) {
                data.push(no_data);
            } else {
                data.push((row * 10 + col) as i64);
            }
        }
    }
    data
}

/// Creates a grid with a deterministic scatter of `no_data` cells.
///
/// Roughly one cell in `one_in` holds the sentinel.
pub fn create_sparse_grid(width: usize, height: usize, no_data: i64, one_in: u32, seed: u32) -> Vec<i64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let hash = simple_hash(col as u32, row as u32, seed);
            if one_in > 0 && hash % one_in == 0 {
                data.push(no_data);
            } else {
                data.push((hash % 5000) as i64);
            }
        }
    }
    data
}

/// Interleave single-band grids into band tuples (`band0, band1, ...` per tile).
pub fn interleave_bands(bands: &[Vec<i64>]) -> Vec<i64> {
    let len = bands.iter().map(Vec::len).min().unwrap_or(0);
    let mut data = Vec::with_capacity(len * bands.len());
    for i in 0..len {
        for band in bands {
            data.push(band[i]);
        }
    }
    data
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_grid() {
        let grid = create_masked_grid(4, 2, -9999, |col, _| col >= 2);
        assert_eq!(grid, vec![0, 1, -9999, -9999, 10, 11, -9999, -9999]);
    }

    #[test]
    fn test_sparse_grid_is_deterministic() {
        let a = create_sparse_grid(20, 20, -9999, 7, 42);
        let b = create_sparse_grid(20, 20, -9999, 7, 42);
        assert_eq!(a, b);
        assert!(a.iter().any(|&v| v == -9999));
        assert!(a.iter().any(|&v| v != -9999));
    }

    #[test]
    fn test_interleave_bands() {
        let data = interleave_bands(&[vec![1, 2, 3], vec![10, 20, 30]]);
        assert_eq!(data, vec![1, 10, 2, 20, 3, 30]);
        assert_eq!(create_sequence(5, 3), vec![5, 6, 7]);
    }
}
