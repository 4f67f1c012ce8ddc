//! Greymap reading and writing on top of the `image` crate's PNM codec.
use std::{fs, io, path::Path};

use image::{
    ExtendedColorType, ImageEncoder,
    codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding},
};
use log::debug;
use stencil::Grid;

/// Loads `path` as an 8-bit greymap and widens it to `f32` samples.
///
/// # Errors
/// Returns an io error if the file can't be opened or decoded.
pub fn read(path: &Path) -> io::Result<Grid> {
    let img = image::open(path)
        .map_err(|e| io::Error::other(format!("failed to read {}: {e}", path.display())))?
        .into_luma8();

    let (cols, rows) = (img.width() as usize, img.height() as usize);
    let data = img.into_raw().into_iter().map(f32::from).collect();
    let grid = Grid::from_vec(rows, cols, data).map_err(io::Error::other)?;

    debug!(rows = rows, cols = cols; "read {}", path.display());
    Ok(grid)
}

/// Rescales `grid` so its maximum maps to 255 and stores it as a binary greymap.
///
/// An all-zero grid is stored as is.
pub fn write(path: &Path, grid: &Grid) -> io::Result<()> {
    let bytes = to_bytes(grid);
    let mut encoded = Vec::with_capacity(bytes.len() + 32);

    PnmEncoder::new(&mut encoded)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(
            &bytes,
            grid.cols() as u32,
            grid.rows() as u32,
            ExtendedColorType::L8,
        )
        .map_err(|e| io::Error::other(format!("failed to encode {}: {e}", path.display())))?;
    fs::write(path, encoded)?;

    debug!(rows = grid.rows(), cols = grid.cols(); "wrote {}", path.display());
    Ok(())
}

/// Creates `path`'s parent directory if needed, then writes `grid` to it.
pub fn save(path: &Path, grid: &Grid) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    write(path, grid)
}

fn to_bytes(grid: &Grid) -> Vec<u8> {
    let max = grid.as_slice().iter().copied().fold(0.0_f32, f32::max);
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };

    grid.as_slice()
        .iter()
        .map(|&px| (px * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximum_maps_to_255() {
        let grid = Grid::from_vec(1, 4, vec![0.0, 1.0, 2.0, 4.0]).unwrap();
        assert_eq!(to_bytes(&grid), [0, 64, 128, 255]);
    }

    #[test]
    fn zero_image_stays_zero() {
        let grid = Grid::zeros(2, 3).unwrap();
        assert_eq!(to_bytes(&grid), [0; 6]);
    }
}
