use std::io;

use node::pgm;
use stencil::Grid;

#[test]
fn round_trip_keeps_8_bit_images() -> io::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sample_8.pgm");

    // Brightest pixel is 255, so writing doesn't rescale.
    let image = Grid::from_fn(8, 6, |r, c| ((r * 6 + c) * 5) as f32 + 20.0).unwrap();

    pgm::write(&path, &image)?;
    let read = pgm::read(&path)?;

    assert_eq!((read.rows(), read.cols()), (8, 6));
    assert_eq!(read, image);
    Ok(())
}

#[test]
fn file_starts_with_binary_greymap_header() -> io::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.pgm");

    pgm::write(&path, &Grid::zeros(3, 2).unwrap())?;
    let bytes = std::fs::read(&path)?;

    assert!(bytes.starts_with(b"P5"));
    assert!(bytes.ends_with(&[0; 6]));
    Ok(())
}

#[test]
fn save_creates_the_output_directory() -> io::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("output").join("nested").join("sobel_4.pgm");

    let grid = Grid::from_fn(4, 4, |r, _| r as f32).unwrap();
    pgm::save(&path, &grid)?;

    assert!(path.is_file());
    assert_eq!(pgm::read(&path)?.rows(), 4);
    Ok(())
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(pgm::read(&dir.path().join("sample_64.pgm")).is_err());
}
