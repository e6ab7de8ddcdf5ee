use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Result, TerrainError};
use crate::grid::HeightGrid;

pub const TGA_HEADER_LEN: usize = 18;

/// Header of an uncompressed 24-bit truecolor TGA without a colour map.
pub fn tga_header(width: u16, height: u16) -> [u8; TGA_HEADER_LEN] {
    let [w_lo, w_hi] = width.to_le_bytes();
    let [h_lo, h_hi] = height.to_le_bytes();
    [
        0, // id length
        0, // colour map type
        2, // uncompressed truecolor
        0, 0, // colour map index
        0, 0, // colour map length
        0, // colour map entry size
        0, 0, // x origin
        0, 0, // y origin
        w_lo, // width, low byte
        w_hi, // width, high byte
        h_lo, // height, low byte
        h_hi, // height, high byte
        24,   // bits per pixel
        0,    // attributes
    ]
}

/// Write the grid as a greyscale TGA: rows bottom to top, cells left to
/// right, each cell truncated to a byte and repeated three times.
pub fn write_tga<W: Write>(grid: &HeightGrid, mut out: W) -> Result<()> {
    let side = u16::try_from(grid.side()).map_err(|_| {
        TerrainError::InvalidParams(format!("tile side {} does not fit a TGA header", grid.side()))
    })?;
    out.write_all(&tga_header(side, side))?;

    let mut row_bytes = Vec::with_capacity(grid.side() * 3);
    for row in grid.rows().iter().rev() {
        row_bytes.clear();
        for &v in row {
            let grey = v as u8;
            row_bytes.extend_from_slice(&[grey, grey, grey]);
        }
        out.write_all(&row_bytes)?;
    }
    out.flush()?;
    Ok(())
}

pub fn save_tga<P: AsRef<Path>>(grid: &HeightGrid, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_tga(grid, BufWriter::new(file))?;
    info!(path = %path.display(), side = grid.side(), "terrain saved as TGA");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{tga_header, write_tga};
    use crate::HeightGrid;

    #[test]
    fn header_layout() {
        let h = tga_header(256, 256);
        assert_eq!(
            h,
            [0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 24, 0]
        );
    }

    #[test]
    fn two_by_two_bottom_up() {
        let g = HeightGrid::from_rows(vec![vec![10, 20], vec![30, 40]]);
        let mut buf = Vec::new();
        write_tga(&g, &mut buf).unwrap();

        assert_eq!(buf.len(), 18 + 12);
        assert_eq!(&buf[..18], &[0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 2, 0, 24, 0]);
        assert_eq!(
            &buf[18..],
            &[30, 30, 30, 40, 40, 40, 10, 10, 10, 20, 20, 20]
        );
    }

    #[test]
    fn cells_truncate_to_a_byte() {
        let g = HeightGrid::from_rows(vec![vec![256 + 7]]);
        let mut buf = Vec::new();
        write_tga(&g, &mut buf).unwrap();
        assert_eq!(&buf[18..], &[7, 7, 7]);
    }
}
