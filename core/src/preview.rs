use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};
use palette::{Gradient, LinSrgb};
use tracing::info;

use crate::error::Result;
use crate::grid::HeightGrid;

// Map a height onto [0, 1] using the grid's bounds
fn normalized(grid: &HeightGrid, v: i32) -> f32 {
    let (lo, hi) = (grid.min_height(), grid.max_height());
    if hi <= lo {
        return 0.0;
    }
    let (v, lo, hi) = (v as i64, lo as i64, hi as i64);
    ((v - lo) as f32 / (hi - lo) as f32).clamp(0.0, 1.0)
}

/// Greyscale image of the tile, one pixel per cell, height scaled to 0..=255.
pub fn to_grey_image(grid: &HeightGrid) -> GrayImage {
    let side = grid.side() as u32;
    GrayImage::from_fn(side, side, |x, y| {
        let t = normalized(grid, grid.get(x as usize, y as usize));
        Luma([(t * 255.0) as u8])
    })
}

/// Height-coloured image: water, sand, grass, rock, snow.
pub fn to_colour_image(grid: &HeightGrid) -> RgbImage {
    let gradient = Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.0, 0.0, 0.5)), // deep water
        (0.30, LinSrgb::new(0.0, 0.5, 1.0)), // shallows
        (0.40, LinSrgb::new(0.8, 0.8, 0.5)), // sand
        (0.60, LinSrgb::new(0.1, 0.6, 0.2)), // grass
        (0.80, LinSrgb::new(0.5, 0.4, 0.3)), // rock
        (1.00, LinSrgb::new(1.0, 1.0, 1.0)), // snow
    ]);

    let side = grid.side() as u32;
    RgbImage::from_fn(side, side, |x, y| {
        let t = normalized(grid, grid.get(x as usize, y as usize));
        let col: LinSrgb = gradient.get(t);
        let rgb = col.into_format::<u8>();
        Rgb([rgb.red, rgb.green, rgb.blue])
    })
}

/// Save a PNG preview, coloured or greyscale.
pub fn save_png<P: AsRef<Path>>(grid: &HeightGrid, path: P, coloured: bool) -> Result<()> {
    let path = path.as_ref();
    if coloured {
        to_colour_image(grid).save(path)?;
    } else {
        to_grey_image(grid).save(path)?;
    }
    info!(path = %path.display(), coloured, "preview saved");
    Ok(())
}
