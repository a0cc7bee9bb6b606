use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use physarum_core::GridView;

/// Per-channel weights applied to cell intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMask(pub [f32; 3]);

impl Default for ColorMask {
    fn default() -> Self {
        ColorMask([0.2, 0.6, 0.9])
    }
}

impl ColorMask {
    pub fn shade(&self, intensity: u8) -> Rgb<u8> {
        let v = intensity as f32;
        Rgb([
            (v * self.0[0]) as u8,
            (v * self.0[1]) as u8,
            (v * self.0[2]) as u8,
        ])
    }
}

fn scaled_extent(cells: usize, cell_px: u32) -> Option<u32> {
    u32::try_from(cells).ok()?.checked_mul(cell_px)
}

/// Draw each cell as a `cell_px` square block. Fails when the image would
/// not fit in `u32` pixel dimensions.
pub fn render_frame(view: GridView<'_>, mask: &ColorMask, cell_px: u32) -> Result<RgbImage> {
    let cell_px = cell_px.max(1);
    let width = scaled_extent(view.columns, cell_px).with_context(|| {
        format!("image width overflows: {} columns x {cell_px} px", view.columns)
    })?;
    let height = scaled_extent(view.rows, cell_px)
        .with_context(|| format!("image height overflows: {} rows x {cell_px} px", view.rows))?;
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let col = (x / cell_px) as usize;
        let row = (y / cell_px) as usize;
        mask.shade(view.get(col, row))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mask_matches_blue_green_palette() {
        let mask = ColorMask::default();
        assert_eq!(mask.shade(0), Rgb([0, 0, 0]));
        assert_eq!(mask.shade(255), Rgb([51, 153, 229]));
    }

    #[test]
    fn cells_render_as_square_blocks() {
        let cells = [0u8, 255, 100, 0];
        let view = GridView {
            columns: 2,
            rows: 2,
            cells: &cells,
        };
        let mask = ColorMask([1.0, 1.0, 1.0]);
        let img = render_frame(view, &mask, 3).expect("small image");
        assert_eq!(img.dimensions(), (6, 6));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(3, 2), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(5, 0), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(1, 4), Rgb([100, 100, 100]));
    }

    #[test]
    fn oversized_image_is_an_error() {
        let cells = [0u8; 2];
        let view = GridView {
            columns: 2,
            rows: 1,
            cells: &cells,
        };
        let err = render_frame(view, &ColorMask::default(), u32::MAX)
            .expect_err("width overflows u32");
        assert!(err.to_string().contains("width"), "{err}");
    }
}
