//! Fixed-column grid of screenshots on one canvas.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView as _, ImageFormat, Rgb, RgbImage, imageops};

use crate::foundation::{
    error::{ReittiError, ReittiResult},
    fs::ensure_parent_dir,
};

pub const DEFAULT_COLUMNS: u32 = 3;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollageSummary {
    pub images: usize,
    pub columns: u32,
    pub rows: u32,
    pub width: u32,
    pub height: u32,
}

/// Load every image that exists and decodes, in input order. Others are skipped with a
/// warning.
pub fn load_images(paths: &[PathBuf]) -> Vec<DynamicImage> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            tracing::warn!("skipping missing image {}", path.display());
            continue;
        }
        match image::open(path) {
            Ok(img) => images.push(img),
            Err(e) => tracing::warn!("error loading {}: {e}", path.display()),
        }
    }
    images
}

/// Cell `(row, column)` of the `index`-th image.
pub fn grid_cell(index: usize, columns: u32) -> (u32, u32) {
    let index = index as u32;
    (index / columns, index % columns)
}

/// Canvas `(width, height)` for `count` cells of `cell_w x cell_h` in `columns` columns.
pub fn canvas_size(
    count: usize,
    columns: u32,
    cell_w: u32,
    cell_h: u32,
) -> ReittiResult<(u32, u32)> {
    let rows = u32::try_from(count.div_ceil(columns as usize)).ok();
    let width = columns.checked_mul(cell_w);
    let height = rows.and_then(|r| r.checked_mul(cell_h));
    match (width, height) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(ReittiError::image(format!(
            "collage of {count} images in {columns} columns of {cell_w}x{cell_h} is too large"
        ))),
    }
}

/// Lay `images` out row-major on a white canvas.
///
/// The first image fixes the cell size; images of any other size are resized to it
/// (aspect ratio is not preserved).
pub fn compose_collage(images: &[DynamicImage], columns: u32) -> ReittiResult<RgbImage> {
    if columns == 0 {
        return Err(ReittiError::config("collage needs at least one column"));
    }
    let Some(first) = images.first() else {
        return Err(ReittiError::no_data("no valid images to create collage"));
    };

    let (cell_w, cell_h) = first.dimensions();
    let (width, height) = canvas_size(images.len(), columns, cell_w, cell_h)?;
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    for (idx, img) in images.iter().enumerate() {
        let (row, col) = grid_cell(idx, columns);
        let cell = if img.dimensions() == (cell_w, cell_h) {
            img.to_rgb8()
        } else {
            img.resize_exact(cell_w, cell_h, imageops::FilterType::Lanczos3)
                .to_rgb8()
        };
        imageops::replace(
            &mut canvas,
            &cell,
            i64::from(col * cell_w),
            i64::from(row * cell_h),
        );
    }

    Ok(canvas)
}

/// Load `paths`, compose them and write a PNG to `out`. Nothing is written when no image
/// could be loaded.
#[tracing::instrument(skip(paths), fields(inputs = paths.len()))]
pub fn write_collage(paths: &[PathBuf], out: &Path, columns: u32) -> ReittiResult<CollageSummary> {
    let images = load_images(paths);
    let canvas = compose_collage(&images, columns)?;

    ensure_parent_dir(out)?;
    canvas
        .save_with_format(out, ImageFormat::Png)
        .map_err(|e| ReittiError::image(format!("write collage '{}': {e}", out.display())))?;

    let summary = CollageSummary {
        images: images.len(),
        columns,
        rows: images.len().div_ceil(columns as usize) as u32,
        width: canvas.width(),
        height: canvas.height(),
    };
    tracing::info!("✓ collage saved to {}", out.display());
    Ok(summary)
}
