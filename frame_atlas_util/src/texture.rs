// SPDX-FileCopyrightText: 2021 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::fit::{fit, FitError};
use anyhow::{Context, Result};
use frame_atlas::FrameAtlas;
use glam::uvec2;
use image::codecs::png;
use image::imageops::replace;
use image::io::Reader;
use image::{ColorType, ImageEncoder, RgbaImage};
use oxipng::{optimize_from_memory, Headers, Options};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from [`compose_atlas`].
#[derive(Debug, Error)]
pub enum ComposeError {
    /// There is no first frame to derive the frame size from.
    #[error("no frames to compose")]
    NoFrames,
    /// A frame differs in size from the first frame.
    #[error("frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error(transparent)]
    Fit(#[from] FitError),
}

/// Output locations and encoding options for [`pack_frame_atlas`].
pub struct PackOptions<'a> {
    /// The file to write the atlas texture to.
    pub output_texture: &'a Path,
    /// When set, the file to write the grid geometry to as JSON.
    pub output_data: Option<&'a Path>,
    /// Losslessly shrink the encoded texture with oxipng.
    pub optimize: bool,
}

/// Composites `frames` onto a transparent power-of-two square texture in row-major order,
/// filling each row left to right. Every frame must have the size of the first.
pub fn compose_atlas(frames: &[RgbaImage]) -> Result<(RgbaImage, FrameAtlas), ComposeError> {
    let first = frames.first().ok_or(ComposeError::NoFrames)?;
    let frame_size = uvec2(first.width(), first.height());

    for (index, frame) in frames.iter().enumerate() {
        if frame.dimensions() != (frame_size.x, frame_size.y) {
            return Err(ComposeError::FrameSizeMismatch {
                index,
                width: frame.width(),
                height: frame.height(),
                expected_width: frame_size.x,
                expected_height: frame_size.y,
            });
        }
    }

    let layout = fit(frames.len() as u32, frame_size)?;
    assert!(
        frames.len() as u32 <= layout.cells(),
        "{}x{} grid cannot hold {} frames",
        layout.cols,
        layout.rows,
        frames.len()
    );

    // New image buffers are zeroed, so unused cells stay fully transparent.
    let mut atlas = RgbaImage::new(layout.side, layout.side);
    let mut tile_x = 0;
    let mut tile_y = 0;
    for frame in frames {
        replace(
            &mut atlas,
            frame,
            tile_x * frame_size.x,
            tile_y * frame_size.y,
        );
        tile_x += 1;
        if tile_x == layout.cols {
            tile_x = 0;
            tile_y += 1;
        }
    }

    Ok((
        atlas,
        FrameAtlas::new(layout, frame_size, frames.len() as u32),
    ))
}

/// Loads `files` in order, packs them into one atlas texture and writes the texture plus
/// the optional JSON geometry. Returns the geometry of the packed atlas.
pub fn pack_frame_atlas(files: &[PathBuf], options: &PackOptions<'_>) -> Result<FrameAtlas> {
    let frames = files
        .par_iter()
        .map(|path| -> Result<RgbaImage> {
            println!("Loading {}", path.display());

            let image = Reader::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?
                .decode()
                .with_context(|| format!("failed to decode {}", path.display()))?;
            Ok(image.into_rgba8())
        })
        .collect::<Result<Vec<_>>>()?;

    let (atlas, data) = compose_atlas(&frames)?;

    println!("Encoding {0}x{0} png...", data.side);

    let mut unoptimized = Vec::new();
    png::PngEncoder::new(&mut unoptimized)
        .write_image(atlas.as_raw(), data.side, data.side, ColorType::Rgba8)
        .context("failed to encode png")?;

    let encoded = if options.optimize {
        optimize_from_memory(
            &unoptimized,
            &Options {
                bit_depth_reduction: true,
                color_type_reduction: true,
                palette_reduction: true,
                grayscale_reduction: true,
                strip: Headers::Safe,
                ..Options::default()
            },
        )
        .context("failed to optimize png")?
    } else {
        unoptimized
    };

    println!("Writing {}", options.output_texture.display());
    fs::write(options.output_texture, encoded)
        .with_context(|| format!("failed to write {}", options.output_texture.display()))?;

    if let Some(data_path) = options.output_data {
        let json = serde_json::to_string(&data).context("failed to serialize atlas geometry")?;
        println!("Writing {}", data_path.display());
        fs::write(data_path, json)
            .with_context(|| format!("failed to write {}", data_path.display()))?;
    }

    Ok(data)
}
