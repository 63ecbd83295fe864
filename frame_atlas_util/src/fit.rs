// SPDX-FileCopyrightText: 2021 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use frame_atlas::GridLayout;
use glam::UVec2;
use thiserror::Error;

/// Errors from [`fit`].
#[derive(Debug, Error, Eq, PartialEq)]
pub enum FitError {
    /// Zero frames were requested.
    #[error("cannot fit zero frames")]
    NoFrames,
    /// A frame dimension was zero.
    #[error("frame dimensions must be nonzero, got {0}x{1}")]
    EmptyFrame(u32, u32),
    /// The grid needs a side longer than a texture dimension can hold.
    #[error("grid requires a {0} px side, longer than a texture dimension can hold")]
    TooLarge(u64),
}

/// Computes the square power-of-two texture side and the usable grid that fit `num_frames`
/// frames of `frame_size` pixels each.
///
/// Columns are derived from the unrounded row estimate; rounding rows first would produce a
/// different grid for oblong frames. The returned grid may offer more cells than
/// `num_frames` since the side is rounded up to a power of two, but never fewer.
pub fn fit(num_frames: u32, frame_size: UVec2) -> Result<GridLayout, FitError> {
    if num_frames == 0 {
        return Err(FitError::NoFrames);
    }
    if frame_size.x == 0 || frame_size.y == 0 {
        return Err(FitError::EmptyFrame(frame_size.x, frame_size.y));
    }

    let (fw, fh) = (frame_size.x as f64, frame_size.y as f64);

    // Rows that would make the tiled sheet roughly square.
    let rows = (num_frames as f64 * fw / fh).sqrt();
    let cols = (num_frames as f64 / rows).ceil();
    let rows = rows.ceil();

    let required_dim = (cols * fw).max(rows * fh);

    // A side past 2^31 would overflow the doubling search.
    if required_dim > (1u64 << 31) as f64 {
        return Err(FitError::TooLarge(required_dim as u64));
    }

    let mut side = 2u32;
    while (side as f64) < required_dim {
        side *= 2;
    }

    // The rounded-up side may hold more cells than the ideal grid.
    Ok(GridLayout {
        side,
        cols: side / frame_size.x,
        rows: side / frame_size.y,
    })
}
