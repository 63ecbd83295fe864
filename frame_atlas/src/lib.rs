// SPDX-FileCopyrightText: 2021 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use glam::{uvec2, vec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};

/// GridLayout stores the grid geometry computed for one atlas build.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Width and height of the square atlas texture. Always a power of two, at least 2.
    pub side: u32,
    /// Usable columns at the final side length.
    pub cols: u32,
    /// Usable rows at the final side length.
    pub rows: u32,
}

/// FrameAtlas stores the pixel geometry of a packed atlas texture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FrameAtlas {
    pub side: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub cols: u32,
    pub rows: u32,
    /// Frames actually placed; the grid may offer more cells than this.
    pub frame_count: u32,
}

/// UvFrameAtlas stores the precise texture coordinates of its frames.
#[derive(Serialize, Deserialize)]
pub struct UvFrameAtlas {
    /// Aspect ratio aka frame width / height. Shared by every frame.
    pub aspect: f32,
    /// Frames in placement order.
    pub frames: Vec<UvFrame>,
}

/// UvFrame stores precise texture coordinates.
#[derive(Serialize, Deserialize)]
pub struct UvFrame {
    /// Texture coordinates into the atlas in counter-clockwise order starting at bottom
    /// left.
    ///
    /// ```x
    /// D - C
    /// | / |
    /// A - B
    /// ```
    pub uvs: [Vec2; 4],
}

impl GridLayout {
    /// Total cells the grid offers. At least as many as the frame count it was computed for.
    pub fn cells(&self) -> u32 {
        self.cols * self.rows
    }

    /// Grid cell of frame `index` in row-major order.
    pub fn cell(&self, index: u32) -> UVec2 {
        uvec2(index % self.cols, index / self.cols)
    }
}

impl FrameAtlas {
    /// Pairs a computed grid with the frame geometry it was computed for.
    pub fn new(layout: GridLayout, frame_size: UVec2, frame_count: u32) -> Self {
        Self {
            side: layout.side,
            frame_width: frame_size.x,
            frame_height: frame_size.y,
            cols: layout.cols,
            rows: layout.rows,
            frame_count,
        }
    }

    /// Dimensions of [`FrameAtlas`] equivilant to `uvec2(side, side)`.
    pub fn dimensions(&self) -> UVec2 {
        uvec2(self.side, self.side)
    }

    /// Size of every frame equivilant to `uvec2(frame_width, frame_height)`.
    pub fn frame_size(&self) -> UVec2 {
        uvec2(self.frame_width, self.frame_height)
    }

    /// The grid geometry of [`FrameAtlas`].
    pub fn layout(&self) -> GridLayout {
        GridLayout {
            side: self.side,
            cols: self.cols,
            rows: self.rows,
        }
    }

    /// Pixel position of frame `index`'s top left corner.
    pub fn position(&self, index: u32) -> UVec2 {
        self.layout().cell(index) * self.frame_size()
    }

    /// Converts a [`FrameAtlas`] into a [`UvFrameAtlas`] which is useful for rendering.
    pub fn to_uv_atlas(&self) -> UvFrameAtlas {
        UvFrameAtlas {
            aspect: self.frame_width as f32 / self.frame_height as f32,
            frames: (0..self.frame_count).map(|index| self.uvs(index)).collect(),
        }
    }

    /// Converts one frame's cell into a [`UvFrame`].
    fn uvs(&self, index: u32) -> UvFrame {
        let pos = self.position(index).as_vec2();
        let dim = self.frame_size().as_vec2();

        /*
        D  C

        A  B
         */
        let uvs = [
            pos + vec2(0.0, dim.y),
            pos + dim,
            pos + vec2(dim.x, 0.0),
            pos,
        ]
        .map(|v| v / self.dimensions().as_vec2());

        UvFrame { uvs }
    }
}

#[cfg(test)]
mod tests {
    use crate::{FrameAtlas, GridLayout};
    use glam::{uvec2, vec2};

    fn atlas_4x1() -> FrameAtlas {
        FrameAtlas::new(
            GridLayout {
                side: 8,
                cols: 4,
                rows: 1,
            },
            uvec2(2, 8),
            4,
        )
    }

    #[test]
    fn row_major_cells() {
        let layout = GridLayout {
            side: 8,
            cols: 2,
            rows: 2,
        };
        assert_eq!(layout.cell(0), uvec2(0, 0));
        assert_eq!(layout.cell(1), uvec2(1, 0));
        assert_eq!(layout.cell(2), uvec2(0, 1));
        assert_eq!(layout.cell(3), uvec2(1, 1));
        assert_eq!(layout.cells(), 4);
    }

    #[test]
    fn frame_positions() {
        let atlas = atlas_4x1();
        assert_eq!(atlas.position(0), uvec2(0, 0));
        assert_eq!(atlas.position(3), uvec2(6, 0));
    }

    #[test]
    fn uv_frames_are_normalized() {
        let atlas = atlas_4x1();
        let uv = atlas.to_uv_atlas();
        assert_eq!(uv.frames.len(), 4);
        assert!((uv.aspect - 0.25).abs() < f32::EPSILON);
        for frame in &uv.frames {
            for v in frame.uvs {
                assert!((0.0..=1.0).contains(&v.x) && (0.0..=1.0).contains(&v.y));
            }
        }
        // Top left corner of the second frame.
        assert_eq!(uv.frames[1].uvs[3], vec2(0.25, 0.0));
    }

    #[test]
    fn serializes_for_the_client() {
        let atlas = atlas_4x1();
        let json = serde_json::to_string(&atlas).unwrap();
        assert_eq!(
            json,
            r#"{"side":8,"frame_width":2,"frame_height":8,"cols":4,"rows":1,"frame_count":4}"#
        );
        let back: FrameAtlas = serde_json::from_str(&json).unwrap();
        assert_eq!(back, atlas);
    }
}
