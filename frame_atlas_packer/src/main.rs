// SPDX-FileCopyrightText: 2021 Softbear, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::Result;
use clap::Parser;
use frame_atlas_util::texture::{pack_frame_atlas, PackOptions};
use std::path::PathBuf;

/// Tiles equally sized animation frames onto one square power-of-two texture.
#[derive(Parser, Debug)]
#[command(about = "Tiles equally sized frames onto a power-of-two texture atlas")]
struct Args {
    /// Frame image files in placement order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,
    /// File to write the atlas texture to.
    #[arg(long, default_value = "out.png")]
    output: PathBuf,
    /// Also write the grid geometry as JSON.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Losslessly optimize the encoded texture with oxipng.
    #[arg(long)]
    optimize: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Processing {} frame files.", args.frames.len());

    let atlas = pack_frame_atlas(
        &args.frames,
        &PackOptions {
            output_texture: &args.output,
            output_data: args.data.as_deref(),
            optimize: args.optimize,
        },
    )?;

    println!(
        "Tiled {} frames onto a {}x{} texture at {}.",
        atlas.frame_count,
        atlas.side,
        atlas.side,
        args.output.display()
    );
    Ok(())
}
