use crate::{
    domain::{Block, BlockId},
    error::{TrellisError, TrellisResult},
    timecode::Minute,
};

mod cluster;
mod columns;
mod geometry;

pub use cluster::cluster_by_overlap;
pub use columns::{PackedCluster, pack_columns};
pub use geometry::block_geometry;

/// Grid parameters for laying out one day column.
#[derive(Clone, Copy, Debug)]
pub struct GridConfig {
    pub pixels_per_minute: f64,
    pub grid_start: Minute,
    pub min_height_px: f64,
}

impl GridConfig {
    pub fn new(
        pixels_per_minute: f64,
        grid_start: Minute,
        min_height_px: f64,
    ) -> TrellisResult<Self> {
        if !(pixels_per_minute > 0.0) {
            return Err(TrellisError::InvalidConfig(format!(
                "pixels per minute must be positive, got {pixels_per_minute}"
            )));
        }
        Ok(GridConfig {
            pixels_per_minute,
            grid_start,
            min_height_px,
        })
    }
}

/// Placement of one block within its day column. Left and width are
/// fractions of the column width; top and height are pixels. Recomputed
/// on every render pass and never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockLayout {
    pub block_id: BlockId,
    pub column: usize,
    pub column_count: usize,
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
}

/// Lays out one day's blocks: clusters transitively overlapping blocks,
/// packs each cluster into columns, and maps every member to geometry.
/// Returns one layout per input block, in cluster order.
pub fn lay_out_day(blocks: &[Block], config: &GridConfig) -> Vec<BlockLayout> {
    let mut layouts = Vec::with_capacity(blocks.len());

    for group in cluster_by_overlap(blocks) {
        let packed = pack_columns(group);
        for (block, column) in packed.members {
            let (top, height, left, width) =
                block_geometry(block.interval, column, packed.column_count, config);
            layouts.push(BlockLayout {
                block_id: block.id.clone(),
                column,
                column_count: packed.column_count,
                top,
                height,
                left,
                width,
            });
        }
    }

    layouts
}
