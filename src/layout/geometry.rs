use crate::{domain::TimeInterval, layout::GridConfig};

/// Maps an interval plus its column slot to `(top, height, left, width)`.
/// Top is relative to the grid start and goes negative for blocks that
/// begin above it; height never falls below the configured floor so very
/// short blocks stay visible. Left and width are fractions of the day
/// column, so a cluster's columns tile `[0, 1)` with no gaps.
pub fn block_geometry(
    interval: TimeInterval,
    column: usize,
    column_count: usize,
    config: &GridConfig,
) -> (f64, f64, f64, f64) {
    let top = (interval.start as f64 - config.grid_start as f64) * config.pixels_per_minute;
    let height = (interval.duration() as f64 * config.pixels_per_minute).max(config.min_height_px);
    let left = column as f64 / column_count as f64;
    let width = 1.0 / column_count as f64;
    (top, height, left, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(ppm: f64, grid_start: u16) -> GridConfig {
        GridConfig::new(ppm, grid_start, 10.0).unwrap()
    }

    #[test]
    fn test_top_and_height_scale_with_minutes() {
        let interval = TimeInterval::new(540, 630).unwrap();
        let (top, height, _, _) = block_geometry(interval, 0, 1, &config(2.0, 480));
        assert_eq!(top, 120.0);
        assert_eq!(height, 180.0);
    }

    #[test]
    fn test_block_above_grid_start_gets_negative_top() {
        let interval = TimeInterval::new(300, 360).unwrap();
        let (top, _, _, _) = block_geometry(interval, 0, 1, &config(1.0, 480));
        assert_eq!(top, -180.0);
    }

    #[test]
    fn test_short_block_hits_height_floor() {
        let interval = TimeInterval::new(540, 543).unwrap();
        let (_, height, _, _) = block_geometry(interval, 0, 1, &config(2.0, 0));
        assert_eq!(height, 10.0);
    }

    #[test]
    fn test_columns_tile_the_day_column() {
        let interval = TimeInterval::new(540, 600).unwrap();
        for column_count in 1..=6 {
            let mut widths = 0.0;
            let mut next_left = 0.0;
            for column in 0..column_count {
                let (_, _, left, width) =
                    block_geometry(interval, column, column_count, &config(2.0, 0));
                assert!((left - next_left).abs() < 1e-12);
                widths += width;
                next_left = left + width;
            }
            assert!((widths - 1.0).abs() < 1e-12);
        }
    }
}
