use crate::{domain::Block, timecode::Minute};

/// One cluster with per-member column assignments.
pub struct PackedCluster<'a> {
    pub members: Vec<(&'a Block, usize)>,
    pub column_count: usize,
}

/// Greedy first-fit column assignment within one cluster. Members are
/// taken in start order (stable sort, so equal starts keep their input
/// order) and each gets the lowest column whose previous occupant has
/// already ended; a column ending exactly at the candidate's start is
/// free. For interval graphs this greedy coloring is minimal, so the
/// column count equals the largest number of simultaneously running
/// blocks in the cluster.
pub fn pack_columns<'a>(mut cluster: Vec<&'a Block>) -> PackedCluster<'a> {
    cluster.sort_by_key(|block| block.interval.start);

    let mut column_ends: Vec<Minute> = Vec::new();
    let mut members = Vec::with_capacity(cluster.len());

    for block in cluster {
        let column = column_ends
            .iter()
            .position(|&end| end <= block.interval.start)
            .unwrap_or_else(|| {
                column_ends.push(0);
                column_ends.len() - 1
            });
        column_ends[column] = block.interval.end;
        members.push((block, column));
    }

    PackedCluster {
        column_count: column_ends.len(),
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlockId, GroupId, TimeInterval};

    fn block(id: &str, start: Minute, end: Minute) -> Block {
        Block {
            id: BlockId(id.to_string()),
            group: GroupId(format!("g-{id}")),
            title: id.to_string(),
            category: "Work".to_string(),
            day: 0,
            interval: TimeInterval::new(start, end).unwrap(),
            core_work: false,
            alt_focus: false,
        }
    }

    fn column_of(packed: &PackedCluster, id: &str) -> usize {
        packed
            .members
            .iter()
            .find(|(b, _)| b.id.0 == id)
            .map(|(_, col)| *col)
            .expect("missing member")
    }

    fn max_simultaneous(blocks: &[&Block]) -> usize {
        (0..1440)
            .map(|minute| {
                blocks
                    .iter()
                    .filter(|b| b.interval.start <= minute && minute < b.interval.end)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_two_overlapping_blocks_take_two_columns() {
        let a = block("a", 540, 660);
        let b = block("b", 600, 720);
        let packed = pack_columns(vec![&a, &b]);

        assert_eq!(packed.column_count, 2);
        assert_eq!(column_of(&packed, "a"), 0);
        assert_eq!(column_of(&packed, "b"), 1);
    }

    #[test]
    fn test_touching_end_frees_the_column() {
        let a = block("a", 540, 600);
        let b = block("b", 570, 630);
        let c = block("c", 600, 660);
        let packed = pack_columns(vec![&a, &b, &c]);

        assert_eq!(packed.column_count, 2);
        assert_eq!(column_of(&packed, "a"), 0);
        assert_eq!(column_of(&packed, "b"), 1);
        assert_eq!(column_of(&packed, "c"), 0);
    }

    #[test]
    fn test_no_column_holds_overlapping_blocks() {
        let blocks = vec![
            block("a", 0, 200),
            block("b", 50, 120),
            block("c", 100, 300),
            block("d", 120, 220),
            block("e", 200, 400),
            block("f", 210, 260),
        ];
        let refs: Vec<&Block> = blocks.iter().collect();
        let packed = pack_columns(refs);

        for (left, left_col) in &packed.members {
            for (right, right_col) in &packed.members {
                if left.id != right.id && left_col == right_col {
                    assert!(
                        !left.interval.overlaps(&right.interval),
                        "{} and {} share column {}",
                        left.id.0,
                        right.id.0,
                        left_col
                    );
                }
            }
        }
    }

    #[test]
    fn test_column_count_matches_peak_concurrency() {
        let cases: Vec<Vec<Block>> = vec![
            vec![block("a", 540, 600)],
            vec![block("a", 540, 660), block("b", 600, 720)],
            vec![
                block("a", 540, 600),
                block("b", 570, 630),
                block("c", 600, 660),
            ],
            vec![
                block("a", 0, 400),
                block("b", 100, 300),
                block("c", 150, 250),
                block("d", 300, 500),
            ],
        ];

        for case in cases {
            let refs: Vec<&Block> = case.iter().collect();
            let expected = max_simultaneous(&refs);
            let packed = pack_columns(refs);
            assert_eq!(packed.column_count, expected);
        }
    }

    #[test]
    fn test_equal_starts_keep_input_order() {
        let a = block("a", 540, 600);
        let b = block("b", 540, 620);
        let packed = pack_columns(vec![&a, &b]);

        assert_eq!(column_of(&packed, "a"), 0);
        assert_eq!(column_of(&packed, "b"), 1);
    }
}
