use crate::domain::Block;

/// Partitions one day's blocks into maximal clusters connected by
/// temporal overlap. Overlap is transitive across a cluster: a block
/// joins as soon as it overlaps any member, so two blocks can share a
/// cluster without overlapping each other directly.
pub fn cluster_by_overlap(blocks: &[Block]) -> Vec<Vec<&Block>> {
    let mut remaining: Vec<&Block> = blocks.iter().collect();
    let mut clusters = Vec::new();

    while !remaining.is_empty() {
        let seed = remaining.remove(0);
        let mut cluster = vec![seed];

        // Absorb until a full pass over the leftovers adds nothing.
        let mut absorbed = true;
        while absorbed {
            absorbed = false;
            let mut i = 0;
            while i < remaining.len() {
                let joins = cluster
                    .iter()
                    .any(|member| member.interval.overlaps(&remaining[i].interval));
                if joins {
                    cluster.push(remaining.remove(i));
                    absorbed = true;
                } else {
                    i += 1;
                }
            }
        }

        clusters.push(cluster);
    }

    clusters
}
