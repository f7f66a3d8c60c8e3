//! Ordering of decoded objects before they are placed.

use tracing::warn;

use super::MapModel;
use crate::types::InstanceId;

impl MapModel {
    /// Move multi-tile objects behind single-cell ones, keeping the
    /// relative order within each group.
    ///
    /// Tails expanded for a multi-tile head must not end up below objects
    /// that were listed after the head in the file.
    pub fn sort_pending_chain(&self, chain: Vec<InstanceId>) -> Vec<InstanceId> {
        let (singles, multis): (Vec<InstanceId>, Vec<InstanceId>) =
            chain.iter().copied().partition(|&id| !self.is_multi(id));
        let reordered = !multis.is_empty()
            && singles
                .iter()
                .zip(&chain)
                .any(|(sorted, original)| sorted != original);
        if reordered {
            warn!(
                multi = multis.len(),
                single = singles.len(),
                "Multi-part objects moved behind single objects"
            );
        }
        singles.into_iter().chain(multis).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry;

    #[test]
    fn test_multis_move_last() {
        let mut map = MapModel::new(registry(), 4, 4);
        let tree = map.spawn_named("bigtree").unwrap();
        let floor = map.spawn_named("floor").unwrap();
        let chest = map.spawn_named("chest").unwrap();

        let sorted = map.sort_pending_chain(vec![tree, floor, chest]);
        assert_eq!(sorted, vec![floor, chest, tree]);
    }

    #[test]
    fn test_sorted_chain_unchanged() {
        let mut map = MapModel::new(registry(), 4, 4);
        let floor = map.spawn_named("floor").unwrap();
        let tree = map.spawn_named("bigtree").unwrap();
        assert_eq!(map.sort_pending_chain(vec![floor, tree]), vec![floor, tree]);
        assert!(map.sort_pending_chain(Vec::new()).is_empty());
    }
}
