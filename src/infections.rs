//! Per-disease-class infection counters: one array over work links and one
//! over wards (play) per class, owned separately from the network and
//! rewritten each day by the infection-propagation step.

use rayon::prelude::*;

use crate::network::{Network, Networks};

/// The infection counters for one network. `work[class][link]` counts
/// infections on fixed movements, `play[class][ward]` on random movements;
/// both keep the reserved slot 0 of their index space.
pub struct Infections {
    pub work: Vec<Vec<i32>>,
    pub play: Vec<Vec<i32>>,
    /// One sibling tracker per demographic sub-network, empty for a
    /// single-demographic run.
    pub subinfs: Vec<Infections>,
}

impl Infections {
    /// Allocates zeroed counters for `n_classes` disease classes over the
    /// given network. Play arrays span the node table's full capacity so
    /// sparse ward ids index directly.
    pub fn build(network: &Network, n_classes: usize) -> Self {
        Infections {
            work: (0..n_classes).map(|_| vec![0; network.nlinks + 1]).collect(),
            play: (0..n_classes).map(|_| vec![0; network.nodes.capacity()]).collect(),
            subinfs: Vec::new(),
        }
    }

    /// Allocates counters for a multi-demographic run: the overall network
    /// first, then one independent sibling per sub-network.
    pub fn build_for(networks: &Networks, n_classes: usize) -> Self {
        let mut infections = Infections::build(&networks.overall, n_classes);
        infections.subinfs = networks
            .subnets
            .iter()
            .map(|subnet| Infections::build(subnet, n_classes))
            .collect();
        infections
    }

    pub fn n_classes(&self) -> usize {
        self.work.len()
    }

    /// Resets every counter to zero. Each class array is an independent unit
    /// of work with no cross-writes, so the passes run in parallel with only
    /// the implicit join at the end.
    pub fn clear(&mut self) {
        self.work
            .par_iter_mut()
            .chain(self.play.par_iter_mut())
            .for_each(|counters| counters.fill(0));

        for subinf in &mut self.subinfs {
            subinf.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::sample_network;

    #[test]
    fn build_sizes_counters_with_the_reserved_slot() {
        let network = sample_network();
        let infections = Infections::build(&network, 4);
        assert_eq!(infections.n_classes(), 4);
        for class in &infections.work {
            assert_eq!(class.len(), network.nlinks + 1);
        }
        for class in &infections.play {
            assert_eq!(class.len(), network.nnodes + 1);
        }
        assert!(infections.subinfs.is_empty());
    }

    #[test]
    fn clear_zeroes_every_class() {
        let network = sample_network();
        let mut infections = Infections::build(&network, 3);
        infections.work[0][1] = 7;
        infections.work[2][3] = 2;
        infections.play[1][2] = 9;

        infections.clear();
        for class in infections.work.iter().chain(infections.play.iter()) {
            assert!(class.iter().all(|&c| c == 0));
        }
    }

    #[test]
    fn multi_demographic_build_and_clear() {
        let networks = Networks {
            overall: sample_network(),
            subnets: vec![sample_network(), sample_network()],
        };
        let mut infections = Infections::build_for(&networks, 2);
        assert_eq!(infections.subinfs.len(), 2);

        infections.subinfs[1].play[0][1] = 5;
        infections.clear();
        assert_eq!(infections.subinfs[1].play[0][1], 0);
    }
}
