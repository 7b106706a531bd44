//! The assembled ward-movement network and its daily reset passes.

use log::{debug, warn};
use rayon::prelude::*;

use crate::links::{LinkTable, PlayLinkTable};
use crate::nodes::NodeTable;
use crate::params::Parameters;
use crate::{denominators, rescale};

/// A built movement network: one ward table plus the work and play link
/// tables. Counts are always one less than the owning table's capacity
/// because slot 0 is reserved.
#[derive(Debug)]
pub struct Network {
    pub nodes: NodeTable,
    /// Fixed commuting links.
    pub links: LinkTable,
    /// Randomized daily-movement links.
    pub play: PlayLinkTable,
    pub nnodes: usize,
    pub nlinks: usize,
    pub plinks: usize,
}

impl Network {
    /// Restores every work link's susceptible count from its baseline weight.
    pub fn reset_work_matrix(&mut self) {
        let n = self.nlinks;
        let weight = &self.links.weight[1..=n];
        self.links.suscept[1..=n]
            .par_iter_mut()
            .zip(weight.par_iter())
            .for_each(|(s, w)| *s = *w);
    }

    /// Restores every play link's weight from its susceptible count. Note
    /// the direction: for play links `suscept` is the persisted baseline and
    /// `weight` is what the stay-at-home rescaling overwrites each day.
    pub fn reset_play_matrix(&mut self) {
        let n = self.plinks;
        let suscept = &self.play.suscept[1..=n];
        self.play.weight[1..=n]
            .par_iter_mut()
            .zip(suscept.par_iter())
            .for_each(|(w, s)| *w = *s);
    }

    /// Restores every ward's play pool from its saved baseline. Runs over
    /// the whole table since ward ids can exceed the occupied count.
    pub fn reset_play_susceptibles(&mut self) {
        let saved = &self.nodes.save_play_suscept[1..];
        self.nodes.play_suscept[1..]
            .par_iter_mut()
            .zip(saved.par_iter())
            .for_each(|(p, s)| *p = *s);
    }

    /// The start-of-day reset: work and play matrices back to baseline, play
    /// pools back to their saved values, and the disease's force-of-infection
    /// contributions back to their defaults.
    pub fn reset_everything(&mut self, params: &mut Parameters) {
        self.reset_work_matrix();
        self.reset_play_matrix();
        self.reset_play_susceptibles();
        params.disease.reset_contrib_foi();
    }

    /// The fixed per-day prologue run by the day-loop driver: reset, apply
    /// the stay-at-home policy, then bring both denominator sets in line with
    /// the (possibly rescaled) state. Steps are strictly sequential; only
    /// their inner loops parallelize.
    pub fn update(&mut self, params: &mut Parameters) {
        self.reset_everything(params);
        rescale::rescale_play_matrix(self, params.static_play_at_home);
        denominators::recalculate_work_denominators(self);
        denominators::recalculate_play_denominators(self);
    }

    /// Minimum and maximum work-link distances. By convention the reported
    /// minimum is always zero (the true minimum is discarded); the maximum
    /// is the true observed maximum.
    pub fn min_max_distance(&self) -> (f64, f64) {
        let mut mindist: Option<f64> = None;
        let mut maxdist: f64 = 0.0;

        for i in 1..=self.nlinks {
            let dist = self.links.distance[i];
            maxdist = maxdist.max(dist);
            mindist = Some(match mindist {
                None => dist,
                Some(m) => m.min(dist),
            });
        }

        debug!("maxdist {maxdist} mindist {mindist:?}");
        if let Some(m) = mindist {
            if m > 0.0 {
                warn!("clamping minimum distance {m} to zero");
            }
        }

        (0.0, maxdist)
    }
}

/// A multi-demographic run: the overall network plus one sub-network per
/// demographic. Siblings share a build/clear lifecycle (overall first, then
/// each subnet) but are otherwise independent.
pub struct Networks {
    pub overall: Network,
    pub subnets: Vec<Network>,
}

#[cfg(test)]
pub(crate) fn sample_network() -> Network {
    // Three wards; work links 1->2, 2->3, 3->3 (self-loop); play links
    // mirroring them with fractional weights. Ranges and denominators are
    // laid out the way the builder would.
    let mut nodes = NodeTable::with_capacity(4);
    let mut links = LinkTable::with_capacity(4);
    let mut play = PlayLinkTable::with_capacity(4);

    for i in 1..=3 {
        nodes.occupy(crate::WardId(i));
    }

    let work = [(1usize, 2usize, 5.0), (2, 3, 3.0), (3, 3, 2.0)];
    for (idx, (from, to, w)) in work.iter().enumerate() {
        let i = idx + 1;
        links.ifrom[i] = *from;
        links.ito[i] = *to;
        links.weight[i] = *w;
        links.suscept[i] = *w;
        nodes.begin_to[*from] = i;
        nodes.end_to[*from] = i + 1;
        if from == to {
            nodes.self_w[*from] = i;
        }
    }

    let playlinks = [(1usize, 2usize, 0.5), (2, 3, 0.25), (3, 3, 1.0)];
    for (idx, (from, to, w)) in playlinks.iter().enumerate() {
        let i = idx + 1;
        play.ifrom[i] = *from;
        play.ito[i] = *to;
        play.weight[i] = *w;
        play.suscept[i] = *w;
        nodes.begin_p[*from] = i;
        nodes.end_p[*from] = i + 1;
        if from == to {
            nodes.self_p[*from] = i;
        }
    }

    for i in 1..=3 {
        nodes.play_suscept[i] = 100.0;
        nodes.save_play_suscept[i] = 100.0;
    }

    Network {
        nodes,
        links,
        play,
        nnodes: 3,
        nlinks: 3,
        plinks: 3,
    }
}
