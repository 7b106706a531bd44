//! Per-day recomputation of the normalization denominators. Both passes are
//! idempotent and run every simulated day after the reset/rescale steps and
//! again after any population movement.

use log::{debug, warn};

use crate::network::Network;

/// Zeroes and re-accumulates the work denominators from the current (possibly
/// rescaled) link susceptibles, not the immutable baseline weights.
pub fn recalculate_work_denominators(network: &mut Network) {
    let nodes = &mut network.nodes;
    let links = &network.links;

    // Ward ids can sit above the occupied count when the label space is
    // sparse, so the node passes cover every allocated slot.
    nodes.denominator_n[1..].fill(0.0);
    nodes.denominator_d[1..].fill(0.0);

    let mut sum = 0.0;
    for j in 1..=network.nlinks {
        let suscept = links.suscept[j];
        nodes.denominator_d[links.ito[j]] += suscept;
        nodes.denominator_n[links.ifrom[j]] += suscept;
        sum += suscept;
    }

    debug!("recalculate_work_denominators sum = {sum}");
}

/// Zeroes and re-accumulates the play denominators. Incoming play mass is
/// `weight * play_suscept[ifrom]` summed per destination, then rounded
/// half-up; the outgoing denominator mirrors the ward's own pool size rather
/// than any sum. A negative pool is reported, never clamped.
pub fn recalculate_play_denominators(network: &mut Network) {
    let nodes = &mut network.nodes;
    let play = &network.play;

    nodes.denominator_pd[1..].fill(0.0);
    nodes.denominator_p[1..].fill(0.0);

    let mut sum = 0.0;
    for j in 1..=network.plinks {
        let denom = play.weight[j] * nodes.play_suscept[play.ifrom[j]];
        nodes.denominator_pd[play.ito[j]] += denom;
        sum += denom;
    }
    debug!("recalculate_play_denominators sum 1 = {sum}");

    let mut sum = 0.0;
    for i in 1..nodes.capacity() {
        nodes.denominator_pd[i] = (nodes.denominator_pd[i] + 0.5).floor();
        nodes.denominator_p[i] = nodes.play_suscept[i];

        if nodes.play_suscept[i] < 0.0 {
            warn!("negative play_suscept {} at ward {i}", nodes.play_suscept[i]);
        }

        sum += nodes.denominator_p[i];
    }
    debug!("recalculate_play_denominators sum 2 = {sum}");
}
