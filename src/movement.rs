//! Redistribution of susceptible mass between the work and play pools.
//!
//! Work to play rounds each moved amount up; play to work rounds down but
//! carries the dropped fractions forward in a running remainder, emitting one
//! extra unit whenever the remainder reaches a whole one. The carry makes the
//! total moved converge to the total of the exact quantities instead of
//! systematically under-rounding, and it depends on processing links in
//! source order, so that loop must stay sequential.

use log::warn;

use crate::denominators::{recalculate_play_denominators, recalculate_work_denominators};
use crate::network::Network;
use crate::params::Parameters;

/// Moves population between the work and play pools per
/// `params.work_to_play` and `params.play_to_work` (either may be zero).
/// Work to play runs first. Both denominator sets are recomputed before
/// returning so they always match the latest pool sizes.
pub fn move_population(network: &mut Network, params: &Parameters) {
    if params.work_to_play > 0.0 {
        for i in 1..=network.nlinks {
            let suscept = network.links.suscept[i];
            let to_move = (suscept * params.work_to_play).ceil();

            if to_move > suscept {
                warn!("work->play move {to_move} exceeds suscept {suscept} on link {i}");
            }

            network.links.suscept[i] -= to_move;
            network.nodes.play_suscept[network.links.ifrom[i]] += to_move;
        }
    }

    if params.play_to_work > 0.0 {
        let mut countrem = 0.0;

        // Each play link credits the work link at its own index; play links
        // beyond the work table have no counterpart to receive the movers.
        let coupled = network.plinks.min(network.nlinks);
        if network.plinks > network.nlinks {
            warn!(
                "{} play links beyond the {} work links are skipped",
                network.plinks - network.nlinks,
                network.nlinks
            );
        }

        for i in 1..=coupled {
            let ifrom = network.play.ifrom[i];
            let temp = params.play_to_work
                * network.play.weight[i]
                * network.nodes.save_play_suscept[ifrom];

            let mut to_move = temp.floor();
            countrem += temp - to_move;

            if countrem >= 1.0 {
                to_move += 1.0;
                countrem -= 1.0;
            }

            // Cannot move more than the ward currently holds.
            if network.nodes.play_suscept[ifrom] < to_move {
                to_move = network.nodes.play_suscept[ifrom];
            }

            network.nodes.play_suscept[ifrom] -= to_move;
            network.links.suscept[i] += to_move;
        }
    }

    recalculate_work_denominators(network);
    recalculate_play_denominators(network);
}
