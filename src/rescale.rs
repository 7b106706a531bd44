//! The stay-at-home policy: a single scalar in `[0, 1]` rescaling every play
//! weight from the link's current susceptible baseline. 0 leaves movement
//! unconstrained, 1 keeps everyone in their home ward.

use crate::denominators::recalculate_play_denominators;
use crate::network::Network;

/// Rescales every play weight from its current `suscept`, then brings the
/// play denominators back in line. The formulas are applied verbatim even at
/// `static_play_at_home == 0`, where they reduce to `weight = suscept`.
pub fn rescale_play_matrix(network: &mut Network, static_play_at_home: f64) {
    let sclfac = 1.0 - static_play_at_home;

    for j in 1..=network.plinks {
        let suscept = network.play.suscept[j];
        network.play.weight[j] = if network.play.ifrom[j] != network.play.ito[j] {
            // Not the home ward: fewer play movers.
            suscept * sclfac
        } else {
            (1.0 - suscept) * static_play_at_home + suscept
        };
    }

    recalculate_play_denominators(network);
}
