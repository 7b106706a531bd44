//! Named resolution of mover and mixer strategies. The engine ships a small
//! closed set of built-ins; callers plug in their own behavior by registering
//! a function under a name, and day-loop configuration refers to strategies
//! by name only.

use rustc_hash::FxHashMap;

use crate::error::MetapopError;
use crate::movement;
use crate::network::{Network, Networks};
use crate::params::Parameters;

pub type MoverFn = fn(&mut Network, &Parameters);
pub type MixerFn = fn(&mut Networks, &Parameters);

/// How population moves between the work and play pools each day.
#[derive(Clone, Copy, Debug)]
pub enum MoverStrategy {
    /// Leave everyone where they are.
    Null,
    /// The built-in work/play exchange (`movement::move_population`).
    PopulationExchange,
    Custom(MoverFn),
}

impl MoverStrategy {
    pub fn apply(&self, network: &mut Network, params: &Parameters) {
        match self {
            MoverStrategy::Null => {}
            MoverStrategy::PopulationExchange => movement::move_population(network, params),
            MoverStrategy::Custom(mover) => mover(network, params),
        }
    }
}

/// How the force of infection mixes across demographic sub-networks.
#[derive(Clone, Copy)]
pub enum MixerStrategy {
    /// No mixing between demographics.
    Null,
    Custom(MixerFn),
}

impl MixerStrategy {
    pub fn apply(&self, networks: &mut Networks, params: &Parameters) {
        match self {
            MixerStrategy::Null => {}
            MixerStrategy::Custom(mixer) => mixer(networks, params),
        }
    }
}

/// Name-to-strategy table for movers, preloaded with the built-ins.
pub struct MoverRegistry {
    strategies: FxHashMap<String, MoverStrategy>,
}

impl MoverRegistry {
    pub fn new() -> Self {
        let mut strategies = FxHashMap::default();
        strategies.insert("null".to_string(), MoverStrategy::Null);
        strategies.insert(
            "population_exchange".to_string(),
            MoverStrategy::PopulationExchange,
        );
        MoverRegistry { strategies }
    }

    pub fn register(&mut self, name: &str, strategy: MoverStrategy) {
        self.strategies.insert(name.to_string(), strategy);
    }

    pub fn resolve(&self, name: &str) -> Result<MoverStrategy, MetapopError> {
        self.strategies
            .get(name)
            .copied()
            .ok_or_else(|| MetapopError::UnknownStrategy {
                name: name.to_string(),
            })
    }
}

impl Default for MoverRegistry {
    fn default() -> Self {
        MoverRegistry::new()
    }
}

/// Name-to-strategy table for mixers.
pub struct MixerRegistry {
    strategies: FxHashMap<String, MixerStrategy>,
}

impl MixerRegistry {
    pub fn new() -> Self {
        let mut strategies = FxHashMap::default();
        strategies.insert("null".to_string(), MixerStrategy::Null);
        MixerRegistry { strategies }
    }

    pub fn register(&mut self, name: &str, strategy: MixerStrategy) {
        self.strategies.insert(name.to_string(), strategy);
    }

    pub fn resolve(&self, name: &str) -> Result<MixerStrategy, MetapopError> {
        self.strategies
            .get(name)
            .copied()
            .ok_or_else(|| MetapopError::UnknownStrategy {
                name: name.to_string(),
            })
    }
}

impl Default for MixerRegistry {
    fn default() -> Self {
        MixerRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::sample_network;
    use crate::params::Disease;

    #[test]
    fn builtins_resolve_by_name() {
        let registry = MoverRegistry::new();
        assert!(registry.resolve("null").is_ok());
        assert!(registry.resolve("population_exchange").is_ok());
    }

    #[test]
    fn unknown_name_is_a_descriptive_error() {
        let registry = MoverRegistry::new();
        let err = registry.resolve("teleport").unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn custom_mover_is_applied() {
        fn drain_ward_one(network: &mut Network, _params: &Parameters) {
            network.nodes.play_suscept[1] = 0.0;
        }

        let mut registry = MoverRegistry::new();
        registry.register("drain", MoverStrategy::Custom(drain_ward_one));

        let mut network = sample_network();
        let params = Parameters::new(Disease::sir());
        registry.resolve("drain").unwrap().apply(&mut network, &params);
        assert_eq!(network.nodes.play_suscept[1], 0.0);
    }

    #[test]
    fn population_exchange_runs_the_mover() {
        let mut network = sample_network();
        let mut params = Parameters::new(Disease::sir());
        params.work_to_play = 0.5;

        let registry = MoverRegistry::new();
        registry
            .resolve("population_exchange")
            .unwrap()
            .apply(&mut network, &params);
        // ceil(5 * 0.5) = 3 moved off link 1.
        assert_eq!(network.links.suscept[1], 2.0);
    }

    #[test]
    fn null_mixer_is_a_no_op() {
        let mut networks = Networks {
            overall: sample_network(),
            subnets: vec![],
        };
        let params = Parameters::new(Disease::sir());
        MixerRegistry::new()
            .resolve("null")
            .unwrap()
            .apply(&mut networks, &params);
        assert_eq!(networks.overall.links.suscept[1], 5.0);
    }
}
