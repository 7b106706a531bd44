pub mod build;
pub mod denominators;
pub mod error;
pub mod infections;
pub mod links;
pub mod log;
pub mod movement;
pub mod network;
pub mod nodes;
pub mod params;
pub mod registry;
pub mod rescale;

pub use build::NetworkBuilder;
pub use error::MetapopError;
pub use infections::Infections;
pub use network::{Network, Networks};
pub use params::{Disease, Parameters, VariableSet};
pub use registry::{MixerRegistry, MixerStrategy, MoverRegistry, MoverStrategy};

/// Dense 1-based index of a ward. Index 0 is reserved, so a `WardId` of 0
/// means "no ward" wherever one is stored.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct WardId(pub usize);

/// Dense 1-based index of a link (work or play). Index 0 is reserved.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct LinkId(pub usize);
