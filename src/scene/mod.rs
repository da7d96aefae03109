pub mod park;
pub mod terrain;

pub use park::{Park, ParkConfig, Prop, PropKind};
pub use terrain::Terrain;
