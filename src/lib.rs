pub mod config;
pub mod connectivity;
pub mod errors;
pub mod generation;
pub mod grid;
pub mod paint;
pub mod placement;
pub mod rules;

// Selective re-exports for external consumers

// Errors - every fallible call returns these
pub use errors::{BoardError, BoardResult};

// Board storage and reachability queries
pub use connectivity::{Reachability, Topology};
pub use grid::{BaseTerrain, BoardGrid, CellCoord, Rgba8, TerrainCategory};

// Generation entry points
pub use generation::{BoardGenerator, BoardHost, GenerationOutcome, GenerationSettings, StartCell};
pub use rules::presets::get_rule_preset;
pub use rules::{OverwritePolicy, Placement, TerrainRule};
