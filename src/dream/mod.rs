//! Dream analysis, history, visualization and temporal distortion.

pub mod memory;
pub mod parser;
pub mod temporal;
pub mod visualizer;

pub use memory::{DreamMemory, DreamStore, EmotionalInfluence, FileStore, MemoryStore, StoredDream};
pub use parser::{DreamColor, Emotion, Movement, ObjectCategory, ParsedDream};
pub use temporal::TemporalEffects;
pub use visualizer::{DreamVisualizer, VisualizationSummary};

/// Handle shared by the visualizer and temporal effects for one dream object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);
