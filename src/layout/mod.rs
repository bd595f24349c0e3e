pub mod masonry;
pub mod random;

pub use masonry::{JitterRange, MasonryLayout, PackError, RowBreak};
pub use random::{RandomSource, ScriptedSource, SeededRng};
