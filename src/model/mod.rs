mod bundle;
mod candidate;
mod enriched;
mod record;

pub use bundle::{InputBundle, Mode};
pub use candidate::{Candidate, RawCandidate};
pub use enriched::{Difficulty, Dimension, EnrichedCandidate};
pub use record::OutputRecord;
