pub mod adjustment;
pub mod machine;
pub mod vector;

pub use adjustment::RatingAdjustment;
pub use machine::{LinearModel, MachineResult, MachineSentiment, ModelError, NullMachineSentiment};
pub use vector::{extract_cells, TextVectorCell, VectorCell, VectorData, RATING_STARS};
