mod batch;
mod feeder;

pub use batch::{ID_LIMIT, RatingRecord, RatingsBatch};
pub use feeder::BatchFeeder;
