// Response post-processing
pub mod fees;

pub use fees::{estimate_fees, ESTIMATED_FEES};
