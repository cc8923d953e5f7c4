pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;

/// Trading periods per year used for every annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
