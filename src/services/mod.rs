pub mod market_data;
pub mod anchor;
pub mod precedence;
pub mod analyzer;
pub mod bundle_store;

pub use market_data::*;
pub use anchor::*;
pub use precedence::*;
pub use analyzer::*;
pub use bundle_store::*;
