//! Full-chain coverage matrices

mod builder;
mod rollup;
mod types;

pub use builder::{MatrixQuery, MAX_TRAVERSAL_DEPTH};
pub use rollup::rollup_status;
pub use types::{
    ChainRow, FullChainMatrix, MatrixResult, MatrixSummary, RollupStatus, TestIndex, TestOutcome,
    TestRecord,
};
