pub mod ledger;
pub mod report;
pub mod sales;

pub use ledger::*;
pub use report::*;
pub use sales::*;
