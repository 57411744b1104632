pub mod config;
pub mod expense;
pub mod goal;
pub mod ledger;
pub mod task;
pub mod workspace;

pub use config::*;
pub use expense::*;
pub use goal::*;
pub use ledger::*;
pub use task::*;
pub use workspace::*;
