pub mod config_io;
pub mod ledger_io;
pub mod lock;
pub mod state;
