pub mod case;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod intake;
pub mod logging;
pub mod review;
