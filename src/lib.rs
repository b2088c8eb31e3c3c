pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod retailers;
pub mod services;
pub mod storage;
