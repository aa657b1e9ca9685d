pub mod config;
pub mod logging;

pub mod abi;
pub mod checksum;
pub mod cmake;
pub mod exec;
pub mod fetch;
pub mod orchestrate;
pub mod recipe;
pub mod toolchain;
