pub mod config;
pub mod dirs;
pub mod logs;
pub mod rsa;
pub mod server;
pub mod time;
pub mod types;
