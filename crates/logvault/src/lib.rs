pub mod ai;
pub mod server;
