pub mod delete;
pub mod server;
