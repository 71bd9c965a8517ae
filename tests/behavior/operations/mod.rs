pub mod cli;
pub mod factory;
pub mod list;
pub mod mkdir;
pub mod push;
