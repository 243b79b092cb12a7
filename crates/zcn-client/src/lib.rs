pub mod auth;
pub mod broadcast;
pub mod cancel;
pub mod client;
pub mod config;
pub mod confirmation;
pub mod network;
pub mod node_set;
pub mod smart_contract;
