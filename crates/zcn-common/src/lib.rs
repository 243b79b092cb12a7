pub mod crypto;
pub mod errors;
pub mod network;
pub mod transaction;
pub mod types;

pub use crypto::*;
pub use errors::*;
pub use network::*;
pub use transaction::*;
pub use types::*;
