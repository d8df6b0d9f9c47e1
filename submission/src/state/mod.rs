pub mod pending;
pub mod slot;
pub mod transaction;

pub use pending::Pendings;
pub use slot::Slot;
pub use transaction::{TxAux, TxId, TxIn};
