// ============================================================================
// Transaction Domain
// ============================================================================
//
// - Value objects (TransactionType, canonical date format)
// - Record (TransactionRecord)
// - Table (TransactionTable, the ordered in-memory view of the store)
// - Errors (NormalizeError)
//
// ============================================================================

pub mod value_objects;
pub mod record;
pub mod table;
pub mod errors;

pub use value_objects::*;
pub use record::*;
pub use table::*;
pub use errors::*;
