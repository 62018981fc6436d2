// ============================================================================
// Domain Layer - Transaction Model
// ============================================================================
//
// The transaction record is the only entity in the pipeline. Everything that
// crosses a boundary (CSV import, topic, SQL table, terminal form, dashboard)
// is mapped to and from the types in this module.
//
// ============================================================================

pub mod transaction;
