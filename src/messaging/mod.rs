// ============================================================================
// Messaging - Topic publishing and consumption
// ============================================================================
//
// - wire:      JSON message layout on the topic
// - redpanda:  rdkafka producer behind the `Publisher` trait
// - publisher: paced, fail-fast batch publishing
// - sink:      topic consumer appending imported records to the store
//
// ============================================================================

mod errors;
mod publisher;
mod redpanda;
mod sink;
mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::PublishError;
pub use publisher::EventPublisher;
pub use redpanda::{Origin, Publisher, RedpandaClient, ORIGIN_HEADER};
pub use sink::{SinkHandler, SinkOutcome, TopicSink};
pub use wire::{decode_record, encode_record, TransactionMessage};
