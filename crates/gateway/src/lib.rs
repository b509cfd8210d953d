//! Ephemeral share lifecycle orchestration.
//!
//! [`ShareGateway`] coordinates the metadata/counter store and the blob
//! store so that a share is only ever served while its TTL has not elapsed
//! and its remaining-download counter is positive, that concurrent
//! downloaders racing on the last permitted download are serialized by a
//! single atomic decrement, and that partial failures across the two stores
//! never leave readable metadata pointing at missing bytes.
//!
//! Uploads run as an ordered write sequence (blob, record, counter) where
//! each step's failure compensates the prior steps in reverse order.
//! Downloads run a per-request state machine: validate the reference id,
//! load the record, gate on the counter, stream the blob, and clean both
//! stores up after the last permitted download.

pub mod builder;
pub mod download;
pub mod error;
pub mod gateway;
pub mod policy;
pub mod upload;

pub use builder::ShareGatewayBuilder;
pub use download::Download;
pub use error::ShareError;
pub use gateway::ShareGateway;
pub use policy::SharePolicy;
pub use upload::{UploadReceipt, UploadRequest};
