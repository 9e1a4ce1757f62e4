//! Core traits for the DNS mirror
//!
//! This module defines the abstract interfaces at the crate's two seams.
//!
//! - [`RemoteDnsClient`]: Calls to the authoritative DNS service
//! - [`ZoneLister`], [`RecordGetter`], [`RecordSetter`], [`RecordAppender`],
//!   [`RecordDeleter`]: Operations exposed to the host

pub mod capabilities;
pub mod remote_client;

pub use capabilities::{RecordAppender, RecordDeleter, RecordGetter, RecordSetter, ZoneLister};
pub use remote_client::{RemoteDnsClient, RemoteDnsClientFactory};
