//! API gateway client for the CPSS backend.
//!
//! One configured base address, a bearer credential attached to every
//! request, and a single cross-cutting 401 policy: any unauthorized
//! response tears the session down (memory and durable storage) before the
//! error reaches the caller. Every other failure is returned for
//! caller-local handling.

pub mod client;
pub mod error;
pub mod types;

pub use {
    client::ApiClient,
    error::ApiError,
    types::{
        BotConfigRequest, BotConfigResponse, BotHealth, BotStatus, Platform, Preset,
        PresetRequest, Publication, PublicationStatus, PublishRequest, ToggleResult,
        UploadedMedia,
    },
};
