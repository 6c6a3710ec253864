/*!
 * # coze2draft - Coze payload to JianYing draft generator
 *
 * A Rust library for turning a loosely-typed Coze workflow payload
 * (images, audio clips, captions with timings) into a complete JianYing
 * draft project.
 *
 * ## Features
 *
 * - Defensive decoding of doubly-encoded payload fields
 * - Per-item media download with a deterministic fallback chain, so every
 *   timeline position resolves to a usable local file
 * - Ordered video/audio track assembly with computed time ranges
 * - SRT subtitle generation with a single inherited style template
 * - Transactional staging: the editor's watched draft root only ever sees
 *   a complete draft tree
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `input_normalizer`: Payload decoding and time normalization
 * - `sanitize`: Filesystem-safe names and draft titles
 * - `fetch`: Media acquisition collaborator (HTTP)
 * - `media_resolver`: Fallback-chain media resolution
 * - `timeline`: Track/segment assembly and the timeline aggregate
 * - `subtitle`: Caption pairing and the SRT artifact
 * - `writer`: Serialization into the editor's document pair
 * - `publish`: Staging and atomic publication
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod fetch;
pub mod file_utils;
pub mod input_normalizer;
pub mod media_resolver;
pub mod publish;
pub mod sanitize;
pub mod subtitle;
pub mod timeline;
pub mod writer;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, DraftError, FetchError};
pub use input_normalizer::{DraftPayload, decode_maybe_nested, to_microseconds};
pub use media_resolver::{MediaResolver, ResolutionStatus};
pub use subtitle::{CaptionEntry, pair_captions};
pub use timeline::{TimelineBuilder, TimelineDocument, TrackKind};
