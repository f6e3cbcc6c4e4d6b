//! HTTP request handlers
//!
//! - `api` - Health check and service info
//! - `realtime` - Ephemeral tokens for browser Realtime sessions
//! - `company_brief` - Company research summary
//! - `scenario` - Practice scenario generation
//! - `face_nudge` - Camera-presence nudge phrasing and verification
//! - `sessions` - Session recording upload and transcripts

pub mod api;
pub mod company_brief;
pub mod face_nudge;
pub mod realtime;
pub mod scenario;
pub mod sessions;
