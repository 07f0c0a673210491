pub mod api;
pub mod app_state;
pub mod audit;
pub mod config;
pub mod consts;
pub mod error;
pub mod fingerprint;
pub mod utils;

pub use audit::{run_audit, AuditResult, Band, CandidateFrame, ReferenceFrame};
pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, HashBits};
