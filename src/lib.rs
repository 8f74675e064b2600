// ID Card Toolkit - Core Library
// Validation, parsing, reverse generation and sample analysis of
// Chinese resident identity numbers (GB 11643)

pub mod error;
pub mod region;     // Region Table - code → full name
pub mod codec;      // Checksum + structural validation
pub mod identity;   // Parser - semantic fields
pub mod generator;  // Reverse guess over sequence codes
pub mod analyzer;   // Batch validation + population estimates
pub mod batch;      // Batch file I/O
pub mod logging;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use error::{Result, ToolkitError};
pub use region::{RegionNode, RegionTable};
pub use codec::{
    checksum, Codec, FailureKind, IdentityNumber, Rejection, Validation,
    CHECKSUM_MAP, WEIGHTS,
};
pub use identity::{age_on, AddressInfo, ParseOutcome, ParsedIdentity, Sex};
pub use analyzer::{
    AnalysisReport, GroupEstimate, InvalidRecord, SampleSummary, ESTIMATE_NOTE,
};
pub use batch::{guess_filename, load_id_list, save_lines, save_report};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
