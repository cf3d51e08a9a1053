//! Structured logging facility
//!
//! One initialization point (`init(profile)`) plus three macros that every
//! pipeline stage uses to mark its boundaries:
//!
//! - `log_op_start!(op, ...)` - operation start
//! - `log_op_end!(op, duration_ms = ...)` - operation end
//! - `log_op_error!(op, err, duration_ms = ...)` - operation failure
//!
//! Prompt text, provider output and provider error payloads are never
//! passed to these macros. Log identifiers and hashes instead.
//!
//! ```rust
//! use infergov_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
