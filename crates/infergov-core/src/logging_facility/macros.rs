//! Boundary logging macros
//!
//! Callers must depend on `tracing` and `infergov-core-types`.

/// Log the start of an operation
///
/// ```
/// # use infergov_core::log_op_start;
/// log_op_start!("submit");
/// log_op_start!("submit", request_id = "abc");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = infergov_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = infergov_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use infergov_core::log_op_end;
/// log_op_end!("submit", duration_ms = 42);
/// log_op_end!("submit", duration_ms = 42, status = "success");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = infergov_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = infergov_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation failure
///
/// `err` must convert into `GovError`; its kind and stable code are logged,
/// its message is not.
///
/// ```
/// # use infergov_core::log_op_error;
/// # use infergov_core::errors::{GovError, GovErrorKind};
/// let err = GovError::new(GovErrorKind::NotFound);
/// log_op_error!("replay", err, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let gov_err: $crate::errors::GovError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = infergov_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?gov_err.kind(),
            err_code = gov_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let gov_err: $crate::errors::GovError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = infergov_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?gov_err.kind(),
            err_code = gov_err.code(),
            $($field)*
        );
    }};
}
