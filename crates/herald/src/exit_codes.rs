//! Exit codes for the CLI

use herald_core::error::exit_code;
use herald_core::HeraldError;

/// Success
pub const SUCCESS: i32 = exit_code::SUCCESS;

/// General error
pub const ERROR: i32 = exit_code::ERROR;

/// Exit code for an error bubbled up to `main`
pub fn for_error(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<HeraldError>())
        .map(HeraldError::exit_code)
        .unwrap_or(ERROR)
}
