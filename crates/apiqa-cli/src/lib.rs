//! # apiqa-cli — Command-Line Interface
//!
//! Provides the `apiqa` binary for validating API payloads outside a test
//! run: JSON documents from files or stdin, and recorded responses.
//!
//! ## Subcommands
//!
//! - `apiqa validate` — validate documents against a named schema.
//! - `apiqa check` — run the standard assertion bundle on a recorded response.
//! - `apiqa schemas` — list registered schemas.
//! - `apiqa sample` — print a fixture document.
//!
//! ```bash
//! apiqa validate --schema user responses/user-1.json
//! curl -s https://jsonplaceholder.typicode.com/posts | apiqa validate --schema post --each
//! apiqa check --schema post --status 201 recorded/create-post.json
//! ```
//!
//! ## Exit Codes
//!
//! `0` when everything passed, `1` when a document or check failed, `2` on
//! usage, configuration and I/O errors.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed args and the
//!   resolved [`config::CliConfig`] and return an exit code.
//! - Handlers delegate to `apiqa-schema` and `apiqa-assert`; rendering is
//!   separated from printing so it can be tested.

pub mod check;
pub mod config;
pub mod sample;
pub mod schemas;
pub mod validate;

/// Exit code when everything passed.
pub const EXIT_PASS: u8 = 0;
/// Exit code when validation or a check failed.
pub const EXIT_FAIL: u8 = 1;
/// Exit code for usage, configuration and I/O errors.
pub const EXIT_ERROR: u8 = 2;

/// Exit code for a pass/fail outcome.
pub fn exit_code(passed: bool) -> u8 {
    if passed {
        EXIT_PASS
    } else {
        EXIT_FAIL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(true), 0);
        assert_eq!(exit_code(false), 1);
        assert_eq!(EXIT_ERROR, 2);
    }
}
