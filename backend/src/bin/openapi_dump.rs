#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
//! Print the OpenAPI document as JSON.

use std::process::ExitCode;

use user_directory::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> ExitCode {
    match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("failed to serialise OpenAPI document: {error}");
            ExitCode::FAILURE
        }
    }
}
