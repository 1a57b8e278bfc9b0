//! Version information display.

use crate::cli::args::{OutputFormat, VersionArgs};
use crate::error::BreathpaceError;

/// Print version information.
///
/// # Errors
///
/// Returns `BreathpaceError::Json` if JSON serialization fails.
pub fn run(args: &VersionArgs) -> Result<(), BreathpaceError> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    match args.format {
        OutputFormat::Human => {
            println!("{name} {version}");
        }
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": name,
                "version": version,
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", serde_json::to_string(&info)?);
        }
    }
    Ok(())
}
