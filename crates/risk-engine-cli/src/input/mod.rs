pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Typed input from `--input <file>` when given, otherwise from piped stdin.
/// `None` means neither was supplied and the caller builds the input from flags.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(file::read_json(p)?)),
        None => stdin::read_stdin(),
    }
}
