use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

pub const CSV_HEADER: &str = "image,method,thresholds,elapsed_ms";

/// Append one result row to the CSV log at `file_path`, writing the header
/// first if the file is new or empty.
pub fn writeln(
    file_path: &Path,
    image_name: &str,
    method: &str,
    thresholds: &[f64],
    duration: Duration,
) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(file_path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "{CSV_HEADER}")?;
    }
    writeln!(
        file,
        "{image_name},{method},[{}],{}",
        thresholds
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(";"),
        duration.as_secs_f64() * 1000.0,
    )
}
