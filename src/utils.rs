use std::path::{Path, PathBuf};

/// Name of the aggregate file written next to the snapshots
pub const AGGREGATE_FILE_NAME: &str = "all_scraped_data.json";

/// File name for the snapshot of the `sequence`-th extracted page (1-based)
pub fn snapshot_file_name(sequence: usize) -> String {
    format!("screenshot_{}.png", sequence)
}

/// Full snapshot path inside the working directory
pub fn snapshot_path(dir: &Path, sequence: usize) -> PathBuf {
    dir.join(snapshot_file_name(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_naming_is_keyed_by_sequence() {
        assert_eq!(snapshot_file_name(1), "screenshot_1.png");
        assert_eq!(
            snapshot_path(Path::new("out"), 12),
            PathBuf::from("out/screenshot_12.png")
        );
    }
}
