//! Human-readable byte sizes for the dataset list.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count with two decimals, stepping by 1024.
///
/// ```
/// use sweep_model::format_byte_size;
///
/// assert_eq!(format_byte_size(512), "512.00 B");
/// assert_eq!(format_byte_size(1536), "1.50 KB");
/// ```
pub fn format_byte_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} TB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_through_units() {
        assert_eq!(format_byte_size(0), "0.00 B");
        assert_eq!(format_byte_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_byte_size(5 * 1024 * 1024 * 1024 * 1024), "5.00 TB");
    }
}
