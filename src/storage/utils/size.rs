/// Format a byte count using a 1024 base and units B, KiB, MiB, GiB.
///
/// A scaled value of 1023.95 or more is promoted to the next unit so that
/// rounding never prints "1024.0".
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];
    const THRESHOLD: f64 = 1024.0;
    const PROMOTE_AT: f64 = THRESHOLD - 0.05;

    let last = UNITS.len() - 1;
    let mut scaled = size as f64;
    let mut unit_index = 0;
    while scaled >= THRESHOLD && unit_index < last {
        scaled /= THRESHOLD;
        unit_index += 1;
    }
    if scaled >= PROMOTE_AT && unit_index < last {
        scaled /= THRESHOLD;
        unit_index += 1;
    }
    format!("{scaled:.1} {}", UNITS[unit_index])
}
