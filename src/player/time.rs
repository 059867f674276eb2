/// Render seconds as `m:ss`. Anything that is not a finite, non-negative
/// number renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::format_time;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(0.9), "0:00");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(65.4), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn invalid_values_render_zero() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }
}
