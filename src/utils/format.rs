//! Duration text rendering shared by the API responses

/// Render whole seconds as a zero-padded "HH:MM:SS" string
pub fn duration_text(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_each_component() {
        assert_eq!(duration_text(0), "00:00:00");
        assert_eq!(duration_text(3), "00:00:03");
        assert_eq!(duration_text(61), "00:01:01");
        assert_eq!(duration_text(3661), "01:01:01");
    }

    #[test]
    fn hours_exceed_two_digits() {
        assert_eq!(duration_text(100 * 3600), "100:00:00");
    }
}
