pub mod config;
pub mod exercise;
pub mod log;
pub mod session;

/// `m:ss` for a second count.
pub fn clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(clock(0), "0:00");
        assert_eq!(clock(59), "0:59");
        assert_eq!(clock(240), "4:00");
        assert_eq!(clock(3725), "62:05");
    }
}
