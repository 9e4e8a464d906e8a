use chrono::{DateTime, Local};

pub fn now() -> DateTime<Local> {
    Local::now()
}

/// `2024-05-01 13:37:00` style stamp for the scan report
pub fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
