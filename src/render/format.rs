//! Text formatting helpers shared by the views and the HTML adapter.

use chrono::{DateTime, Local};
use serde_json::Value;

/// Escape text for interpolation into HTML content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wall-clock time of day in the server's local zone, e.g. `14:03:27`.
pub fn format_time_short(epoch_seconds: i64) -> String {
    match DateTime::from_timestamp(epoch_seconds, 0) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

/// Coarse relative time: days, then hours, then minutes, then seconds.
pub fn format_ago(seconds_ago: i64) -> String {
    let secs = seconds_ago.unsigned_abs();
    let (count, unit) = if secs >= 86_400 {
        (secs / 86_400, "day")
    } else if secs >= 3_600 {
        (secs / 3_600, "hr")
    } else if secs >= 60 {
        (secs / 60, "min")
    } else {
        (secs, "sec")
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

/// One decimal place, or `-` when the metric is absent.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}", v),
        _ => "-".to_string(),
    }
}

/// Display form of an opaque diagnostic field. Absent and `null` are blank.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unescape_html(input: &str) -> String {
        input
            .replace("&#39;", "'")
            .replace("&quot;", "\"")
            .replace("&gt;", ">")
            .replace("&lt;", "<")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_escape_html_removes_markup() {
        let raw = r#"<script>alert("x & 'y'")</script>"#;
        let escaped = escape_html(raw);
        assert_eq!(
            escaped,
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(!escaped.contains('"'));
        assert!(!escaped.contains('\''));
    }

    #[test]
    fn test_escape_round_trip() {
        for raw in [
            "plain",
            "<b>bold</b>",
            "a && b",
            "&amp; already",
            "it's \"quoted\"",
            "<script>document.cookie</script>",
        ] {
            let escaped = escape_html(raw);
            // Every remaining ampersand starts an entity.
            for (i, _) in escaped.match_indices('&') {
                let rest = &escaped[i..];
                assert!(
                    ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"]
                        .iter()
                        .any(|e| rest.starts_with(e)),
                    "bare ampersand in {:?}",
                    escaped
                );
            }
            assert_eq!(unescape_html(&escaped), raw);
        }
    }

    #[test]
    fn test_format_ago_units() {
        assert_eq!(format_ago(0), "0 secs ago");
        assert_eq!(format_ago(1), "1 sec ago");
        assert_eq!(format_ago(59), "59 secs ago");
        assert_eq!(format_ago(65), "1 min ago");
        assert_eq!(format_ago(150), "2 mins ago");
        assert_eq!(format_ago(3_600), "1 hr ago");
        assert_eq!(format_ago(7_300), "2 hrs ago");
        assert_eq!(format_ago(86_400), "1 day ago");
        assert_eq!(format_ago(3 * 86_400 + 5), "3 days ago");
        // Clock skew puts last contact in the future.
        assert_eq!(format_ago(-65), "1 min ago");
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(-71.26)), "-71.3");
        assert_eq!(format_metric(Some(8.0)), "8.0");
        assert_eq!(format_metric(None), "-");
        assert_eq!(format_metric(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_time_short_shape() {
        let text = format_time_short(1_700_000_000);
        assert_eq!(text.len(), 8);
        assert_eq!(text.matches(':').count(), 2);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(None), "");
        assert_eq!(display_value(Some(&json!(null))), "");
        assert_eq!(display_value(Some(&json!(-87))), "-87");
        assert_eq!(display_value(Some(&json!("queued"))), "queued");
    }
}
