use anyhow::Result;

use crate::fetcher::CaptionEntry;

/// Format entries as `[start] text` lines, start time with two decimals
pub fn format_as_text(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("[{:.2}] {}", entry.start, entry.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format entries as a pretty-printed JSON array
pub fn format_as_json(entries: &[CaptionEntry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Format entries as SRT subtitles
pub fn format_as_srt(entries: &[CaptionEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                srt_timestamp(entry.start),
                srt_timestamp(entry.start + entry.duration),
                entry.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `HH:MM:SS,mmm`
fn srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry_line() {
        let entries = vec![CaptionEntry::new(0.0, 1.0, "hello")];
        assert_eq!(format_as_text(&entries), "[0.00] hello");
    }

    #[test]
    fn test_text_preserves_order_without_trailing_newline() {
        let entries = vec![
            CaptionEntry::new(12.346, 2.0, "second"),
            CaptionEntry::new(1.5, 2.0, "first"),
            CaptionEntry::new(3725.0, 1.0, "third"),
        ];
        assert_eq!(
            format_as_text(&entries),
            "[12.35] second\n[1.50] first\n[3725.00] third"
        );
    }

    #[test]
    fn test_text_empty_transcript() {
        assert_eq!(format_as_text(&[]), "");
    }

    #[test]
    fn test_json_output() {
        let entries = vec![CaptionEntry::new(0.0, 1.0, "Hello world")];
        let json = format_as_json(&entries).unwrap();
        let parsed: Vec<CaptionEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entries);
        assert!(json.contains("\"text\": \"Hello world\""));
    }

    #[test]
    fn test_srt_output() {
        let entries = vec![
            CaptionEntry::new(0.0, 1.5, "Hello"),
            CaptionEntry::new(3661.25, 2.0, "world"),
        ];
        assert_eq!(
            format_as_srt(&entries),
            "1\n00:00:00,000 --> 00:00:01,500\nHello\n\n2\n01:01:01,250 --> 01:01:03,250\nworld\n"
        );
    }
}
