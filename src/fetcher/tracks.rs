use serde::Deserialize;
use std::fmt;

use super::FetchError;

/// Language used when the caller does not ask for any
pub const DEFAULT_LANGUAGES: &[&str] = &["en"];

/// `captions.playerCaptionsTracklistRenderer` from the innertube player response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTracklist {
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub name: Option<FormattedText>,
    /// `"asr"` for automatically generated captions
    #[serde(default)]
    pub kind: Option<String>,
}

/// Innertube text object: either `simpleText` or a list of `runs`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedText {
    #[serde(default)]
    pub simple_text: Option<String>,
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextRun {
    pub text: String,
}

impl FormattedText {
    pub fn joined(&self) -> Option<String> {
        if self.runs.is_empty() {
            return self.simple_text.clone();
        }

        Some(self.runs.iter().map(|run| run.text.as_str()).collect())
    }
}

/// A single caption track a video offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptTrack {
    pub language_code: String,
    pub language: String,
    pub is_generated: bool,
    pub url: String,
}

impl fmt::Display for TranscriptTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.language_code, self.language)?;
        if self.is_generated {
            write!(f, ", auto-generated")?;
        }
        write!(f, ")")
    }
}

/// Caption tracks of one video, split into manually created and generated ones
#[derive(Debug, Clone)]
pub struct TrackList {
    pub video_id: String,
    pub manual: Vec<TranscriptTrack>,
    pub generated: Vec<TranscriptTrack>,
}

impl TrackList {
    pub fn from_tracklist(video_id: &str, tracklist: CaptionTracklist) -> Self {
        let mut manual = Vec::new();
        let mut generated = Vec::new();

        for track in tracklist.caption_tracks {
            let is_generated = track.kind.as_deref() == Some("asr");
            let language = track
                .name
                .as_ref()
                .and_then(FormattedText::joined)
                .unwrap_or_else(|| track.language_code.clone());

            let entry = TranscriptTrack {
                language_code: track.language_code,
                language,
                is_generated,
                url: track.base_url,
            };

            if is_generated {
                generated.push(entry);
            } else {
                manual.push(entry);
            }
        }

        Self {
            video_id: video_id.to_string(),
            manual,
            generated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.generated.is_empty()
    }

    /// All tracks, manually created first
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptTrack> {
        self.manual.iter().chain(self.generated.iter())
    }

    /// Pick a track by language priority.
    ///
    /// For each code in order a manually created track beats a generated one; the
    /// first code with any match wins. `None` falls back to [`DEFAULT_LANGUAGES`].
    pub fn find(&self, languages: Option<&[String]>) -> Result<&TranscriptTrack, FetchError> {
        let codes: Vec<&str> = match languages {
            Some(codes) if !codes.is_empty() => codes.iter().map(String::as_str).collect(),
            _ => DEFAULT_LANGUAGES.to_vec(),
        };

        for code in &codes {
            let hit = self
                .manual
                .iter()
                .find(|track| track.language_code == *code)
                .or_else(|| self.generated.iter().find(|track| track.language_code == *code));

            if let Some(track) = hit {
                tracing::debug!("Selected caption track {}", track);
                return Ok(track);
            }
        }

        Err(FetchError::NoTranscriptFound {
            video_id: self.video_id.clone(),
            requested: languages.map(<[String]>::to_vec).unwrap_or_default(),
            available: self.iter().map(ToString::to_string).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracklist() -> CaptionTracklist {
        serde_json::from_value(serde_json::json!({
            "captionTracks": [
                {
                    "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=de&fmt=srv3",
                    "name": { "runs": [{ "text": "German" }] },
                    "languageCode": "de",
                    "isTranslatable": true
                },
                {
                    "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr",
                    "name": { "simpleText": "English (auto-generated)" },
                    "languageCode": "en",
                    "kind": "asr",
                    "isTranslatable": true
                },
                {
                    "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=en",
                    "name": { "runs": [{ "text": "English" }] },
                    "languageCode": "en"
                }
            ]
        }))
        .unwrap()
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|code| code.to_string()).collect()
    }

    #[test]
    fn test_tracks_are_split_by_kind() {
        let list = TrackList::from_tracklist("abc", tracklist());
        assert_eq!(list.manual.len(), 2);
        assert_eq!(list.generated.len(), 1);
        assert!(list.generated[0].is_generated);
        assert_eq!(list.manual[0].url, "https://www.youtube.com/api/timedtext?v=abc&lang=de&fmt=srv3");
    }

    #[test]
    fn test_default_language_prefers_manual_track() {
        let list = TrackList::from_tracklist("abc", tracklist());
        let track = list.find(None).unwrap();
        assert_eq!(track.language_code, "en");
        assert!(!track.is_generated);
    }

    #[test]
    fn test_priority_order_is_respected() {
        let list = TrackList::from_tracklist("abc", tracklist());
        let requested = langs(&["fr", "de", "en"]);
        let track = list.find(Some(requested.as_slice())).unwrap();
        assert_eq!(track.language_code, "de");
    }

    #[test]
    fn test_generated_track_used_when_no_manual_one() {
        let mut raw = tracklist();
        raw.caption_tracks.retain(|track| track.kind.is_some() || track.language_code != "en");
        let list = TrackList::from_tracklist("abc", raw);
        let track = list.find(None).unwrap();
        assert!(track.is_generated);
    }

    #[test]
    fn test_missing_language_reports_requested_and_available() {
        let list = TrackList::from_tracklist("abc", tracklist());
        let requested = langs(&["es", "fr"]);
        match list.find(Some(requested.as_slice())) {
            Err(FetchError::NoTranscriptFound { video_id, requested, available }) => {
                assert_eq!(video_id, "abc");
                assert_eq!(requested, vec!["es", "fr"]);
                assert_eq!(
                    available,
                    vec!["de (German)", "en (English)", "en (English (auto-generated), auto-generated)"]
                );
            }
            other => panic!("expected NoTranscriptFound, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path_reports_no_requested_languages() {
        let empty = CaptionTracklist { caption_tracks: Vec::new() };
        let list = TrackList::from_tracklist("abc", empty);
        assert!(list.is_empty());
        match list.find(None) {
            Err(FetchError::NoTranscriptFound { requested, .. }) => assert!(requested.is_empty()),
            other => panic!("expected NoTranscriptFound, got {:?}", other),
        }
    }
}
