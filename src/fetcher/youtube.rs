use anyhow::{anyhow, Context};
use async_trait::async_trait;
use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

use super::tracks::{CaptionTracklist, FormattedText, TrackList, TranscriptTrack};
use super::{CaptionEntry, FetchError, FetchRequest, TranscriptSource};
use crate::transport::TransportConfig;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

const CONSENT_FORM_MARKER: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const PO_TOKEN_MARKER: &str = "&exp=xpe";

const BOT_CHECK_REASON: &str = "Sign in to confirm you’re not a bot";
const AGE_RESTRICTED_REASON: &str = "This video may be inappropriate for some users.";
const UNAVAILABLE_REASON: &str = "This video is unavailable";

/// Transcript source backed by YouTube's watch page and innertube player API
pub struct YoutubeTranscriptApi {
    client: Client,
    cookies: Arc<Jar>,
}

impl YoutubeTranscriptApi {
    /// Create a client; `None` keeps reqwest's default timeout and proxy behaviour
    pub fn new(transport: Option<&TransportConfig>) -> Result<Self, reqwest::Error> {
        let cookies = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&cookies));

        if let Some(transport) = transport {
            builder = transport.apply(builder)?;
        }

        Ok(Self {
            client: builder.build()?,
            cookies,
        })
    }

    /// List the caption tracks available for a video
    pub async fn list_tracks(&self, video_id: &str) -> Result<TrackList, FetchError> {
        let html = self.fetch_video_html(video_id).await?;

        let api_key = match extract_api_key(&html) {
            Some(key) => key,
            None if html.contains(RECAPTCHA_MARKER) => {
                return Err(FetchError::RequestBlocked {
                    video_id: video_id.to_string(),
                })
            }
            None => {
                return Err(anyhow!("Could not find the innertube API key on the watch page of {}", video_id).into())
            }
        };

        let player = self.fetch_player_response(video_id, &api_key).await?;
        let tracklist = captions_from_player(video_id, player)?;

        Ok(TrackList::from_tracklist(video_id, tracklist))
    }

    async fn fetch_video_html(&self, video_id: &str) -> Result<String, FetchError> {
        let html = self.fetch_html(video_id).await?;
        if !html.contains(CONSENT_FORM_MARKER) {
            return Ok(html);
        }

        tracing::debug!("Accepting YouTube cookie consent");
        self.accept_consent(&html)?;

        let html = self.fetch_html(video_id).await?;
        if html.contains(CONSENT_FORM_MARKER) {
            return Err(anyhow!("YouTube kept asking for cookie consent for video {}", video_id).into());
        }

        Ok(html)
    }

    async fn fetch_html(&self, video_id: &str) -> Result<String, FetchError> {
        tracing::debug!("Loading watch page for {}", video_id);

        let response = self
            .client
            .get(WATCH_URL)
            .query(&[("v", video_id)])
            .send()
            .await?;

        Ok(check_status(response, video_id)?.text().await?)
    }

    fn accept_consent(&self, html: &str) -> Result<(), FetchError> {
        let token = consent_token(html)
            .ok_or_else(|| anyhow!("Could not find the consent token on the YouTube consent page"))?;

        let youtube = Url::parse("https://www.youtube.com").context("Invalid YouTube base URL")?;
        self.cookies
            .add_cookie_str(&format!("CONSENT=YES+{}; Domain=.youtube.com", token), &youtube);

        Ok(())
    }

    async fn fetch_player_response(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse, FetchError> {
        tracing::debug!("Requesting innertube player data for {}", video_id);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        Ok(check_status(response, video_id)?.json::<PlayerResponse>().await?)
    }

    async fn fetch_track(&self, video_id: &str, track: &TranscriptTrack) -> Result<Vec<CaptionEntry>, FetchError> {
        if track.url.contains(PO_TOKEN_MARKER) {
            return Err(anyhow!(
                "YouTube requires a PO token for the {} track of video {}",
                track,
                video_id
            )
            .into());
        }

        let url = json3_url(&track.url)?;
        tracing::debug!("Downloading caption track {}", track);

        let response = self.client.get(url).send().await?;
        let body = check_status(response, video_id)?.text().await?;

        parse_json3(video_id, &body)
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptApi {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<CaptionEntry>, FetchError> {
        let tracks = self.list_tracks(&request.video_id).await?;
        tracing::debug!(
            "Video {} offers {} manual and {} generated caption tracks",
            request.video_id,
            tracks.manual.len(),
            tracks.generated.len()
        );

        let track = tracks.find(request.languages.as_deref())?;
        tracing::info!("Using {} transcript for {}", track, request.video_id);

        self.fetch_track(&request.video_id, track).await
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

/// YouTube answers rate-limited clients with 429
fn check_status(response: Response, video_id: &str) -> Result<Response, FetchError> {
    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RequestBlocked {
            video_id: video_id.to_string(),
        });
    }

    Ok(response.error_for_status()?)
}

fn api_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("API key pattern is valid")
    })
}

fn consent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"name="v" value="(.*?)""#).expect("consent pattern is valid"))
}

pub(crate) fn extract_api_key(html: &str) -> Option<String> {
    api_key_pattern()
        .captures(html)
        .map(|captures| captures[1].to_string())
}

pub(crate) fn consent_token(html: &str) -> Option<String> {
    consent_pattern()
        .captures(html)
        .map(|captures| captures[1].to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    #[serde(default)]
    player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    error_screen: Option<ErrorScreen>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorScreen {
    #[serde(default)]
    player_error_message_renderer: Option<PlayerErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct PlayerErrorMessage {
    #[serde(default)]
    subreason: Option<FormattedText>,
}

impl PlayabilityStatus {
    fn subreason(&self) -> Option<String> {
        self.error_screen
            .as_ref()?
            .player_error_message_renderer
            .as_ref()?
            .subreason
            .as_ref()?
            .joined()
    }
}

/// Check playability and pull the caption tracklist out of a player response
pub(crate) fn captions_from_player(video_id: &str, player: PlayerResponse) -> Result<CaptionTracklist, FetchError> {
    if let Some(playability) = &player.playability_status {
        assert_playable(video_id, playability)?;
    }

    match player
        .captions
        .and_then(|captions| captions.player_captions_tracklist_renderer)
    {
        Some(tracklist) if !tracklist.caption_tracks.is_empty() => Ok(tracklist),
        _ => Err(FetchError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        }),
    }
}

fn assert_playable(video_id: &str, playability: &PlayabilityStatus) -> Result<(), FetchError> {
    let status = match playability.status.as_deref() {
        None | Some("OK") => return Ok(()),
        Some(status) => status,
    };
    let reason = playability.reason.as_deref().unwrap_or_default();

    match (status, reason) {
        ("LOGIN_REQUIRED", BOT_CHECK_REASON) => Err(FetchError::RequestBlocked {
            video_id: video_id.to_string(),
        }),
        ("LOGIN_REQUIRED", AGE_RESTRICTED_REASON) => Err(anyhow!(
            "Video {} is age restricted and cannot be accessed without signing in",
            video_id
        )
        .into()),
        ("ERROR", UNAVAILABLE_REASON) if video_id.starts_with("http://") || video_id.starts_with("https://") => {
            Err(anyhow!("'{}' looks like a URL; pass the video ID instead", video_id).into())
        }
        ("ERROR", UNAVAILABLE_REASON) => Err(FetchError::VideoUnavailable {
            video_id: video_id.to_string(),
        }),
        _ => {
            let mut message = format!("Video {} is unplayable ({})", video_id, status);
            if !reason.is_empty() {
                message.push_str(&format!(": {}", reason));
            }
            if let Some(subreason) = playability.subreason() {
                message.push_str(&format!(" - {}", subreason));
            }
            Err(anyhow!(message).into())
        }
    }
}

/// Point a caption track URL at the json3 rendition
pub(crate) fn json3_url(track_url: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(track_url)
        .with_context(|| format!("Invalid caption track URL: {}", track_url))?;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Ok(url)
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimedTextEvent {
    #[serde(default)]
    t_start_ms: f64,
    #[serde(default)]
    d_duration_ms: f64,
    #[serde(default)]
    segs: Vec<TimedTextSegment>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

/// Turn a json3 caption document into caption entries, dropping whitespace-only events
pub(crate) fn parse_json3(video_id: &str, body: &str) -> Result<Vec<CaptionEntry>, FetchError> {
    if body.trim().is_empty() {
        return Err(anyhow!("YouTube returned an empty caption document for video {}", video_id).into());
    }

    let document: TimedText = serde_json::from_str(body)
        .with_context(|| format!("Failed to parse caption document for video {}", video_id))?;

    let entries = document
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            if text.trim().is_empty() {
                return None;
            }

            Some(CaptionEntry {
                start: event.t_start_ms / 1000.0,
                duration: event.d_duration_ms / 1000.0,
                text,
            })
        })
        .collect();

    Ok(entries)
}
