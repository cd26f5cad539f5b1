use crate::Result;
use url::Url;

/// Reduce a YouTube URL to its video ID; anything that is not a recognised URL is returned as-is.
pub fn extract_video_id(input: &str) -> String {
    let trimmed = input.trim();

    let Ok(parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    let host = match parsed.host_str() {
        Some(host) => host.trim_start_matches("www.").trim_start_matches("m.").to_lowercase(),
        None => return trimmed.to_string(),
    };

    let candidate = match host.as_str() {
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            let from_query = parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned());

            from_query.or_else(|| {
                let segments: Vec<&str> = parsed.path_segments()?.collect();
                match segments.as_slice() {
                    ["embed" | "shorts" | "live" | "v", id, ..] => Some(id.to_string()),
                    _ => None,
                }
            })
        }
        _ => None,
    };

    match candidate {
        Some(id) if !id.is_empty() => id,
        _ => trimmed.to_string(),
    }
}

/// Validate a proxy URI; reqwest understands http, https and socks5 proxies
pub fn validate_proxy_uri(uri: &str) -> Result<Url> {
    let parsed = Url::parse(uri)
        .map_err(|_| anyhow::anyhow!("Invalid proxy URI: {}", uri))?;

    if !matches!(parsed.scheme(), "http" | "https" | "socks5" | "socks5h") {
        anyhow::bail!("Proxy URI must use http, https or socks5, got '{}'", parsed.scheme());
    }

    if parsed.host_str().is_none() {
        anyhow::bail!("Proxy URI has no host: {}", uri);
    }

    Ok(parsed)
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !rendered.contains(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }

    rendered
}
