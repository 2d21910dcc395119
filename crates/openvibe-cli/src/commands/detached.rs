use anyhow::{Context, Result, anyhow};
use openvibe_core::detached::DetachedTabPayload;
use openvibe_core::tab::TabKindTag;
use url::Url;

pub fn decode(raw_url: &str) -> Result<String> {
    let url = Url::parse(raw_url).with_context(|| format!("Invalid URL: {}", raw_url))?;
    match DetachedTabPayload::from_url(&url) {
        Some(payload) => Ok(serde_json::to_string_pretty(&payload)?),
        None => Ok("No detached tab payload.".to_string()),
    }
}

pub fn encode(
    raw_url: &str,
    id: String,
    kind: &str,
    workspace_id: String,
    title: String,
    thread_id: Option<String>,
) -> Result<String> {
    let url = Url::parse(raw_url).with_context(|| format!("Invalid URL: {}", raw_url))?;
    let kind: TabKindTag = kind.parse().map_err(|e: String| anyhow!(e))?;
    let payload = DetachedTabPayload {
        id,
        kind,
        workspace_id,
        title,
        thread_id: thread_id.filter(|_| kind == TabKindTag::Thread),
    };

    // Refuse to emit a URL the detached window would not be able to decode.
    let decodable = DetachedTabPayload::from_json(&payload.to_json()?);
    if decodable.as_ref() != Some(&payload) {
        return Err(anyhow!(
            "Incomplete payload: id, workspace id and title are required, and thread tabs need --thread-id"
        ));
    }

    Ok(payload.to_url(&url)?.to_string())
}
