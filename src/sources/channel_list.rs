//! Decoding of the provider's channel-list response
//!
//! The console answers a list query with a JSON envelope whose `Fs[1][1][1][1]`
//! slot holds an HTML fragment. Each channel is an `<li>` carrying a checkbox
//! (`id` = channel id, `checked` = enabled) and a label with the title.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::Channel;

const ENVELOPE_KEY: &str = "Fs";
const FRAGMENT_PATH: [usize; 4] = [1, 1, 1, 1];

const ITEM_SELECTOR: &str = "li";
const CHECKBOX_SELECTOR: &str = r#"input[type="checkbox"]"#;
// Older console builds render the title in a span instead of a label
const TITLE_SELECTOR: &str = "label, span";

/// Full decode: JSON envelope, then HTML fragment
pub fn decode_channel_list(body: &str) -> AppResult<Vec<Channel>> {
    let fragment = extract_fragment(body)?;
    parse_channel_list(&fragment)
}

/// Walk `Fs[1][1][1][1]`, validating every level
pub fn extract_fragment(body: &str) -> AppResult<String> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| AppError::malformed_upstream(format!("channel list is not JSON: {e}")))?;

    let mut node = root.get(ENVELOPE_KEY).ok_or_else(|| {
        AppError::malformed_upstream(format!("channel list has no '{ENVELOPE_KEY}' envelope"))
    })?;
    let mut path = ENVELOPE_KEY.to_string();

    for index in FRAGMENT_PATH {
        let items = node
            .as_array()
            .ok_or_else(|| AppError::malformed_upstream(format!("{path} is not an array")))?;
        node = items.get(index).ok_or_else(|| {
            AppError::malformed_upstream(format!(
                "{path} has {} elements, expected index {index}",
                items.len()
            ))
        })?;
        path.push_str(&format!("[{index}]"));
    }

    node.as_str()
        .map(str::to_owned)
        .ok_or_else(|| AppError::malformed_upstream(format!("{path} is not an HTML string")))
}

/// Parse the `<li>` channel entries out of the HTML fragment
///
/// List items without a checkbox are headings or separators and are skipped.
/// A checkbox item lacking an id or a title means the page shape changed.
pub fn parse_channel_list(fragment: &str) -> AppResult<Vec<Channel>> {
    let document = Html::parse_fragment(fragment);
    let items = selector(ITEM_SELECTOR)?;
    let checkbox = selector(CHECKBOX_SELECTOR)?;
    let title = selector(TITLE_SELECTOR)?;

    let mut channels = Vec::new();
    for (position, item) in document.select(&items).enumerate() {
        let Some(input) = item.select(&checkbox).next() else {
            continue;
        };

        let id = input
            .value()
            .attr("id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::malformed_upstream(format!("list item {position} has a checkbox without an id"))
            })?;

        let label = item.select(&title).next().ok_or_else(|| {
            AppError::malformed_upstream(format!("list item {position} ({id}) has no label"))
        })?;

        channels.push(Channel::new(
            element_text(label),
            id,
            input.value().attr("checked").is_some(),
        ));
    }

    debug!("Parsed {} channels from provider channel list", channels.len());
    Ok(channels)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css).map_err(|e| AppError::internal(format!("invalid selector '{css}': {e:?}")))
}
