use std::collections::HashMap;
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

static EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube\.com/embed/([A-Za-z0-9_-]+)").unwrap());

/// Class markers that open body-text capture. Matched as substrings of a
/// div's class attribute.
pub const CONTENT_MARKERS: &[&str] = &["article-content", "video-container", "poster-container"];

/// Signals pulled from one document. Anything not found stays at its empty
/// default; scanning never fails.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Meta name/property -> content, last-wins for duplicate keys.
    pub meta_tags: HashMap<String, String>,
    pub title_text: String,
    pub author_text: String,
    pub date_text: String,
    pub body_text: String,
    pub video_id: String,
}

/// Where text data currently lands. One struct updated per tag event instead
/// of flags scattered through the loop.
#[derive(Debug, Default)]
struct ScanState {
    in_title: bool,
    title_done: bool,
    in_author: bool,
    in_date: bool,
    /// Nested <div> depth inside the content container; 0 = not capturing.
    content_depth: u32,
    content_done: bool,
    body_parts: Vec<String>,
}

impl ScanState {
    fn on_start(&mut self, tag: &str, attrs: &HashMap<String, String>) {
        match tag {
            "title" if !self.title_done => self.in_title = true,
            "span" => match attrs.get("class").map(String::as_str) {
                Some("post-author") => self.in_author = true,
                Some("post-date") => self.in_date = true,
                _ => {}
            },
            "div" => {
                let class = attrs.get("class").map(String::as_str).unwrap_or("");
                if self.content_depth > 0 {
                    self.content_depth += 1;
                } else if !self.content_done
                    && CONTENT_MARKERS.iter().any(|m| class.contains(m))
                {
                    self.content_depth = 1;
                }
            }
            _ => {}
        }
    }

    fn on_end(&mut self, tag: &str) {
        match tag {
            "title" if self.in_title => {
                self.in_title = false;
                self.title_done = true;
            }
            "span" => {
                if self.in_author {
                    self.in_author = false;
                } else if self.in_date {
                    self.in_date = false;
                }
            }
            "div" if self.content_depth > 0 => {
                self.content_depth -= 1;
                if self.content_depth == 0 {
                    self.content_done = true;
                }
            }
            _ => {}
        }
    }

    fn on_text(&mut self, data: &str, result: &mut ScanResult) {
        if self.in_title {
            result.title_text.push_str(data);
        } else if self.in_author {
            result.author_text.push_str(data);
        } else if self.in_date {
            result.date_text.push_str(data);
        } else if self.content_depth > 0 {
            self.body_parts.push(data.to_string());
        }
    }
}

/// Single left-to-right pass over tag and text events. Unknown tags are
/// ignored and malformed markup ends the scan quietly; whatever was found up
/// to that point stands.
pub fn scan(html: &str) -> ScanResult {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut result = ScanResult::default();
    let mut state = ScanState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = tag_name(&e);
                let attrs = attr_map(&e);
                collect_signals(&tag, &attrs, &mut result);
                state.on_start(&tag, &attrs);
            }
            // Void elements (<meta …/>, <iframe …/>) carry signals but no text.
            Ok(Event::Empty(e)) => {
                let tag = tag_name(&e);
                let attrs = attr_map(&e);
                collect_signals(&tag, &attrs, &mut result);
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                state.on_end(&tag);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map(|c| c.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                let data = text.trim();
                if !data.is_empty() {
                    state.on_text(data, &mut result);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => break,
        }
    }

    result.body_text = state.body_parts.join(" ");
    result
}

/// Meta tags and embed URLs, shared between Start and Empty events.
fn collect_signals(tag: &str, attrs: &HashMap<String, String>, result: &mut ScanResult) {
    match tag {
        "meta" => {
            let content = attrs.get("content").cloned().unwrap_or_default();
            if let Some(name) = attrs.get("name").filter(|n| !n.is_empty()) {
                result.meta_tags.insert(name.clone(), content);
            } else if let Some(property) = attrs.get("property").filter(|p| !p.is_empty()) {
                result.meta_tags.insert(property.clone(), content);
            }
        }
        "iframe" if result.video_id.is_empty() => {
            if let Some(src) = attrs.get("src") {
                if let Some(caps) = EMBED_RE.captures(src) {
                    result.video_id = caps[1].to_string();
                }
            }
        }
        _ => {}
    }
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

fn attr_map(e: &BytesStart) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for attr in e.attributes().with_checks(false).flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        map.insert(key, value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_name_and_property() {
        let html = r#"<html><head>
            <meta name="description" content="a post">
            <meta property="og:image" content="https://example.com/i.png">
        </head></html>"#;
        let r = scan(html);
        assert_eq!(r.meta_tags["description"], "a post");
        assert_eq!(r.meta_tags["og:image"], "https://example.com/i.png");
    }

    #[test]
    fn duplicate_meta_last_wins() {
        let html = r#"<head>
            <meta name="keywords" content="first">
            <meta name="keywords" content="second">
        </head>"#;
        assert_eq!(scan(html).meta_tags["keywords"], "second");
    }

    #[test]
    fn only_first_title_is_captured() {
        let html = "<title>Real Title</title><title>Decoy</title>";
        assert_eq!(scan(html).title_text, "Real Title");
    }

    #[test]
    fn author_and_date_spans() {
        let html = r#"<span class="post-author">Jane</span>
                      <span class="post-date">Mar 03, 2024</span>
                      <span class="other">noise</span>"#;
        let r = scan(html);
        assert_eq!(r.author_text, "Jane");
        assert_eq!(r.date_text, "Mar 03, 2024");
    }

    #[test]
    fn nested_divs_do_not_end_body_capture() {
        let html = r#"<div class="article-content">
            intro
            <div class="callout">nested <div>deeper</div> text</div>
            outro
        </div>
        <div>after the container</div>"#;
        let r = scan(html);
        assert_eq!(r.body_text, "intro nested deeper text outro");
    }

    #[test]
    fn body_capture_does_not_restart() {
        let html = r#"<div class="article-content">first</div>
                      <div class="article-content">second</div>"#;
        assert_eq!(scan(html).body_text, "first");
    }

    #[test]
    fn first_embed_wins() {
        let html = r#"
            <iframe src="https://www.youtube.com/embed/dQw4w9WgXcQ"></iframe>
            <iframe src="https://www.youtube.com/embed/zzzzzzzzzzz"></iframe>"#;
        assert_eq!(scan(html).video_id, "dQw4w9WgXcQ");
    }

    #[test]
    fn broken_markup_keeps_earlier_signals() {
        let html = "<title>Still Here</title><div class=\"article-content\">text";
        let r = scan(html);
        assert_eq!(r.title_text, "Still Here");
    }

    #[test]
    fn empty_document_yields_defaults() {
        let r = scan("");
        assert!(r.title_text.is_empty());
        assert!(r.meta_tags.is_empty());
        assert!(r.body_text.is_empty());
        assert!(r.video_id.is_empty());
    }
}
