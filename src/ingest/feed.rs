// src/ingest/feed.rs
//! RSS + Atom parsing into `FeedEntry` values.
//!
//! Both vocabularies are read from one streaming pass: `<item>` (RSS) and `<entry>`
//! (Atom) are collected separately and returned items-first, each in document order.
//! A reader error anywhere in the document yields no entries at all.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use metrics::{counter, histogram};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ingest::normalize_snippet;
use crate::ingest::types::FeedEntry;

/// Parse a feed; undated entries are stamped with the current time.
pub fn parse_feed(xml: &str) -> Vec<FeedEntry> {
    parse_feed_at(xml, Utc::now())
}

/// Same as [`parse_feed`] with an explicit fallback clock.
pub fn parse_feed_at(xml: &str, now: DateTime<Utc>) -> Vec<FeedEntry> {
    parse_with(xml, now, false)
}

/// Variant that also fills `author` from the first `<creator>` (e.g. `dc:creator`).
pub fn parse_feed_with_creator(xml: &str, now: DateTime<Utc>) -> Vec<FeedEntry> {
    parse_with(xml, now, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Item,
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Published,
    Updated,
    Description,
    Summary,
    Creator,
}

#[derive(Debug, Default)]
struct Draft {
    title: Option<String>,
    link_seen: bool,
    link_text: Option<String>,
    link_href: Option<String>,
    pub_date: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    description: Option<String>,
    summary: Option<String>,
    creator: Option<String>,
}

impl Draft {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link_text,
            Field::PubDate => &mut self.pub_date,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
            Field::Description => &mut self.description,
            Field::Summary => &mut self.summary,
            Field::Creator => &mut self.creator,
        }
    }

    /// Only the first element of each kind counts.
    fn wants(&mut self, field: Field) -> bool {
        match field {
            Field::Link => !self.link_seen,
            other => self.slot(other).is_none(),
        }
    }

    fn open(&mut self, field: Field, el: &BytesStart<'_>) {
        if field == Field::Link {
            self.link_seen = true;
            self.link_href = href_of(el);
        }
    }

    fn into_entry(self, now: DateTime<Utc>) -> Option<FeedEntry> {
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        let text_link = self.link_text.as_deref().map(str::trim).unwrap_or_default();
        let url = if text_link.is_empty() {
            self.link_href.as_deref().map(str::trim).unwrap_or_default()
        } else {
            text_link
        };
        if title.is_empty() || url.is_empty() {
            return None;
        }

        let published_at = self
            .pub_date
            .as_deref()
            .or(self.published.as_deref())
            .or(self.updated.as_deref())
            .and_then(parse_timestamp)
            .unwrap_or(now);

        let snippet = self
            .description
            .as_deref()
            .or(self.summary.as_deref())
            .map(normalize_snippet)
            .unwrap_or_default();

        let author = self
            .creator
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Some(FeedEntry {
            title: title.to_string(),
            url: url.to_string(),
            published_at,
            snippet,
            author,
        })
    }
}

fn classify(el: &BytesStart<'_>, with_creator: bool) -> Option<Field> {
    match el.name().as_ref() {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" => Some(Field::PubDate),
        b"published" => Some(Field::Published),
        b"updated" => Some(Field::Updated),
        b"description" => Some(Field::Description),
        b"summary" => Some(Field::Summary),
        _ if with_creator && el.local_name().as_ref() == b"creator" => Some(Field::Creator),
        _ => None,
    }
}

fn node_of(el: &BytesStart<'_>) -> Option<Node> {
    match el.name().as_ref() {
        b"item" => Some(Node::Item),
        b"entry" => Some(Node::Entry),
        _ => None,
    }
}

fn href_of(el: &BytesStart<'_>) -> Option<String> {
    el.try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

struct Capture {
    field: Field,
    depth: usize,
    buf: String,
}

struct Open {
    node: Node,
    depth: usize,
    draft: Draft,
}

fn parse_with(xml: &str, now: DateTime<Utc>, with_creator: bool) -> Vec<FeedEntry> {
    let t0 = std::time::Instant::now();
    let scrubbed = scrub_html_entities_for_xml(xml);
    let out = match read_entries(&scrubbed, now, with_creator) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "feed xml rejected; treating as empty");
            Vec::new()
        }
    };
    histogram!("news_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("news_feed_entries_total").increment(out.len() as u64);
    out
}

fn read_entries(
    xml: &str,
    now: DateTime<Utc>,
    with_creator: bool,
) -> Result<Vec<FeedEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut open: Option<Open> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if open.is_none() {
                    if let Some(node) = node_of(&e) {
                        open = Some(Open {
                            node,
                            depth,
                            draft: Draft::default(),
                        });
                    }
                } else if capture.is_none() {
                    // nested markup inside a captured field only contributes its text
                    if let (Some(o), Some(field)) = (open.as_mut(), classify(&e, with_creator)) {
                        if o.draft.wants(field) {
                            o.draft.open(field, &e);
                            capture = Some(Capture {
                                field,
                                depth,
                                buf: String::new(),
                            });
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if let (Some(o), None) = (open.as_mut(), capture.as_ref()) {
                    if let Some(field) = classify(&e, with_creator) {
                        if o.draft.wants(field) {
                            o.draft.open(field, &e);
                            *o.draft.slot(field) = Some(String::new());
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some(c) = capture.as_mut() {
                    let text = t.unescape().map(|s| s.into_owned()).unwrap_or_else(|_| {
                        html_escape::decode_html_entities(&String::from_utf8_lossy(&t))
                            .into_owned()
                    });
                    c.buf.push_str(&text);
                }
            }
            Event::CData(t) => {
                if let Some(c) = capture.as_mut() {
                    c.buf.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let (Some(c), Some(o)) = (capture.take(), open.as_mut()) {
                        *o.draft.slot(c.field) = Some(c.buf);
                    }
                }
                if open.as_ref().is_some_and(|o| o.depth == depth) {
                    if let Some(o) = open.take() {
                        if let Some(entry) = o.draft.into_entry(now) {
                            match o.node {
                                Node::Item => items.push(entry),
                                Node::Entry => entries.push(entry),
                            }
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    items.extend(entries);
    Ok(items)
}

/// Best-effort timestamp parsing for feed dates: RFC 2822 (RSS), RFC 3339 (Atom),
/// and a few ISO-ish layouts seen in the wild. Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// HTML named entities are not valid XML; publishers still emit them.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Channel title is ignored</title>
    <link>https://example.com/</link>
    <item>
      <title>Fed holds rates</title>
      <link>https://example.com/fed</link>
      <pubDate>Fri, 31 May 2024 14:30:00 GMT</pubDate>
      <description><![CDATA[<p>The <b>FOMC</b> kept rates&nbsp;unchanged.</p>]]></description>
      <dc:creator>Jane Doe</dc:creator>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Feed title is ignored</title>
  <entry>
    <title>Fed holds rates</title>
    <link rel="alternate" href="https://example.com/fed"/>
    <published>2024-05-31T14:30:00Z</published>
    <summary type="html">&lt;p&gt;The &lt;b&gt;FOMC&lt;/b&gt; kept rates unchanged.&lt;/p&gt;</summary>
  </entry>
</feed>"#;

    #[test]
    fn rss_item_fields_are_extracted() {
        let out = parse_feed_at(RSS, now());
        assert_eq!(out.len(), 1);
        let e = &out[0];
        assert_eq!(e.title, "Fed holds rates");
        assert_eq!(e.url, "https://example.com/fed");
        assert_eq!(
            e.published_at,
            Utc.with_ymd_and_hms(2024, 5, 31, 14, 30, 0).unwrap()
        );
        assert_eq!(e.snippet, "The FOMC kept rates unchanged.");
        assert_eq!(e.author, None, "plain parser ignores creator");
    }

    #[test]
    fn atom_and_rss_yield_equivalent_entries() {
        let rss = parse_feed_at(RSS, now());
        let atom = parse_feed_at(ATOM, now());
        assert_eq!(rss, atom);
    }

    #[test]
    fn creator_variant_fills_author() {
        let out = parse_feed_with_creator(RSS, now());
        assert_eq!(out[0].author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn entries_missing_title_or_link_are_skipped() {
        let xml = r#"<rss><channel>
            <item><title>no link</title></item>
            <item><link>https://example.com/no-title</link></item>
            <item><title>ok</title><link>https://example.com/ok</link></item>
        </channel></rss>"#;
        let out = parse_feed_at(xml, now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://example.com/ok");
    }

    #[test]
    fn missing_or_bad_dates_fall_back_to_now() {
        let xml = r#"<rss><channel>
            <item><title>a</title><link>https://e.com/a</link></item>
            <item><title>b</title><link>https://e.com/b</link><pubDate>yesterday-ish</pubDate></item>
        </channel></rss>"#;
        let out = parse_feed_at(xml, now());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.published_at == now()));
    }

    #[test]
    fn atom_updated_is_last_date_fallback() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry>
            <title>8-K - ACME CORP</title>
            <link href="https://www.sec.gov/x"/>
            <updated>2024-05-30T09:15:00-04:00</updated>
        </entry></feed>"#;
        let out = parse_feed_at(xml, now());
        assert_eq!(
            out[0].published_at,
            Utc.with_ymd_and_hms(2024, 5, 30, 13, 15, 0).unwrap()
        );
    }

    #[test]
    fn items_come_before_entries() {
        let xml = r#"<root>
            <entry><title>atom</title><link href="https://e.com/atom"/></entry>
            <item><title>rss</title><link>https://e.com/rss</link></item>
        </root>"#;
        let out = parse_feed_at(xml, now());
        let urls: Vec<_> = out.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://e.com/rss", "https://e.com/atom"]);
    }

    #[test]
    fn snippet_is_capped_at_300_chars() {
        let long = "x".repeat(1000);
        let xml = format!(
            "<rss><channel><item><title>t</title><link>https://e.com</link><description>{long}</description></item></channel></rss>"
        );
        let out = parse_feed_at(&xml, now());
        assert_eq!(out[0].snippet.chars().count(), 300);
    }

    #[test]
    fn malformed_document_yields_nothing() {
        let xml = "<rss><channel><item><title>ok</title><link>https://e.com</link></item><item><title>bad</link></item></channel></rss>";
        assert!(parse_feed_at(xml, now()).is_empty());
        assert!(parse_feed_at("not xml at all", now()).is_empty());
    }

    #[test]
    fn timestamp_layouts() {
        let want = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("Tue, 02 Jan 2024 03:04:05 +0000"), Some(want));
        assert_eq!(parse_timestamp("2024-01-02T03:04:05Z"), Some(want));
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(want));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("garbage"), None);
    }
}
