//! Lazy start-tag stream over an HTML document.
//!
//! Discovery only needs the `<meta>` tags of a page, so instead of building a
//! tree this yields start and self-closing tags one at a time, tokenized by a
//! lenient `quick_xml` reader. The stream is finite and cannot be rewound;
//! scan again by building a new [`TagStream`] over the same text.
//!
//! Comments, doctypes, end tags and text are skipped. Raw-text elements such
//! as `<script>` are skipped up to their end tag, so markup that only appears
//! inside a script body is never reported. Attribute values are decoded with
//! the HTML5 entity table plus numeric character references.

use quick_xml::Reader;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};

/// A start tag with lowercased name and attribute keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Tag {
    /// Value of an attribute. A repeated attribute yields its last value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "script", "style", "textarea", "title", "xmp",
];

pub struct TagStream<'a> {
    src: &'a str,
    /// Byte offset of the reader's input within `src`.
    offset: usize,
    reader: Reader<&'a [u8]>,
    done: bool,
}

fn html_reader(src: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(src);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

impl<'a> TagStream<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            reader: html_reader(src),
            done: false,
        }
    }

    fn position(&self) -> usize {
        self.offset + self.reader.buffer_position() as usize
    }

    /// Jump to the `</name` that closes a raw-text element, or to the end.
    fn skip_raw_text(&mut self, name: &str) {
        let pos = TagStream::position(self);
        let closing = format!("</{}", name);
        match find_ignore_ascii_case(&self.src.as_bytes()[pos..], closing.as_bytes()) {
            Some(off) => {
                self.offset = pos + off;
                self.reader = html_reader(&self.src[self.offset..]);
            }
            None => self.done = true,
        }
    }
}

impl Iterator for TagStream<'_> {
    type Item = Tag;

    fn next(&mut self) -> Option<Tag> {
        while !self.done {
            let (start, raw_text_allowed) = match self.reader.read_event() {
                Ok(Event::Start(start)) => (start, true),
                Ok(Event::Empty(start)) => (start, false),
                Ok(Event::Eof) | Err(_) => {
                    self.done = true;
                    break;
                }
                Ok(_) => continue,
            };

            let Some(tag) = to_tag(&start) else {
                continue;
            };
            if raw_text_allowed && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                self.skip_raw_text(&tag.name);
            }
            return Some(tag);
        }
        None
    }
}

/// `None` for things that only look like tags, such as `< 2 >`.
fn to_tag(start: &BytesStart<'_>) -> Option<Tag> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let attrs = start
        .html_attributes()
        .map_while(Result::ok)
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let value = attr
                .unescape_value_with(resolve_html5_entity)
                .map(|value| value.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();

    Some(Tag { name, attrs })
}

fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}
