//! Event-level view of a project descriptor.
//!
//! A document is read once into an immutable sequence of `quick_xml` events,
//! together with the positions of the elements of interest (a given tag whose
//! direct parent is a group tag). Rewriting produces a new event stream;
//! events that are not replaced are written back byte for byte.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use cpv_util::errors::CpvError;

/// Position of one element inside [`ParsedDocument::events`].
///
/// For a self-closing element `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSpan {
    pub start: usize,
    pub end: usize,
}

impl ElementSpan {
    pub fn is_empty_element(&self) -> bool {
        self.start == self.end
    }
}

/// A well-formed document split into events.
#[derive(Debug)]
pub struct ParsedDocument<'a> {
    path: PathBuf,
    events: Vec<Event<'a>>,
    elements: Vec<ElementSpan>,
}

struct OpenElement {
    name: Vec<u8>,
    index: usize,
    tracked: bool,
}

impl<'a> ParsedDocument<'a> {
    /// Parse `xml`, tracking every `element_tag` whose parent is `group_tag`.
    ///
    /// `path` is only used in error messages. Tracked elements nested inside
    /// another tracked element are not tracked themselves.
    pub fn parse(
        path: &Path,
        xml: &'a str,
        group_tag: &str,
        element_tag: &str,
    ) -> Result<Self, CpvError> {
        let mut reader = Reader::from_str(xml);
        let mut events = Vec::new();
        let mut elements = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut saw_root = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                parse_error(
                    path,
                    format!("{e} (near byte {})", reader.buffer_position()),
                )
            })?;

            match &event {
                Event::Start(e) | Event::Empty(e) => {
                    if stack.is_empty() {
                        if saw_root {
                            return Err(parse_error(path, "multiple root elements".to_string()));
                        }
                        saw_root = true;
                    }
                    let name = e.name().as_ref().to_vec();
                    let tracked = name == element_tag.as_bytes()
                        && stack
                            .last()
                            .is_some_and(|parent| parent.name == group_tag.as_bytes())
                        && !stack.iter().any(|open| open.tracked);

                    if matches!(event, Event::Start(_)) {
                        stack.push(OpenElement {
                            name,
                            index: events.len(),
                            tracked,
                        });
                    } else if tracked {
                        elements.push(ElementSpan {
                            start: events.len(),
                            end: events.len(),
                        });
                    }
                }
                Event::End(e) => {
                    let Some(open) = stack.pop() else {
                        return Err(parse_error(
                            path,
                            format!("unexpected closing tag </{}>", lossy(e.name().as_ref())),
                        ));
                    };
                    if open.name != e.name().as_ref() {
                        return Err(parse_error(
                            path,
                            format!(
                                "expected </{}>, found </{}>",
                                lossy(&open.name),
                                lossy(e.name().as_ref())
                            ),
                        ));
                    }
                    if open.tracked {
                        elements.push(ElementSpan {
                            start: open.index,
                            end: events.len(),
                        });
                    }
                }
                Event::Eof => {
                    if let Some(open) = stack.last() {
                        return Err(parse_error(
                            path,
                            format!("unclosed element <{}>", lossy(&open.name)),
                        ));
                    }
                    if !saw_root {
                        return Err(parse_error(path, "root element is missing".to_string()));
                    }
                    break;
                }
                _ => {}
            }

            events.push(event);
        }

        elements.sort_by_key(|span| span.start);

        Ok(Self {
            path: path.to_path_buf(),
            events,
            elements,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    /// Tracked elements in document order.
    pub fn elements(&self) -> &[ElementSpan] {
        &self.elements
    }

    /// The opening (or self-closing) tag of a tracked element.
    pub fn start_tag(&self, span: ElementSpan) -> &BytesStart<'a> {
        match &self.events[span.start] {
            Event::Start(e) | Event::Empty(e) => e,
            _ => unreachable!("element spans always begin at a start tag"),
        }
    }

    /// Unescaped value of attribute `name` on a tracked element.
    pub fn attribute(&self, span: ElementSpan, name: &str) -> Result<Option<String>, CpvError> {
        for attr in self.start_tag(span).attributes() {
            let attr = attr.map_err(|e| parse_error(&self.path, e.to_string()))?;
            if attr.key.as_ref() == name.as_bytes() {
                let value = attr
                    .unescape_value()
                    .map_err(|e| parse_error(&self.path, e.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    /// Serialize a tracked element on one line under a new tag name.
    ///
    /// Attributes keep their order and raw values; whitespace-only text
    /// between child nodes is dropped.
    pub fn render_element(&self, span: ElementSpan, tag: &str) -> Result<String, CpvError> {
        let start = self.start_tag(span);
        let mut out = EventSink::new(&self.path);

        if span.is_empty_element() {
            out.write(Event::Empty(rebuild_start(&self.path, start, tag, None, true)?))?;
        } else {
            out.write(Event::Start(rebuild_start(&self.path, start, tag, None, false)?))?;
            for event in &self.events[span.start + 1..span.end] {
                if let Event::Text(text) = event {
                    if text.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                }
                out.write(event.clone())?;
            }
            out.write(Event::End(BytesEnd::new(tag.to_string())))?;
        }

        out.finish()
    }

    /// The start tag of a tracked element without attribute `skip`.
    ///
    /// The tag name, the other attributes and a trailing space before `/>`
    /// are preserved.
    pub fn start_without(
        &self,
        span: ElementSpan,
        skip: &str,
    ) -> Result<BytesStart<'static>, CpvError> {
        let start = self.start_tag(span);
        let name = lossy(start.name().as_ref()).into_owned();
        let raw: &[u8] = start;
        let trailing_space = raw.last().is_some_and(u8::is_ascii_whitespace);
        rebuild_start(&self.path, start, &name, Some(skip), trailing_space)
    }

    /// Write the document back out, substituting start tags by event index.
    pub fn serialize_with(
        &self,
        mut replacement: impl FnMut(usize) -> Option<BytesStart<'static>>,
    ) -> Result<String, CpvError> {
        let mut out = EventSink::new(&self.path);
        for (index, event) in self.events.iter().enumerate() {
            match (event, replacement(index)) {
                (Event::Start(_), Some(start)) => out.write(Event::Start(start))?,
                (Event::Empty(_), Some(start)) => out.write(Event::Empty(start))?,
                _ => out.write(event.clone())?,
            }
        }
        out.finish()
    }
}

/// Build a start tag named `tag` from the attributes of `start`.
fn rebuild_start(
    path: &Path,
    start: &BytesStart<'_>,
    tag: &str,
    skip: Option<&str>,
    trailing_space: bool,
) -> Result<BytesStart<'static>, CpvError> {
    let mut content = String::from(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(path, e.to_string()))?;
        if skip.is_some_and(|s| attr.key.as_ref() == s.as_bytes()) {
            continue;
        }
        let value = lossy(&attr.value);
        // Raw values are already escaped; only the quote style can clash.
        let quote = if value.contains('"') { '\'' } else { '"' };
        content.push(' ');
        content.push_str(&lossy(attr.key.as_ref()));
        content.push('=');
        content.push(quote);
        content.push_str(&value);
        content.push(quote);
    }
    if trailing_space {
        content.push(' ');
    }
    Ok(BytesStart::from_content(content, tag.len()))
}

struct EventSink<'p> {
    path: &'p Path,
    writer: Writer<Vec<u8>>,
}

impl<'p> EventSink<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            writer: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), CpvError> {
        if matches!(event, Event::Eof) {
            return Ok(());
        }
        self.writer
            .write_event(event)
            .map_err(|e| parse_error(self.path, format!("failed to serialize: {e}")))
    }

    fn finish(self) -> Result<String, CpvError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| parse_error(self.path, format!("serialized output is not UTF-8: {e}")))
    }
}

fn parse_error(path: &Path, message: String) -> CpvError {
    CpvError::DocumentParse {
        path: path.to_path_buf(),
        message,
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
