//! Extracts article metadata from a pre-rendered HTML page. The page is run
//! through the [`html5ever`] tokenizer once, front to back, and a small
//! automaton decides what each token contributes:
//!
//! * text inside the title heading becomes the title,
//! * text inside the content section becomes the excerpt,
//! * `<meta>` tags anywhere supply the image, publish date, canonical URL and
//!   the fallback description.
//!
//! No DOM is built. See [`extract`] for the entry point and
//! [`parse_timestamp`] for how publish dates are read.

use std::borrow::Cow;
use std::cell::RefCell;

use chrono::{DateTime, FixedOffset};
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use serde::Deserialize;

/// Identifies the elements and attributes that carry article metadata.
/// Element and attribute names must be lowercase; the tokenizer lowercases
/// everything it reads.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Selectors {
    /// The title heading element.
    pub title_tag: String,

    /// The title heading's `class` attribute, compared for equality.
    pub title_class: String,

    /// The content section element.
    pub content_tag: String,

    /// A substring the content section's `class` attribute must contain.
    pub content_class: String,

    /// The `<meta property>` carrying the hero image.
    pub image_property: String,

    /// The `<meta property>` carrying the publish timestamp.
    pub published_property: String,

    /// The `<meta property>` carrying the canonical URL.
    pub canonical_property: String,

    /// The `<meta name>` carrying the fallback description.
    pub description_name: String,

    /// The maximum length of an excerpt, in characters.
    pub excerpt_length: usize,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            title_tag: String::from("h1"),
            title_class: String::from("post-title"),
            content_tag: String::from("section"),
            content_class: String::from("post-content"),
            image_property: String::from("og:image"),
            published_property: String::from("article:published_time"),
            canonical_property: String::from("og:url"),
            description_name: String::from("description"),
            excerpt_length: 200,
        }
    }
}

/// The raw metadata found on one page. Every field is empty when the page
/// doesn't provide it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub published: String,
    pub canonical_url: String,
}

/// Extracts [`Metadata`] from the HTML text of one article page. Malformed
/// markup never fails; the tokenizer recovers and whatever was found is
/// returned.
pub fn extract(html: &str, selectors: &Selectors) -> Metadata {
    let tokenizer = Tokenizer::new(
        Sink(RefCell::new(Scanner::new(selectors))),
        TokenizerOpts::default(),
    );
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    let metadata = tokenizer.sink.0.borrow_mut().finish();
    metadata
}

/// Parses a publish timestamp. A trailing `Z` is rewritten to an explicit
/// `+00:00` offset first. Offsets may also be written without a colon
/// (`+0100`) or without minutes (`+01`). Returns `None` for anything that isn't a
/// timestamp with an offset.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    const FALLBACK_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%dT%H:%M%#z",
        "%Y-%m-%d %H:%M%#z",
    ];

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stem) => Cow::Owned(format!("{}+00:00", stem)),
        None => Cow::Borrowed(raw),
    };

    DateTime::parse_from_rfc3339(&normalized).ok().or_else(|| {
        FALLBACK_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
    })
}

/// Where the scan currently is relative to the regions we capture text from.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Region {
    Outside,

    /// Inside the title heading. `in_content` remembers whether the heading
    /// opened inside the content section, in which case its text counts
    /// toward both and the scan returns to [`Region::Content`] afterwards.
    Title { in_content: bool },

    Content,
}

struct Scanner<'a> {
    selectors: &'a Selectors,
    region: Region,

    /// Character data seen since the last tag. The tokenizer hands text over
    /// in arbitrary runs, so runs are joined here and consumed as one piece
    /// when the next tag, comment or EOF arrives.
    pending: String,

    title: String,
    content: String,
    content_excerpt: Option<String>,
    description: Option<String>,
    image: String,
    published: String,
    canonical_url: String,
}

impl<'a> Scanner<'a> {
    fn new(selectors: &'a Selectors) -> Self {
        Scanner {
            selectors,
            region: Region::Outside,
            pending: String::new(),
            title: String::new(),
            content: String::new(),
            content_excerpt: None,
            description: None,
            image: String::new(),
            published: String::new(),
            canonical_url: String::new(),
        }
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        match self.region {
            Region::Outside => {}
            Region::Title { in_content } => {
                self.title.push_str(&text);
                if in_content {
                    self.push_content(&text);
                }
            }
            Region::Content => self.push_content(&text),
        }
    }

    fn push_content(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            if !self.content.is_empty() {
                self.content.push(' ');
            }
            self.content.push_str(text);
        }
    }

    fn on_start_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let name: &str = &tag.name;
        if name == self.selectors.title_tag
            && attr(tag, "class") == Some(self.selectors.title_class.as_str())
        {
            self.region = Region::Title {
                in_content: self.region == Region::Content,
            };
        } else if name == self.selectors.content_tag
            && attr(tag, "class")
                .map_or(false, |class| class.contains(&self.selectors.content_class))
        {
            if self.region == Region::Outside {
                self.region = Region::Content;
            }
        } else if name == "meta" {
            self.on_meta(tag);
        }

        match name {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" => TokenSinkResult::RawData(RawKind::Rawtext),
            "textarea" | "title" => TokenSinkResult::RawData(RawKind::Rcdata),
            _ => TokenSinkResult::Continue,
        }
    }

    fn on_meta(&mut self, tag: &Tag) {
        let content = || attr(tag, "content").unwrap_or_default().to_owned();
        match attr(tag, "property") {
            Some(p) if p == self.selectors.image_property => self.image = content(),
            Some(p) if p == self.selectors.published_property => {
                self.published = content()
            }
            Some(p) if p == self.selectors.canonical_property => {
                self.canonical_url = content()
            }
            _ => {
                if attr(tag, "name") == Some(self.selectors.description_name.as_str())
                    && self.description.is_none()
                {
                    let description = content();
                    if !description.is_empty() {
                        self.description = Some(description);
                    }
                }
            }
        }
    }

    fn on_end_tag(&mut self, tag: &Tag) {
        let name: &str = &tag.name;
        match self.region {
            Region::Title { in_content } if name == self.selectors.title_tag => {
                self.region = match in_content {
                    true => Region::Content,
                    false => Region::Outside,
                };
            }
            Region::Content if name == self.selectors.content_tag => {
                self.region = Region::Outside;
                if self.content_excerpt.is_none() && !self.content.is_empty() {
                    self.content_excerpt = Some(truncate(
                        &self.content,
                        self.selectors.excerpt_length,
                    ));
                }
            }
            _ => {}
        }
    }

    fn finish(&mut self) -> Metadata {
        self.flush_text();
        let excerpt = self
            .content_excerpt
            .take()
            .or_else(|| self.description.take())
            .unwrap_or_default();
        Metadata {
            title: self.title.trim().to_owned(),
            excerpt: truncate(&excerpt, self.selectors.excerpt_length),
            image: std::mem::take(&mut self.image),
            published: std::mem::take(&mut self.published),
            canonical_url: std::mem::take(&mut self.canonical_url),
        }
    }
}

/// Adapts a [`Scanner`] to html5ever's [`TokenSink`], which only hands out
/// shared references.
struct Sink<'a>(RefCell<Scanner<'a>>);

impl<'a> TokenSink for Sink<'a> {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut scanner = self.0.borrow_mut();
        match token {
            Token::CharacterTokens(text) => {
                scanner.pending.push_str(&text);
                TokenSinkResult::Continue
            }
            Token::TagToken(tag) => {
                scanner.flush_text();
                match tag.kind {
                    TagKind::StartTag => scanner.on_start_tag(&tag),
                    TagKind::EndTag => {
                        scanner.on_end_tag(&tag);
                        TokenSinkResult::Continue
                    }
                }
            }
            Token::CommentToken(_) | Token::DoctypeToken(_) | Token::EOFToken => {
                scanner.flush_text();
                TokenSinkResult::Continue
            }
            _ => TokenSinkResult::Continue,
        }
    }
}

fn attr<'t>(tag: &'t Tag, name: &str) -> Option<&'t str> {
    tag.attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

/// Keeps the first `max` characters of `text` and drops trailing whitespace.
fn truncate(text: &str, max: usize) -> String {
    let end = text
        .char_indices()
        .nth(max)
        .map_or(text.len(), |(index, _)| index);
    text[..end].trim().to_owned()
}
