//! Paginates the sorted article list and renders one listing document per
//! page. The first page is the blog's own `index.html`; page `N > 1` lives
//! at `{page_directory}/{N}/index.html` below it. Because those pages sit two
//! directories deeper, their article links are prefixed with the blog path
//! and their template gets its relative asset paths rewritten (see
//! [`crate::layout`]).

use crate::article::Article;
use crate::escape::{EscapeHref, EscapeHtml};
use crate::layout::{rewrite, Layout, Rewrite};
use gtmpl::{Template, Value};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Responsible for paginating, templating, and writing listing pages to
/// disk from [`Article`]s.
pub struct Writer<'a> {
    /// The template for one article's entry in a listing.
    pub article_template: &'a Template,

    /// The template for the previous/next navigation.
    pub pagination_template: &'a Template,

    /// The text of the existing listing document that supplies the header
    /// and footer.
    pub layout_source: &'a str,

    /// The opening tag of the posts container in `layout_source`.
    pub posts_marker: &'a str,

    /// Applied to `layout_source` for every page after the first.
    pub nested_rewrites: &'a [Rewrite],

    /// The number of articles per page.
    pub page_size: usize,

    /// The root-relative URL of the blog, e.g. `/blog/`. Must end with `/`.
    pub blog_path: &'a str,

    /// The directory under the blog holding pages 2 and up.
    pub page_directory: &'a str,

    /// The name of the document written in each page directory.
    pub page_file: &'a str,

    /// The blog directory on disk.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Renders and writes every page for `articles`, which must already be
    /// sorted. Pages whose template has no posts container are skipped.
    /// Returns the number of pages written.
    pub fn write_pages(&self, articles: &[Article]) -> Result<usize> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut written = 0;
        for page in pages(articles, self.page_size) {
            let html = match self.render_page(&page)? {
                Some(html) => html,
                None => {
                    warn!(
                        "No `{}` in the index template; skipping page {}",
                        self.posts_marker, page.number
                    );
                    continue;
                }
            };

            let file_path = self.file_path(page.number);
            if let Some(dir) = file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            info!("Generating {}...", file_path.display());
            std::fs::write(&file_path, html)?;
            written += 1;
        }
        Ok(written)
    }

    /// Renders a single page. Returns `Ok(None)` when the layout template
    /// can't be split around the posts container.
    pub fn render_page(&self, page: &Page) -> Result<Option<String>> {
        let layout = match page.number > 1 {
            true => Layout::split(
                &rewrite(self.layout_source, self.nested_rewrites),
                self.posts_marker,
            ),
            false => Layout::split(self.layout_source, self.posts_marker),
        };
        let layout = match layout {
            Some(layout) => layout,
            None => return Ok(None),
        };

        let mut entries = Vec::with_capacity(page.articles.len());
        for article in page.articles {
            let link = self.article_link(page, article);
            entries.push(execute(self.article_template, article_value(article, &link))?);
        }

        let mut body = entries.join("\n");
        body.push_str(&self.render_pagination(page)?);
        Ok(Some(layout.wrap(&body)))
    }

    /// Renders the navigation for `page`. This is empty when there is only
    /// one page.
    fn render_pagination(&self, page: &Page) -> Result<String> {
        if page.total <= 1 {
            return Ok(String::new());
        }
        let prev = match page.number > 1 {
            true => Some(self.page_url(page.number - 1)),
            false => None,
        };
        let next = match page.number < page.total {
            true => Some(self.page_url(page.number + 1)),
            false => None,
        };

        let option_to_value = |opt: Option<String>| match opt {
            Some(url) => Value::String(EscapeHref(&url).to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("prev".to_owned(), option_to_value(prev));
        m.insert("next".to_owned(), option_to_value(next));
        m.insert("number".to_owned(), Value::String(page.number.to_string()));
        m.insert("total".to_owned(), Value::String(page.total.to_string()));
        execute(self.pagination_template, Value::Object(m))
    }

    /// The URL of page `number`. The first page is the blog path itself
    /// rather than `{page_directory}/1/`.
    pub fn page_url(&self, number: usize) -> String {
        match number {
            0 | 1 => self.blog_path.to_owned(),
            _ => format!("{}{}/{}/", self.blog_path, self.page_directory, number),
        }
    }

    /// Where page `number` is written.
    pub fn file_path(&self, number: usize) -> PathBuf {
        match number {
            0 | 1 => self.output_directory.join(self.page_file),
            _ => self
                .output_directory
                .join(self.page_directory)
                .join(number.to_string())
                .join(self.page_file),
        }
    }

    /// Links from the first page are relative to the blog directory. Later
    /// pages are nested deeper, so their links are rooted at the blog path.
    fn article_link(&self, page: &Page, article: &Article) -> String {
        match page.number > 1 {
            true => format!("{}{}", self.blog_path, article.url),
            false => article.url.clone(),
        }
    }
}

/// One page of a listing: a contiguous run of at most `page_size` articles.
#[derive(Debug)]
pub struct Page<'a> {
    /// 1-based.
    pub number: usize,
    pub total: usize,
    pub articles: &'a [Article],
}

/// The number of pages needed for `count` articles.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    match page_size {
        0 => 0,
        _ => (count + page_size - 1) / page_size,
    }
}

/// The articles on page `number` (1-based). Pages outside the list are
/// empty.
pub fn page_slice(articles: &[Article], number: usize, page_size: usize) -> &[Article] {
    if number == 0 {
        return &[];
    }
    let start = (number - 1).saturating_mul(page_size).min(articles.len());
    let end = number.saturating_mul(page_size).min(articles.len());
    &articles[start..end]
}

/// Every page for `articles`, in order.
pub fn pages(articles: &[Article], page_size: usize) -> Vec<Page<'_>> {
    let total = total_pages(articles.len(), page_size);
    (1..=total)
        .map(|number| Page {
            number,
            total,
            articles: page_slice(articles, number, page_size),
        })
        .collect()
}

fn article_value(article: &Article, link: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "title".to_owned(),
        Value::String(EscapeHtml(&article.title).to_string()),
    );
    m.insert(
        "excerpt".to_owned(),
        Value::String(EscapeHtml(&article.excerpt).to_string()),
    );
    m.insert(
        "image".to_owned(),
        Value::String(EscapeHtml(&article.image).to_string()),
    );
    m.insert(
        "slug".to_owned(),
        Value::String(EscapeHtml(&article.slug).to_string()),
    );
    m.insert("link".to_owned(), Value::String(EscapeHref(link).to_string()));
    Value::Object(m)
}

/// Applies `template` to `value` and returns the output as text.
pub(crate) fn execute(template: &Template, value: Value) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &gtmpl::Context::from(value)?)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => write!(f, "Rendering template: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
