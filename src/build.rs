//! Exports the pipelines behind each command: [`build_index`] rebuilds the
//! paginated blog index, [`build_projects`] regenerates the photo-project
//! page, and [`collection`] gathers that page's articles by year. Each one
//! reads articles ([`crate::scan`]), renders them ([`crate::write`],
//! [`crate::gallery`]) and writes the result to disk.

use crate::config::Config;
use crate::gallery;
use crate::layout::load_template;
use crate::scan::{partition_by_year, Collector, Error as ScanError, YearBucket};
use crate::write::{total_pages, Error as WriteError, Writer};
use gtmpl::Template;
use log::{info, warn};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// The built-in template for one article in a listing.
pub const ARTICLE_TEMPLATE: &str = include_str!("../templates/article.html");

/// The built-in template for the listing navigation.
pub const PAGINATION_TEMPLATE: &str = include_str!("../templates/pagination.html");

/// The built-in template for the projects page.
pub const PROJECTS_TEMPLATE: &str = include_str!("../templates/projects.html");

/// Rebuilds the blog index: every article directory directly below the blog
/// is read, the articles are sorted newest first and written out
/// `page_size` at a time. Returns the number of pages written, which is zero
/// when there are no articles or no layout document.
pub fn build_index(config: &Config) -> Result<usize> {
    let blog = config.blog_dir();
    let collector = Collector::new(&blog, &config.page_file, &config.extract);

    info!("Collecting articles...");
    let articles = collector.list_articles(&config.index.excluded)?;
    info!("Found {} articles", articles.len());
    if articles.is_empty() {
        info!("No articles found!");
        return Ok(0);
    }

    let page_size = config.index.page_size.0;
    info!("Generating {} pages...", total_pages(articles.len(), page_size));

    // Read the layout once so pages written by this run never feed back into
    // later pages.
    let candidates = config.index_templates();
    let (layout_path, layout_source) = match load_template(&candidates)? {
        Some(found) => found,
        None => {
            warn!("No index template found in {:?}", candidates);
            return Ok(0);
        }
    };
    info!("Using layout {}", layout_path.display());

    let article_template = parse_template(&template_source(
        config.index.article_template.as_deref().map(|p| config.resolve(p)),
        ARTICLE_TEMPLATE,
    )?)?;
    let pagination_template = parse_template(&template_source(
        config.index.pagination_template.as_deref().map(|p| config.resolve(p)),
        PAGINATION_TEMPLATE,
    )?)?;

    let writer = Writer {
        article_template: &article_template,
        pagination_template: &pagination_template,
        layout_source: &layout_source,
        posts_marker: &config.index.posts_marker,
        nested_rewrites: &config.index.nested_rewrites,
        page_size,
        blog_path: &config.index.blog_path,
        page_directory: &config.index.page_directory,
        page_file: &config.page_file,
        output_directory: &blog,
    };
    let written = writer.write_pages(&articles)?;
    info!("Done! Blog index rebuilt with {} pages.", written);
    Ok(written)
}

/// Collects the configured collection's dated articles and groups them by
/// the configured years.
pub fn collection(config: &Config) -> Result<Vec<YearBucket>> {
    let blog = config.blog_dir();
    let collector = Collector::new(&blog, &config.page_file, &config.extract);
    let articles = collector.collect_tagged(&config.collection.markers)?;

    let buckets = partition_by_year(&articles, &config.collection.years);
    for bucket in &buckets {
        info!("Found {} articles from {}", bucket.articles.len(), bucket.year);
    }
    Ok(buckets)
}

/// Regenerates the projects page and returns the path it was written to.
pub fn build_projects(config: &Config) -> Result<PathBuf> {
    let buckets = collection(config)?;
    let template = parse_template(&template_source(
        config.collection.template.as_deref().map(|p| config.resolve(p)),
        PROJECTS_TEMPLATE,
    )?)?;
    let html = gallery::render(&template, &buckets)?;

    let output = config.resolve(&config.collection.output);
    if let Some(dir) = output.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&output, html)?;
    info!("Generated {}", output.display());
    Ok(output)
}

/// Parses a template from its source text.
pub fn parse_template(source: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(source).map_err(Error::ParseTemplate)?;
    Ok(template)
}

// Reads the template file at `path`, or falls back to the built-in template.
fn template_source(path: Option<PathBuf>, builtin: &str) -> Result<String> {
    match path {
        None => Ok(builtin.to_owned()),
        Some(path) => fs::read_to_string(&path).map_err(|err| Error::OpenTemplateFile { path, err }),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for the pipelines. Errors can come from scanning,
/// rendering, loading or parsing templates, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the blog directory can't be scanned.
    Scan(ScanError),

    /// Returned for errors rendering or writing pages.
    Write(WriteError),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Scan(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "Parsing template: {}", err),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scan(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ScanError> for Error {
    /// Converts [`ScanError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ScanError) -> Error {
        Error::Scan(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
