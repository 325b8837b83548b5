//! Discovers article pages on disk and turns them into [`Article`]s. There
//! are two ways to collect articles:
//!
//! * [`Collector::list_articles`] looks at the immediate children of the
//!   blog directory, skipping reserved directories, and keeps every article
//!   whether or not it has a date.
//! * [`Collector::collect_tagged`] walks the whole tree and keeps dated
//!   articles whose raw text mentions one of the collection's markers. The
//!   marker test is a plain case-insensitive substring search, so a marker
//!   that appears anywhere on the page counts, not just in a tag.
//!
//! Unreadable pages are logged and skipped. Only a missing blog directory
//! stops a scan.

use crate::article::{sort_by_date, Article, UNTITLED};
use crate::extract::{extract, parse_timestamp, Selectors};
use log::{debug, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

/// Reads article pages below a blog directory.
pub struct Collector<'a> {
    /// The blog directory.
    root: &'a Path,

    /// The file name of the page inside each article directory.
    page_file: &'a str,

    selectors: &'a Selectors,
}

impl<'a> Collector<'a> {
    /// Constructs a new collector. See fields on [`Collector`] for argument
    /// descriptions.
    pub fn new(root: &'a Path, page_file: &'a str, selectors: &'a Selectors) -> Collector<'a> {
        Collector {
            root,
            page_file,
            selectors,
        }
    }

    /// Collects one article per immediate subdirectory of the blog, except
    /// those named in `excluded` and those without a page file. The result
    /// is sorted by date, most recent first, with undated articles last.
    pub fn list_articles(&self, excluded: &[String]) -> Result<Vec<Article>> {
        let mut dirs = Vec::new();
        for result in fs::read_dir(self.root).map_err(|err| self.root_error(err))? {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Error listing {}: {}", self.root.display(), err);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            if excluded.iter().any(|e| *e == name) {
                continue;
            }
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                dirs.push((name, entry.path()));
            }
        }
        dirs.sort();

        let mut articles = Vec::with_capacity(dirs.len());
        for (name, dir) in dirs {
            let page = dir.join(self.page_file);
            if !page.is_file() {
                continue;
            }
            match fs::read_to_string(&page) {
                Ok(contents) => {
                    articles.push(self.article(&contents, format!("{}/", name), name))
                }
                Err(err) => warn!("Error parsing {}: {}", dir.display(), err),
            }
        }

        sort_by_date(&mut articles);
        Ok(articles)
    }

    /// Walks the blog tree and collects every dated article whose page text
    /// contains one of `markers`, ignoring case. The result is sorted by
    /// date, most recent first.
    pub fn collect_tagged(&self, markers: &[String]) -> Result<Vec<Article>> {
        // Fail early: walkdir would only report this as a per-entry error.
        fs::metadata(self.root).map_err(|err| self.root_error(err))?;
        let markers: Vec<String> = markers.iter().map(|m| m.to_lowercase()).collect();

        let mut articles = Vec::new();
        let walker = WalkDir::new(self.root).sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Error walking {}: {}", self.root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != self.page_file {
                continue;
            }

            let contents = match fs::read_to_string(entry.path()) {
                Ok(contents) => contents,
                Err(err) => {
                    warn!("Error reading {}: {}", entry.path().display(), err);
                    continue;
                }
            };
            let lowered = contents.to_lowercase();
            if !markers.iter().any(|m| lowered.contains(m.as_str())) {
                continue;
            }

            let dir = entry.path().parent().unwrap_or(self.root);
            let slug = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let article = self.article(&contents, relative_url(self.root, dir), slug);
            match article.published {
                Some(_) => articles.push(article),
                None => debug!("Skipping undated {}", entry.path().display()),
            }
        }

        sort_by_date(&mut articles);
        Ok(articles)
    }

    fn article(&self, contents: &str, url: String, slug: String) -> Article {
        let metadata = extract(contents, self.selectors);
        debug!("Extracted {:?} from {}", metadata.title, url);
        Article {
            title: match metadata.title.is_empty() {
                true => UNTITLED.to_owned(),
                false => metadata.title,
            },
            excerpt: metadata.excerpt,
            image: metadata.image,
            published: parse_timestamp(&metadata.published),
            canonical_url: Url::parse(metadata.canonical_url.trim()).ok(),
            url,
            slug,
        }
    }

    fn root_error(&self, err: std::io::Error) -> Error {
        Error::Root {
            path: self.root.to_owned(),
            err,
        }
    }
}

/// The articles of one calendar year.
#[derive(Clone, Debug, PartialEq)]
pub struct YearBucket {
    pub year: i32,
    pub articles: Vec<Article>,
}

/// Groups `articles` by the year of their publish date, one bucket per entry
/// of `years` and in that order. Articles from other years, and undated
/// ones, are left out. The relative order of articles is preserved.
pub fn partition_by_year(articles: &[Article], years: &[i32]) -> Vec<YearBucket> {
    years
        .iter()
        .map(|&year| YearBucket {
            year,
            articles: articles
                .iter()
                .filter(|a| a.year() == Some(year))
                .cloned()
                .collect(),
        })
        .collect()
}

/// The path from `root` to `dir` with `/` separators and a trailing `/`.
fn relative_url(root: &Path, dir: &Path) -> String {
    let parts: Vec<String> = dir
        .strip_prefix(root)
        .unwrap_or(dir)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    match parts.is_empty() {
        true => String::from("./"),
        false => format!("{}/", parts.join("/")),
    }
}

/// The result of a scan.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a scan that couldn't start.
#[derive(Debug)]
pub enum Error {
    /// Returned when the blog directory can't be read.
    Root { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Root { path, err } => {
                write!(f, "Reading blog directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Root { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::article;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(p: &Path, s: &str) {
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, s).unwrap();
    }

    fn page(title: &str, date: Option<&str>, extra: &str) -> String {
        let date = date
            .map(|d| format!(r#"<meta property="article:published_time" content="{}">"#, d))
            .unwrap_or_default();
        format!(
            r#"<html><head>{}<meta property="og:image" content="/img/{}.jpg"></head>
<body class="{}"><h1 class="post-title">{}</h1>
<section class="post-content"><p>Body of {}</p></section></body></html>"#,
            date, title, extra, title, title
        )
    }

    fn slugs(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.slug.as_str()).collect()
    }

    #[test]
    fn test_list_articles() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let blog = dir.path();
        write(&blog.join("old/index.html"), &page("Old", Some("2015-05-01T08:00:00Z"), ""));
        write(&blog.join("new/index.html"), &page("New", Some("2016-05-01T08:00:00Z"), ""));
        write(&blog.join("undated/index.html"), &page("Undated", None, ""));
        write(&blog.join("broken/index.html"), &page("Broken", Some("yesterday"), ""));
        write(&blog.join("tag/foo/index.html"), &page("Tag", None, ""));
        write(&blog.join("page/index.html"), &page("Page", None, ""));
        write(&blog.join("empty/readme.txt"), "no page here");
        write(&blog.join("index.html"), &page("Root", None, ""));

        let selectors = Selectors::default();
        let collector = Collector::new(blog, "index.html", &selectors);
        let articles = collector.list_articles(&[String::from("tag"), String::from("page")])?;

        assert_eq!(vec!["new", "old", "broken", "undated"], slugs(&articles));
        assert_eq!("new/", articles[0].url);
        assert_eq!("New", articles[0].title);
        assert_eq!("Body of New", articles[0].excerpt);
        assert_eq!("/img/New.jpg", articles[0].image);
        assert_eq!(None, articles[2].published);
        Ok(())
    }

    #[test]
    fn test_list_articles_untitled() -> Result<()> {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("a/index.html"), "<html><body>nothing</body></html>");
        let selectors = Selectors::default();
        let articles = Collector::new(dir.path(), "index.html", &selectors).list_articles(&[])?;
        assert_eq!(UNTITLED, articles[0].title);
        assert_eq!("a/", articles[0].url);
        Ok(())
    }

    #[test]
    fn test_list_articles_skips_unreadable() -> Result<()> {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("good/index.html"), &page("Good", None, ""));
        fs::create_dir_all(dir.path().join("bad")).unwrap();
        fs::write(dir.path().join("bad/index.html"), [0xff, 0xfe, 0x00]).unwrap();
        let selectors = Selectors::default();
        let articles = Collector::new(dir.path(), "index.html", &selectors).list_articles(&[])?;
        assert_eq!(vec!["good"], slugs(&articles));
        Ok(())
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let selectors = Selectors::default();
        let collector = Collector::new(&missing, "index.html", &selectors);
        assert!(matches!(collector.list_articles(&[]), Err(Error::Root { .. })));
        assert!(matches!(collector.collect_tagged(&[]), Err(Error::Root { .. })));
    }

    #[test]
    fn test_collect_tagged() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let blog = dir.path();
        write(
            &blog.join("2015/semaine-1/index.html"),
            &page("S1", Some("2015-01-04T12:00:00Z"), "post tag-projet-52"),
        );
        write(
            &blog.join("semaine-30/index.html"),
            &page("S30", Some("2015-07-26T12:00:00Z"), "post TAG-PROJET-52"),
        );
        write(
            &blog.join("semaine-60/index.html"),
            &page("S60", Some("2016-02-21T12:00:00Z"), "post projet-52"),
        );
        write(
            &blog.join("undated/index.html"),
            &page("Undated", None, "post tag-projet-52"),
        );
        write(
            &blog.join("other/index.html"),
            &page("Other", Some("2016-01-01T00:00:00Z"), "post tag-cuisine"),
        );

        let selectors = Selectors::default();
        let collector = Collector::new(blog, "index.html", &selectors);
        let markers = vec![String::from("projet-52"), String::from("tag-projet-52")];
        let articles = collector.collect_tagged(&markers)?;

        assert_eq!(vec!["semaine-60", "semaine-30", "semaine-1"], slugs(&articles));
        assert_eq!("2015/semaine-1/", articles[2].url);
        Ok(())
    }

    #[test]
    fn test_collect_is_repeatable() -> Result<()> {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write(
                &dir.path().join(format!("p{}/index.html", i)),
                &page(&format!("P{}", i), Some("2016-01-01T00:00:00Z"), "projet-52"),
            );
        }
        let selectors = Selectors::default();
        let collector = Collector::new(dir.path(), "index.html", &selectors);
        let markers = vec![String::from("projet-52")];
        assert_eq!(collector.collect_tagged(&markers)?, collector.collect_tagged(&markers)?);
        assert_eq!(collector.list_articles(&[])?, collector.list_articles(&[])?);
        Ok(())
    }

    #[test]
    fn test_partition_by_year() {
        let articles = vec![
            article("c", Some("2017-01-01T00:00:00Z")),
            article("b2", Some("2016-06-01T00:00:00Z")),
            article("b1", Some("2016-01-01T00:00:00Z")),
            article("a", Some("2015-01-01T00:00:00Z")),
            article("x", None),
        ];
        let buckets = partition_by_year(&articles, &[2015, 2016]);
        assert_eq!(2, buckets.len());
        assert_eq!(2015, buckets[0].year);
        assert_eq!(vec!["a"], slugs(&buckets[0].articles));
        assert_eq!(2016, buckets[1].year);
        assert_eq!(vec!["b2", "b1"], slugs(&buckets[1].articles));
    }

    #[test]
    fn test_relative_url() {
        let root = Path::new("/site/blog");
        assert_eq!("a/", relative_url(root, Path::new("/site/blog/a")));
        assert_eq!("2015/a/", relative_url(root, Path::new("/site/blog/2015/a")));
        assert_eq!("./", relative_url(root, root));
    }
}
