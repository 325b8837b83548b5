//! Defines the [`Article`] type, the metadata record for one pre-rendered
//! article page, and the ordering used by every listing.

use chrono::{DateTime, Datelike, FixedOffset};
use url::Url;

/// The title given to articles whose page has no title heading.
pub const UNTITLED: &str = "Untitled";

/// Represents one article discovered in the blog tree. Articles are built
/// once from a single page read (see [`crate::extract`]) and never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
    /// The text of the title heading, or [`UNTITLED`].
    pub title: String,

    /// At most `excerpt_length` characters taken from the content section,
    /// falling back to the page's meta description.
    pub excerpt: String,

    /// The hero image reference (`og:image`), empty when absent.
    pub image: String,

    /// The publish timestamp. `None` means the date is unknown, either
    /// because the page had none or because it could not be parsed.
    pub published: Option<DateTime<FixedOffset>>,

    /// The canonical URL (`og:url`) when the page declares a valid one.
    pub canonical_url: Option<Url>,

    /// The path of the article's directory relative to the blog root. This
    /// always ends with a `/`.
    pub url: String,

    /// The name of the article's directory.
    pub slug: String,
}

impl Article {
    /// The calendar year of the publish date, if known.
    pub fn year(&self) -> Option<i32> {
        self.published.map(|date| date.year())
    }
}

/// Sorts articles by publish date, most recent first. Articles with an
/// unknown date compare after every dated article and otherwise keep their
/// relative order.
pub fn sort_by_date(articles: &mut [Article]) {
    // `None < Some(_)`, so comparing `b` to `a` pushes unknown dates last.
    articles.sort_by(|a, b| b.published.cmp(&a.published));
}

#[cfg(test)]
pub(crate) fn article(slug: &str, published: Option<&str>) -> Article {
    Article {
        title: format!("Title of {}", slug),
        excerpt: format!("Excerpt of {}", slug),
        image: format!("/img/{}.jpg", slug),
        published: published.map(|date| {
            DateTime::parse_from_rfc3339(date).expect("test dates are valid")
        }),
        canonical_url: None,
        url: format!("{}/", slug),
        slug: slug.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slugs(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.slug.as_str()).collect()
    }

    #[test]
    fn test_sort_by_date_descending() {
        let mut articles = vec![
            article("middle", Some("2016-03-01T10:00:00+00:00")),
            article("oldest", Some("2015-01-01T00:00:00+00:00")),
            article("newest", Some("2017-06-30T23:59:59+02:00")),
        ];
        sort_by_date(&mut articles);
        assert_eq!(vec!["newest", "middle", "oldest"], slugs(&articles));
    }

    #[test]
    fn test_sort_by_date_unknown_last() {
        let mut articles = vec![
            article("undated-a", None),
            article("old", Some("2001-01-01T00:00:00+00:00")),
            article("undated-b", None),
            article("new", Some("2020-01-01T00:00:00+00:00")),
        ];
        sort_by_date(&mut articles);
        assert_eq!(
            vec!["new", "old", "undated-a", "undated-b"],
            slugs(&articles)
        );
    }

    #[test]
    fn test_sort_compares_instants_across_offsets() {
        // 10:00+02:00 is 08:00 UTC, earlier than 09:00 UTC.
        let mut articles = vec![
            article("paris", Some("2016-03-01T10:00:00+02:00")),
            article("london", Some("2016-03-01T09:00:00+00:00")),
        ];
        sort_by_date(&mut articles);
        assert_eq!(vec!["london", "paris"], slugs(&articles));
    }

    #[test]
    fn test_year() {
        assert_eq!(
            Some(2016),
            article("a", Some("2016-12-31T23:00:00-05:00")).year()
        );
        assert_eq!(None, article("b", None).year());
    }
}
