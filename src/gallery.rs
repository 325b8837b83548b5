//! Builds the photo-project page: the collection's articles grouped by year,
//! each year laid out as rows of three image cells.

use crate::article::Article;
use crate::escape::EscapeHtml;
use crate::scan::YearBucket;
use crate::write::{execute, Result};
use gtmpl::{Template, Value};
use std::collections::HashMap;

/// The number of image cells per row.
pub const ROW_WIDTH: usize = 3;

/// Lays out `articles` as rows of [`ROW_WIDTH`] image cells. Article `i`
/// (0-based) lands in row `i / 3`; no articles means no rows.
pub fn rows(articles: &[Article]) -> String {
    let rows: Vec<String> = articles
        .chunks(ROW_WIDTH)
        .map(|chunk| {
            let cells: Vec<String> = chunk.iter().map(cell).collect();
            format!("    <div class=\"row\">\n{}\n    </div>", cells.join("\n"))
        })
        .collect();
    rows.join("\n")
}

fn cell(article: &Article) -> String {
    let title = EscapeHtml(&article.title);
    format!(
        r#"      <div class="col-lg-4 col-xs-12 row-images">
        <img src="{}" alt="{}"
             title="{}" style="width:100%" />
      </div>"#,
        EscapeHtml(&article.image),
        title,
        title,
    )
}

/// Renders the projects page from year buckets, in the order given. The
/// first bucket is marked active.
pub fn render(template: &Template, buckets: &[YearBucket]) -> Result<String> {
    let sections: Vec<Value> = buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("active".to_owned(), Value::Bool(i == 0));
            m.insert("year".to_owned(), Value::String(bucket.year.to_string()));
            m.insert(
                "count".to_owned(),
                Value::String(bucket.articles.len().to_string()),
            );
            m.insert("rows".to_owned(), Value::String(rows(&bucket.articles)));
            Value::Object(m)
        })
        .collect();
    let total: usize = buckets.iter().map(|b| b.articles.len()).sum();

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("sections".to_owned(), Value::Array(sections));
    m.insert("total".to_owned(), Value::String(total.to_string()));
    execute(template, Value::Object(m))
}
