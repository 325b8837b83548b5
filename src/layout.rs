//! Splits an existing listing document into the header and footer that
//! surround the generated posts. The header runs through the posts
//! container's opening tag; the footer closes that container and the rest of
//! the page.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Used when the template has no recognisable closing sequence.
const DEFAULT_FOOTER: &str = "\n</div>\n</main>\n</body>\n</html>";

static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)</div>\s*(</main>.*?</body>.*?</html>)").expect("footer pattern is valid")
});

/// A literal text substitution applied to the template of pages that live
/// deeper in the output tree than the first page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

impl Rewrite {
    pub fn new(from: &str, to: &str) -> Rewrite {
        Rewrite {
            from: from.to_owned(),
            to: to.to_owned(),
        }
    }

    /// The rewrites needed to move a page from `blog/` to `blog/page/N/`.
    pub fn nested_defaults() -> Vec<Rewrite> {
        vec![
            Rewrite::new(r#"href="assets/"#, r#"href="../../assets/"#),
            Rewrite::new(r#"src="assets/"#, r#"src="../../assets/"#),
            Rewrite::new(r#"href="../images/"#, r#"href="../../../images/"#),
            Rewrite::new(r#"src="../images/"#, r#"src="../../../images/"#),
            Rewrite::new(r#"href="../css/"#, r#"href="../../../css/"#),
            Rewrite::new(r#"src="../js/"#, r#"src="../../../js/"#),
        ]
    }
}

/// Applies `rewrites` in order.
pub fn rewrite(template: &str, rewrites: &[Rewrite]) -> String {
    rewrites
        .iter()
        .fold(template.to_owned(), |text, r| text.replace(&r.from, &r.to))
}

/// The fixed parts of a listing document.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub header: String,
    pub footer: String,
}

impl Layout {
    /// Splits `template` at the first occurrence of `marker`. The header
    /// keeps the marker and any whitespace after it. Returns `None` when the
    /// marker doesn't occur.
    pub fn split(template: &str, marker: &str) -> Option<Layout> {
        let start = template.find(marker)?;
        let after_marker = start + marker.len();
        let rest = &template[after_marker..];
        let header_end = after_marker + (rest.len() - rest.trim_start().len());

        let footer = match FOOTER.captures(template).and_then(|c| c.get(1)) {
            Some(tail) => format!("\n</div>\n{}", tail.as_str()),
            None => String::from(DEFAULT_FOOTER),
        };

        Some(Layout {
            header: template[..header_end].to_owned(),
            footer,
        })
    }

    /// Surrounds `body` with the header and footer.
    pub fn wrap(&self, body: &str) -> String {
        let mut out =
            String::with_capacity(self.header.len() + body.len() + self.footer.len());
        out.push_str(&self.header);
        out.push_str(body);
        out.push_str(&self.footer);
        out
    }
}

/// Reads the first existing file among `candidates`. Returns `None` when none
/// of them exist; a candidate that exists but can't be read is an error.
pub fn load_template(candidates: &[PathBuf]) -> std::io::Result<Option<(PathBuf, String)>> {
    for candidate in candidates {
        if is_file(candidate) {
            return Ok(Some((candidate.clone(), fs::read_to_string(candidate)?)));
        }
    }
    Ok(None)
}

fn is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MARKER: &str = r#"<div class="posts-loop">"#;

    const TEMPLATE: &str = r#"<html><head><link href="assets/css/screen.css"></head>
<body><main><div class="posts-loop">
    <article>old</article>
</div>
</main>
<script src="../js/app.js"></script>
</body>
</html>
"#;

    #[test]
    fn test_split() {
        let layout = Layout::split(TEMPLATE, MARKER).expect("marker present");
        assert_eq!(
            "<html><head><link href=\"assets/css/screen.css\"></head>\n<body><main><div class=\"posts-loop\">\n    ",
            layout.header
        );
        assert_eq!(
            "\n</div>\n</main>\n<script src=\"../js/app.js\"></script>\n</body>\n</html>",
            layout.footer
        );
    }

    #[test]
    fn test_split_missing_marker() {
        assert_eq!(None, Layout::split("<html><body></body></html>", MARKER));
    }

    #[test]
    fn test_split_default_footer() {
        let layout = Layout::split(r#"<body><div class="posts-loop"></div>"#, MARKER)
            .expect("marker present");
        assert_eq!(DEFAULT_FOOTER, layout.footer);
    }

    #[test]
    fn test_wrap() {
        let layout = Layout {
            header: String::from("<h>"),
            footer: String::from("</h>"),
        };
        assert_eq!("<h>body</h>", layout.wrap("body"));
    }

    #[test]
    fn test_rewrite_nested() {
        let rewritten = rewrite(TEMPLATE, &Rewrite::nested_defaults());
        assert!(rewritten.contains(r#"href="../../assets/css/screen.css""#));
        assert!(rewritten.contains(r#"src="../../../js/app.js""#));
    }

    #[test]
    fn test_load_template_first_existing() -> std::io::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let second = dir.path().join("second.html");
        fs::write(&second, "second")?;
        let loaded = load_template(&[dir.path().join("missing.html"), second.clone()])?;
        assert_eq!(Some((second, String::from("second"))), loaded);
        assert_eq!(None, load_template(&[dir.path().join("missing.html")])?);
        Ok(())
    }
}
