//! [`Display`] wrappers that escape values before they are spliced into
//! generated markup. Extracted titles and excerpts are decoded text, so they
//! have to be escaped again on the way out.

use pulldown_cmark::escape::{escape_href, escape_html};
use std::fmt::{self, Display};

/// Escapes a link destination for use in an `href` attribute.
pub struct EscapeHref<'a>(pub &'a str);

impl Display for EscapeHref<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut escaped = String::with_capacity(self.0.len());
        escape_href(&mut escaped, self.0).map_err(|_| fmt::Error)?;
        f.write_str(&escaped)
    }
}

/// Escapes text for use in element content or a quoted attribute value.
pub struct EscapeHtml<'a>(pub &'a str);

impl Display for EscapeHtml<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut escaped = String::with_capacity(self.0.len());
        escape_html(&mut escaped, self.0).map_err(|_| fmt::Error)?;
        f.write_str(&escaped)
    }
}
