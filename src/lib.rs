//! The library code for the `blogindex` tool, which regenerates the listing
//! pages of a blog whose articles are already rendered to HTML. The work
//! breaks down into two steps:
//!
//! 1. Reading articles from the pages on disk ([`crate::scan`], which uses
//!    [`crate::extract`] to pull the title, image, date and excerpt out of
//!    each page)
//! 2. Rendering listings back to disk ([`crate::write`] and
//!    [`crate::gallery`])
//!
//! There are two listings. The blog index holds every article, newest first,
//! split into pages of a configurable size. Each page is the existing index
//! document with its list of posts swapped out ([`crate::layout`]), so the
//! site's header, footer and assets carry over untouched.
//!
//! The projects page holds the articles of one collection (articles whose
//! page mentions a marker such as a tag name), grouped by year and laid out
//! as rows of three photos.
//!
//! [`crate::build`] stitches these steps together, one function per
//! command.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod build;
pub mod config;
pub mod escape;
pub mod extract;
pub mod gallery;
pub mod layout;
pub mod scan;
pub mod write;
