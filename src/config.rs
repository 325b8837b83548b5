use crate::extract::Selectors;
use crate::layout::Rewrite;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file looked up by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "blogindex.yaml";

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct PageSize(pub usize);

impl Default for PageSize {
    fn default() -> Self {
        PageSize(6)
    }
}

/// Settings for the paginated blog index.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub page_size: PageSize,

    /// The root-relative URL of the blog.
    pub blog_path: String,

    /// The directory below the blog holding pages 2 and up.
    pub page_directory: String,

    /// Blog subdirectories that aren't articles.
    pub excluded: Vec<String>,

    /// Candidate layout documents; the first that exists is used.
    pub templates: Vec<PathBuf>,

    /// The opening tag of the posts container in the layout document.
    pub posts_marker: String,

    pub nested_rewrites: Vec<Rewrite>,

    pub article_template: Option<PathBuf>,
    pub pagination_template: Option<PathBuf>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            page_size: PageSize::default(),
            blog_path: String::from("/blog/"),
            page_directory: String::from("page"),
            excluded: ["page", "author", "tag", "public", "assets", "rss"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            templates: vec![
                PathBuf::from("/tmp/blog-index-template.html"),
                PathBuf::from("blog/index.html"),
            ],
            posts_marker: String::from(r#"<div class="posts-loop">"#),
            nested_rewrites: Rewrite::nested_defaults(),
            article_template: None,
            pagination_template: None,
        }
    }
}

/// Settings for the tag-scoped collection and its projects page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectionConfig {
    /// Any of these, found anywhere in a page, puts it in the collection.
    pub markers: Vec<String>,

    /// The years shown on the projects page, in order. The first one is
    /// the section shown as active.
    pub years: Vec<i32>,

    /// Where the projects page is written.
    pub output: PathBuf,

    pub template: Option<PathBuf>,

    /// How many articles per year the `collection` report lists.
    pub preview: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        CollectionConfig {
            markers: vec![String::from("projet-52"), String::from("tag-projet-52")],
            years: vec![2016, 2015],
            output: PathBuf::from("projects/index.html"),
            template: None,
            preview: 5,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The site directory. Relative paths in the configuration are resolved
    /// against it. This is the directory holding the project file, or the
    /// directory the search started from when there is none.
    #[serde(skip)]
    pub root_directory: PathBuf,

    pub blog_directory: PathBuf,

    /// The file name of the page inside each article directory.
    pub page_file: String,

    pub extract: Selectors,
    pub index: IndexConfig,
    pub collection: CollectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_directory: PathBuf::from("."),
            blog_directory: PathBuf::from("blog"),
            page_file: String::from("index.html"),
            extract: Selectors::default(),
            index: IndexConfig::default(),
            collection: CollectionConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from the nearest [`PROJECT_FILE`] in `dir` or
    /// one of its parents. Without one, the defaults apply with `dir` as the
    /// site directory.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = dir
            .canonicalize()
            .map_err(|e| anyhow!("Resolving directory `{}`: {}", dir.display(), e))?;
        match find_project_file(&dir) {
            Some(path) => match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            },
            None => {
                let config = Config {
                    root_directory: dir,
                    ..Config::default()
                };
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = match File::open(path) {
            Err(e) => return Err(anyhow!("Opening project file `{}`: {}", path.display(), e)),
            Ok(file) => file,
        };
        let mut config: Config = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                config.root_directory = project_root.to_owned();
                config.validate()?;
                Ok(config)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.index.page_size.0 == 0 {
            return Err(anyhow!("`index.page_size` must be at least 1"));
        }
        let blog_path = &self.index.blog_path;
        if !blog_path.starts_with('/') || !blog_path.ends_with('/') {
            return Err(anyhow!(
                "`index.blog_path` must start and end with `/`, got `{}`",
                blog_path
            ));
        }
        Ok(())
    }

    /// Resolves `path` against the site directory. Absolute paths are
    /// returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root_directory.join(path)
    }

    pub fn blog_dir(&self) -> PathBuf {
        self.resolve(&self.blog_directory)
    }

    pub fn index_templates(&self) -> Vec<PathBuf> {
        self.index.templates.iter().map(|p| self.resolve(p)).collect()
    }
}

fn find_project_file(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(PROJECT_FILE);
    if path.is_file() {
        return Some(path);
    }
    dir.parent().and_then(find_project_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().canonicalize()?, config.root_directory);
        assert_eq!(6, config.index.page_size.0);
        assert_eq!(dir.path().canonicalize()?.join("blog"), config.blog_dir());
        assert_eq!(
            vec![
                PathBuf::from("/tmp/blog-index-template.html"),
                dir.path().canonicalize()?.join("blog/index.html"),
            ],
            config.index_templates()
        );
        assert_eq!(vec![2016, 2015], config.collection.years);
        Ok(())
    }

    #[test]
    fn test_project_file_in_parent() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "blog_directory: posts
index:
  page_size: 10
  excluded: [drafts]
collection:
  years: [2020]
extract:
  title_class: entry-title
",
        )?;
        let nested = dir.path().join("posts").join("deep");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().canonicalize()?, config.root_directory);
        assert_eq!(PathBuf::from("posts"), config.blog_directory);
        assert_eq!(10, config.index.page_size.0);
        assert_eq!(vec![String::from("drafts")], config.index.excluded);
        assert_eq!("/blog/", config.index.blog_path);
        assert_eq!(vec![2020], config.collection.years);
        assert_eq!(CollectionConfig::default().markers, config.collection.markers);
        assert_eq!("entry-title", config.extract.title_class);
        assert_eq!("h1", config.extract.title_tag);
        Ok(())
    }

    #[test]
    fn test_invalid_page_size() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join(PROJECT_FILE), "index:\n  page_size: 0\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_blog_path() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join(PROJECT_FILE), "index:\n  blog_path: blog\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_directory() {
        assert!(Config::from_directory(Path::new("/definitely/not/here")).is_err());
    }
}
