//! Internal link extraction and resolution.
//!
//! Markdown links (`[text](url)`) are pulled out of a page body with a single
//! regex, classified by URL shape, and internal ones are checked against the
//! set of page URLs the corpus would publish. Both sides of every lookup are
//! normalized the same way: lower-cased, `#fragment` and `?query` removed,
//! trailing `/` enforced.
//!
//! Wiki-style `[[Page]]` / `[[Page|Label]]` links are recognized by
//! [`find_wiki_links`] but never checked against the page set.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::Config;
use crate::index::{path_segments, ContentIndex, SECTION_INDEX_FILE};
use crate::models::FindingKind;

/// Absolute URLs under this prefix point at assets, not pages.
pub const ASSET_PREFIX: &str = "/images/";

static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
static WIKI_LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn link_regex() -> &'static Regex {
    LINK_REGEX.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"))
}

fn wiki_link_regex() -> &'static Regex {
    WIKI_LINK_REGEX.get_or_init(|| {
        Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("valid wiki link regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `http://` or `https://`.
    External,
    /// `mailto:` or `#fragment`.
    AnchorOrMailto,
    /// Starts with `/`; relative to the corpus root.
    AbsoluteInternal,
    /// Anything else; relative to the linking file's directory.
    RelativeInternal,
}

impl LinkKind {
    pub fn of(url: &str) -> Self {
        if url.starts_with("http://") || url.starts_with("https://") {
            LinkKind::External
        } else if url.starts_with("mailto:") || url.starts_with('#') {
            LinkKind::AnchorOrMailto
        } else if url.starts_with('/') {
            LinkKind::AbsoluteInternal
        } else {
            LinkKind::RelativeInternal
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(
            self,
            LinkKind::AbsoluteInternal | LinkKind::RelativeInternal
        )
    }
}

/// One `[text](url)` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub text: String,
    pub raw_url: String,
    pub kind: LinkKind,
}

/// One `[[Page]]` or `[[Page|Label]]` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub target: String,
    pub label: Option<String>,
}

pub fn find_links(body: &str) -> Vec<LinkReference> {
    link_regex()
        .captures_iter(body)
        .map(|cap| {
            let raw_url = cap[2].to_string();
            LinkReference {
                text: cap[1].to_string(),
                kind: LinkKind::of(&raw_url),
                raw_url,
            }
        })
        .collect()
}

pub fn find_wiki_links(body: &str) -> Vec<WikiLink> {
    wiki_link_regex()
        .captures_iter(body)
        .map(|cap| WikiLink {
            target: cap[1].to_string(),
            label: cap.get(2).map(|m| m.as_str().to_string()),
        })
        .collect()
}

/// Lower-case, drop `#fragment` and `?query`, and end with `/`.
pub fn normalize_url(url: &str) -> String {
    let path = url.split(['#', '?']).next().unwrap_or_default();
    let mut normalized = path.to_lowercase();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

/// Join `url` onto the directory containing `source` (a corpus-relative
/// file path), folding `.` and `..` lexically. Returns the corpus-root URL
/// path, or `None` if the join climbs above the root.
pub fn join_relative(source: &Path, url: &str) -> Option<String> {
    let mut segments = path_segments(source);
    segments.pop();

    let path = url.split(['#', '?']).next().unwrap_or_default();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other.to_string()),
        }
    }
    Some(format!("/{}", segments.join("/")))
}

/// Outcome of checking one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// External, anchor, or mailto link.
    Unchecked,
    /// Asset link under [`ASSET_PREFIX`].
    Exempt,
    Resolved(String),
    /// Normalized target that matched no page.
    Broken(String),
    /// Relative link that cannot be expressed inside the corpus.
    Invalid,
}

impl Resolution {
    pub fn resolves(&self) -> bool {
        !matches!(self, Resolution::Broken(_) | Resolution::Invalid)
    }

    /// Finding to report for `link`, if any.
    pub fn finding(&self, link: &LinkReference) -> Option<FindingKind> {
        match self {
            Resolution::Broken(_) => Some(FindingKind::BrokenInternalLink(link.raw_url.clone())),
            Resolution::Invalid => Some(FindingKind::InvalidRelativeLink(link.raw_url.clone())),
            _ => None,
        }
    }
}

/// URLs of every page the corpus publishes, normalized.
#[derive(Debug, Clone, Default)]
pub struct PageSet {
    urls: HashSet<String>,
}

impl PageSet {
    /// Derive page URLs from the index: `wiki/elohim.md` → `/wiki/elohim/`,
    /// `wiki/_index.md` → `/wiki/`. Section roots for the source language and
    /// every translation are always present.
    pub fn from_index(index: &ContentIndex, config: &Config) -> Self {
        let mut pages = PageSet::default();
        for file in index.files() {
            pages.insert(&page_url(&file.relative_path));
        }
        for section in config.section_names() {
            pages.insert(&format!("/{}/", section));
            for language in &config.languages.translations {
                pages.insert(&format!("/{}/{}/", language, section));
            }
        }
        pages
    }

    pub fn insert(&mut self, url: &str) {
        self.urls.insert(normalize_url(url));
    }

    /// Membership after normalizing `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(&normalize_url(url))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Published URL of a corpus-relative markdown path.
pub fn page_url(relative: &Path) -> String {
    let mut segments = path_segments(relative);
    let is_index = segments.last().is_some_and(|s| s == SECTION_INDEX_FILE);
    if is_index {
        segments.pop();
    } else if let Some(stem) = relative.file_stem() {
        segments.pop();
        segments.push(stem.to_string_lossy().to_string());
    }
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Check one link found in the file at `source` (corpus-relative).
pub fn resolve(link: &LinkReference, pages: &PageSet, source: &Path) -> Resolution {
    if !link.kind.is_checked() {
        return Resolution::Unchecked;
    }
    let target = match link.kind {
        LinkKind::External | LinkKind::AnchorOrMailto => return Resolution::Unchecked,
        LinkKind::AbsoluteInternal => {
            let target = normalize_url(&link.raw_url);
            if target.starts_with(ASSET_PREFIX) {
                return Resolution::Exempt;
            }
            target
        }
        LinkKind::RelativeInternal => match join_relative(source, &link.raw_url) {
            Some(joined) => normalize_url(&joined),
            None => return Resolution::Invalid,
        },
    };

    if pages.contains(&target) {
        Resolution::Resolved(target)
    } else {
        Resolution::Broken(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(urls: &[&str]) -> PageSet {
        let mut set = PageSet::default();
        for url in urls {
            set.insert(url);
        }
        set
    }

    fn link(url: &str) -> LinkReference {
        LinkReference {
            text: "t".to_string(),
            raw_url: url.to_string(),
            kind: LinkKind::of(url),
        }
    }

    #[test]
    fn classifies_urls() {
        assert_eq!(LinkKind::of("https://example.com"), LinkKind::External);
        assert_eq!(LinkKind::of("http://example.com"), LinkKind::External);
        assert_eq!(LinkKind::of("mailto:a@b.c"), LinkKind::AnchorOrMailto);
        assert_eq!(LinkKind::of("#top"), LinkKind::AnchorOrMailto);
        assert_eq!(LinkKind::of("/wiki/elohim/"), LinkKind::AbsoluteInternal);
        assert_eq!(LinkKind::of("../sibling"), LinkKind::RelativeInternal);
        assert_eq!(LinkKind::of("sibling"), LinkKind::RelativeInternal);
    }

    #[test]
    fn extracts_markdown_links() {
        let body = "See [Elohim](/wiki/elohim/) and ![map](/images/map.png).\n\
                    Also [site](https://example.com) and [[Raelism|the movement]].";
        let found = find_links(body);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].text, "Elohim");
        assert_eq!(found[0].raw_url, "/wiki/elohim/");
        assert_eq!(found[1].raw_url, "/images/map.png");
        assert_eq!(found[2].kind, LinkKind::External);
    }

    #[test]
    fn wiki_links_are_recognized() {
        let found = find_wiki_links("[[Elohim]] and [[Yahweh|the leader]] but not [x](y)");
        assert_eq!(
            found,
            vec![
                WikiLink {
                    target: "Elohim".to_string(),
                    label: None
                },
                WikiLink {
                    target: "Yahweh".to_string(),
                    label: Some("the leader".to_string())
                },
            ]
        );
    }

    #[test]
    fn normalizes_case_fragment_query_and_slash() {
        assert_eq!(normalize_url("/Wiki/Elohim"), "/wiki/elohim/");
        assert_eq!(normalize_url("/wiki/elohim/#origins"), "/wiki/elohim/");
        assert_eq!(normalize_url("/wiki/elohim?lang=de"), "/wiki/elohim/");
    }

    #[test]
    fn page_urls_strip_extension_and_index_files() {
        assert_eq!(page_url(Path::new("wiki/elohim.md")), "/wiki/elohim/");
        assert_eq!(page_url(Path::new("wiki/_index.md")), "/wiki/");
        assert_eq!(page_url(Path::new("de/wiki/a/_index.md")), "/de/wiki/a/");
        assert_eq!(page_url(Path::new("_index.md")), "/");
        assert_eq!(page_url(Path::new("about.md")), "/about/");
    }

    #[test]
    fn absolute_links_ignore_trailing_slash_and_case() {
        let set = pages(&["/wiki/elohim/"]);
        let source = Path::new("wiki/other.md");
        assert!(resolve(&link("/wiki/elohim"), &set, source).resolves());
        assert!(resolve(&link("/wiki/elohim/"), &set, source).resolves());
        assert!(resolve(&link("/WIKI/Elohim#top"), &set, source).resolves());
        assert_eq!(
            resolve(&link("/wiki/elohim"), &set, source),
            resolve(&link("/wiki/elohim/"), &set, source)
        );
    }

    #[test]
    fn image_links_are_exempt() {
        let set = PageSet::default();
        let result = resolve(&link("/images/anything.png"), &set, Path::new("wiki/a.md"));
        assert_eq!(result, Resolution::Exempt);
        assert!(result.finding(&link("/images/anything.png")).is_none());
    }

    #[test]
    fn anchors_and_external_are_unchecked() {
        let set = PageSet::default();
        let source = Path::new("wiki/a.md");
        assert_eq!(resolve(&link("#wiki"), &set, source), Resolution::Unchecked);
        assert_eq!(
            resolve(&link("https://nowhere.invalid"), &set, source),
            Resolution::Unchecked
        );
        assert_eq!(resolve(&link("mailto:x@y.z"), &set, source), Resolution::Unchecked);
        assert!(!LinkKind::External.is_checked());
        assert!(LinkKind::RelativeInternal.is_checked());
    }

    #[test]
    fn relative_links_join_parent_directory() {
        let source = Path::new("wiki/a/b.md");
        let present = pages(&["/wiki/sibling-page/"]);
        assert!(resolve(&link("../sibling-page"), &present, source).resolves());

        let empty = PageSet::default();
        let missing = resolve(&link("../sibling-page"), &empty, source);
        assert_eq!(missing, Resolution::Broken("/wiki/sibling-page/".to_string()));
        assert_eq!(
            missing.finding(&link("../sibling-page")),
            Some(FindingKind::BrokenInternalLink("../sibling-page".to_string()))
        );
    }

    #[test]
    fn relative_links_escaping_root_are_invalid() {
        let source = Path::new("wiki/a.md");
        let result = resolve(&link("../../outside"), &PageSet::default(), source);
        assert_eq!(result, Resolution::Invalid);
        assert_eq!(
            result.finding(&link("../../outside")),
            Some(FindingKind::InvalidRelativeLink("../../outside".to_string()))
        );
    }

    #[test]
    fn join_relative_folds_dots() {
        let source = Path::new("wiki/a/b.md");
        assert_eq!(
            join_relative(source, "./c/../d").as_deref(),
            Some("/wiki/a/d")
        );
        assert_eq!(join_relative(source, "../../").as_deref(), Some("/"));
        assert_eq!(join_relative(source, "../../../x"), None);
    }
}
