//! Navigation tree: sections with their pages as children.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::{SECTIONS, SectionSpec};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarLink {
    pub label: String,
    /// `/section-3#page-25`
    pub href: String,
    pub anchor: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarNode {
    pub id: &'static str,
    pub label: String,
    pub href: &'static str,
    pub expanded: bool,
    pub active: bool,
    pub children: Vec<SidebarLink>,
}

/// Which sections are expanded. Owned by the site shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarState {
    expanded: BTreeSet<&'static str>,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, section: &str) -> bool {
        self.expanded.contains(section)
    }

    /// Flip a section open or closed. Unknown ids are ignored.
    pub fn toggle(&mut self, section: &str) {
        let Some(spec) = SECTIONS.iter().find(|s| s.id == section) else {
            return;
        };
        if !self.expanded.remove(spec.id) {
            self.expanded.insert(spec.id);
        }
    }

    pub fn expand(&mut self, section: &SectionSpec) {
        self.expanded.insert(section.id);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// The tree to render. `active` marks the current section.
    pub fn tree(&self, lang: Language, active: Option<&str>) -> Vec<SidebarNode> {
        SECTIONS
            .iter()
            .map(|section| SidebarNode {
                id: section.id,
                label: section.title(lang).to_owned(),
                href: section.route,
                expanded: self.is_expanded(section.id),
                active: active == Some(section.id),
                children: section
                    .pages
                    .iter()
                    .map(|page| SidebarLink {
                        label: page.title(lang).to_owned(),
                        href: format!("{}#{}", section.route, page.anchor),
                        anchor: page.anchor,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_section;

    #[test]
    fn collapsed_by_default() {
        let tree = SidebarState::new().tree(Language::En, None);
        assert_eq!(tree.len(), SECTIONS.len());
        assert!(tree.iter().all(|n| !n.expanded && !n.active));
    }

    #[test]
    fn toggle_and_expand() {
        let mut s = SidebarState::new();
        s.toggle("section-3");
        assert!(s.is_expanded("section-3"));
        s.toggle("section-3");
        assert!(!s.is_expanded("section-3"));
        s.toggle("section-99");
        assert_eq!(s, SidebarState::new());

        s.expand(find_section("/section-2").unwrap());
        s.expand(find_section("/section-2").unwrap());
        assert!(s.is_expanded("section-2"));
        s.collapse_all();
        assert!(!s.is_expanded("section-2"));
    }

    #[test]
    fn children_link_to_page_anchors() {
        let mut s = SidebarState::new();
        s.toggle("section-3");
        let tree = s.tree(Language::Fr, Some("section-3"));
        let node = tree.iter().find(|n| n.id == "section-3").unwrap();
        assert!(node.expanded && node.active);
        assert_eq!(node.children[1].href, "/section-3#page-25");
        assert_eq!(node.children[1].anchor, "page-25");
    }
}
