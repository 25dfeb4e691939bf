#![forbid(unsafe_code)]

//! Element identity, behavior tags, and selectors.
//!
//! An [`ElementId`] is an opaque handle assigned by the host document. Two
//! handles compare equal iff they name the same node. Handles are never reused
//! by a document once issued, so a removed node's id stays dead.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Opaque identity of a document node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u32);

impl ElementId {
    /// Wrap a raw host-assigned id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id as assigned by the host.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Behaviors attached to an observed element.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BehaviorTags: u8 {
        /// Receives the visible-state class on activation.
        const REVEAL = 0b0000_0001;
        /// Runs a numeric counter animation on activation.
        const COUNTER = 0b0000_0010;
        /// Owns descendants that are revealed in a staggered cascade.
        const STAGGER_CHILDREN = 0b0000_0100;
    }
}

/// A predicate over elements, mirroring the small CSS subset the page uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Element carries the class.
    Class(String),
    /// Element has the attribute (any value).
    Attribute(String),
    /// Element tag name (case-insensitive).
    Tag(String),
    /// Every inner selector matches.
    All(Vec<Selector>),
    /// At least one inner selector matches.
    Any(Vec<Selector>),
}

impl Selector {
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class(name.into())
    }

    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Conjunction of `self` and `other`.
    #[must_use]
    pub fn and(self, other: Selector) -> Self {
        match self {
            Self::All(mut parts) => {
                parts.push(other);
                Self::All(parts)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// Any of the given tag names.
    #[must_use]
    pub fn any_tag<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Any(names.into_iter().map(|n| Self::Tag(n.into())).collect())
    }

    /// Evaluate against an element described by its tag, classes and
    /// attribute lookup.
    pub fn matches<'a>(
        &self,
        tag: &str,
        mut classes: impl Iterator<Item = &'a str> + Clone,
        has_attribute: &dyn Fn(&str) -> bool,
    ) -> bool {
        match self {
            Self::Class(name) => classes.any(|c| c == name),
            Self::Attribute(name) => has_attribute(name),
            Self::Tag(name) => tag.eq_ignore_ascii_case(name),
            Self::All(parts) => parts
                .iter()
                .all(|p| p.matches(tag, classes.clone(), has_attribute)),
            Self::Any(parts) => parts
                .iter()
                .any(|p| p.matches(tag, classes.clone(), has_attribute)),
        }
    }

    /// Render as a CSS selector string for `querySelectorAll`.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Class(name) => format!(".{name}"),
            Self::Attribute(name) => format!("[{name}]"),
            Self::Tag(name) => name.to_ascii_lowercase(),
            Self::All(parts) => {
                // Tag selectors must lead a compound selector.
                let mut tags: Vec<String> = Vec::new();
                let mut rest = String::new();
                for part in parts {
                    match part {
                        Self::Tag(_) => tags.push(part.to_css()),
                        _ => rest.push_str(&part.to_css()),
                    }
                }
                format!("{}{rest}", tags.concat())
            }
            Self::Any(parts) => parts
                .iter()
                .map(Selector::to_css)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs(_: &str) -> bool {
        false
    }

    #[test]
    fn class_selector_matches() {
        let sel = Selector::class("fade-in-up");
        assert!(sel.matches("div", ["a", "fade-in-up"].into_iter(), &no_attrs));
        assert!(!sel.matches("div", ["a"].into_iter(), &no_attrs));
    }

    #[test]
    fn compound_selector_requires_all() {
        let sel = Selector::tag("img").and(Selector::attribute("data-src"));
        let has = |name: &str| name == "data-src";
        assert!(sel.matches("IMG", std::iter::empty(), &has));
        assert!(!sel.matches("div", std::iter::empty(), &has));
        assert!(!sel.matches("img", std::iter::empty(), &no_attrs));
    }

    #[test]
    fn css_rendering() {
        assert_eq!(Selector::class("x").to_css(), ".x");
        assert_eq!(
            Selector::attribute("data-src")
                .and(Selector::tag("img"))
                .to_css(),
            "img[data-src]"
        );
        assert_eq!(
            Selector::any_tag(["a", "button"]).to_css(),
            "a, button"
        );
    }

    #[test]
    fn tags_compose() {
        let tags = BehaviorTags::REVEAL | BehaviorTags::COUNTER;
        assert!(tags.contains(BehaviorTags::COUNTER));
        assert!(!tags.contains(BehaviorTags::STAGGER_CHILDREN));
    }

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId::new(7).to_string(), "#7");
    }
}
