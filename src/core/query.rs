//! Structural queries over a [`Document`].
//!
//! Relationships between elements are resolved by rule, not by stored ids:
//! a slider's label is "the first descendant of the slider's parent carrying
//! the marker class", evaluated in document order every time it is asked.

use crate::document::{Document, NodeId};

/// The subset of CSS selectors the synchronizer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `input[type="range"]`
    Slider,
    /// `.name`
    Class(String),
}

impl Selector {
    pub fn class(name: &str) -> Self {
        Selector::Class(name.to_string())
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        match self {
            Selector::Slider => is_slider(doc, id),
            Selector::Class(c) => doc.has_class(id, c),
        }
    }

    /// Equivalent CSS selector text, for hosts with a native query engine.
    pub fn css(&self) -> String {
        match self {
            Selector::Slider => "input[type=\"range\"]".to_string(),
            Selector::Class(c) => format!(".{c}"),
        }
    }
}

/// `input` element whose `type` is `range`. ASCII case-insensitive, as HTML
/// enumerated attributes are; surrounding whitespace does not match, so this
/// agrees with `input[type="range"]`.
pub fn is_slider(doc: &Document, id: NodeId) -> bool {
    doc.tag(id) == Some("input")
        && doc
            .attribute(id, "type")
            .is_some_and(|t| t.eq_ignore_ascii_case("range"))
}

pub fn query_all(doc: &Document, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
    doc.descendants(scope)
        .filter(|id| selector.matches(doc, *id))
        .collect()
}

pub fn query_first(doc: &Document, scope: NodeId, selector: &Selector) -> Option<NodeId> {
    doc.descendants(scope).find(|id| selector.matches(doc, *id))
}

/// First element under the slider's immediate parent carrying `marker`.
///
/// The parent must be an element: a slider sitting directly under the
/// document root has no container and therefore no label.
pub fn find_label(doc: &Document, slider: NodeId, marker: &str) -> Option<NodeId> {
    let parent = doc.parent(slider).filter(|p| *p != doc.root())?;
    doc.descendants(parent).find(|id| doc.has_class(*id, marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementBuilder;

    #[test]
    fn slider_detection_ignores_other_inputs() {
        let mut doc = Document::new();
        let root = doc.root();
        let tree = ElementBuilder::new("form")
            .child(ElementBuilder::new("input").attr("type", "text"))
            .child(ElementBuilder::new("input").attr("type", "RANGE"))
            .child(ElementBuilder::new("div").attr("type", "range"))
            .child(ElementBuilder::new("input").attr("type", " range "))
            .child(ElementBuilder::range("1"));
        doc.append_tree(root, &tree.into()).unwrap();

        let sliders = query_all(&doc, root, &Selector::Slider);
        assert_eq!(sliders.len(), 2);
        assert!(sliders
            .iter()
            .all(|s| doc.attribute(*s, "type").is_some_and(|t| !t.starts_with(' '))));
        assert!(sliders.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn label_lookup_is_scoped_to_the_parent() {
        let mut doc = Document::new();
        let root = doc.root();
        let tree = ElementBuilder::new("section")
            .child(ElementBuilder::new("span").class("rating-value").text("outer"))
            .child(
                ElementBuilder::new("div")
                    .child(ElementBuilder::range("3"))
                    .child(
                        ElementBuilder::new("p")
                            .child(ElementBuilder::new("span").class("rating-value").text("inner")),
                    ),
            );
        doc.append_tree(root, &tree.into()).unwrap();

        let slider = query_first(&doc, root, &Selector::Slider).unwrap();
        let label = find_label(&doc, slider, "rating-value").unwrap();
        assert_eq!(doc.text_content(label), "inner");
    }

    #[test]
    fn top_level_slider_has_no_container() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_tree(root, &ElementBuilder::range("1").into()).unwrap();
        doc.append_tree(
            root,
            &ElementBuilder::new("section")
                .child(ElementBuilder::new("span").class("rating-value").text("unrelated"))
                .into(),
        )
        .unwrap();

        let slider = query_first(&doc, root, &Selector::Slider).unwrap();
        assert_eq!(find_label(&doc, slider, "rating-value"), None);
    }

    #[test]
    fn detached_slider_has_no_label() {
        let mut doc = Document::new();
        let slider = doc.create_element("input").unwrap();
        doc.set_attribute(slider, "type", "range").unwrap();
        assert_eq!(find_label(&doc, slider, "rating-value"), None);
    }

    #[test]
    fn css_rendering() {
        assert_eq!(Selector::Slider.css(), "input[type=\"range\"]");
        assert_eq!(Selector::class("rating-value").css(), ".rating-value");
    }
}
