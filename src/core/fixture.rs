use std::fs;
use std::path::Path;

use crate::config::SyncConfig;
use crate::document::{Document, NodeTree};
use crate::error::LoadError;

/// Parse a JSON page: either a single node tree or an array of top-level
/// nodes, all appended under the document root.
pub fn document_from_json(raw: &str) -> Result<Document, LoadError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let trees: Vec<NodeTree> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };

    let mut doc = Document::new();
    let root = doc.root();
    for tree in &trees {
        doc.append_tree(root, tree)?;
    }
    Ok(doc)
}

pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let raw = fs::read_to_string(path)?;
    document_from_json(&raw)
}

pub fn load_config(path: &Path) -> Result<SyncConfig, LoadError> {
    let raw = fs::read_to_string(path)?;
    Ok(SyncConfig::from_json_str(&raw)?)
}

/// Serialize the children of the document root as a JSON array.
pub fn document_to_json(doc: &Document) -> Result<String, LoadError> {
    let trees: Vec<NodeTree> = doc
        .children(doc.root())
        .iter()
        .filter_map(|id| doc.to_tree(*id))
        .collect();
    Ok(serde_json::to_string_pretty(&trees)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Page;
    use crate::query::{self, Selector};
    use crate::sync;

    const PAGE: &str = r#"
        {"tag": "div", "children": [
            {"tag": "input", "attrs": {"type": "range", "min": "0", "max": "10", "value": "5"}},
            {"tag": "span", "attrs": {"class": "rating-value"}, "children": [{"text": "5"}]}
        ]}
    "#;

    #[test]
    fn loads_single_tree() {
        let doc = document_from_json(PAGE).unwrap();
        let root = doc.root();
        let slider = query::query_first(&doc, root, &Selector::Slider).unwrap();
        assert_eq!(doc.value(slider), Some("5"));
        let label = query::find_label(&doc, slider, "rating-value").unwrap();
        assert_eq!(doc.text_content(label), "5");
    }

    #[test]
    fn loads_array_and_writes_back() {
        let raw = format!("[{PAGE}, {{\"text\": \"tail\"}}]");
        let doc = document_from_json(&raw).unwrap();
        assert_eq!(doc.children(doc.root()).len(), 2);

        let out = document_to_json(&doc).unwrap();
        let again = document_from_json(&out).unwrap();
        assert_eq!(again.text_content(again.root()), doc.text_content(doc.root()));
    }

    #[test]
    fn top_level_slider_is_not_paired_with_a_distant_label() {
        let raw = r#"[
            {"tag": "input", "attrs": {"type": "range", "value": "1"}},
            {"tag": "section", "children": [
                {"tag": "span", "attrs": {"class": "rating-value"}, "children": [{"text": "unrelated"}]}
            ]}
        ]"#;
        let mut page = Page::new(document_from_json(raw).unwrap());
        let installed = sync::install(&mut page, SyncConfig::default());
        page.finish_parsing();
        assert!(installed.subscriptions().is_empty());

        let doc = page.document();
        let slider = query::query_first(doc, doc.root(), &Selector::Slider).unwrap();
        page.drag(slider, "9").unwrap();
        let doc = page.document();
        let label = query::query_first(doc, doc.root(), &Selector::class("rating-value")).unwrap();
        assert_eq!(doc.text_content(label), "unrelated");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            document_from_json("{\"tag\": "),
            Err(LoadError::Json(_))
        ));
    }
}
