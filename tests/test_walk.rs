use proptest::prelude::*;
use soap_walk::{walk, Collector, Document, Element, Node, TreeWalker};
use std::str::FromStr;

/// Builds a tree where node `i` (for `i > 0`) hangs below node `parents[i - 1] % i`.
/// Node 0 is the top-level element.
fn build_tree(parents: &[usize]) -> (Document, Vec<Vec<usize>>) {
    let mut doc = Document::new();
    let count = parents.len() + 1;
    let mut children = vec![Vec::new(); count];
    let mut elements = Vec::with_capacity(count);
    for i in 0..count {
        let elem = Element::new(&mut doc, format!("n{}", i));
        elem.push_child(&mut doc, Node::Text(format!("t{}", i)))
            .unwrap();
        elements.push(elem);
    }
    let container = doc.container();
    container
        .push_child(&mut doc, Node::Element(elements[0]))
        .unwrap();
    for (offset, choice) in parents.iter().enumerate() {
        let i = offset + 1;
        let parent = choice % i;
        elements[parent]
            .push_child(&mut doc, Node::Element(elements[i]))
            .unwrap();
        children[parent].push(i);
    }
    (doc, children)
}

fn expected_preorder(children: &[Vec<usize>], node: usize, out: &mut Vec<(String, String)>) {
    out.push((format!("n{}", node), format!("t{}", node)));
    for &child in &children[node] {
        expected_preorder(children, child, out);
    }
}

proptest! {
    #[test]
    fn walk_is_preorder_in_document_order(parents in prop::collection::vec(any::<usize>(), 0..64)) {
        let (doc, children) = build_tree(&parents);
        let mut expected = Vec::new();
        expected_preorder(&children, 0, &mut expected);

        let walker = TreeWalker::new(&doc);
        let first = walker.collect(doc.root_nodes());
        prop_assert_eq!(first.len(), parents.len() + 1);
        prop_assert_eq!(&first, &expected);

        let second = walker.collect(doc.root_nodes());
        prop_assert_eq!(first, second);
    }
}

#[test]
fn leaf_yields_one_pair() {
    let doc = Document::from_str(r#"<?xml version="1.0"?><Root>hello</Root>"#).unwrap();
    let pairs = TreeWalker::new(&doc).collect(doc.root_nodes());
    assert_eq!(pairs, vec![("Root".to_string(), "hello".to_string())]);
}

#[test]
fn siblings_keep_document_order() {
    let doc = Document::from_str(r#"<?xml version="1.0"?><Root><X/><Y/><Z/></Root>"#).unwrap();
    let mut names = Vec::new();
    walk(
        &doc,
        doc.root_nodes(),
        &mut Collector(|name: &str, _: &str| names.push(name.to_string())),
    )
    .unwrap();
    assert_eq!(names, vec!["Root", "X", "Y", "Z"]);
}

#[test]
fn own_text_excludes_descendants() {
    let xml = r#"<?xml version="1.0"?><A>before<B>inner</B>after</A>"#;
    let doc = Document::from_str(xml).unwrap();
    let pairs = TreeWalker::new(&doc).collect(doc.root_nodes());
    assert_eq!(
        pairs,
        vec![
            ("A".to_string(), "beforeafter".to_string()),
            ("B".to_string(), "inner".to_string()),
        ]
    );
}

#[test]
fn deep_parsed_tree() {
    let depth = 100_000;
    let mut xml = String::from("<?xml version=\"1.0\"?>");
    for _ in 0..depth {
        xml.push_str("<n>");
    }
    xml.push_str("leaf");
    for _ in 0..depth {
        xml.push_str("</n>");
    }
    let doc = Document::from_str(&xml).unwrap();
    let mut count = 0usize;
    let mut last_text = String::new();
    walk(
        &doc,
        doc.root_nodes(),
        &mut Collector(|_: &str, text: &str| {
            count += 1;
            last_text = text.to_string();
        }),
    )
    .unwrap();
    assert_eq!(count, depth);
    assert_eq!(last_text, "leaf");
}

#[test]
fn deep_built_tree() {
    let depth = 200_000;
    let mut doc = Document::new();
    let mut parent = doc.container();
    for _ in 0..depth {
        let elem = Element::new(&mut doc, "d");
        parent.push_child(&mut doc, Node::Element(elem)).unwrap();
        parent = elem;
    }
    assert_eq!(doc.container().descendants(&doc).count(), depth);
}

#[test]
fn walk_from_inner_sequence() {
    let xml = r#"<?xml version="1.0"?><a><b><c/></b><d/></a>"#;
    let doc = Document::from_str(xml).unwrap();
    let a = doc.root_element().unwrap();
    let pairs = TreeWalker::new(&doc).collect(a.children(&doc));
    let names: Vec<&str> = pairs.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["b", "c", "d"]);
}
