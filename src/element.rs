use crate::document::{Document, Node};
use crate::error::{Error, Result};
use crate::walker::Descendants;
use std::borrow::Cow;
use std::collections::HashMap;

/// Data of an element, stored in [`Document`].
#[derive(Debug)]
pub struct ElementData {
    full_name: String,
    attributes: HashMap<String, String>, // q:attr="val" => {"q:attr": "val"}
    namespace_decls: HashMap<String, String>, // local namespace newly defined in attributes
    parent: Option<Element>,
    children: Vec<Node>,
}

/// Represents an Xml Element.
///
/// This struct only contains a unique usize id and implements trait `Copy`.
/// So you do not need to bother with having a reference.
///
/// Because the actual data of the element is stored in [`Document`],
/// most methods takes `&Document` or `&mut Document` as its first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    id: usize,
}

impl Element {
    /// Create a new empty element with name.
    pub fn new<S: Into<String>>(document: &mut Document, name: S) -> Element {
        Self::with_data(document, name.into(), HashMap::new(), HashMap::new())
    }

    pub(crate) fn with_data(
        document: &mut Document,
        full_name: String,
        attributes: HashMap<String, String>,
        namespace_decls: HashMap<String, String>,
    ) -> Element {
        let elem = Element {
            id: document.counter,
        };
        let elem_data = ElementData {
            full_name,
            attributes,
            namespace_decls,
            parent: None,
            children: vec![],
        };
        document.store.push(elem_data);
        document.counter += 1;
        elem
    }

    pub(crate) fn container() -> (Element, ElementData) {
        let elem_data = ElementData {
            full_name: String::new(),
            attributes: HashMap::new(),
            namespace_decls: HashMap::new(),
            parent: None,
            children: Vec::new(),
        };
        let elem = Element { id: 0 };
        (elem, elem_data)
    }

    pub fn is_container(&self) -> bool {
        self.id == 0
    }

    pub fn separate_prefix_name(full_name: &str) -> (&str, &str) {
        match full_name.split_once(':') {
            Some((prefix, name)) => (prefix, name),
            None => ("", full_name),
        }
    }
}

impl Element {
    // Element ids are only handed out by the document that stores them.
    fn data<'a>(&self, document: &'a Document) -> &'a ElementData {
        &document.store[self.id]
    }

    fn mut_data<'a>(&self, document: &'a mut Document) -> &'a mut ElementData {
        &mut document.store[self.id]
    }

    /// Get raw name of element, including its namespace prefix.
    pub fn full_name<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).full_name
    }

    /// Get prefix and name of element.
    ///
    /// `<prefix:name>` -> `("prefix", "name")`
    pub fn prefix_name<'a>(&self, document: &'a Document) -> (&'a str, &'a str) {
        Self::separate_prefix_name(self.full_name(document))
    }

    /// Get namespace prefix of element, without name.
    ///
    /// `<prefix:name>` -> `"prefix"`.
    pub fn prefix<'a>(&self, document: &'a Document) -> &'a str {
        self.prefix_name(document).0
    }

    /// Local name of element, without its prefix.
    ///
    /// `<soap:Body>` -> `"Body"`.
    pub fn name<'a>(&self, document: &'a Document) -> &'a str {
        self.prefix_name(document).1
    }

    /// Get attributes of element.
    ///
    /// The attribute names may have namespace prefix. To strip the prefix and only its name, call [`Element::separate_prefix_name`].
    pub fn attributes<'a>(&self, document: &'a Document) -> &'a HashMap<String, String> {
        &self.data(document).attributes
    }

    /// Get attribute value by its raw name.
    pub fn attribute<'a>(&self, document: &'a Document, name: &str) -> Option<&'a str> {
        self.attributes(document).get(name).map(String::as_str)
    }

    /// Gets the namespace of this element.
    ///
    /// Shorthand for `self.namespace_for_prefix(document, self.prefix(document))`.
    pub fn namespace<'a>(&self, document: &'a Document) -> Option<&'a str> {
        self.namespace_for_prefix(document, self.prefix(document))
    }

    /// Gets HashMap of `prefix:namespace` declared in its attributes.
    pub fn namespace_declarations<'a>(
        &self,
        document: &'a Document,
    ) -> &'a HashMap<String, String> {
        &self.data(document).namespace_decls
    }

    /// Get namespace value given prefix, for this element.
    pub fn namespace_for_prefix<'a>(
        &self,
        document: &'a Document,
        prefix: &str,
    ) -> Option<&'a str> {
        let mut elem = *self;
        loop {
            let data = elem.data(document);
            if let Some(value) = data.namespace_decls.get(prefix) {
                return Some(value);
            }
            elem = elem.parent(document)?;
        }
    }

    pub fn parent(&self, document: &Document) -> Option<Element> {
        self.data(document).parent
    }

    pub fn has_parent(&self, document: &Document) -> bool {
        self.parent(document).is_some()
    }

    /// Child nodes in document order.
    pub fn children<'a>(&self, document: &'a Document) -> &'a [Node] {
        &self.data(document).children
    }

    pub fn has_children(&self, document: &Document) -> bool {
        !self.children(document).is_empty()
    }

    /// Child elements in document order, skipping text and other nodes.
    pub fn child_elements<'a>(&self, document: &'a Document) -> impl Iterator<Item = Element> + 'a {
        self.children(document).iter().filter_map(Node::as_element)
    }

    /// All elements below this one, in pre-order. This element is not included.
    pub fn descendants<'a>(&self, document: &'a Document) -> Descendants<'a> {
        Descendants::new(document, self.children(document))
    }

    /// First child element with the local name `name`.
    pub fn find(&self, document: &Document, name: &str) -> Option<Element> {
        self.child_elements(document)
            .find(|elem| elem.name(document) == name)
    }

    /// Every child element with the local name `name`, in document order.
    pub fn find_all<'a>(
        &self,
        document: &'a Document,
        name: &'a str,
    ) -> impl Iterator<Item = Element> + 'a {
        self.child_elements(document)
            .filter(move |elem| elem.name(document) == name)
    }

    /// Descend through child elements by local name.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: holds the path up to and including the first missing name.
    pub fn find_path(&self, document: &Document, path: &[&str]) -> Result<Element> {
        let mut elem = *self;
        for (depth, name) in path.iter().enumerate() {
            elem = elem
                .find(document, name)
                .ok_or_else(|| Error::NotFound(path[..=depth].join("/")))?;
        }
        Ok(elem)
    }

    /// Own text of the element: its direct text and CDATA children joined together.
    /// Text of descendant elements is not included.
    pub fn text<'a>(&self, document: &'a Document) -> Cow<'a, str> {
        let mut texts = self.children(document).iter().filter_map(Node::as_text);
        let first = match texts.next() {
            Some(first) => first,
            None => return Cow::Borrowed(""),
        };
        match texts.next() {
            None => Cow::Borrowed(first),
            Some(second) => {
                let mut buf = String::with_capacity(first.len() + second.len());
                buf.push_str(first);
                buf.push_str(second);
                texts.for_each(|text| buf.push_str(text));
                Cow::Owned(buf)
            }
        }
    }

    /// All text below the element in document order, descendants included.
    ///
    /// Implementation of [Node.textContent](https://developer.mozilla.org/en-US/docs/Web/API/Node/textContent)
    pub fn text_content(&self, document: &Document) -> String {
        let mut buf = String::new();
        let mut stack = vec![self.children(document).iter()];
        while let Some(nodes) = stack.last_mut() {
            match nodes.next() {
                Some(Node::Element(elem)) => stack.push(elem.children(document).iter()),
                Some(node) => {
                    if let Some(text) = node.as_text() {
                        buf.push_str(text);
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        buf
    }

    /// Equivalent to `vec.push()`.
    ///
    /// # Errors
    ///
    /// - [`Error::ContainerCannotMove`]: The container element cannot be a child.
    /// - [`Error::Cycle`]: If node is an element, it must not be `self` or an ancestor of `self`.
    /// - [`Error::HasAParent`]: If node is an element, it must not have a parent.
    pub fn push_child(&self, document: &mut Document, node: Node) -> Result<()> {
        if let Node::Element(elem) = node {
            if elem.is_container() {
                return Err(Error::ContainerCannotMove);
            }
            let mut ancestor = Some(*self);
            while let Some(current) = ancestor {
                if current == elem {
                    return Err(Error::Cycle);
                }
                ancestor = current.parent(document);
            }
            let data = elem.mut_data(document);
            if data.parent.is_some() {
                return Err(Error::HasAParent);
            }
            data.parent = Some(*self);
        }
        self.mut_data(document).children.push(node);
        Ok(())
    }
}
