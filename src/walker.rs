//! Pre-order walk over element trees.
//!
//! [`TreeWalker`] visits every element reachable from a sequence of sibling nodes,
//! a node before its descendants and siblings in document order, and reports the
//! element's local name and own text to a [`Sink`].
//!
//! Traversal keeps its pending siblings on an explicit stack, so the depth of the
//! tree is limited by memory and not by the call stack.

use crate::document::{Document, Node};
use crate::element::Element;
use std::convert::Infallible;
use std::io::Write;
use std::slice;
use tracing::{debug, trace};

/// Receives `(name, text)` pairs in the order a walk produces them.
pub trait Sink {
    type Error;

    fn emit(&mut self, name: &str, text: &str) -> Result<(), Self::Error>;
}

impl Sink for Vec<(String, String)> {
    type Error = Infallible;

    fn emit(&mut self, name: &str, text: &str) -> Result<(), Infallible> {
        self.push((name.to_string(), text.to_string()));
        Ok(())
    }
}

/// Sink that hands every pair to a closure.
pub struct Collector<F>(pub F);

impl<F: FnMut(&str, &str)> Sink for Collector<F> {
    type Error = Infallible;

    fn emit(&mut self, name: &str, text: &str) -> Result<(), Infallible> {
        (self.0)(name, text);
        Ok(())
    }
}

/// Sink writing one `name===text` line per element.
pub struct WriteSink<W: Write> {
    writer: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(writer: W) -> WriteSink<W> {
        WriteSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriteSink<W> {
    type Error = std::io::Error;

    fn emit(&mut self, name: &str, text: &str) -> std::io::Result<()> {
        writeln!(self.writer, "{}==={}", name, text)
    }
}

/// Pre-order iterator over the elements reachable from a sequence of sibling nodes.
///
/// Nodes that are not elements are skipped, along with everything they would contain.
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<slice::Iter<'a, Node>>,
}

impl<'a> Descendants<'a> {
    pub fn new(document: &'a Document, nodes: &'a [Node]) -> Descendants<'a> {
        Descendants {
            document,
            stack: vec![nodes.iter()],
        }
    }

    /// Number of sibling sequences still pending. Equals the depth of the last
    /// yielded element plus one, until its children are exhausted.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        while let Some(siblings) = self.stack.last_mut() {
            match siblings.next() {
                Some(Node::Element(elem)) => {
                    let elem = *elem;
                    self.stack.push(elem.children(self.document).iter());
                    return Some(elem);
                }
                Some(_) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Walks element trees owned by a [`Document`] without modifying them.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    document: &'a Document,
}

impl<'a> TreeWalker<'a> {
    pub fn new(document: &'a Document) -> TreeWalker<'a> {
        TreeWalker { document }
    }

    /// Emit `(name, text)` for every element reachable from `nodes`, in pre-order.
    ///
    /// Stops at the first error returned by the sink.
    pub fn walk<S: Sink + ?Sized>(&self, nodes: &'a [Node], sink: &mut S) -> Result<(), S::Error> {
        let mut count = 0usize;
        for elem in Descendants::new(self.document, nodes) {
            let name = elem.name(self.document);
            let text = elem.text(self.document);
            trace!(name, text = &*text, "visit element");
            sink.emit(name, &text)?;
            count += 1;
        }
        debug!(elements = count, "walk finished");
        Ok(())
    }

    /// Walk `nodes` and return the emitted pairs.
    pub fn collect(&self, nodes: &'a [Node]) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        match self.walk(nodes, &mut pairs) {
            Ok(()) => pairs,
            Err(never) => match never {},
        }
    }
}

/// Shorthand for [`TreeWalker::walk`].
pub fn walk<'a, S: Sink + ?Sized>(
    document: &'a Document,
    nodes: &'a [Node],
    sink: &mut S,
) -> Result<(), S::Error> {
    TreeWalker::new(document).walk(nodes, sink)
}
