use crate::document::{Document, Node};
use crate::element::Element;
use crate::error::{Error, Result};
use encoding_rs::Decoder;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufRead, Read};
use tracing::{debug, trace};

pub(crate) struct DecodeReader<R: Read> {
    decoder: Option<Decoder>,
    inner: R,
    undecoded: [u8; 4096],
    undecoded_pos: usize,
    undecoded_cap: usize,
    remaining: [u8; 32], // Is there an encoding with > 32 bytes for a char?
    decoded: [u8; 12288],
    decoded_pos: usize,
    decoded_cap: usize,
    done: bool,
}

impl<R: Read> DecodeReader<R> {
    // If Decoder is not set, don't decode.
    pub(crate) fn new(reader: R, decoder: Option<Decoder>) -> DecodeReader<R> {
        DecodeReader {
            decoder,
            inner: reader,
            undecoded: [0; 4096],
            undecoded_pos: 0,
            undecoded_cap: 0,
            remaining: [0; 32],
            decoded: [0; 12288],
            decoded_pos: 0,
            decoded_cap: 0,
            done: false,
        }
    }

    pub(crate) fn set_decoder(&mut self, dec: Option<Decoder>) {
        self.decoder = dec;
        self.done = false;
    }

    fn fill_buf_decode(&mut self) -> std::io::Result<&[u8]> {
        // A decode step writes nothing when it only got part of a character.
        while self.decoded_pos >= self.decoded_cap {
            debug_assert!(self.decoded_pos == self.decoded_cap);
            if self.done && self.undecoded_pos >= self.undecoded_cap {
                return Ok(&[]);
            }
            let remaining = self.undecoded_cap - self.undecoded_pos;
            if remaining <= 32 {
                // Move remaining undecoded bytes at the end to start
                self.remaining[..remaining]
                    .copy_from_slice(&self.undecoded[self.undecoded_pos..self.undecoded_cap]);
                self.undecoded[..remaining].copy_from_slice(&self.remaining[..remaining]);
                let read = self.inner.read(&mut self.undecoded[remaining..])?;
                self.done = read == 0;
                self.undecoded_pos = 0;
                self.undecoded_cap = remaining + read;
            }

            let decoder = match self.decoder.as_mut() {
                Some(decoder) => decoder,
                None => return Ok(&[]),
            };
            let (_res, read, written, _replaced) = decoder.decode_to_utf8(
                &self.undecoded[self.undecoded_pos..self.undecoded_cap],
                &mut self.decoded,
                self.done,
            );
            self.undecoded_pos += read;
            self.decoded_cap = written;
            self.decoded_pos = 0;
        }
        Ok(&self.decoded[self.decoded_pos..self.decoded_cap])
    }

    /// Buffers at least `amt` undecoded bytes, fewer only if the input ends first.
    pub(crate) fn peek_raw(&mut self, amt: usize) -> std::io::Result<&[u8]> {
        if self.undecoded_pos > 0 {
            self.undecoded
                .copy_within(self.undecoded_pos..self.undecoded_cap, 0);
            self.undecoded_cap -= self.undecoded_pos;
            self.undecoded_pos = 0;
        }
        while self.undecoded_cap < amt {
            let read = self.inner.read(&mut self.undecoded[self.undecoded_cap..])?;
            if read == 0 {
                break;
            }
            self.undecoded_cap += read;
        }
        Ok(&self.undecoded[..self.undecoded_cap])
    }

    fn fill_buf_without_decode(&mut self) -> std::io::Result<&[u8]> {
        if self.undecoded_pos >= self.undecoded_cap {
            debug_assert!(self.undecoded_pos == self.undecoded_cap);
            self.undecoded_cap = self.inner.read(&mut self.undecoded)?;
            self.undecoded_pos = 0;
        }
        Ok(&self.undecoded[self.undecoded_pos..self.undecoded_cap])
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let available = self.fill_buf()?;
        let amt = std::cmp::min(available.len(), buf.len());
        buf[..amt].copy_from_slice(&available[..amt]);
        self.consume(amt);
        Ok(amt)
    }
}

impl<R: Read> BufRead for DecodeReader<R> {
    // Decoder may change from None to Some.
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        match &self.decoder {
            Some(_) => self.fill_buf_decode(),
            None => self.fill_buf_without_decode(),
        }
    }
    fn consume(&mut self, amt: usize) {
        match &self.decoder {
            Some(_) => {
                self.decoded_pos = std::cmp::min(self.decoded_pos + amt, self.decoded_cap);
            }
            None => {
                self.undecoded_pos = std::cmp::min(self.undecoded_pos + amt, self.undecoded_cap);
            }
        }
    }
}

/// Options when parsing xml.
///
/// `trim_text`: whitespace around text is removed, and whitespace-only text between tags
/// is dropped. `<key> 22 </key>` has text `"22"` when set, `" 22 "` otherwise.
///
/// `require_decl`: the document must start with an XML declaration (`<?xml ... ?>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub trim_text: bool,
    pub require_decl: bool,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions {
            trim_text: false,
            require_decl: true,
        }
    }
}

pub(crate) struct DocumentParser {
    document: Document,
    read_opts: ReadOptions,
    encoding: Option<String>,
}

impl DocumentParser {
    pub(crate) fn new(opts: ReadOptions) -> DocumentParser {
        DocumentParser {
            document: Document::new(),
            read_opts: opts,
            encoding: None,
        }
    }

    pub(crate) fn parse_reader<R: Read>(reader: R, opts: ReadOptions) -> Result<Document> {
        let mut parser = DocumentParser::new(opts);
        parser.parse_start(reader)?;
        debug!(
            elements = parser.document.element_count(),
            "parsed document"
        );
        Ok(parser.document)
    }

    fn handle_decl(&mut self, ev: &BytesDecl) -> Result<()> {
        self.document.version = String::from_utf8(ev.version()?.to_vec())?;
        self.encoding = match ev.encoding() {
            Some(res) => Some(String::from_utf8(res?.to_vec())?),
            None => None,
        };
        self.document.encoding = self.encoding.clone();
        self.document.standalone = match ev.standalone() {
            Some(res) => {
                let val = std::str::from_utf8(&*res?)?.to_lowercase();
                if val == "yes" {
                    true
                } else if val == "no" {
                    false
                } else {
                    return Err(Error::MalformedXML(
                        "Standalone Document Declaration has non boolean value".to_string(),
                    ));
                }
            }
            None => false,
        };
        Ok(())
    }

    fn handle_bytes_start(&mut self, parent: Element, ev: &BytesStart) -> Result<Element> {
        let mut_doc = &mut self.document;
        let full_name = String::from_utf8(ev.name().to_vec())?;
        let mut attributes = HashMap::new();
        let mut namespaces = HashMap::new();
        for attr in ev.attributes() {
            let attr = attr?;
            let key = String::from_utf8(attr.key.to_vec())?;
            let value = String::from_utf8(attr.unescaped_value()?.to_vec())?;
            if key == "xmlns" {
                namespaces.insert(String::new(), value);
                continue;
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.insert(prefix.to_owned(), value);
                continue;
            }
            attributes.insert(key, value);
        }
        let element = Element::with_data(mut_doc, full_name, attributes, namespaces);
        parent.push_child(mut_doc, Node::Element(element))?;
        Ok(element)
    }

    fn push_to_current(&mut self, element_stack: &[Element], node: Node) -> Result<()> {
        let parent = current(element_stack)?;
        parent.push_child(&mut self.document, node)
    }

    // Look at the document decl and figure out the document encoding
    fn parse_start<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut decode_reader = DecodeReader::new(reader, None);

        let (init_encoding, bom_len) = match decode_reader.peek_raw(4)? {
            [0xfe, 0xff, ..] => (Some(UTF_16BE), 2),
            [0xff, 0xfe, ..] => (Some(UTF_16LE), 2),
            [0xef, 0xbb, 0xbf, ..] => (None, 3),
            [0x00, 0x3c, 0x00, 0x3f, ..] => (Some(UTF_16BE), 0),
            [0x3c, 0x00, 0x3f, 0x00, ..] => (Some(UTF_16LE), 0),
            // Anything else is read as UTF-8 until a declaration says otherwise.
            _ => (None, 0),
        };
        decode_reader.consume(bom_len);
        decode_reader.set_decoder(init_encoding.map(|e| e.new_decoder_without_bom_handling()));

        let mut xmlreader = Reader::from_reader(decode_reader);
        xmlreader.trim_text(self.read_opts.trim_text);
        let mut element_stack: Vec<Element> = vec![self.document.container()];

        let mut buf = Vec::with_capacity(150);
        let xmlreader = loop {
            match xmlreader.read_event(&mut buf)? {
                // Untrimmed readers report the empty text before the declaration.
                Event::Text(ref ev) if ev.is_empty() => {}
                Event::Decl(ev) => {
                    self.handle_decl(&ev)?;
                    break self.switch_encoding(xmlreader, init_encoding)?;
                }
                _ if self.read_opts.require_decl => {
                    return Err(Error::MalformedXML(
                        "Didn't find XML Declaration at the start of file".to_string(),
                    ));
                }
                event => {
                    if self.handle_event(&mut element_stack, event)? {
                        return Ok(());
                    }
                    break xmlreader;
                }
            }
            buf.clear();
        };
        self.parse_content(xmlreader, element_stack)
    }

    fn switch_encoding<R: Read>(
        &self,
        xmlreader: Reader<DecodeReader<R>>,
        init_encoding: Option<&'static Encoding>,
    ) -> Result<Reader<DecodeReader<R>>> {
        let encoding_str = match &self.encoding {
            Some(encoding_str) => encoding_str,
            None => return Ok(xmlreader),
        };
        let encoding = Encoding::for_label(encoding_str.as_bytes()).ok_or(Error::CannotDecode)?;
        let encoding = if encoding == UTF_8 {
            None
        } else {
            Some(encoding)
        };
        // Encoding::for_label("UTF-16") defaults to UTF-16 LE, even though it could be UTF-16 BE
        if encoding == init_encoding || (encoding == Some(UTF_16LE) && init_encoding == Some(UTF_16BE))
        {
            return Ok(xmlreader);
        }
        debug!(encoding = encoding_str.as_str(), "switching document encoding");
        let mut decode_reader = xmlreader.into_underlying_reader();
        decode_reader.set_decoder(encoding.map(|e| e.new_decoder_without_bom_handling()));
        let mut xmlreader = Reader::from_reader(decode_reader);
        xmlreader.trim_text(self.read_opts.trim_text);
        Ok(xmlreader)
    }

    fn text_node(&self, content: String) -> Option<Node> {
        if content.is_empty() {
            return None;
        }
        if !self.read_opts.trim_text {
            return Some(Node::Text(content));
        }
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == content.len() {
            Some(Node::Text(content))
        } else {
            Some(Node::Text(trimmed.to_string()))
        }
    }

    // Returns if document parsing is finished.
    fn handle_event(&mut self, element_stack: &mut Vec<Element>, event: Event) -> Result<bool> {
        trace!(?event, depth = element_stack.len() - 1, "xml event");
        match event {
            Event::Start(ref ev) => {
                let parent = current(element_stack)?;
                let element = self.handle_bytes_start(parent, ev)?;
                element_stack.push(element);
                Ok(false)
            }
            Event::End(_) => {
                // quick-xml checks if tag names match for us
                if element_stack.len() <= 1 {
                    return Err(Error::MalformedXML(
                        "Closing tag without an opening tag".to_string(),
                    ));
                }
                element_stack.pop();
                Ok(false)
            }
            Event::Empty(ref ev) => {
                let parent = current(element_stack)?;
                self.handle_bytes_start(parent, ev)?;
                Ok(false)
            }
            Event::Text(ev) => {
                let content = String::from_utf8(ev.unescaped()?.to_vec())?;
                if let Some(node) = self.text_node(content) {
                    self.push_to_current(element_stack, node)?;
                }
                Ok(false)
            }
            Event::DocType(ev) => {
                let content = String::from_utf8(ev.to_vec())?;
                self.push_to_current(element_stack, Node::DocType(content))?;
                Ok(false)
            }
            // Comment and PI content is not escaped.
            Event::Comment(ev) => {
                let content = String::from_utf8(ev.to_vec())?;
                self.push_to_current(element_stack, Node::Comment(content))?;
                Ok(false)
            }
            // quick-xml hands CDATA content over escaped.
            Event::CData(ev) => {
                let content = String::from_utf8(ev.unescaped()?.to_vec())?;
                self.push_to_current(element_stack, Node::CData(content))?;
                Ok(false)
            }
            Event::PI(ev) => {
                let content = String::from_utf8(ev.to_vec())?;
                self.push_to_current(element_stack, Node::PI(content))?;
                Ok(false)
            }
            Event::Decl(_) => Err(Error::MalformedXML(
                "XML Declaration is only allowed at the start of file".to_string(),
            )),
            Event::Eof => {
                if element_stack.len() > 1 {
                    let unclosed = current(element_stack)?;
                    return Err(Error::MalformedXML(format!(
                        "Unclosed tag <{}>",
                        unclosed.full_name(&self.document)
                    )));
                }
                Ok(true)
            }
        }
    }

    fn parse_content<B: BufRead>(
        &mut self,
        mut reader: Reader<B>,
        mut element_stack: Vec<Element>,
    ) -> Result<()> {
        let mut buf = Vec::with_capacity(200); // reduce time increasing capacity at start.

        loop {
            let ev = reader.read_event(&mut buf)?;
            if self.handle_event(&mut element_stack, ev)? {
                return Ok(());
            }
            buf.clear();
        }
    }
}

fn current(element_stack: &[Element]) -> Result<Element> {
    element_stack
        .last()
        .copied()
        .ok_or_else(|| Error::MalformedXML("Element stack is empty".to_string()))
}
