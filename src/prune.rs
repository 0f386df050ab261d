//! Removing protection elements from XML parts
//!
//! Parts are streamed through a `quick_xml` reader and echoed to a writer, dropping any element
//! (and everything inside it) whose qualified name contains one of the requested fragments.
//! Matching is on the name as written, prefix included, so `sheetProtection` catches both
//! `<sheetProtection/>` and `<x:sheetProtection/>`.

use std::fmt::Display;
use std::fs;
use std::path::Path;

use log::debug;
use memchr::memmem;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::consts;
use crate::error::{UnlockError, UnlockResult};

/// The rewritten document plus the names of the elements that were taken out of it
#[derive(Debug)]
pub struct Pruned {
    pub xml: Vec<u8>,
    pub removed: Vec<String>,
}

/// Removes every element matching `fragments` from the part at `path`, rewriting it in place.
///
/// Returns the number of elements removed. The part is only overwritten once the whole document
/// has parsed, so malformed XML leaves the file as it was.
pub fn prune_elements(path: &Path, fragments: &[&str]) -> UnlockResult<usize> {
    if !path.is_file() {
        return Err(UnlockError::XmlNotFound(path.to_path_buf()));
    }
    let xml = fs::read(path)?;
    let pruned = prune_document(&xml, fragments, path)?;
    fs::write(path, &pruned.xml)?;
    if !pruned.removed.is_empty() {
        debug!(
            "Removed {} from {}",
            pruned.removed.join(", "),
            path.display()
        );
    }
    Ok(pruned.removed.len())
}

/// Does the work of [`prune_elements`] on an in-memory document. `origin` is only used to label
/// errors.
///
/// The root element is never removed. A declaration is added if the document has none, and
/// kept as is otherwise.
pub fn prune_document(xml: &[u8], fragments: &[&str], origin: &Path) -> UnlockResult<Pruned> {
    let parse_err = |e: &dyn Display| UnlockError::XmlParse {
        path: origin.to_path_buf(),
        message: e.to_string(),
    };

    if xml.starts_with(&[0xFF, 0xFE]) || xml.starts_with(&[0xFE, 0xFF]) {
        return Err(parse_err(&"UTF-16 encoded parts are not supported"));
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut removed = Vec::new();

    let mut buf = Vec::new();
    let mut depth = 0_usize;
    // Depth of the element currently being dropped, if any
    let mut skip: Option<usize> = None;
    let mut seen_root = false;
    let mut started = false;

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| parse_err(&e))?;

        if !started {
            started = true;
            if !matches!(event, Event::Decl(_)) {
                writer.get_mut().extend_from_slice(consts::XML_DECLARATION);
            }
        }

        match event {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                if skip.is_some() {
                    continue;
                }
                if depth == 1 {
                    if seen_root {
                        return Err(parse_err(&"more than one root element"));
                    }
                    seen_root = true;
                } else if let Some(name) = matching_name(e.name().as_ref(), fragments) {
                    removed.push(name);
                    skip = Some(depth);
                    continue;
                }
                writer
                    .write_event(Event::Start(e))
                    .map_err(|e| parse_err(&e))?;
            }
            Event::Empty(e) => {
                if skip.is_some() {
                    continue;
                }
                if depth == 0 {
                    if seen_root {
                        return Err(parse_err(&"more than one root element"));
                    }
                    seen_root = true;
                } else if let Some(name) = matching_name(e.name().as_ref(), fragments) {
                    removed.push(name);
                    continue;
                }
                writer
                    .write_event(Event::Empty(e))
                    .map_err(|e| parse_err(&e))?;
            }
            Event::End(e) => {
                let closing = depth;
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| parse_err(&"closing tag without an opening tag"))?;
                match skip {
                    Some(d) if d == closing => skip = None,
                    Some(_) => {}
                    None => writer
                        .write_event(Event::End(e))
                        .map_err(|e| parse_err(&e))?,
                }
            }
            Event::Text(e) if depth == 0 && !e.iter().all(u8::is_ascii_whitespace) => {
                return Err(parse_err(&"text outside the root element"));
            }
            Event::CData(_) if depth == 0 => {
                return Err(parse_err(&"CDATA outside the root element"));
            }
            ev if skip.is_some() => drop(ev),
            ev => writer.write_event(ev).map_err(|e| parse_err(&e))?,
        }
    }

    if depth != 0 {
        return Err(parse_err(&"unexpected end of document, elements left open"));
    }
    if !seen_root {
        return Err(parse_err(&"document has no root element"));
    }

    Ok(Pruned {
        xml: writer.into_inner(),
        removed,
    })
}

fn matching_name(name: &[u8], fragments: &[&str]) -> Option<String> {
    fragments
        .iter()
        .any(|f| memmem::find(name, f.as_bytes()).is_some())
        .then(|| String::from_utf8_lossy(name).into_owned())
}
