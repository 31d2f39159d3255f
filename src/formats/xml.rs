//! XML-flavored resource format.
//!
//! A document is a `<localizations>` container holding one `<localization>`
//! element per culture, or a single bare `<localization>` root:
//!
//! ```xml
//! <localizations>
//!   <localization culture="en-US" priority="100">
//!     <entry key="Title">Home</entry>
//!     <node name="Account">
//!       <entry key="SignIn">Sign in</entry>
//!     </node>
//!   </localization>
//! </localizations>
//! ```
//!
//! Unknown elements and attributes are collected and reported after the
//! parse, the same way the JSON format rejects unrecognized fields.
//!
//! Whitespace-only input is a structural error here: a non-empty XML document
//! must contain a root element. Only the fully empty string is tolerated as
//! "no localizations". The JSON format deliberately differs, see
//! [`crate::formats::json`].

use std::sync::Arc;

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{
    culture,
    error::Error,
    resource::Resource,
    types::{Localization, LocalizationNode},
};

use super::unrecognized_fields;

/// Parses an XML resource into zero or more localizations.
pub fn parse(resource: &Arc<Resource>, raw: &str) -> Result<Vec<Localization>, Error> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    if raw.trim().is_empty() {
        return Err(Error::invalid_resource(
            resource.identity(),
            "whitespace-only document has no root element",
        ));
    }

    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut localizations = Vec::new();
    let mut unknown = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"localizations" => {
                    collect_unknown_attributes(e, "localizations", resource, &mut unknown)?;
                }
                b"localization" => {
                    let localization =
                        parse_localization(&mut reader, e, false, resource, &mut unknown)?;
                    localizations.push(localization);
                }
                other => {
                    unknown.push(String::from_utf8_lossy(other).into_owned());
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"localizations" => {}
                b"localization" => {
                    let localization =
                        parse_localization(&mut reader, e, true, resource, &mut unknown)?;
                    localizations.push(localization);
                }
                other => unknown.push(String::from_utf8_lossy(other).into_owned()),
            },
            Ok(Event::End(_)) => {}
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(Error::invalid_resource(
                    resource.identity(),
                    format!("invalid XML: {err}"),
                ));
            }
        }
    }

    if !unknown.is_empty() {
        return Err(unrecognized_fields(resource.as_ref(), &unknown));
    }
    Ok(localizations)
}

/// Lightweight well-formedness check; content is discarded.
///
/// Mirrors [`parse`]: the empty string is acceptable, a whitespace-only or
/// rootless document is not.
pub fn check_syntax(raw: &str) -> Result<(), Error> {
    if raw.is_empty() {
        return Ok(());
    }
    if raw.trim().is_empty() {
        return Err(Error::invalid_resource(
            "(syntax check)",
            "whitespace-only document has no root element",
        ));
    }

    let mut reader = Reader::from_str(raw);
    let mut depth = 0usize;
    let mut seen_root = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                if depth == 0 && seen_root {
                    return Err(Error::invalid_resource(
                        "(syntax check)",
                        "document has more than one root element",
                    ));
                }
                depth += 1;
                seen_root = true;
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Empty(_)) => {
                if depth == 0 && seen_root {
                    return Err(Error::invalid_resource(
                        "(syntax check)",
                        "document has more than one root element",
                    ));
                }
                seen_root = true;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(Error::XmlParse)?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(Error::invalid_resource(
                        "(syntax check)",
                        "content outside the root element",
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }
    if depth != 0 {
        Err(Error::invalid_resource(
            "(syntax check)",
            "unclosed element at end of document",
        ))
    } else if !seen_root {
        Err(Error::invalid_resource(
            "(syntax check)",
            "document has no root element",
        ))
    } else {
        Ok(())
    }
}

fn parse_localization(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    empty_element: bool,
    resource: &Arc<Resource>,
    unknown: &mut Vec<String>,
) -> Result<Localization, Error> {
    let mut culture_name = None;
    let mut priority = None;

    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::invalid_resource(resource.identity(), e.to_string()))?;
        match attr.key.as_ref() {
            b"culture" => {
                let value = attr.unescape_value()?.to_string();
                if !culture::is_well_formed(&value) {
                    tracing::debug!(culture = %value, resource = %resource.identity(),
                        "culture name does not look like a language identifier");
                }
                culture_name = Some(value);
            }
            b"priority" => {
                let value = attr.unescape_value()?.to_string();
                priority = Some(value.parse::<i32>().map_err(|_| {
                    Error::invalid_resource(
                        resource.identity(),
                        format!("priority `{}` is not an integer", value),
                    )
                })?);
            }
            other => unknown.push(format!(
                "localization@{}",
                String::from_utf8_lossy(other)
            )),
        }
    }

    let mut localization = Localization::new(culture_name, priority);
    if !empty_element {
        parse_children(reader, &mut localization.root, "", resource, unknown)?;
    }
    localization.resource = Some(Arc::clone(resource));
    Ok(localization)
}

// Consumes children up to and including the enclosing end tag. Mismatched
// end tags are caught by the reader itself.
fn parse_children(
    reader: &mut Reader<&[u8]>,
    node: &mut LocalizationNode,
    path: &str,
    resource: &Arc<Resource>,
    unknown: &mut Vec<String>,
) -> Result<(), Error> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"entry" => {
                    let (key, value) = parse_entry(reader, e, path, false, resource, unknown)?;
                    insert_entry(node, path, key, value, resource)?;
                }
                b"node" => {
                    let name = node_name(e, path, resource, unknown)?;
                    let child_path = joined(path, &name);
                    let mut child = LocalizationNode::new(name);
                    parse_children(reader, &mut child, &child_path, resource, unknown)?;
                    node.nodes.push(child);
                }
                other => {
                    unknown.push(joined(path, &String::from_utf8_lossy(other)));
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"entry" => {
                    let (key, value) = parse_entry(reader, e, path, true, resource, unknown)?;
                    insert_entry(node, path, key, value, resource)?;
                }
                b"node" => {
                    let name = node_name(e, path, resource, unknown)?;
                    node.nodes.push(LocalizationNode::new(name));
                }
                other => unknown.push(joined(path, &String::from_utf8_lossy(other))),
            },
            Ok(Event::End(_)) => return Ok(()),
            Ok(Event::Eof) => {
                return Err(Error::invalid_resource(
                    resource.identity(),
                    "unexpected EOF inside element",
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }
}

fn parse_entry(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    path: &str,
    empty_element: bool,
    resource: &Arc<Resource>,
    unknown: &mut Vec<String>,
) -> Result<(String, String), Error> {
    let mut key = None;
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::invalid_resource(resource.identity(), e.to_string()))?;
        match attr.key.as_ref() {
            b"key" => key = Some(attr.unescape_value()?.to_string()),
            other => unknown.push(format!(
                "{}@{}",
                joined(path, "entry"),
                String::from_utf8_lossy(other)
            )),
        }
    }
    let key = key.ok_or_else(|| {
        Error::invalid_resource(resource.identity(), "entry element missing 'key'")
    })?;

    if empty_element {
        return Ok((key, String::new()));
    }

    let mut value = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => value.push_str(&e.unescape().map_err(Error::XmlParse)?),
            Ok(Event::CData(e)) => value.push_str(&String::from_utf8_lossy(&e)),
            // Entry values are text only. Child markup is recorded as
            // unrecognized and skipped whole, so its end tag cannot be
            // mistaken for this entry's and shift later entries to the
            // wrong parent.
            Ok(Event::Start(ref e)) => {
                unknown.push(joined(
                    &joined(path, "entry"),
                    &String::from_utf8_lossy(e.name().as_ref()),
                ));
                reader.read_to_end(e.name())?;
            }
            Ok(Event::Empty(ref e)) => unknown.push(joined(
                &joined(path, "entry"),
                &String::from_utf8_lossy(e.name().as_ref()),
            )),
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(Error::invalid_resource(
                    resource.identity(),
                    "unexpected EOF inside entry",
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e)),
        }
    }
    Ok((key, value))
}

fn insert_entry(
    node: &mut LocalizationNode,
    path: &str,
    key: String,
    value: String,
    resource: &Arc<Resource>,
) -> Result<(), Error> {
    if !node.try_insert_entry(key.clone(), value) {
        return Err(Error::invalid_resource(
            resource.identity(),
            format!(
                "entry `{}` collides case-insensitively with an existing key",
                joined(path, &key)
            ),
        ));
    }
    Ok(())
}

fn node_name(
    start: &BytesStart,
    path: &str,
    resource: &Arc<Resource>,
    unknown: &mut Vec<String>,
) -> Result<String, Error> {
    let mut name = None;
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::invalid_resource(resource.identity(), e.to_string()))?;
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value()?.to_string()),
            other => unknown.push(format!(
                "{}@{}",
                joined(path, "node"),
                String::from_utf8_lossy(other)
            )),
        }
    }
    name.ok_or_else(|| Error::invalid_resource(resource.identity(), "node element missing 'name'"))
}

fn collect_unknown_attributes(
    start: &BytesStart,
    context: &str,
    resource: &Arc<Resource>,
    unknown: &mut Vec<String>,
) -> Result<(), Error> {
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::invalid_resource(resource.identity(), e.to_string()))?;
        unknown.push(format!(
            "{}@{}",
            context,
            String::from_utf8_lossy(attr.key.as_ref())
        ));
    }
    Ok(())
}

fn joined(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}
