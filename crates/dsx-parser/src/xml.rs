//! A small XML reader producing an element tree.
//!
//! Supports elements, single or double quoted attributes, self-closing tags,
//! comments, processing instructions, `<!DOCTYPE>`, CDATA and the predefined
//! entities. Character data is not kept: the DSX vocabulary carries
//! everything in attributes.

use indexmap::IndexMap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use dsx_core::XmlError;

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Element>,
    /// 1-based line of the opening tag.
    pub line: usize,
}

impl Element {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            line,
        }
    }

    /// Raw attribute value, entities already decoded.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_name_start), take_while(is_name_char)))(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        delimited(char('\''), take_till(|c: char| c == '\''), char('\'')),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        multispace1,
        separated_pair(name, tuple((multispace0, char('='), multispace0)), quoted),
    )(input)
}

/// `<name attr="v" ...>` or `<name ... />`; the flag is true when self-closing.
fn start_tag(input: &str) -> IResult<&str, (&str, Vec<(&str, &str)>, bool)> {
    tuple((
        preceded(char('<'), name),
        many0(attribute),
        preceded(multispace0, alt((value(true, tag("/>")), value(false, char('>'))))),
    ))(input)
}

fn end_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("</"), name, pair(multispace0, char('>')))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn processing_instruction(input: &str) -> IResult<&str, &str> {
    delimited(tag("<?"), take_until("?>"), tag("?>"))(input)
}

fn cdata(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>"))(input)
}

fn doctype(input: &str) -> IResult<&str, &str> {
    terminated(preceded(tag("<!DOCTYPE"), take_till(|c: char| c == '>')), char('>'))(input)
}

/// Anything between elements that carries no structure.
fn misc(input: &str) -> IResult<&str, &str> {
    alt((comment, processing_instruction, cdata, doctype))(input)
}

/// Replace predefined and numeric character entities. Unknown entities are kept verbatim.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Maps byte offsets back to line numbers.
struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            starts,
            len: source.len(),
        }
    }

    /// Line of the position where `rest` begins.
    fn line_of(&self, rest: &str) -> usize {
        let offset = self.len - rest.len();
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

/// Parse a complete document and return its root element.
pub fn parse(source: &str) -> Result<Element, XmlError> {
    let index = LineIndex::new(source);
    let mut rest = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    while !rest.is_empty() {
        let line = index.line_of(rest);

        if let Ok((remaining, _)) = misc(rest) {
            rest = remaining;
            continue;
        }
        if rest.starts_with("<!--") || rest.starts_with("<![CDATA[") || rest.starts_with("<?") {
            return Err(XmlError::new(line, "unterminated comment, CDATA or processing instruction"));
        }

        if rest.starts_with("</") {
            let (remaining, closing) =
                end_tag(rest).map_err(|_| XmlError::new(line, "malformed closing tag"))?;
            let element = stack
                .pop()
                .ok_or_else(|| XmlError::new(line, format!("unexpected closing tag </{closing}>")))?;
            if element.name != closing {
                return Err(XmlError::new(
                    line,
                    format!(
                        "closing tag </{closing}> does not match <{}> opened at line {}",
                        element.name, element.line
                    ),
                ));
            }
            attach(element, &mut stack, &mut root, line)?;
            rest = remaining;
            continue;
        }

        if rest.starts_with('<') {
            let (remaining, (tag_name, attributes, self_closing)) =
                start_tag(rest).map_err(|_| XmlError::new(line, "malformed opening tag"))?;
            let mut element = Element::new(tag_name, line);
            for (key, raw) in attributes {
                if element.attributes.contains_key(key) {
                    return Err(XmlError::new(
                        line,
                        format!("attribute '{key}' repeated on <{tag_name}>"),
                    ));
                }
                element.attributes.insert(key.to_string(), decode_entities(raw));
            }
            if self_closing {
                attach(element, &mut stack, &mut root, line)?;
            } else {
                stack.push(element);
            }
            rest = remaining;
            continue;
        }

        // Character data
        let end = rest.find('<').unwrap_or(rest.len());
        if stack.is_empty() && !rest[..end].trim().is_empty() {
            return Err(XmlError::new(line, "text outside the root element"));
        }
        rest = &rest[end..];
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::new(
            index.line_of(rest),
            format!("<{}> opened at line {} is never closed", open.name, open.line),
        ));
    }
    root.ok_or_else(|| XmlError::new(index.line_of(rest), "document has no root element"))
}

fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    line: usize,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::new(line, "document has more than one root element"));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_elements() {
        let doc = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- header -->
<dsx>
    <scene root="world" axis_length='5'/>
    <views default="cam">
        <perspective id="cam" near="0.1" far="100" angle="45">
            <from x="10" y="10" z="10" />
        </perspective>
    </views>
</dsx>"#,
        )
        .unwrap();

        assert_eq!(doc.name, "dsx");
        assert_eq!(doc.line, 3);
        assert_eq!(doc.children.len(), 2);
        let scene = doc.child("scene").unwrap();
        assert_eq!(scene.attribute("root"), Some("world"));
        assert_eq!(scene.attribute("axis_length"), Some("5"));
        let from = &doc.child("views").unwrap().children[0].children[0];
        assert_eq!(from.name, "from");
        assert_eq!(from.line, 7);
    }

    #[test]
    fn test_attribute_order_and_entities() {
        let doc = parse(r#"<t b="1" a="x &lt; y &amp; z &#65;&#x42;" c="&bogus;"/>"#).unwrap();
        let keys: Vec<_> = doc.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(doc.attribute("a"), Some("x < y & z AB"));
        assert_eq!(doc.attribute("c"), Some("&bogus;"));
    }

    #[test]
    fn test_text_and_cdata_are_ignored() {
        let doc = parse("<a>hello<![CDATA[<not a tag>]]><b/> world</a>").unwrap();
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.children[0].name, "b");
    }

    #[test]
    fn test_mismatched_tag_reports_line() {
        let err = parse("<a>\n  <b>\n  </c>\n</a>").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("</c>"));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<a>\n<b/>\n").unwrap_err();
        assert!(err.message.contains("never closed"));
    }

    #[test]
    fn test_structural_errors() {
        assert!(parse("").is_err());
        assert!(parse("<a/><b/>").is_err());
        assert!(parse("junk <a/>").is_err());
        assert!(parse(r#"<a x="1" x="2"/>"#).is_err());
        assert!(parse("<a><!-- never ends </a>").is_err());
        assert!(parse(r#"<a x="1></a>"#).is_err());
    }
}
