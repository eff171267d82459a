use winnow::combinator::{opt, preceded, repeat};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_until, take_while};

use crate::types::ParseNode;

// -- Whitespace ---------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

// -- Names --------------------------------------------------------------------

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
        }),
    )
        .take()
        .parse_next(input)
}

// -- Attributes ---------------------------------------------------------------

// Double-quoted value with the five standard entities.
fn attr_value(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '&' => {
                let body = take_until(1.., ";").parse_next(input)?;
                ';'.parse_next(input)?;
                let decoded = match body {
                    "amp" => '&',
                    "lt" => '<',
                    "gt" => '>',
                    "quot" => '"',
                    "apos" => '\'',
                    _ => return Err(ErrMode::from_input(input).cut()),
                };
                s.push(decoded);
            }
            c => s.push(c),
        }
    }
}

fn attribute(input: &mut &str) -> ModalResult<(String, String)> {
    let key = name.parse_next(input)?;
    ws.parse_next(input)?;
    '='.parse_next(input)?;
    ws.parse_next(input)?;
    let value = attr_value
        .context(StrContext::Expected(StrContextValue::Description(
            "attribute value",
        )))
        .parse_next(input)?;
    Ok((key.to_owned(), value))
}

// -- Comments & declaration -----------------------------------------------------

fn comment(input: &mut &str) -> ModalResult<ParseNode> {
    "<!--".parse_next(input)?;
    let _ = take_until(0.., "-->").parse_next(input)?;
    "-->".parse_next(input)?;
    Ok(ParseNode::comment())
}

fn declaration(input: &mut &str) -> ModalResult<()> {
    "<?".parse_next(input)?;
    let _ = take_until(0.., "?>").parse_next(input)?;
    "?>".void().parse_next(input)
}

// Text content carries no meaning in this dialect and is skipped.
fn text(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c != '<')
        .void()
        .parse_next(input)
}

// -- Elements -------------------------------------------------------------------

fn element(input: &mut &str) -> ModalResult<ParseNode> {
    '<'.parse_next(input)?;
    let tag = name
        .context(StrContext::Expected(StrContextValue::Description(
            "tag name",
        )))
        .parse_next(input)?;
    let mut node = ParseNode::element(tag);

    let attrs: Vec<(String, String)> =
        repeat(0.., preceded(ws, attribute)).parse_next(input)?;
    for (key, value) in attrs {
        node = node.attr(&key, &value);
    }

    ws.parse_next(input)?;
    if opt("/>").parse_next(input)?.is_some() {
        return Ok(node);
    }
    '>'.context(StrContext::Expected(StrContextValue::CharLiteral('>')))
        .parse_next(input)?;

    loop {
        let _ = opt(text).parse_next(input)?;
        if opt("</").parse_next(input)?.is_some() {
            let end = name.parse_next(input)?;
            if end != node.tag() {
                return Err(ErrMode::from_input(input).cut());
            }
            ws.parse_next(input)?;
            '>'.parse_next(input)?;
            return Ok(node);
        }
        if let Some(c) = opt(comment).parse_next(input)? {
            node.push_child(c);
            continue;
        }
        let child = element
            .context(StrContext::Expected(StrContextValue::Description(
                "element",
            )))
            .parse_next(input)?;
        node.push_child(child);
    }
}

// -- Top-level parser -------------------------------------------------------------

pub(super) fn document(input: &mut &str) -> ModalResult<ParseNode> {
    ws.parse_next(input)?;
    let _ = opt(declaration).parse_next(input)?;
    let _: () = repeat(0.., preceded(ws, comment.void())).parse_next(input)?;
    ws.parse_next(input)?;
    let root = element
        .context(StrContext::Expected(StrContextValue::Description(
            "root element",
        )))
        .parse_next(input)?;
    let _: () = repeat(0.., preceded(ws, comment.void())).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;

    use super::*;

    #[test]
    fn parse_self_closing_root() {
        let root = parse(r#"<rules/>"#).unwrap();
        assert_eq!(root.tag(), "rules");
        assert!(root.children().is_empty());
    }

    #[test]
    fn parse_attributes() {
        let root = parse(r#"<ruleitem membername="Year" operator="GreaterThanOrEqual"/>"#)
            .unwrap();
        assert_eq!(root.attribute("membername"), Some("Year"));
        assert_eq!(root.attribute("operator"), Some("GreaterThanOrEqual"));
        assert_eq!(root.attribute("uses"), None);
    }

    #[test]
    fn parse_nested_elements_keep_order() {
        let root = parse(
            r#"<and>
                 <ruleitem membername="a" targetvalue="1" operator="Equal"/>
                 <ruleitem membername="b" targetvalue="2" operator="Equal"/>
               </and>"#,
        )
        .unwrap();
        let members: Vec<&str> = root
            .elements()
            .map(|n| n.attribute("membername").unwrap())
            .collect();
        assert_eq!(members, ["a", "b"]);
    }

    #[test]
    fn parse_entities_in_attribute_values() {
        let root = parse(r#"<n value="&lt;tag&gt; &amp; &quot;x&quot; &apos;y&apos;"/>"#)
            .unwrap();
        assert_eq!(root.attribute("value"), Some("<tag> & \"x\" 'y'"));
    }

    #[test]
    fn parse_comments_are_preserved_as_nodes() {
        let root = parse("<rules><!-- disabled --><rule name=\"r\"/></rules>").unwrap();
        assert_eq!(root.children().len(), 2);
        assert!(root.children()[0].is_comment());
        assert_eq!(root.elements().count(), 1);
    }

    #[test]
    fn parse_declaration_is_skipped() {
        let root = parse("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<rules/>").unwrap();
        assert_eq!(root.tag(), "rules");
    }

    #[test]
    fn parse_text_content_is_ignored() {
        let root = parse("<rules>\n  stray text\n  <rule name=\"r\"/>\n</rules>").unwrap();
        assert_eq!(root.elements().count(), 1);
    }

    #[test]
    fn parse_leading_and_trailing_comments() {
        let root = parse("<!-- head -->\n<rules/>\n<!-- tail -->").unwrap();
        assert_eq!(root.tag(), "rules");
    }

    #[test]
    fn parse_mismatched_close_tag_fails() {
        assert!(parse("<rules></rule>").is_err());
    }

    #[test]
    fn parse_unclosed_element_fails() {
        assert!(parse("<rules><rule/>").is_err());
    }

    #[test]
    fn parse_two_roots_fails() {
        assert!(parse("<a/><b/>").is_err());
    }

    #[test]
    fn parse_unknown_entity_fails() {
        assert!(parse(r#"<n value="&copy;"/>"#).is_err());
    }

    #[test]
    fn parse_empty_input_fails() {
        assert!(parse("").is_err());
    }

    #[test]
    fn document_parser_stops_at_root() {
        let mut input = "<a/>  ";
        let root = document(&mut input).unwrap();
        assert_eq!(root.tag(), "a");
        assert!(input.is_empty());
    }
}
