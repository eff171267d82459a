use std::collections::HashMap;

/// A materialized markup tree node: tag, named attributes, ordered children.
///
/// This is the shape the grammar readers consume. It is usually produced by
/// [`parse::parse`](crate::parse::parse) but can be built programmatically,
/// decoupling the readers from any particular markup syntax. Comment nodes
/// are carried in the tree but filtered out before they reach a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    tag: String,
    attributes: HashMap<String, String>,
    children: Vec<ParseNode>,
    comment: bool,
}

impl ParseNode {
    /// An element node with the given tag.
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attributes: HashMap::new(),
            children: Vec::new(),
            comment: false,
        }
    }

    /// A comment node. Comments have no tag, attributes, or children.
    #[must_use]
    pub fn comment() -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            children: Vec::new(),
            comment: true,
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Builder-style child appender. Children keep document order.
    #[must_use]
    pub fn child(mut self, node: ParseNode) -> Self {
        self.children.push(node);
        self
    }

    pub(crate) fn push_child(&mut self, node: ParseNode) {
        self.children.push(node);
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.comment
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All children in document order, comments included.
    #[must_use]
    pub fn children(&self) -> &[ParseNode] {
        &self.children
    }

    /// Element children in document order, comments skipped.
    pub fn elements(&self) -> impl Iterator<Item = &ParseNode> {
        self.children.iter().filter(|n| !n.comment)
    }

    /// Select descendant elements by a slash-separated tag path rooted at
    /// this node, e.g. `"/rules/rule"` on a `<rules>` root.
    ///
    /// The first segment must match this node's tag; each later segment
    /// steps into matching element children. Returns matches in document
    /// order.
    #[must_use]
    pub fn select<'a>(&'a self, path: &str) -> Vec<&'a ParseNode> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut out = Vec::new();
        if let Some((first, rest)) = segments.split_first() {
            if !self.comment && self.tag == *first {
                self.collect_path(rest, &mut out);
            }
        }
        out
    }

    fn collect_path<'a>(&'a self, segments: &[&str], out: &mut Vec<&'a ParseNode>) {
        match segments {
            [] => out.push(self),
            [next, rest @ ..] => {
                for child in self.elements().filter(|c| c.tag == *next) {
                    child.collect_path(rest, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ParseNode {
        ParseNode::element("rules")
            .child(
                ParseNode::element("rule")
                    .attr("name", "a")
                    .attr("appliesto", "CarDTO"),
            )
            .child(ParseNode::comment())
            .child(
                ParseNode::element("rule")
                    .attr("name", "b")
                    .attr("appliesto", "SalesPersonDTO"),
            )
    }

    #[test]
    fn attribute_lookup() {
        let node = ParseNode::element("ruleitem")
            .attr("membername", "Year")
            .attr("operator", "GreaterThanOrEqual");
        assert_eq!(node.attribute("membername"), Some("Year"));
        assert_eq!(node.attribute("uses"), None);
    }

    #[test]
    fn select_matches_path_in_document_order() {
        let d = doc();
        let rules = d.select("/rules/rule");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].attribute("name"), Some("a"));
        assert_eq!(rules[1].attribute("name"), Some("b"));
    }

    #[test]
    fn select_root_mismatch_is_empty() {
        let d = doc();
        assert!(d.select("/mathexps/mathexp").is_empty());
    }

    #[test]
    fn select_skips_comments() {
        let d = doc();
        // The comment child never appears, even though it sits between rules.
        assert!(d.select("/rules/rule").iter().all(|n| !n.is_comment()));
    }

    #[test]
    fn elements_filters_comments_keeps_order() {
        let node = ParseNode::element("and")
            .child(ParseNode::comment())
            .child(ParseNode::element("ruleitem").attr("membername", "x"))
            .child(ParseNode::element("ruleitem").attr("membername", "y"));
        let tags: Vec<&str> = node
            .elements()
            .map(|n| n.attribute("membername").unwrap())
            .collect();
        assert_eq!(tags, ["x", "y"]);
        assert_eq!(node.children().len(), 3);
    }

    #[test]
    fn deep_select() {
        let d = ParseNode::element("a")
            .child(ParseNode::element("b").child(ParseNode::element("c").attr("n", "1")))
            .child(ParseNode::element("b").child(ParseNode::element("c").attr("n", "2")));
        let found = d.select("/a/b/c");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].attribute("n"), Some("2"));
    }
}
