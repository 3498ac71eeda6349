use scraper::{ElementRef, Html};

/// 无内容、不需要闭合标签的元素
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// 内部文本按原样输出、不做转义的元素
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// 摘要处理用的可变节点树，每个节点只属于一个父节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// 保持源码中的属性顺序
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// 所有后代文本节点拼接后的内容
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }

    /// 后代中是否还有 `<img>` 或 `<picture>`
    pub fn contains_image(&self) -> bool {
        self.children.iter().any(|child| match child {
            Node::Element(el) => el.is("img") || el.is("picture") || el.contains_image(),
            Node::Text(_) => false,
        })
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

/// HTML 片段：隐式容器下的节点森林
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub children: Vec<Node>,
}

impl Fragment {
    /// 使用 html5ever 的片段解析（宽松恢复，自动补全未闭合标签）。注释、doctype 等非内容节点被丢弃
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_fragment(html);
        Self {
            children: convert_children(document.root_element()),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            write_node(&mut out, node, false);
        }
        out
    }
}

fn convert_children(parent: ElementRef<'_>) -> Vec<Node> {
    parent
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::Text(String::from(&**text))),
            scraper::Node::Element(_) => ElementRef::wrap(child).map(convert_element),
            _ => None,
        })
        .collect()
}

fn convert_element(element: ElementRef<'_>) -> Node {
    let value = element.value();
    Node::Element(Element {
        name: value.name().to_string(),
        // 外来内容（SVG、MathML）中的属性带命名空间前缀，如 xlink:href
        attrs: value
            .attrs
            .iter()
            .map(|(name, value)| {
                let qualified = match &name.prefix {
                    Some(prefix) => format!("{}:{}", &**prefix, &*name.local),
                    None => name.local.to_string(),
                };
                (qualified, value.to_string())
            })
            .collect(),
        children: convert_children(element),
    })
}

fn write_node(out: &mut String, node: &Node, raw_text: bool) {
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_into(out, text, false),
        Node::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(out, value, true);
                out.push('"');
            }
            out.push('>');

            let is_void = VOID_ELEMENTS.iter().any(|v| el.is(v));
            if is_void {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.iter().any(|r| el.is(r));
            for child in &el.children {
                write_node(out, child, raw);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

fn escape_into(out: &mut String, text: &str, attr_mode: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_element_and_text_nodes() {
        let fragment = Fragment::parse("<p class=\"lead\">Hello <b>world</b></p>tail");
        assert_eq!(fragment.children.len(), 2);

        let Node::Element(p) = &fragment.children[0] else {
            panic!("expected element");
        };
        assert!(p.is("p"));
        assert!(p.has_class("lead"));
        assert_eq!(p.text_content(), "Hello world");
        assert_eq!(fragment.children[1], Node::Text("tail".into()));
    }

    #[test]
    fn serialization_is_stable_for_simple_markup() {
        let html = "<p>Hello <b>world</b></p><img src=\"a.png\"><br>";
        assert_eq!(Fragment::parse(html).to_html(), html);
    }

    #[test]
    fn unclosed_tags_are_balanced() {
        let html = Fragment::parse("<div><p>open <em>emphasis").to_html();
        assert_eq!(html, "<div><p>open <em>emphasis</em></p></div>");
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let html = Fragment::parse("<a title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3</a>").to_html();
        assert_eq!(html, "<a title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3</a>");
    }

    #[test]
    fn prefixed_attributes_keep_their_prefix() {
        let html = "<svg xmlns:xlink=\"http://www.w3.org/1999/xlink\"><use xlink:href=\"#i\"></use></svg>";
        let fragment = Fragment::parse(html);
        let Node::Element(svg) = &fragment.children[0] else {
            panic!("expected element");
        };
        assert_eq!(svg.attr("xmlns:xlink"), Some("http://www.w3.org/1999/xlink"));
        let Node::Element(use_el) = &svg.children[0] else {
            panic!("expected element");
        };
        assert_eq!(use_el.attr("xlink:href"), Some("#i"));
        assert_eq!(use_el.attr("href"), None);
        assert_eq!(fragment.to_html(), html);
    }

    #[test]
    fn comments_are_dropped() {
        let html = Fragment::parse("<p>a<!-- note -->b</p>").to_html();
        assert_eq!(html, "<p>ab</p>");
    }

    #[test]
    fn set_attr_replaces_or_appends() {
        let mut img = Element::new("img");
        img.set_attr("src", "a.png");
        img.set_attr("src", "b.png");
        img.set_attr("loading", "lazy");
        assert_eq!(img.attr("src"), Some("b.png"));
        assert_eq!(img.attrs.len(), 2);
    }

    #[test]
    fn contains_image_looks_at_descendants() {
        let fragment = Fragment::parse("<div><p><span><img src=\"x\"></span></p></div><p>no</p>");
        let flags: Vec<bool> = fragment
            .children
            .iter()
            .map(|n| matches!(n, Node::Element(el) if el.contains_image()))
            .collect();
        assert_eq!(flags, vec![true, false]);
    }
}
