//! A small, forgiving HTML parser producing an owned node tree.
//!
//! Good enough for bookmark files and for pulling `<title>`/`<meta>` out of
//! web pages; it does not implement the full HTML5 tree construction rules.
//! Tag and attribute names are lower-cased. `dt`/`dd` and `li` close their
//! open siblings implicitly, `<p>` is treated as a void separator, and the
//! content of `script`, `style`, `title` and `textarea` is read as raw text.
//!
//! Nesting depth is unbounded, so traversals and drop use explicit work
//! lists instead of recursion.

/// A node in the parsed tree.
#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes and children in document order.
#[derive(Debug, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr", "p",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "title", "textarea"];

impl Element {
    fn new(name: &str, attrs: Vec<(String, String)>) -> Self {
        Self {
            name: name.to_string(),
            attrs,
            children: Vec::new(),
        }
    }

    /// Returns the value of attribute `name` (case-insensitive).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the element children, skipping text.
    pub fn child_elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search for the first descendant named `name`.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        self.find_first_where(name, &|_| true)
    }

    /// Like [`Element::find_first`], but never descends into elements named `fence`.
    pub fn find_first_outside(&self, name: &str, fence: &str) -> Option<&Element> {
        self.find_first_where(name, &|el| el.name != fence)
    }

    fn find_first_where(&self, name: &str, descend: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        let mut pending: Vec<&Element> = self.child_elements().rev().collect();
        while let Some(el) = pending.pop() {
            if el.name == name {
                return Some(el);
            }
            if descend(el) {
                pending.extend(el.child_elements().rev());
            }
        }
        None
    }

    /// Collects every descendant named `name` in document order.
    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        let mut pending: Vec<&'a Element> = self.child_elements().rev().collect();
        while let Some(el) = pending.pop() {
            if el.name == name {
                out.push(el);
            }
            pending.extend(el.child_elements().rev());
        }
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, None);
        out
    }

    /// Concatenated text of all descendants, skipping subtrees named `fence`.
    pub fn text_outside(&self, fence: &str) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, Some(fence));
        out
    }

    fn collect_text(&self, out: &mut String, fence: Option<&str>) {
        let mut pending: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = pending.pop() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) if Some(el.name.as_str()) != fence => {
                    pending.extend(el.children.iter().rev())
                }
                Node::Element(_) => {}
            }
        }
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Node::Element(mut el) = node {
                pending.append(&mut el.children);
            }
        }
    }
}

/// Parses `html` into a tree rooted at a synthetic `#document` element.
pub fn parse(html: &str) -> Element {
    let mut builder = TreeBuilder::new();
    let lower = html.to_ascii_lowercase();
    let bytes = html.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(offset) = html[pos..].find('<') else {
            builder.text(&html[pos..]);
            break;
        };
        let lt = pos + offset;
        if lt > pos {
            builder.text(&html[pos..lt]);
        }

        let rest = &lower[lt..];
        if rest.starts_with("<!--") {
            pos = match lower[lt + 4..].find("-->") {
                Some(end) => lt + 4 + end + 3,
                None => bytes.len(),
            };
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = skip_past(&lower, lt, '>');
        } else if rest.starts_with("</") {
            let (name, after) = read_name(&lower, lt + 2);
            if !name.is_empty() {
                builder.close(&name);
            }
            pos = skip_past(&lower, after, '>');
        } else if bytes.get(lt + 1).map_or(false, |b| b.is_ascii_alphabetic()) {
            let (name, after) = read_name(&lower, lt + 1);
            let (attrs, self_closing, end) = read_attributes(html, &lower, after);
            pos = end;
            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing {
                let close = format!("</{}", name);
                let stop = lower[pos..].find(&close).map_or(bytes.len(), |i| pos + i);
                let raw = &html[pos..stop];
                builder.open(&name, attrs, false);
                if name == "title" || name == "textarea" {
                    builder.text(raw);
                } else {
                    builder.raw_text(raw);
                }
                builder.close(&name);
                pos = if stop < bytes.len() {
                    skip_past(&lower, stop, '>')
                } else {
                    stop
                };
            } else {
                builder.open(&name, attrs, self_closing);
            }
        } else {
            builder.text("<");
            pos = lt + 1;
        }
    }

    builder.finish()
}

/// Returns the index just past the next `needle` at or after `from`.
fn skip_past(lower: &str, from: usize, needle: char) -> usize {
    match lower[from..].find(needle) {
        Some(i) => from + i + needle.len_utf8(),
        None => lower.len(),
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn read_name(lower: &str, from: usize) -> (String, usize) {
    let bytes = lower.as_bytes();
    let mut end = from;
    while end < bytes.len() && is_name_byte(bytes[end]) {
        end += 1;
    }
    (lower[from..end].to_string(), end)
}

/// Reads attributes up to the closing `>`. Returns `(attrs, self_closing, position after '>')`.
fn read_attributes(html: &str, lower: &str, mut pos: usize) -> (Vec<(String, String)>, bool, usize) {
    let bytes = html.as_bytes();
    let mut attrs = Vec::new();

    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        match bytes.get(pos) {
            None => return (attrs, false, pos),
            Some(b'>') => return (attrs, false, pos + 1),
            Some(b'/') => {
                if bytes.get(pos + 1) == Some(&b'>') {
                    return (attrs, true, pos + 2);
                }
                pos += 1;
                continue;
            }
            _ => {}
        }

        let start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'>' | b'/')
        {
            pos += 1;
        }
        let name = lower[start..pos].to_string();

        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let mut value = String::new();
        if bytes.get(pos) == Some(&b'=') {
            pos += 1;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let open = pos + 1;
                    let close = html[open..]
                        .find(quote as char)
                        .map_or(bytes.len(), |i| open + i);
                    value = unescape(&html[open..close]);
                    pos = (close + 1).min(bytes.len());
                }
                _ => {
                    let open = pos;
                    while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
                        pos += 1;
                    }
                    value = unescape(&html[open..pos]);
                }
            }
        }

        if !name.is_empty() {
            attrs.push((name, value));
        }
    }
}

struct TreeBuilder {
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new("#document", Vec::new())],
        }
    }

    fn top(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn text(&mut self, raw: &str) {
        if !raw.is_empty() {
            let decoded = unescape(raw);
            self.top().children.push(Node::Text(decoded));
        }
    }

    fn raw_text(&mut self, raw: &str) {
        if !raw.is_empty() {
            self.top().children.push(Node::Text(raw.to_string()));
        }
    }

    fn open(&mut self, name: &str, attrs: Vec<(String, String)>, self_closing: bool) {
        match name {
            "dt" | "dd" => self.close_implied(&["dt", "dd"], &["dl"]),
            "li" => self.close_implied(&["li"], &["ul", "ol"]),
            _ => {}
        }

        let element = Element::new(name, attrs);
        if self_closing || VOID_ELEMENTS.contains(&name) {
            self.top().children.push(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    /// Closes the nearest open element in `targets`, unless a `boundary` is reached first.
    fn close_implied(&mut self, targets: &[&str], boundaries: &[&str]) {
        for i in (1..self.stack.len()).rev() {
            let name = self.stack[i].name.as_str();
            if boundaries.contains(&name) {
                return;
            }
            if targets.contains(&name) {
                self.pop_to(i);
                return;
            }
        }
    }

    fn close(&mut self, name: &str) {
        if let Some(i) = (1..self.stack.len()).rev().find(|&i| self.stack[i].name == name) {
            self.pop_to(i);
        }
    }

    /// Pops elements until the one at `index` has been closed.
    fn pop_to(&mut self, index: usize) {
        while self.stack.len() > index {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if self.stack.len() > 1 {
            if let Some(element) = self.stack.pop() {
                self.top().children.push(Node::Element(element));
            }
        }
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            self.pop();
        }
        self.stack.pop().unwrap_or_default()
    }
}

/// Escapes text for use in HTML content or a quoted attribute value.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decodes character references. Unknown or unterminated references are kept literally.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail[1..].find(';').filter(|&i| i > 0 && i <= 10) {
            Some(i) => match decode_reference(&tail[1..=i]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &tail[i + 2..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        _ => return None,
    };
    Some(ch)
}
