use super::*;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Window,
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

/// Playback-facing state of a media element. `paused` starts true: nothing
/// plays until the page or the harness starts playback.
#[derive(Debug, Clone)]
pub(crate) struct MediaState {
    pub(crate) paused: bool,
    pub(crate) ended: bool,
    pub(crate) muted: bool,
    pub(crate) volume: f64,
}

impl MediaState {
    fn from_attrs(attrs: &HashMap<String, String>) -> Self {
        Self {
            paused: true,
            ended: false,
            muted: attrs.contains_key("muted"),
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) style: Vec<(String, String)>,
    pub(crate) media: Option<MediaState>,
}

/// Arena document tree. A synthetic window node sits above the document so
/// that event propagation paths include the window, and `html`/`body` are
/// always synthesized so a document-level fullscreen target exists even for
/// fragment input.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    pub(crate) window: NodeId,
    pub(crate) document: NodeId,
    pub(crate) document_element: NodeId,
    pub(crate) body: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let mut nodes = Vec::new();
        let window = NodeId(0);
        nodes.push(Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Window,
        });
        let mut dom = Self {
            nodes,
            window,
            document: window,
            document_element: window,
            body: window,
            id_index: HashMap::new(),
        };
        dom.document = dom.create_node(Some(window), NodeType::Document);
        dom.document_element = dom.create_element(dom.document, "html".into(), HashMap::new());
        dom.body = dom.create_element(dom.document_element, "body".into(), HashMap::new());
        dom
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let media = if tag_name == "video" || tag_name == "audio" {
            Some(MediaState::from_attrs(&attrs))
        } else {
            None
        };
        let id_attr = attrs.get("id").cloned();
        let element = Element {
            tag_name,
            attrs,
            style: Vec::new(),
            media,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = id_attr {
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| element.attrs.contains_key(name))
    }

    pub(crate) fn remove_attr(&mut self, node_id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(node_id) {
            element.attrs.remove(name);
        }
    }

    pub(crate) fn style_property(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id).and_then(|element| {
            element
                .style
                .iter()
                .find(|(prop, _)| prop == name)
                .map(|(_, value)| value.clone())
        })
    }

    pub(crate) fn set_style_property(&mut self, node_id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node_id) {
            if let Some(entry) = element.style.iter_mut().find(|(prop, _)| prop == name) {
                entry.1 = value.to_string();
            } else {
                element.style.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub(crate) fn media(&self, node_id: NodeId) -> Option<&MediaState> {
        self.element(node_id).and_then(|element| element.media.as_ref())
    }

    pub(crate) fn media_mut(&mut self, node_id: NodeId) -> Option<&mut MediaState> {
        self.element_mut(node_id)
            .and_then(|element| element.media.as_mut())
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node_id, &mut out);
        out
    }

    fn collect_text(&self, node_id: NodeId, out: &mut String) {
        match &self.nodes[node_id.0].node_type {
            NodeType::Text(text) => out.push_str(text),
            _ => {
                for child in &self.nodes[node_id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    pub(crate) fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.first_by_tag_from(self.document_element, tag)
    }

    fn first_by_tag_from(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        if self
            .tag_name(node_id)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        {
            return Some(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            if let Some(found) = self.first_by_tag_from(*child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Supports the selector forms the crate exercises: `#id`, `tag` and
    /// `tag#id`.
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }

        if let Some(id) = trimmed.strip_prefix('#') {
            if id.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            return Ok(self.element_by_id(id));
        }

        if let Some((tag, id)) = trimmed.split_once('#') {
            if !is_valid_tag_name(tag) || id.is_empty() {
                return Err(Error::UnsupportedSelector(selector.to_string()));
            }
            return Ok(self.element_by_id(id).filter(|node_id| {
                self.tag_name(*node_id)
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            }));
        }

        if is_valid_tag_name(trimmed) {
            return Ok(self.first_by_tag(trimmed));
        }

        Err(Error::UnsupportedSelector(selector.to_string()))
    }

    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Window => "window".into(),
            NodeType::Document => "document".into(),
            NodeType::Text(_) => "#text".into(),
            NodeType::Element(element) => match element.attrs.get("id") {
                Some(id) => format!("{}#{}", element.tag_name, id),
                None => element.tag_name.clone(),
            },
        }
    }

    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        self.dump_node_into(node_id, &mut out);
        out
    }

    fn dump_node_into(&self, node_id: NodeId, out: &mut String) {
        match &self.nodes[node_id.0].node_type {
            NodeType::Text(text) => out.push_str(text),
            NodeType::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                let mut names: Vec<&String> = element.attrs.keys().collect();
                names.sort();
                for name in names {
                    let value = &element.attrs[name];
                    if value.is_empty() {
                        out.push_str(&format!(" {name}"));
                    } else {
                        out.push_str(&format!(" {name}='{value}'"));
                    }
                }
                out.push('>');
                for child in &self.nodes[node_id.0].children {
                    self.dump_node_into(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag_name));
            }
            NodeType::Window | NodeType::Document => {
                for child in &self.nodes[node_id.0].children {
                    self.dump_node_into(*child, out);
                }
            }
        }
    }
}

fn is_valid_tag_name(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

/// Builds the arena from an HTML fragment. Quoted, unquoted and boolean
/// attributes are supported; `html`/`head`/`body` wrappers in the input are
/// folded into the synthesized ones; `script`/`style` bodies are kept as raw
/// text.
pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let chars: Vec<char> = html.chars().collect();
    let mut stack: Vec<(NodeId, String)> = Vec::new();
    let mut idx = 0usize;

    while idx < chars.len() {
        if chars[idx] == '<' {
            if starts_with(&chars, idx, "<!--") {
                idx = find_forward(&chars, idx + 4, "-->")
                    .ok_or_else(|| Error::HtmlParse("unterminated comment".into()))?
                    + 3;
                continue;
            }
            if starts_with(&chars, idx, "</") {
                let (name, end) = read_tag_name(&chars, idx + 2)?;
                let close = find_char(&chars, end, '>')
                    .ok_or_else(|| Error::HtmlParse(format!("unterminated closing tag </{name}")))?;
                pop_to_tag(&mut stack, &name);
                idx = close + 1;
                continue;
            }
            if starts_with(&chars, idx, "<!") {
                idx = find_char(&chars, idx + 2, '>')
                    .ok_or_else(|| Error::HtmlParse("unterminated declaration".into()))?
                    + 1;
                continue;
            }

            let (name, after_name) = read_tag_name(&chars, idx + 1)?;
            let (attrs, after_attrs, self_closed) = read_attrs(&chars, after_name, &name)?;
            idx = after_attrs;

            if matches!(name.as_str(), "html" | "head" | "body") {
                continue;
            }

            let parent = stack.last().map(|(node, _)| *node).unwrap_or(dom.body);
            let node_id = dom.create_element(parent, name.clone(), attrs);

            if self_closed || VOID_ELEMENTS.contains(&name.as_str()) {
                continue;
            }

            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                let closer = format!("</{name}");
                let end = find_forward(&chars, idx, &closer)
                    .ok_or_else(|| Error::HtmlParse(format!("unterminated <{name}> content")))?;
                let raw: String = chars[idx..end].iter().collect();
                if !raw.trim().is_empty() {
                    dom.create_text(node_id, raw.trim().to_string());
                }
                idx = find_char(&chars, end, '>')
                    .ok_or_else(|| Error::HtmlParse(format!("unterminated closing tag </{name}")))?
                    + 1;
                continue;
            }

            stack.push((node_id, name));
            continue;
        }

        let start = idx;
        while idx < chars.len() && chars[idx] != '<' {
            idx += 1;
        }
        let text: String = chars[start..idx].iter().collect();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let parent = stack.last().map(|(node, _)| *node).unwrap_or(dom.body);
            dom.create_text(parent, trimmed.to_string());
        }
    }

    Ok(dom)
}

fn pop_to_tag(stack: &mut Vec<(NodeId, String)>, name: &str) {
    if let Some(pos) = stack
        .iter()
        .rposition(|(_, open_name)| open_name.eq_ignore_ascii_case(name))
    {
        stack.truncate(pos);
    }
}

fn starts_with(chars: &[char], idx: usize, needle: &str) -> bool {
    needle
        .chars()
        .enumerate()
        .all(|(offset, ch)| chars.get(idx + offset) == Some(&ch))
}

fn find_forward(chars: &[char], from: usize, needle: &str) -> Option<usize> {
    let mut idx = from;
    while idx < chars.len() {
        if starts_with(chars, idx, needle) {
            return Some(idx);
        }
        idx += 1;
    }
    None
}

fn find_char(chars: &[char], from: usize, needle: char) -> Option<usize> {
    (from..chars.len()).find(|idx| chars[*idx] == needle)
}

fn read_tag_name(chars: &[char], from: usize) -> Result<(String, usize)> {
    let mut idx = from;
    let mut name = String::new();
    while idx < chars.len() && (chars[idx].is_ascii_alphanumeric() || chars[idx] == '-') {
        name.push(chars[idx].to_ascii_lowercase());
        idx += 1;
    }
    if name.is_empty() {
        return Err(Error::HtmlParse(format!(
            "expected tag name at offset {from}"
        )));
    }
    Ok((name, idx))
}

/// Reads attributes up to and past the closing `>`. Returns the attribute
/// map, the index just past `>`, and whether the tag was self-closed.
fn read_attrs(
    chars: &[char],
    from: usize,
    tag: &str,
) -> Result<(HashMap<String, String>, usize, bool)> {
    let mut attrs = HashMap::new();
    let mut idx = from;

    loop {
        while idx < chars.len() && chars[idx].is_whitespace() {
            idx += 1;
        }
        let Some(&ch) = chars.get(idx) else {
            return Err(Error::HtmlParse(format!("unterminated <{tag}> tag")));
        };

        if ch == '>' {
            return Ok((attrs, idx + 1, false));
        }
        if ch == '/' {
            let close = find_char(chars, idx + 1, '>')
                .ok_or_else(|| Error::HtmlParse(format!("unterminated <{tag}> tag")))?;
            return Ok((attrs, close + 1, true));
        }

        let mut name = String::new();
        while idx < chars.len()
            && !chars[idx].is_whitespace()
            && !matches!(chars[idx], '=' | '>' | '/')
        {
            name.push(chars[idx].to_ascii_lowercase());
            idx += 1;
        }
        if name.is_empty() {
            return Err(Error::HtmlParse(format!(
                "malformed attribute in <{tag}> at offset {idx}"
            )));
        }

        while idx < chars.len() && chars[idx].is_whitespace() {
            idx += 1;
        }

        if chars.get(idx) != Some(&'=') {
            attrs.entry(name).or_insert_with(String::new);
            continue;
        }
        idx += 1;
        while idx < chars.len() && chars[idx].is_whitespace() {
            idx += 1;
        }

        let Some(&quote) = chars.get(idx) else {
            return Err(Error::HtmlParse(format!("unterminated <{tag}> tag")));
        };
        let value = if quote == '"' || quote == '\'' {
            let end = find_char(chars, idx + 1, quote).ok_or_else(|| {
                Error::HtmlParse(format!("unterminated attribute value in <{tag}>"))
            })?;
            let value: String = chars[idx + 1..end].iter().collect();
            idx = end + 1;
            value
        } else {
            let start = idx;
            while idx < chars.len() && !chars[idx].is_whitespace() && chars[idx] != '>' {
                idx += 1;
            }
            chars[start..idx].iter().collect()
        };
        attrs.entry(name).or_insert(value);
    }
}
