/// What happens when a fixture element is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Change the page URL (loads the registered route document, if any)
    Navigate(String),
    /// Un-hide every element matching the CSS selector
    Reveal(String),
    /// Hide every element matching the CSS selector
    Hide(String),
    /// Re-render the document, invalidating all outstanding handles
    Rerender,
}

/// Declarative element builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) text: Option<String>,
    pub(crate) value: Option<String>,
    pub(crate) children: Vec<Node>,
    pub(crate) on_click: Vec<ClickEffect>,
    pub(crate) fail_clicks: u32,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            text: None,
            value: None,
            children: Vec::new(),
            on_click: Vec::new(),
            fail_clicks: 0,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Append one or more whitespace separated classes.
    pub fn class(self, class: impl AsRef<str>) -> Self {
        let existing = self
            .attrs
            .iter()
            .find(|(k, _)| k == "class")
            .map(|(_, v)| v.clone());
        let merged = match existing {
            Some(prev) if !prev.is_empty() => format!("{} {}", prev, class.as_ref()),
            _ => class.as_ref().to_string(),
        };
        self.attr("class", merged)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Initial value of a form control.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn hidden(self) -> Self {
        self.attr("hidden", "")
    }

    pub fn disabled(self) -> Self {
        self.attr("disabled", "")
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click.push(effect);
        self
    }

    /// The first `n` clicks fail as if intercepted by an overlay.
    pub fn fail_clicks(mut self, n: u32) -> Self {
        self.fail_clicks = n;
        self
    }
}
