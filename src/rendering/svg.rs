//! Minimal SVG document writer
//!
//! Builds an SVG document element by element. Attribute values and text are
//! escaped; numeric attributes are written with at most two decimals.

use std::fmt::Write as _;

/// An attribute value
pub enum Attr<'a> {
    Str(&'a str),
    Owned(String),
    Num(f32),
}

impl From<&'static str> for Attr<'static> {
    fn from(value: &'static str) -> Self {
        Attr::Str(value)
    }
}

impl From<String> for Attr<'_> {
    fn from(value: String) -> Self {
        Attr::Owned(value)
    }
}

impl From<f32> for Attr<'_> {
    fn from(value: f32) -> Self {
        Attr::Num(value)
    }
}

impl Attr<'_> {
    fn write_to(&self, out: &mut String) {
        match self {
            Attr::Str(s) => out.push_str(&escape(s)),
            Attr::Owned(s) => out.push_str(&escape(s)),
            Attr::Num(n) => out.push_str(&format_number(*n)),
        }
    }
}

/// SVG document under construction
#[derive(Debug, Clone)]
pub struct SvgDocument {
    buf: String,
    open_groups: usize,
}

impl SvgDocument {
    pub fn new(width: f32, height: f32) -> Self {
        let mut buf = String::with_capacity(4096);
        let _ = write!(
            buf,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = format_number(width),
            h = format_number(height)
        );
        Self {
            buf,
            open_groups: 0,
        }
    }

    /// Self-closing element (`<rect .../>`)
    pub fn element(&mut self, name: &str, attrs: &[(&str, Attr<'_>)]) -> &mut Self {
        self.open_tag(name, attrs);
        self.buf.push_str("/>");
        self
    }

    /// Element with escaped text content (`<text ...>e4</text>`)
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, Attr<'_>)], text: &str) -> &mut Self {
        self.open_tag(name, attrs);
        self.buf.push('>');
        self.buf.push_str(&escape(text));
        let _ = write!(self.buf, "</{}>", name);
        self
    }

    pub fn begin_group(&mut self, attrs: &[(&str, Attr<'_>)]) -> &mut Self {
        self.open_tag("g", attrs);
        self.buf.push('>');
        self.open_groups += 1;
        self
    }

    pub fn end_group(&mut self) -> &mut Self {
        if self.open_groups > 0 {
            self.buf.push_str("</g>");
            self.open_groups -= 1;
        }
        self
    }

    /// Close any open groups and the root element
    pub fn finish(mut self) -> String {
        while self.open_groups > 0 {
            self.end_group();
        }
        self.buf.push_str("</svg>");
        self.buf
    }

    fn open_tag(&mut self, name: &str, attrs: &[(&str, Attr<'_>)]) {
        self.buf.push('<');
        self.buf.push_str(name);
        for (key, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(key);
            self.buf.push_str("=\"");
            value.write_to(&mut self.buf);
            self.buf.push('"');
        }
    }
}

/// Escape text for use in XML attributes and content
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a coordinate: integers without a fraction, others with up to two decimals
pub fn format_number(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').to_string()
    }
}
