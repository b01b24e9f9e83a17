//! Retained vector display list for the cartoon, in SVG's coordinate model.

use std::fmt::Write;

use crate::engine::Color;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    /// Control point, then end point.
    QuadTo(f32, f32, f32, f32),
    Close,
}

/// Parse absolute `M`, `L`, `Q` and `Z` path data, e.g. `"M 20 40 Q 50 30 55 10"`.
pub fn parse_path(d: &str) -> Option<Vec<PathCmd>> {
    fn num<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<f32> {
        tokens.next()?.parse().ok()
    }
    let mut tokens = d.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty());
    let mut cmds = Vec::new();
    while let Some(op) = tokens.next() {
        let cmd = match op {
            "M" => PathCmd::MoveTo(num(&mut tokens)?, num(&mut tokens)?),
            "L" => PathCmd::LineTo(num(&mut tokens)?, num(&mut tokens)?),
            "Q" => PathCmd::QuadTo(num(&mut tokens)?, num(&mut tokens)?, num(&mut tokens)?, num(&mut tokens)?),
            "Z" | "z" => PathCmd::Close,
            _ => return None,
        };
        cmds.push(cmd);
    }
    Some(cmds)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Circle { cx: f32, cy: f32, r: f32 },
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32 },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Polyline(Vec<(f32, f32)>),
    Polygon(Vec<(f32, f32)>),
    Path(Vec<PathCmd>),
    /// `y` is the baseline, as in SVG.
    Text { x: f32, y: f32, size: f32, content: String, anchor: TextAnchor },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Style {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    pub round_cap: bool,
    pub opacity: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: None, stroke: None, stroke_width: 1.0, round_cap: false, opacity: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub shape: Shape,
    pub style: Style,
}

impl Element {
    pub fn new(shape: Shape) -> Self {
        Self { shape, style: Style::default() }
    }

    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Shape::Rect { x, y, width, height })
    }

    pub fn circle(cx: f32, cy: f32, r: f32) -> Self {
        Self::new(Shape::Circle { cx, cy, r })
    }

    pub fn ellipse(cx: f32, cy: f32, rx: f32, ry: f32) -> Self {
        Self::new(Shape::Ellipse { cx, cy, rx, ry })
    }

    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(Shape::Line { x1, y1, x2, y2 })
    }

    pub fn polygon(points: &[(f32, f32)]) -> Self {
        Self::new(Shape::Polygon(points.to_vec()))
    }

    pub fn polyline(points: &[(f32, f32)]) -> Self {
        Self::new(Shape::Polyline(points.to_vec()))
    }

    /// Path from SVG path data; malformed data yields an empty path.
    pub fn path(d: &str) -> Self {
        let cmds = parse_path(d).unwrap_or_else(|| {
            log::warn!("ignoring malformed path data {d:?}");
            Vec::new()
        });
        Self::new(Shape::Path(cmds))
    }

    pub fn text(x: f32, y: f32, size: f32, content: &str) -> Self {
        Self::new(Shape::Text { x, y, size, content: content.to_string(), anchor: TextAnchor::Start })
    }

    pub fn fill(mut self, hex: u32) -> Self {
        self.style.fill = Some(Color::from_hex(hex));
        self
    }

    pub fn stroke(mut self, hex: u32, width: f32) -> Self {
        self.style.stroke = Some(Color::from_hex(hex));
        self.style.stroke_width = width;
        self
    }

    pub fn round_cap(mut self) -> Self {
        self.style.round_cap = true;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.style.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn centered(mut self) -> Self {
        if let Shape::Text { anchor, .. } = &mut self.shape {
            *anchor = TextAnchor::Middle;
        }
        self
    }
}

/// Group transform, applied as translate, then rotate about `rotate_center`,
/// then uniform scale.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroupTransform {
    pub translate: (f32, f32),
    /// Degrees, clockwise on screen.
    pub rotate: f32,
    pub rotate_center: (f32, f32),
    pub scale: f32,
}

impl Default for GroupTransform {
    fn default() -> Self {
        Self { translate: (0.0, 0.0), rotate: 0.0, rotate_center: (0.0, 0.0), scale: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub transform: GroupTransform,
    pub opacity: f32,
    pub children: Vec<Node>,
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Group {
    pub fn new() -> Self {
        Self { transform: GroupTransform::default(), opacity: 1.0, children: Vec::new() }
    }

    pub fn at(x: f32, y: f32, scale: f32) -> Self {
        let mut g = Self::new();
        g.transform.translate = (x, y);
        g.transform.scale = scale;
        g
    }

    pub fn rotated(mut self, degrees: f32, cx: f32, cy: f32) -> Self {
        self.transform.rotate = degrees;
        self.transform.rotate_center = (cx, cy);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Group(Group),
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<Group> for Node {
    fn from(g: Group) -> Self {
        Node::Group(g)
    }
}

/// Root of a frame: a fixed-size canvas and its nodes in paint order.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawing {
    pub width: u32,
    pub height: u32,
    pub children: Vec<Node>,
}

impl Drawing {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, children: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }

    /// Full-canvas background rectangle.
    pub fn background(&mut self, hex: u32) -> &mut Self {
        let (w, h) = (self.width as f32, self.height as f32);
        self.add(Element::rect(0.0, 0.0, w, h).fill(hex))
    }

    /// Total number of elements, groups excluded.
    pub fn element_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::Element(_) => 1,
                    Node::Group(g) => count(&g.children),
                })
                .sum()
        }
        count(&self.children)
    }

    /// Every text run in paint order.
    pub fn texts(&self) -> Vec<&str> {
        fn collect<'a>(nodes: &'a [Node], out: &mut Vec<&'a str>) {
            for n in nodes {
                match n {
                    Node::Element(Element { shape: Shape::Text { content, .. }, .. }) => out.push(content),
                    Node::Element(_) => {}
                    Node::Group(g) => collect(&g.children, out),
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.children, &mut out);
        out
    }

    /// Serialise as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for node in &self.children {
            write_node(&mut out, node, 1);
        }
        out.push_str("</svg>\n");
        out
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn style_attrs(style: &Style) -> String {
    let mut s = String::new();
    match style.fill {
        Some(c) => {
            let _ = write!(s, r#" fill="{}""#, c.to_hex_string());
        }
        None => s.push_str(r#" fill="none""#),
    }
    if let Some(c) = style.stroke {
        let _ = write!(s, r#" stroke="{}" stroke-width="{}""#, c.to_hex_string(), style.stroke_width);
    }
    if style.round_cap {
        s.push_str(r#" stroke-linecap="round""#);
    }
    if style.opacity < 1.0 {
        let _ = write!(s, r#" opacity="{}""#, style.opacity);
    }
    s
}

fn points_attr(points: &[(f32, f32)]) -> String {
    points.iter().map(|(x, y)| format!("{x},{y}")).collect::<Vec<_>>().join(" ")
}

fn path_attr(cmds: &[PathCmd]) -> String {
    cmds.iter()
        .map(|c| match *c {
            PathCmd::MoveTo(x, y) => format!("M {x} {y}"),
            PathCmd::LineTo(x, y) => format!("L {x} {y}"),
            PathCmd::QuadTo(cx, cy, x, y) => format!("Q {cx} {cy} {x} {y}"),
            PathCmd::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Group(g) => {
            let t = &g.transform;
            let mut transform = format!("translate({}, {})", t.translate.0, t.translate.1);
            if t.rotate != 0.0 {
                let _ = write!(transform, " rotate({}, {}, {})", t.rotate, t.rotate_center.0, t.rotate_center.1);
            }
            if t.scale != 1.0 {
                let _ = write!(transform, " scale({})", t.scale);
            }
            let opacity = if g.opacity < 1.0 { format!(r#" opacity="{}""#, g.opacity) } else { String::new() };
            let _ = writeln!(out, r#"{indent}<g transform="{transform}"{opacity}>"#);
            for child in &g.children {
                write_node(out, child, depth + 1);
            }
            let _ = writeln!(out, "{indent}</g>");
        }
        Node::Element(e) => {
            let style = style_attrs(&e.style);
            let _ = match &e.shape {
                Shape::Rect { x, y, width, height } => writeln!(
                    out,
                    r#"{indent}<rect x="{x}" y="{y}" width="{width}" height="{height}"{style}/>"#
                ),
                Shape::Circle { cx, cy, r } => {
                    writeln!(out, r#"{indent}<circle cx="{cx}" cy="{cy}" r="{r}"{style}/>"#)
                }
                Shape::Ellipse { cx, cy, rx, ry } => writeln!(
                    out,
                    r#"{indent}<ellipse cx="{cx}" cy="{cy}" rx="{rx}" ry="{ry}"{style}/>"#
                ),
                Shape::Line { x1, y1, x2, y2 } => writeln!(
                    out,
                    r#"{indent}<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}"{style}/>"#
                ),
                Shape::Polyline(points) => {
                    writeln!(out, r#"{indent}<polyline points="{}"{style}/>"#, points_attr(points))
                }
                Shape::Polygon(points) => {
                    writeln!(out, r#"{indent}<polygon points="{}"{style}/>"#, points_attr(points))
                }
                Shape::Path(cmds) => writeln!(out, r#"{indent}<path d="{}"{style}/>"#, path_attr(cmds)),
                Shape::Text { x, y, size, content, anchor } => {
                    let anchor = match anchor {
                        TextAnchor::Start => "",
                        TextAnchor::Middle => r#" text-anchor="middle""#,
                    };
                    writeln!(
                        out,
                        r#"{indent}<text x="{x}" y="{y}" font-size="{size}" font-weight="bold"{anchor}{style}>{}</text>"#,
                        escape(content)
                    )
                }
            };
        }
    }
}
