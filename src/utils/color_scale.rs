//! Color scales for the dashboard charts.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => {
                let v = u32::from_str_radix(digits, 16).ok()?;
                Some(Self::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
            }
            3 => {
                let v = u16::from_str_radix(digits, 16).ok()?;
                let expand = |n: u16| ((n & 0xf) * 17) as u8;
                Some(Self::new(expand(v >> 8), expand(v >> 4), expand(v)))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear interpolation; `t` outside `[0, 1]` extrapolates
    /// and the channels saturate.
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| channel(a as f64 + (b as f64 - a as f64) * t);
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];
const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];
const INFERNO: [&str; 10] = [
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60", "#cf4446", "#ed6925", "#fb9b06",
    "#f7d13d", "#fcffa4",
];
const MAGMA: [&str; 10] = [
    "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f", "#cd4071", "#f1605d", "#fd9668",
    "#feca8d", "#fcfdbf",
];

pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];
const ACCENT: [&str; 8] = [
    "#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f", "#bf5b17", "#666666",
];
const DARK2: [&str; 8] = [
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
];
const PASTEL1: [&str; 9] = [
    "#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6", "#ffffcc", "#e5d8bd", "#fddaec",
    "#f2f2f2",
];
const PASTEL2: [&str; 8] = [
    "#b3e2cd", "#fdcdac", "#cbd5e8", "#f4cae4", "#e6f5c9", "#fff2ae", "#f1e2cc", "#cccccc",
];
const SET1: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];
const SET2: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];
const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

/// Curated palette used when a chart does not ask for a named scheme.
pub const DEFAULT_COLORS: [&str; 12] = [
    "#667eea", "#764ba2", "#f093fb", "#4facfe", "#43e97b", "#fa709a", "#fee140", "#30cfd0",
    "#a8edea", "#fed6e3", "#ffecd2", "#fcb69f",
];

pub const DEFAULT_GRADIENT: (&str, &str) = ("#667eea", "#764ba2");

/// Every scheme the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Palette {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Rainbow,
    Category10,
    Category20,
    Accent,
    Dark2,
    Pastel1,
    Pastel2,
    Set1,
    Set2,
    Set3,
}

impl Palette {
    pub const ALL: [Palette; 14] = [
        Palette::Viridis,
        Palette::Plasma,
        Palette::Inferno,
        Palette::Magma,
        Palette::Rainbow,
        Palette::Category10,
        Palette::Category20,
        Palette::Accent,
        Palette::Dark2,
        Palette::Pastel1,
        Palette::Pastel2,
        Palette::Set1,
        Palette::Set2,
        Palette::Set3,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Viridis => "viridis",
            Palette::Plasma => "plasma",
            Palette::Inferno => "inferno",
            Palette::Magma => "magma",
            Palette::Rainbow => "rainbow",
            Palette::Category10 => "category10",
            Palette::Category20 => "category20",
            Palette::Accent => "accent",
            Palette::Dark2 => "dark2",
            Palette::Pastel1 => "pastel1",
            Palette::Pastel2 => "pastel2",
            Palette::Set1 => "set1",
            Palette::Set2 => "set2",
            Palette::Set3 => "set3",
        }
    }

    /// Unknown names fall back to the default scheme.
    pub fn from_name_or_default(name: &str) -> Palette {
        name.parse().unwrap_or_default()
    }

    pub fn is_sequential(&self) -> bool {
        matches!(
            self,
            Palette::Viridis | Palette::Plasma | Palette::Inferno | Palette::Magma | Palette::Rainbow
        )
    }

    fn categorical(&self) -> &'static [&'static str] {
        match self {
            Palette::Category10 => &CATEGORY10,
            Palette::Category20 => &CATEGORY20,
            Palette::Accent => &ACCENT,
            Palette::Dark2 => &DARK2,
            Palette::Pastel1 => &PASTEL1,
            Palette::Pastel2 => &PASTEL2,
            Palette::Set1 => &SET1,
            Palette::Set2 => &SET2,
            Palette::Set3 => &SET3,
            _ => &[],
        }
    }

    fn interpolator(&self) -> Interpolator {
        match self {
            Palette::Viridis => Interpolator::Ramp(&VIRIDIS),
            Palette::Plasma => Interpolator::Ramp(&PLASMA),
            Palette::Inferno => Interpolator::Ramp(&INFERNO),
            Palette::Magma => Interpolator::Ramp(&MAGMA),
            _ => Interpolator::Rainbow,
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Palette::ALL
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| format!("unknown palette '{}'", s))
    }
}

#[derive(Debug, Clone, Copy)]
enum Interpolator {
    Ramp(&'static [&'static str]),
    Rainbow,
}

impl Interpolator {
    fn at(&self, t: f64) -> Rgb {
        match self {
            Interpolator::Ramp(stops) => ramp(stops, t),
            Interpolator::Rainbow => rainbow(t),
        }
    }
}

fn parse_stop(hex: &str) -> Rgb {
    Rgb::from_hex(hex).unwrap_or(Rgb::new(0, 0, 0))
}

fn ramp(stops: &[&str], t: f64) -> Rgb {
    if stops.is_empty() {
        return Rgb::new(0, 0, 0);
    }
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (stops.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(stops.len() - 1);
    let j = (i + 1).min(stops.len() - 1);
    parse_stop(stops[i]).lerp(&parse_stop(stops[j]), scaled - i as f64)
}

/// Cyclical less-angry rainbow (cubehelix based).
fn rainbow(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t - t.floor() };
    let ts = (t - 0.5).abs();
    let h = 360.0 * t - 100.0;
    let s = 1.5 - 1.5 * ts;
    let l = 0.8 - 0.9 * ts;
    cubehelix(h, s, l)
}

fn cubehelix(h: f64, s: f64, l: f64) -> Rgb {
    const A: f64 = -0.14861;
    const B: f64 = 1.78277;
    const C: f64 = -0.29227;
    const D: f64 = -0.90649;
    const E: f64 = 1.97294;
    let h = (h + 120.0).to_radians();
    let a = s * l * (1.0 - l);
    let (sin_h, cos_h) = h.sin_cos();
    Rgb::new(
        channel(255.0 * (l + a * (A * cos_h + B * sin_h))),
        channel(255.0 * (l + a * (C * cos_h + D * sin_h))),
        channel(255.0 * (l + a * (E * cos_h))),
    )
}

/// Continuous scale mapping `domain` onto a sequential palette.
#[derive(Debug, Clone)]
pub struct SequentialScale {
    interpolator: Interpolator,
    domain: (f64, f64),
}

impl SequentialScale {
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn color(&self, value: f64) -> Rgb {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        self.interpolator.at(t)
    }
}

/// Assigns palette colors to keys in the order the keys are first seen,
/// wrapping around when the palette runs out.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    range: Vec<Rgb>,
    assigned: HashMap<String, usize>,
    order: Vec<String>,
}

impl OrdinalScale {
    pub fn new(range: &[&str]) -> Self {
        Self {
            range: range.iter().map(|h| parse_stop(h)).collect(),
            assigned: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn with_domain<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        for key in keys {
            self.index_of(&key.to_string());
        }
        self
    }

    pub fn domain(&self) -> &[String] {
        &self.order
    }

    pub fn color(&mut self, key: impl ToString) -> Rgb {
        let idx = self.index_of(&key.to_string());
        if self.range.is_empty() {
            return Rgb::new(0, 0, 0);
        }
        self.range[idx % self.range.len()]
    }

    fn index_of(&mut self, key: &str) -> usize {
        if let Some(idx) = self.assigned.get(key) {
            return *idx;
        }
        let idx = self.order.len();
        self.assigned.insert(key.to_string(), idx);
        self.order.push(key.to_string());
        idx
    }
}

#[derive(Debug, Clone)]
pub enum ColorScale {
    Sequential(SequentialScale),
    Ordinal(OrdinalScale),
}

impl ColorScale {
    /// Sequential scales read `key` as a number (non-numeric keys map to
    /// the start of the ramp); ordinal scales treat it as a category.
    pub fn color(&mut self, key: &str) -> Rgb {
        match self {
            ColorScale::Sequential(scale) => scale.color(key.trim().parse().unwrap_or(f64::NAN)),
            ColorScale::Ordinal(scale) => scale.color(key),
        }
    }
}

/// Domain handed to [`create_color_scale`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleDomain {
    Numeric(f64, f64),
    Categories(Vec<String>),
}

/// Builds the scale for `palette`, applying `domain` when it fits the
/// scale kind.
pub fn create_color_scale(palette: Palette, domain: Option<ScaleDomain>) -> ColorScale {
    if palette.is_sequential() {
        let domain = match domain {
            Some(ScaleDomain::Numeric(lo, hi)) => (lo, hi),
            _ => (0.0, 1.0),
        };
        ColorScale::Sequential(SequentialScale {
            interpolator: palette.interpolator(),
            domain,
        })
    } else {
        let scale = OrdinalScale::new(palette.categorical());
        ColorScale::Ordinal(match domain {
            Some(ScaleDomain::Categories(keys)) => scale.with_domain(keys),
            _ => scale,
        })
    }
}

/// Linear two-color gradient over a numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientScale {
    domain: (f64, f64),
    range: (Rgb, Rgb),
}

impl GradientScale {
    pub fn color(&self, value: f64) -> Rgb {
        let (d0, d1) = self.domain;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        self.range.0.lerp(&self.range.1, t)
    }
}

pub fn create_gradient_scale(domain: (f64, f64), range: (Rgb, Rgb)) -> GradientScale {
    GradientScale { domain, range }
}

/// Gradient between the theme's primary and secondary colors.
pub fn default_gradient_scale(domain: (f64, f64)) -> GradientScale {
    create_gradient_scale(
        domain,
        (parse_stop(DEFAULT_GRADIENT.0), parse_stop(DEFAULT_GRADIENT.1)),
    )
}

/// `count` colors: a prefix of [`DEFAULT_COLORS`] when it is long enough,
/// otherwise the category20 cycle.
pub fn default_colors(count: usize) -> Vec<Rgb> {
    if count <= DEFAULT_COLORS.len() {
        return DEFAULT_COLORS[..count].iter().map(|h| parse_stop(h)).collect();
    }
    let mut scale = OrdinalScale::new(&CATEGORY20);
    (0..count).map(|i| scale.color(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(c: Rgb) -> String {
        c.to_hex()
    }

    #[test]
    fn hex_round_trip_and_short_form() {
        assert_eq!(Rgb::from_hex("#667eea"), Some(Rgb::new(0x66, 0x7e, 0xea)));
        assert_eq!(Rgb::from_hex("fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
        assert_eq!(Rgb::new(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn palette_names_parse_into_the_closed_set() {
        assert_eq!("Set3".parse::<Palette>(), Ok(Palette::Set3));
        assert!("jet".parse::<Palette>().is_err());
        assert_eq!(Palette::from_name_or_default("jet"), Palette::Viridis);
        for p in Palette::ALL {
            assert_eq!(p.name().parse::<Palette>(), Ok(p));
        }
    }

    #[test]
    fn sequential_scale_spans_the_ramp() {
        let mut scale = create_color_scale(Palette::Viridis, Some(ScaleDomain::Numeric(0.0, 100.0)));
        assert_eq!(hex(scale.color("0")), "#440154");
        assert_eq!(hex(scale.color("100")), "#fde725");
        assert_eq!(hex(scale.color("250")), "#fde725");
        assert_eq!(hex(scale.color("-5")), "#440154");
    }

    #[test]
    fn rainbow_is_cyclic() {
        assert_eq!(rainbow(0.0), rainbow(1.0));
        assert_eq!(rainbow(0.25), rainbow(1.25));
        assert_ne!(rainbow(0.0), rainbow(0.5));
    }

    #[test]
    fn ordinal_scale_assigns_in_first_seen_order() {
        let mut scale = create_color_scale(
            Palette::Category10,
            Some(ScaleDomain::Categories(vec!["北京".into(), "上海".into()])),
        );
        assert_eq!(hex(scale.color("上海")), CATEGORY10[1]);
        assert_eq!(hex(scale.color("深圳")), CATEGORY10[2]);
        assert_eq!(hex(scale.color("北京")), CATEGORY10[0]);
    }

    #[test]
    fn ordinal_scale_wraps_around() {
        let mut scale = OrdinalScale::new(&ACCENT);
        let colors: Vec<Rgb> = (0..9).map(|i| scale.color(i)).collect();
        assert_eq!(colors[8], colors[0]);
        assert_eq!(scale.domain().len(), 9);
    }

    #[test]
    fn gradient_interpolates_between_endpoints() {
        let scale = create_gradient_scale(
            (10.0, 20.0),
            (Rgb::new(0, 0, 0), Rgb::new(200, 100, 50)),
        );
        assert_eq!(scale.color(10.0), Rgb::new(0, 0, 0));
        assert_eq!(scale.color(15.0), Rgb::new(100, 50, 25));
        assert_eq!(scale.color(20.0), Rgb::new(200, 100, 50));
        assert_eq!(scale.color(40.0), Rgb::new(255, 255, 150));

        let theme = default_gradient_scale((0.0, 1.0));
        assert_eq!(hex(theme.color(0.0)), "#667eea");
        assert_eq!(hex(theme.color(1.0)), "#764ba2");
    }

    #[test]
    fn default_colors_prefer_the_curated_palette() {
        let five = default_colors(5);
        assert_eq!(five.len(), 5);
        assert_eq!(hex(five[0]), "#667eea");

        let twelve = default_colors(12);
        assert_eq!(hex(twelve[11]), "#fcb69f");

        let many = default_colors(25);
        assert_eq!(many.len(), 25);
        assert_eq!(hex(many[0]), CATEGORY20[0]);
        assert_eq!(many[20], many[0]);
        assert!(default_colors(0).is_empty());
    }
}
