//! Tile URL templates.
//!
//! A template is a URL with `{x}`, `{y}` and `{z}` placeholders, for example
//! `https://tile.openstreetmap.org/{z}/{x}/{y}.png`. Templates are parsed and validated once,
//! when the tile source is configured, and then rendered for every tile without searching for
//! the placeholders again.

use std::fmt::{Display, Formatter};

use tilemap_types::TileIndex;

use crate::error::TilemapError;

const LAYER_PLACEHOLDER: &str = "{layer}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    X,
    Y,
    Z,
    Layer,
}

/// Parsed tile URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl TileUrlTemplate {
    /// Parses a template with `{x}`, `{y}` and `{z}` placeholders.
    ///
    /// Each of the three placeholders must be present. Unknown placeholders and unbalanced
    /// braces are rejected.
    pub fn parse(template: &str) -> Result<Self, TilemapError> {
        let parsed = Self::parse_with_layer(template)?;
        if parsed.segments.contains(&Segment::Layer) {
            return Err(TilemapError::Template(format!(
                "{template}: {LAYER_PLACEHOLDER} placeholder must be resolved by a tile source"
            )));
        }

        Ok(parsed)
    }

    fn parse_with_layer(template: &str) -> Result<Self, TilemapError> {
        let mut segments = vec![];
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find(['{', '}']) {
            let (before, from_brace) = rest.split_at(pos);
            literal.push_str(before);

            if from_brace.starts_with('}') {
                return Err(TilemapError::Template(format!(
                    "{template}: unexpected '}}' at position {}",
                    template.len() - from_brace.len()
                )));
            }

            let Some(end) = from_brace.find('}') else {
                return Err(TilemapError::Template(format!(
                    "{template}: placeholder is not closed"
                )));
            };

            let segment = match &from_brace[1..end] {
                "x" => Segment::X,
                "y" => Segment::Y,
                "z" => Segment::Z,
                "layer" => Segment::Layer,
                other => {
                    return Err(TilemapError::Template(format!(
                        "{template}: unknown placeholder {{{other}}}"
                    )))
                }
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
            rest = &from_brace[end + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        for (required, name) in [(Segment::X, "{x}"), (Segment::Y, "{y}"), (Segment::Z, "{z}")] {
            if !segments.contains(&required) {
                return Err(TilemapError::Template(format!(
                    "{template}: {name} placeholder is missing"
                )));
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Substitutes the tile index into the template.
    pub fn url(&self, index: &TileIndex) -> String {
        let mut url = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::X => url.push_str(&index.x.to_string()),
                Segment::Y => url.push_str(&index.y.to_string()),
                Segment::Z => url.push_str(&index.z.to_string()),
                // parse() rejects templates with a layer placeholder
                Segment::Layer => {}
            }
        }

        url
    }

    /// The template string this template was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Display for TileUrlTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Tiles of one tileset: the standard template and the high density (hiDPI) one.
///
/// The base URL may contain a `{layer}` placeholder. The standard template gets the layer name
/// substituted, the hiDPI template gets the layer name with the hiDPI suffix (like `@2x`). If
/// there is no `{layer}` placeholder, the suffix is inserted before the file extension of the
/// URL instead (`.../{y}.png` becomes `.../{y}@2x.png`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    layer: String,
    standard: TileUrlTemplate,
    hidpi: TileUrlTemplate,
    tile_size: u32,
}

impl TileSource {
    /// Creates a tile source for the `layer` of the tile server described by `url`.
    ///
    /// `tile_size` is the pixel size of standard tiles, hiDPI tiles are twice as large.
    pub fn new(
        url: &str,
        layer: &str,
        hidpi_suffix: &str,
        tile_size: u32,
    ) -> Result<Self, TilemapError> {
        if tile_size == 0 {
            return Err(TilemapError::Template(format!(
                "{url}: tile size must not be zero"
            )));
        }

        // validates the url including the placeholder set before substitution
        TileUrlTemplate::parse_with_layer(url)?;

        let standard = url.replace(LAYER_PLACEHOLDER, layer);
        let hidpi = if url.contains(LAYER_PLACEHOLDER) {
            url.replace(LAYER_PLACEHOLDER, &format!("{layer}{hidpi_suffix}"))
        } else {
            insert_before_extension(url, hidpi_suffix)
        };

        Ok(Self {
            layer: layer.to_string(),
            standard: TileUrlTemplate::parse(&standard)?,
            hidpi: TileUrlTemplate::parse(&hidpi)?,
            tile_size,
        })
    }

    /// Name of the layer.
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Template and tile pixel size to use for the given screen density.
    pub fn template(&self, hidpi: bool) -> (&TileUrlTemplate, u32) {
        if hidpi {
            (&self.hidpi, self.tile_size * 2)
        } else {
            (&self.standard, self.tile_size)
        }
    }
}

fn insert_before_extension(url: &str, suffix: &str) -> String {
    let path_start = url.find("://").map(|p| p + 3).unwrap_or(0);
    let query_start = url.find('?').unwrap_or(url.len());
    let file_start = url[path_start..query_start]
        .rfind('/')
        .map(|p| path_start + p + 1)
        .unwrap_or(path_start);

    let insert_at = match url[file_start..query_start].rfind('.') {
        Some(dot) => file_start + dot,
        None => query_start,
    };

    format!("{}{suffix}{}", &url[..insert_at], &url[insert_at..])
}
