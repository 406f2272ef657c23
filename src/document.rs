//! Format-agnostic tilemap document, as handed to the encoder by a host.

/// A whole map: grid size, tile size, layers in draw order and the
/// tilesets the layers actually reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Layers in draw order.
    pub layers: Vec<Layer>,
    /// Used tilesets, in first-use order.
    pub tilesets: Vec<Tileset>,
}

impl Document {
    /// Layers that have a wire representation (tile and object layers).
    pub fn encodable_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.is_encodable())
    }
}

/// A named drawing plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Layer payload.
    pub kind: LayerKind,
}

impl Layer {
    /// Build a tile layer.
    pub fn tiles(name: impl Into<String>, width: usize, height: usize, data: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Tiles {
                width,
                height,
                data,
            },
        }
    }

    /// Build an object layer.
    pub fn objects(name: impl Into<String>, objects: Vec<MapObject>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Objects { objects },
        }
    }

    /// Whether this layer is written to the output at all.
    pub fn is_encodable(&self) -> bool {
        !matches!(self.kind, LayerKind::Other)
    }
}

/// Layer payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// Row-major grid of tile ids, 0 = empty.
    Tiles {
        /// Columns.
        width: usize,
        /// Rows.
        height: usize,
        /// `width * height` ids.
        data: Vec<u32>,
    },
    /// Free-form objects.
    Objects {
        /// Objects in layer order.
        objects: Vec<MapObject>,
    },
    /// Image layers, groups and anything else; skipped by the encoder.
    Other,
}

impl LayerKind {
    /// Tile id at `(x, y)`, or 0 outside the grid.
    pub fn tile_at(&self, x: usize, y: usize) -> u32 {
        match self {
            LayerKind::Tiles {
                width,
                height,
                data,
            } if x < *width && y < *height => data.get(y * width + x).copied().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Object geometry kind. Discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i16)]
pub enum ObjectShape {
    /// Axis-aligned box.
    #[default]
    Rectangle = 0,
    /// Closed point list.
    Polygon = 1,
    /// Open point list.
    Polyline = 2,
    /// Ellipse inscribed in the object bounds.
    Ellipse = 3,
    /// Text box.
    Text = 4,
    /// Single point.
    Point = 5,
}

impl ObjectShape {
    /// Wire discriminant.
    pub fn as_word(self) -> i16 {
        self as i16
    }
}

/// Point relative to its object's position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X offset in pixels.
    pub x: f64,
    /// Y offset in pixels.
    pub y: f64,
}

impl Point {
    /// Build a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An object on an object layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapObject {
    /// X position in pixels.
    pub x: f64,
    /// Y position in pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Object name.
    pub name: String,
    /// Free-form classification.
    pub class_name: String,
    /// Geometry kind.
    pub shape: ObjectShape,
    /// Polygon or polyline points; empty for other shapes.
    pub polygon: Vec<Point>,
    /// Custom properties.
    pub properties: Properties,
}

/// An atlas image cut into a regular, zero-margin grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tileset {
    /// Tileset name.
    pub name: String,
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Atlas image width in pixels, 0 if there is no atlas.
    pub image_width: u32,
    /// Tiles in the order a reader numbers them; the loader lists every id.
    pub tiles: Vec<Tile>,
}

impl Tileset {
    /// Top-left pixel of tile `id` inside the atlas.
    ///
    /// Tiles are laid out left to right, top to bottom with no margin or
    /// spacing, so the offset depends only on the linear id.
    pub fn atlas_origin(&self, id: u32) -> (u32, u32) {
        if self.image_width == 0 {
            return (0, 0);
        }
        let linear = u64::from(id) * u64::from(self.tile_width);
        let image_width = u64::from(self.image_width);
        let src_x = linear % image_width;
        let src_y = (linear / image_width) * u64::from(self.tile_height);
        (src_x as u32, src_y as u32)
    }
}

/// Per-tile metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tile {
    /// Index into the atlas.
    pub id: u32,
    /// Free-form classification.
    pub class_name: String,
    /// Custom properties.
    pub properties: Properties,
}

/// A custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Real number.
    Float(f64),
    /// Text (also used for colors and file paths).
    String(String),
    /// Nested custom type; has no wire encoding.
    Class(Properties),
}

impl PropertyValue {
    /// Classify an untyped number: a zero fractional part makes it an `Int`.
    ///
    /// This is lossy, a float that happens to be whole becomes an `Int`.
    pub fn from_number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
            PropertyValue::Int(n as i64)
        } else {
            PropertyValue::Float(n)
        }
    }

    /// Short name of the value kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Class(_) => "class",
        }
    }
}

/// Ordered bag of uniquely named property values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    entries: Vec<(String, PropertyValue)>,
}

impl Properties {
    /// Empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`; a replaced key keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value for `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Boolean value for `name`, if present with that kind.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(PropertyValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Integer value for `name`, if present with that kind.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(PropertyValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Float value for `name`, if present with that kind.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(PropertyValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// String value for `name`, if present with that kind.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PropertyValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, PropertyValue)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, PropertyValue)>>(iter: I) -> Self {
        let mut out = Properties::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}
