// src/loader/json_loader.rs
use crate::document::*;
use crate::error::MapError;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flip and rotation flags live in the top bits of a gid.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLayerData {
    Array(Vec<u32>),
    Encoded(String),
}

impl Default for JsonLayerData {
    fn default() -> Self {
        JsonLayerData::Array(Vec::new())
    }
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: JsonLayerData,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    objects: Vec<JsonObject>,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    embedded: JsonTileset,
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

#[derive(Deserialize, Default)]
struct JsonTileset {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
    #[serde(default)]
    columns: u32,
    #[serde(default)]
    tilecount: u32,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

impl JsonTileset {
    /// Number of tiles in the tileset. Older exports may omit `tilecount`,
    /// in which case the atlas grid decides; metadata ids past either one
    /// still get a slot.
    fn tile_count(&self) -> u32 {
        let grid = if self.tilecount > 0 {
            self.tilecount
        } else if self.tilewidth > 0 && self.tileheight > 0 {
            let columns = match self.columns {
                0 => self.imagewidth / self.tilewidth,
                c => c,
            };
            columns.saturating_mul(self.imageheight / self.tileheight)
        } else {
            0
        };
        let metadata = self.tiles.iter().map(|t| t.id.saturating_add(1)).max().unwrap_or(0);
        grid.max(metadata)
    }
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    ellipse: bool,
    #[serde(default)]
    text: Option<JsonValue>,
    #[serde(default)]
    polygon: Vec<JsonObjectPoint>,
    #[serde(default)]
    polyline: Vec<JsonObjectPoint>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

fn class_or_type(class: String, kind: String) -> String {
    if !class.is_empty() {
        class
    } else {
        kind
    }
}

fn json_untyped_value(name: &str, value: &JsonValue) -> Result<PropertyValue, MapError> {
    match value {
        JsonValue::Bool(v) => Ok(PropertyValue::Bool(*v)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(v) => Ok(PropertyValue::Int(v)),
            None => Ok(PropertyValue::from_number(n.as_f64().unwrap_or(f64::NAN))),
        },
        JsonValue::String(s) => Ok(PropertyValue::String(s.clone())),
        JsonValue::Object(_) => json_class_value(value),
        JsonValue::Array(_) => Err(MapError::unsupported(name, "array")),
        JsonValue::Null => Err(MapError::unsupported(name, "null")),
    }
}

fn json_class_value(value: &JsonValue) -> Result<PropertyValue, MapError> {
    let mut members = Properties::new();
    if let JsonValue::Object(fields) = value {
        for (k, v) in fields {
            members.insert(k.clone(), json_untyped_value(k, v)?);
        }
    }
    Ok(PropertyValue::Class(members))
}

fn json_property_to_value(prop: JsonProperty) -> Result<(String, PropertyValue), MapError> {
    let JsonProperty { name, kind, value } = prop;

    let mismatch = |expected: &str| MapError::unsupported(&name, format!("{expected} with value {value}"));

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool).ok_or_else(|| mismatch("bool"))?,
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::Int).ok_or_else(|| mismatch("int"))?,
        Some("float") => value.as_f64().map(PropertyValue::Float).ok_or_else(|| mismatch("float"))?,
        Some("string") | Some("file") | Some("color") => value
            .as_str()
            .map(|s| PropertyValue::String(s.to_owned()))
            .ok_or_else(|| mismatch("string"))?,
        Some("class") => json_class_value(&value)?,
        Some(other) => return Err(MapError::unsupported(name, other)),
        None => json_untyped_value(&name, &value)?,
    };

    Ok((name, parsed))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for p in props {
        let (name, value) = json_property_to_value(p)?;
        out.insert(name, value);
    }
    Ok(out)
}

fn object_to_document(obj: JsonObject) -> Result<MapObject, MapError> {
    let (shape, points) = if obj.point {
        (ObjectShape::Point, Vec::new())
    } else if obj.ellipse {
        (ObjectShape::Ellipse, Vec::new())
    } else if !obj.polygon.is_empty() {
        (ObjectShape::Polygon, obj.polygon)
    } else if !obj.polyline.is_empty() {
        (ObjectShape::Polyline, obj.polyline)
    } else if obj.text.is_some() {
        (ObjectShape::Text, Vec::new())
    } else {
        (ObjectShape::Rectangle, Vec::new())
    };

    Ok(MapObject {
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        name: obj.name,
        class_name: class_or_type(obj.class, obj.kind),
        shape,
        polygon: points.into_iter().map(|p| Point::new(p.x, p.y)).collect(),
        properties: properties_from_json(obj.properties)?,
    })
}

/// One `Tile` per id in the tileset, with `type`/`class` and properties
/// merged in from the metadata entries. A tile's position in the list is its
/// id.
fn tileset_to_document(ts: JsonTileset) -> Result<Tileset, MapError> {
    let count = ts.tile_count();
    let mut tiles: Vec<Tile> = (0..count)
        .map(|id| Tile {
            id,
            ..Default::default()
        })
        .collect();
    for meta in ts.tiles {
        let tile = &mut tiles[meta.id as usize];
        tile.class_name = class_or_type(meta.class, meta.kind);
        tile.properties = properties_from_json(meta.properties)?;
    }
    debug!(tileset = %ts.name, tiles = count, "resolved tileset");

    Ok(Tileset {
        name: ts.name,
        tile_width: ts.tilewidth,
        tile_height: ts.tileheight,
        image_width: ts.imagewidth,
        tiles,
    })
}

fn resolve_tileset(ts: JsonTilesetRef, map_dir: &Path) -> Result<(u32, Tileset), MapError> {
    let JsonTilesetRef {
        firstgid,
        source,
        embedded,
    } = ts;

    let Some(source) = source else {
        return Ok((firstgid, tileset_to_document(embedded)?));
    };

    if !source.ends_with(".json") {
        return Err(MapError::InvalidMap(format!(
            "External tileset must be JSON: {source}"
        )));
    }
    let ts_path = map_dir.join(&source);
    let ext_txt = std::fs::read_to_string(&ts_path).map_err(|source| MapError::Io {
        path: ts_path.clone(),
        source,
    })?;
    let ext: JsonTileset = serde_json::from_str(&ext_txt).map_err(|source| MapError::Json {
        path: ts_path,
        source,
    })?;
    Ok((firstgid, tileset_to_document(ext)?))
}

/// Tracks which tilesets are referenced, in first-use order.
struct UsedTilesets {
    // (firstgid, tile count, index into `tilesets`), sorted by firstgid
    ranges: Vec<(u32, u32, usize)>,
    order: Vec<usize>,
    seen: HashSet<usize>,
}

impl UsedTilesets {
    fn new(tilesets: &[(u32, &Tileset)]) -> Self {
        let mut ranges: Vec<_> = tilesets
            .iter()
            .zip(0..)
            .map(|(&(first, ts), idx)| (first, ts.tiles.len() as u32, idx))
            .collect();
        ranges.sort_unstable_by_key(|(first, _, _)| *first);
        Self {
            ranges,
            order: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn mark(&mut self, layer: &str, raw_gid: u32) -> Result<u32, MapError> {
        let gid = raw_gid & GID_MASK;
        if gid == 0 {
            return Ok(0);
        }
        let idx = self.ranges.partition_point(|(first, _, _)| *first <= gid);
        let covering = idx
            .checked_sub(1)
            .and_then(|i| self.ranges.get(i))
            .filter(|(first, count, _)| gid - first < *count);
        let Some(&(_, _, tileset)) = covering else {
            return Err(MapError::InvalidTileGid {
                layer: layer.to_owned(),
                gid,
            });
        };
        if self.seen.insert(tileset) {
            self.order.push(tileset);
        }
        Ok(gid)
    }
}

/// Load a Tiled JSON map and the external JSON tilesets it references.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, MapError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            p.display()
        )));
    }

    let txt = std::fs::read_to_string(p).map_err(|source| MapError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    let j: JsonMap = serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: p.to_path_buf(),
        source,
    })?;

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    document_from_json(j, &map_dir)
}

/// Load a Tiled JSON map from a string; external tilesets resolve against
/// `base_dir`.
pub fn load_document_from_str(json: &str, base_dir: impl AsRef<Path>) -> Result<Document, MapError> {
    let j: JsonMap = serde_json::from_str(json).map_err(|source| MapError::Json {
        path: PathBuf::from("<inline>"),
        source,
    })?;
    document_from_json(j, base_dir.as_ref())
}

fn document_from_json(j: JsonMap, map_dir: &Path) -> Result<Document, MapError> {
    let mut firstgids = Vec::with_capacity(j.tilesets.len());
    let mut tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in j.tilesets {
        let (firstgid, tileset) = resolve_tileset(ts, map_dir)?;
        firstgids.push(firstgid);
        tilesets.push(tileset);
    }

    let ranges: Vec<_> = firstgids.iter().copied().zip(&tilesets).collect();
    let mut used = UsedTilesets::new(&ranges);

    let mut layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {
                let JsonLayerData::Array(data) = l.data else {
                    return Err(MapError::InvalidMap(format!(
                        "Layer '{}' uses encoded tile data; export with CSV encoding",
                        l.name
                    )));
                };
                if data.len() != l.width * l.height {
                    return Err(MapError::InvalidLayerSize(l.name));
                }
                let data = data
                    .into_iter()
                    .map(|gid| used.mark(&l.name, gid))
                    .collect::<Result<Vec<_>, _>>()?;
                LayerKind::Tiles {
                    width: l.width,
                    height: l.height,
                    data,
                }
            }
            "objectgroup" => {
                let mut objects = Vec::with_capacity(l.objects.len());
                for obj in l.objects {
                    if let Some(gid) = obj.gid {
                        used.mark(&l.name, gid)?;
                    }
                    objects.push(object_to_document(obj)?);
                }
                LayerKind::Objects { objects }
            }
            other => {
                warn!(layer = %l.name, kind = other, "skipping layer without a wire encoding");
                LayerKind::Other
            }
        };
        layers.push(Layer { name: l.name, kind });
    }

    let mut slots: Vec<Option<Tileset>> = tilesets.into_iter().map(Some).collect();
    let tilesets: Vec<Tileset> = used
        .order
        .iter()
        .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
        .collect();
    debug!(
        layers = layers.len(),
        tilesets = tilesets.len(),
        "loaded Tiled JSON map"
    );

    Ok(Document {
        width: j.width,
        height: j.height,
        tile_width: j.tilewidth,
        tile_height: j.tileheight,
        layers,
        tilesets,
    })
}
