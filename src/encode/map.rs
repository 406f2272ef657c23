//! Map header, layer and tileset records.

use tracing::trace;

use crate::document::{Document, Layer, LayerKind, MapObject, Tileset};
use crate::Result;

use super::field::{truncate_word, wrap_word, FieldList};
use super::properties::encode_properties;
use super::MAGIC;

/// Flatten a whole document into its field sequence: header, layers, then
/// tilesets.
pub fn encode_map(doc: &Document) -> Result<FieldList> {
    let mut out = FieldList::new();

    out.string(MAGIC)?;
    out.word(wrap_word(doc.width.into()));
    out.word(wrap_word(doc.height.into()));
    out.word(wrap_word(doc.tile_width.into()));
    out.word(wrap_word(doc.tile_height.into()));
    out.count("layers", doc.encodable_layers().count())?;

    for layer in doc.encodable_layers() {
        encode_layer(&mut out, layer)?;
    }

    out.count("tilesets", doc.tilesets.len())?;
    for tileset in &doc.tilesets {
        encode_tileset(&mut out, tileset)?;
    }

    Ok(out)
}

fn encode_layer(out: &mut FieldList, layer: &Layer) -> Result<()> {
    match &layer.kind {
        LayerKind::Tiles { width, height, .. } => {
            trace!(layer = %layer.name, width, height, "encoding tile layer");
            out.string(&layer.name)?;
            for y in 0..*height {
                for x in 0..*width {
                    out.word(wrap_word(layer.kind.tile_at(x, y).into()));
                }
            }
        }
        LayerKind::Objects { objects } => {
            trace!(layer = %layer.name, objects = objects.len(), "encoding object layer");
            out.string(&layer.name)?;
            out.count("objects", objects.len())?;
            for object in objects {
                encode_object(out, object)?;
            }
        }
        LayerKind::Other => {}
    }
    Ok(())
}

fn encode_object(out: &mut FieldList, object: &MapObject) -> Result<()> {
    out.word(truncate_word(object.x));
    out.word(truncate_word(object.y));
    out.word(truncate_word(object.width));
    out.word(truncate_word(object.height));
    out.string(&object.name)?;
    out.string(&object.class_name)?;
    out.word(object.shape.as_word());

    out.count("polygon points", object.polygon.len())?;
    for point in &object.polygon {
        out.word(truncate_word(point.x));
        out.word(truncate_word(point.y));
    }

    out.append(encode_properties(&object.properties)?);
    Ok(())
}

fn encode_tileset(out: &mut FieldList, tileset: &Tileset) -> Result<()> {
    out.string(&tileset.name)?;
    out.count("tiles", tileset.tiles.len())?;

    for tile in &tileset.tiles {
        let (src_x, src_y) = tileset.atlas_origin(tile.id);
        out.string(&tile.class_name)?;
        out.word(wrap_word(src_x.into()));
        out.word(wrap_word(src_y.into()));
        out.append(encode_properties(&tile.properties)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ObjectShape, Point, Properties, PropertyValue, Tile};
    use crate::encode::field::EncodedField::{self, Bytes, Word};

    fn header(doc: &Document, layers: i16) -> Vec<EncodedField> {
        vec![
            Word(MAGIC.len() as i16),
            Bytes(MAGIC.into()),
            Word(doc.width as i16),
            Word(doc.height as i16),
            Word(doc.tile_width as i16),
            Word(doc.tile_height as i16),
            Word(layers),
        ]
    }

    #[test]
    fn tile_layer_scenario() {
        let doc = Document {
            width: 2,
            height: 1,
            tile_width: 8,
            tile_height: 8,
            layers: vec![Layer::tiles("ground", 2, 1, vec![5, 0])],
            tilesets: vec![],
        };
        let fields = encode_map(&doc).expect("encode");

        let mut expected = header(&doc, 1);
        expected.extend([Word(6), Bytes("ground".into()), Word(5), Word(0), Word(0)]);
        assert_eq!(fields.as_slice(), expected.as_slice());
    }

    #[test]
    fn tile_layer_rows_use_layer_dimensions() {
        let doc = Document {
            width: 10,
            height: 10,
            tile_width: 8,
            tile_height: 8,
            layers: vec![Layer::tiles("L", 3, 2, vec![1, 2, 3, 4, 5, 6])],
            tilesets: vec![],
        };
        let fields = encode_map(&doc).expect("encode");
        let tiles: Vec<_> = fields.as_slice()[9..15].to_vec();
        assert_eq!(tiles, vec![Word(1), Word(2), Word(3), Word(4), Word(5), Word(6)]);
        assert_eq!(fields.len(), 9 + 6 + 1);
    }

    #[test]
    fn other_layers_are_skipped() {
        let doc = Document {
            width: 1,
            height: 1,
            tile_width: 4,
            tile_height: 4,
            layers: vec![
                Layer {
                    name: "backdrop".into(),
                    kind: LayerKind::Other,
                },
                Layer::objects("spawns", vec![]),
            ],
            tilesets: vec![],
        };
        let fields = encode_map(&doc).expect("encode");

        let mut expected = header(&doc, 1);
        expected.extend([Word(6), Bytes("spawns".into()), Word(0), Word(0)]);
        assert_eq!(fields.as_slice(), expected.as_slice());
    }

    #[test]
    fn each_object_writes_its_own_polygon() {
        let triangle = MapObject {
            x: 10.9,
            y: 20.0,
            name: "tri".into(),
            class_name: "wall".into(),
            shape: ObjectShape::Polygon,
            polygon: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0)],
            ..Default::default()
        };
        let line = MapObject {
            shape: ObjectShape::Polyline,
            polygon: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            ..Default::default()
        };
        let mut out = FieldList::new();
        encode_object(&mut out, &triangle).expect("encode");
        encode_object(&mut out, &line).expect("encode");

        let f = out.as_slice();
        assert_eq!(&f[..4], &[Word(10), Word(20), Word(0), Word(0)]);
        assert_eq!(&f[4..8], &[Word(3), Bytes("tri".into()), Word(4), Bytes("wall".into())]);
        assert_eq!(f[8], Word(ObjectShape::Polygon as i16));
        assert_eq!(
            &f[9..16],
            &[Word(3), Word(0), Word(0), Word(4), Word(0), Word(4), Word(4)]
        );
        assert_eq!(f[16], Word(0));

        // second object starts after the first one's empty property block
        let g = &f[17..];
        assert_eq!(&g[4..8], &[Word(0), Bytes(String::new()), Word(0), Bytes(String::new())]);
        assert_eq!(g[8], Word(ObjectShape::Polyline as i16));
        assert_eq!(&g[9..14], &[Word(2), Word(1), Word(2), Word(3), Word(4)]);
    }

    #[test]
    fn tiles_use_their_own_metadata() {
        let mut props = Properties::new();
        props.insert("damage", PropertyValue::Int(10));
        let tileset = Tileset {
            name: "terrain".into(),
            tile_width: 16,
            tile_height: 16,
            image_width: 64,
            tiles: vec![
                Tile {
                    id: 3,
                    class_name: "grass".into(),
                    properties: Properties::new(),
                },
                Tile {
                    id: 5,
                    class_name: "lava".into(),
                    properties: props,
                },
            ],
        };
        let mut out = FieldList::new();
        encode_tileset(&mut out, &tileset).expect("encode");

        let f = out.as_slice();
        assert_eq!(&f[..3], &[Word(7), Bytes("terrain".into()), Word(2)]);
        assert_eq!(&f[3..7], &[Word(5), Bytes("grass".into()), Word(48), Word(0)]);
        assert_eq!(f[7], Word(0));
        assert_eq!(&f[8..12], &[Word(4), Bytes("lava".into()), Word(16), Word(16)]);
        assert_eq!(f[12], Word(1));
    }
}
