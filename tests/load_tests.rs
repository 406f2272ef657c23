// tests/load_tests.rs

use std::fs;

use tiled_mdat::{load_document, load_document_from_str, write_map, LayerKind, MapError, MAGIC};

const SIMPLE_MAP: &str = r#"
{
    "width": 1,
    "height": 1,
    "tilewidth": 4,
    "tileheight": 4,
    "layers": [ { "type": "tilelayer", "name": "L", "width": 1, "height": 1, "data": [0] } ]
}
"#;

#[test]
fn integration_load_from_file_and_str() {
    let doc = load_document_from_str(SIMPLE_MAP, ".").expect("should parse inline JSON");
    assert_eq!(doc.width, 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test_map_integration.json");
    fs::write(&path, SIMPLE_MAP).unwrap();
    let doc2 = load_document(&path).unwrap();
    assert_eq!(doc2.tile_width, 4);
    assert_eq!(doc, doc2);
}

#[test]
fn integration_unsupported_format() {
    let err = load_document("foo.tmx").unwrap_err();
    match err {
        MapError::InvalidMap(msg) => assert!(msg.contains("foo.tmx")),
        other => panic!("expected InvalidMap, got {:?}", other),
    }
}

const BAD_LAYER_SIZE: &str = r#"
{
  "width": 2,
  "height": 2,
  "tilewidth": 8,
  "tileheight": 8,
  "layers": [
    { "type": "tilelayer", "name": "oops", "width": 2, "height": 2, "data": [1,2,3] }
  ]
}
"#;

#[test]
fn error_on_layer_size_mismatch() {
    let err = load_document_from_str(BAD_LAYER_SIZE, ".").unwrap_err();
    assert!(matches!(err, MapError::InvalidLayerSize(name) if name == "oops"));
}

const JSON_WITH_EXTRA: &str = r#"
{
  "width":1, "height":1,
  "tilewidth":8, "tileheight":8,
  "dummyField": "ignored",
  "orientation": "orthogonal",
  "layers": [
    {
      "type":"tilelayer",
      "name":"L",
      "width":1,
      "height":1,
      "data":[0],
      "opacity": 0.5,
      "properties": []
    }
  ]
}
"#;

#[test]
fn load_ignores_extra_fields() {
    let doc = load_document_from_str(JSON_WITH_EXTRA, ".").expect("Should ignore unknown fields");
    assert_eq!(doc.layers[0].name, "L");
    assert!(matches!(&doc.layers[0].kind, LayerKind::Tiles { data, .. } if data == &vec![0]));
}

#[test]
fn load_allows_empty_layer_name() {
    let json = SIMPLE_MAP.replace(r#""name": "L""#, r#""name": """#);
    let doc = load_document_from_str(&json, ".").unwrap();
    assert_eq!(doc.layers[0].name, "");
}

#[test]
fn json_map_converts_to_mdat_file() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("level.json");
    let ts_path = dir.path().join("terrain.json");
    let out_path = dir.path().join("level.mdat");

    fs::write(
        &map_path,
        r#"{
          "width": 2, "height": 1, "tilewidth": 16, "tileheight": 16,
          "layers": [
            {"type":"tilelayer","name":"ground","width":2,"height":1,"data":[4,0]},
            {"type":"objectgroup","name":"spawns","objects":[
              {"name":"start","type":"spawn","x":8,"y":8,"point":true,
               "properties":[{"name":"team","type":"int","value":2}]}
            ]}
          ],
          "tilesets":[{"firstgid":1,"source":"terrain.json"}]
        }"#,
    )
    .unwrap();
    fs::write(
        &ts_path,
        r#"{
          "name":"terrain","tilewidth":16,"tileheight":16,
          "image":"terrain.png","imagewidth":64,"imageheight":64,
          "tiles":[{"id":3,"type":"rock"}]
        }"#,
    )
    .unwrap();

    let doc = load_document(&map_path).unwrap();
    let written = write_map(&doc, &out_path).unwrap();

    let bytes = fs::read(&out_path).unwrap();
    assert_eq!(bytes.len(), written);
    assert_eq!(&bytes[2..2 + MAGIC.len()], MAGIC.as_bytes());

    assert_eq!(doc.tilesets[0].tiles.len(), 16);

    // tileset block is last: count, name, then all 16 tiles of the 4x4 atlas
    // in id order; only tile 3 carries a class.
    let mut tail = Vec::new();
    tail.extend_from_slice(&1u16.to_le_bytes());
    tail.extend_from_slice(&7u16.to_le_bytes());
    tail.extend_from_slice(b"terrain");
    tail.extend_from_slice(&16u16.to_le_bytes());
    for id in 0..16i16 {
        let class: &[u8] = if id == 3 { b"rock" } else { b"" };
        tail.extend_from_slice(&(class.len() as u16).to_le_bytes());
        tail.extend_from_slice(class);
        tail.extend_from_slice(&(id % 4 * 16).to_le_bytes());
        tail.extend_from_slice(&(id / 4 * 16).to_le_bytes());
        tail.extend_from_slice(&0u16.to_le_bytes());
    }
    assert!(bytes.ends_with(&tail));
}
