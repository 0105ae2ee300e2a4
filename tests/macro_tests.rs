use structon::{from_str, schema, to_string, NodeList, Schematic};

#[derive(Debug, Default, PartialEq)]
struct Reading {
    celsius: f32,
    stamp: i64,
}

schema! {
    Reading {
        celsius: float as "temp_c",
        stamp: long,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Station {
    id: i32,
    name: Option<String>,
    latest: Option<Box<Reading>>,
    history: NodeList<Reading>,
    window: [f64; 4],
    aliases: [Option<String>; 2],
}

schema! {
    Station {
        id: int,
        name: string,
        latest: nested(Reading),
        history: list(Reading),
        window: array(double, 4),
        aliases: array(string, 2),
    }
}

#[test]
fn test_schema_takes_struct_name() {
    assert_eq!(Station::schema().name(), "Station");
    assert_eq!(Reading::schema().name(), "Reading");
}

#[test]
fn test_declared_order_is_kept() {
    let keys: Vec<&str> = Station::schema().keys().collect();
    assert_eq!(
        keys,
        vec!["id", "name", "latest", "history", "window", "aliases"]
    );
}

#[test]
fn test_rename_replaces_the_field_name_key() {
    let schema = Reading::schema();
    assert!(schema.field("temp_c").is_some());
    assert!(schema.field("celsius").is_none());

    let reading = from_str::<Reading>(r#"{"temp_c": 21.5, "stamp": 99}"#)
        .unwrap()
        .unwrap();
    assert_eq!(reading.celsius, 21.5);
    assert_eq!(
        to_string(&*reading).unwrap(),
        r#"{"temp_c":21.5,"stamp":99}"#
    );
}

#[test]
fn test_every_kind_roundtrips_through_the_macro_accessors() {
    let text = r#"{
        "id": 4,
        "name": "north ridge",
        "latest": {"temp_c": -3.5, "stamp": 1000},
        "history": [{"temp_c": 1.0, "stamp": 1}, {"temp_c": 2.0, "stamp": 2}],
        "window": [0.5, 1.5, 2.5, 3.5],
        "aliases": ["nr", "ridge"]
    }"#;

    let station = from_str::<Station>(text).unwrap().unwrap();
    assert_eq!(station.latest.as_ref().unwrap().celsius, -3.5);
    assert_eq!(station.window, [0.5, 1.5, 2.5, 3.5]);

    let rendered = to_string(&*station).unwrap();
    let again = from_str::<Station>(&rendered).unwrap().unwrap();
    assert_eq!(station, again);
}

#[test]
fn test_scalar_element_lists() {
    #[derive(Debug, Default, PartialEq)]
    struct Sampler {
        bytes: NodeList<i8>,
        ratios: NodeList<f64>,
        notes: NodeList<String>,
    }

    schema! {
        Sampler {
            bytes: list(i8),
            ratios: list(f64),
            notes: list(String),
        }
    }

    let sampler = from_str::<Sampler>(
        r#"{"bytes": [1, 2], "ratios": [0.25, 0.75], "notes": ["a", "b"]}"#,
    )
    .unwrap()
    .unwrap();

    let bytes: Vec<i8> = sampler.bytes.iter().flatten().copied().collect();
    assert_eq!(bytes, vec![1, 2]);
    let notes: Vec<&String> = sampler.notes.iter().flatten().collect();
    assert_eq!(notes, vec!["a", "b"]);

    let rendered = to_string(&*sampler).unwrap();
    assert_eq!(
        rendered,
        r#"{"bytes":[1,2],"ratios":[0.25,0.75],"notes":["a","b"]}"#
    );
}
