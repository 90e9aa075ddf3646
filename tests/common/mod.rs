#![allow(dead_code)]

use rusqlite::Connection;
use std::path::Path;

/// Closed square ring from (min, min) to (max, max).
pub fn square_ring(min: f64, max: f64) -> Vec<(f64, f64)> {
    vec![(min, min), (max, min), (max, max), (min, max), (min, min)]
}

/// Little-endian WKB for a single-ring polygon.
pub fn wkb_polygon(ring: &[(f64, f64)]) -> Vec<u8> {
    let mut buf = vec![0x01u8];
    buf.extend_from_slice(&3u32.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&(ring.len() as u32).to_le_bytes());
    for (x, y) in ring {
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
    }
    buf
}

/// Wrap WKB in a GeoPackage geometry BLOB (no envelope, little-endian).
pub fn gpkg_geometry(wkb: &[u8]) -> Vec<u8> {
    let mut blob = vec![b'G', b'P', 0, 0b0000_0001];
    blob.extend_from_slice(&4326i32.to_le_bytes());
    blob.extend_from_slice(wkb);
    blob
}

/// Build a minimal GeoPackage with the standard metadata tables and one
/// `flood_zones` feature table holding the given polygons.
pub fn write_fixture_gpkg(path: &Path, features: &[(Vec<(f64, f64)>, Option<&str>)]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE gpkg_contents (
             table_name TEXT NOT NULL PRIMARY KEY,
             data_type TEXT NOT NULL,
             identifier TEXT,
             srs_id INTEGER
         );
         CREATE TABLE gpkg_geometry_columns (
             table_name TEXT NOT NULL,
             column_name TEXT NOT NULL,
             geometry_type_name TEXT NOT NULL,
             srs_id INTEGER NOT NULL,
             z TINYINT NOT NULL,
             m TINYINT NOT NULL
         );
         CREATE TABLE flood_zones (
             fid INTEGER PRIMARY KEY,
             geom BLOB,
             SOIL_FLOOD_HAZARD TEXT
         );
         INSERT INTO gpkg_contents VALUES ('flood_zones', 'features', 'flood_zones', 4326);
         INSERT INTO gpkg_geometry_columns VALUES ('flood_zones', 'geom', 'POLYGON', 4326, 0, 0);",
    )
    .unwrap();

    for (ring, hazard) in features {
        conn.execute(
            "INSERT INTO flood_zones (geom, SOIL_FLOOD_HAZARD) VALUES (?1, ?2)",
            rusqlite::params![gpkg_geometry(&wkb_polygon(ring)), hazard],
        )
        .unwrap();
    }
}

/// Fixture GeoPackage as raw bytes, for serving from a mock download URL.
pub fn fixture_bytes(features: &[(Vec<(f64, f64)>, Option<&str>)]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.gpkg");
    write_fixture_gpkg(&path, features);
    std::fs::read(&path).unwrap()
}
