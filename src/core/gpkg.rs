use crate::utils::error::{FloodError, Result};
use geo::Geometry;
use geozero::wkb::Wkb;
use geozero::ToGeo;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// A feature layer registered in the GeoPackage metadata tables.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub table: String,
    pub geometry_column: String,
    pub srs_id: i64,
}

/// Read-only view over a GeoPackage file (a SQLite database with
/// `gpkg_*` metadata tables and WKB geometry BLOBs).
pub struct GpkgDataset {
    conn: Connection,
}

impl GpkgDataset {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Resolve the feature layer to read. With `requested == None` the
    /// first registered feature table is used.
    pub fn feature_layer(&self, requested: Option<&str>) -> Result<FeatureLayer> {
        let mut stmt = self.conn.prepare(
            "SELECT c.table_name, g.column_name, g.srs_id \
             FROM gpkg_contents c \
             JOIN gpkg_geometry_columns g ON g.table_name = c.table_name \
             WHERE c.data_type = 'features' \
             ORDER BY c.table_name",
        )?;
        let layers = stmt
            .query_map([], |row| {
                Ok(FeatureLayer {
                    table: row.get(0)?,
                    geometry_column: row.get(1)?,
                    srs_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        match requested {
            Some(name) => layers
                .into_iter()
                .find(|layer| layer.table == name)
                .ok_or_else(|| {
                    FloodError::dataset(format!("feature table '{}' not found in GeoPackage", name))
                }),
            None => layers
                .into_iter()
                .next()
                .ok_or_else(|| FloodError::dataset("GeoPackage contains no feature tables")),
        }
    }

    /// Read every feature of the layer as `(geometry, hazard label)`.
    /// NULL geometries decode to `None`; non-text hazard values are
    /// stringified so numeric classification codes survive.
    pub fn read_features(
        &self,
        layer: &FeatureLayer,
        hazard_column: &str,
    ) -> Result<Vec<(Option<Geometry<f64>>, Option<String>)>> {
        let sql = format!(
            "SELECT \"{}\", \"{}\" FROM \"{}\"",
            layer.geometry_column, hazard_column, layer.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut features = Vec::new();
        while let Some(row) = rows.next()? {
            let geometry = match row.get_ref(0)? {
                ValueRef::Null => None,
                ValueRef::Blob(blob) => decode_geometry(blob)?,
                other => {
                    return Err(FloodError::dataset(format!(
                        "geometry column holds unexpected type {:?}",
                        other.data_type()
                    )))
                }
            };
            let hazard = match row.get_ref(1)? {
                ValueRef::Null => None,
                ValueRef::Text(text) => Some(String::from_utf8_lossy(text).into_owned()),
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Blob(_) => None,
            };
            features.push((geometry, hazard));
        }
        Ok(features)
    }
}

const GPKG_MAGIC: [u8; 2] = *b"GP";
const FLAG_EMPTY_GEOMETRY: u8 = 0b0001_0000;
const FLAG_EXTENDED_TYPE: u8 = 0b0010_0000;

/// Decode a GeoPackage geometry BLOB: a fixed 8-byte header, an optional
/// envelope whose size is encoded in the flags byte, then standard WKB.
/// Returns `None` for geometries flagged as empty.
pub fn decode_geometry(blob: &[u8]) -> Result<Option<Geometry<f64>>> {
    if blob.len() < 8 {
        return Err(FloodError::dataset("geometry blob shorter than GPKG header"));
    }
    if blob[0..2] != GPKG_MAGIC {
        return Err(FloodError::dataset("geometry blob missing GPKG magic"));
    }
    // Version byte 0 marks GeoPackage 1.x binary.
    if blob[2] != 0 {
        return Err(FloodError::dataset(format!(
            "unsupported GPKG binary version {}",
            blob[2]
        )));
    }

    let flags = blob[3];
    if flags & FLAG_EXTENDED_TYPE != 0 {
        return Err(FloodError::dataset("extended GPKG geometry types are not supported"));
    }

    let envelope_len = match (flags >> 1) & 0x07 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        indicator => {
            return Err(FloodError::dataset(format!(
                "invalid GPKG envelope indicator {}",
                indicator
            )))
        }
    };
    let header_len = 8 + envelope_len;
    if blob.len() < header_len {
        return Err(FloodError::dataset("geometry blob truncated inside envelope"));
    }

    if flags & FLAG_EMPTY_GEOMETRY != 0 {
        return Ok(None);
    }

    let geometry = Wkb(&blob[header_len..]).to_geo()?;
    Ok(Some(geometry))
}
