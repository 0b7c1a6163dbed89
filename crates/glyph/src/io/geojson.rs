use std::path::Path;

use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject, Value};

use crate::{
    error::{GlyphError, Result},
    typed_geojson::{
        GlyphGeoJson, GlyphPathProperties, TypedFeature, TypedFeatureCollection, TypedGeoJson,
    },
    types::{ContourRole, GlyphMetrics, GlyphOutline, GlyphRecord, OutlinePath, Point},
};

/// GeoJSON rings must repeat their first position
fn ring(path: &OutlinePath) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = path
        .points
        .iter()
        .map(|p| vec![f64::from(p.x), f64::from(p.y)])
        .collect();
    if path.points.first() != path.points.last() {
        if let Some(first) = ring.first().cloned() {
            ring.push(first);
        }
    }
    ring
}

fn path_properties(id: usize, path: &OutlinePath) -> GlyphPathProperties {
    GlyphPathProperties {
        id: id as u32,
        role: path.role,
        point_count: path.points.len(),
        orientation: path.orientation(),
        area: path.signed_area().abs(),
    }
}

fn path_geometry(path: &OutlinePath) -> Geometry {
    Geometry::new(Value::Polygon(vec![ring(path)]))
}

impl GlyphOutline {
    /// Export to typed GeoJSON, one Polygon feature per path
    pub fn to_typed_geojson(&self) -> GlyphGeoJson {
        let features = self
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| TypedFeature::new(Some(path_geometry(path)), path_properties(i, path)))
            .collect();

        TypedGeoJson::FeatureCollection(TypedFeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let features = self
            .paths
            .iter()
            .enumerate()
            .map(|(i, path)| -> Result<Feature> {
                let properties = match serde_json::to_value(path_properties(i, path))? {
                    serde_json::Value::Object(map) => Some(map),
                    _ => None,
                };
                Ok(Feature {
                    bbox: None,
                    geometry: Some(path_geometry(path)),
                    id: Some(Id::Number(serde_json::Number::from(i))),
                    properties,
                    foreign_members: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }

    /// Read paths back from a feature collection; non-polygon features are skipped
    pub fn from_feature_collection(collection: &FeatureCollection) -> Self {
        let paths = collection
            .features
            .iter()
            .filter_map(|feature| {
                let geometry = feature.geometry.as_ref()?;
                let Value::Polygon(rings) = &geometry.value else {
                    return None;
                };
                let exterior = rings.first()?;
                let points = exterior
                    .iter()
                    .filter(|position| position.len() >= 2)
                    .map(|position| Point::new(position[0].round() as i32, position[1].round() as i32))
                    .collect();
                let role = feature
                    .property("role")
                    .and_then(|v| serde_json::from_value::<ContourRole>(v.clone()).ok())
                    .unwrap_or_default();
                Some(OutlinePath::new(points, role))
            })
            .collect();

        Self { paths }
    }
}

impl GlyphRecord {
    fn foreign_members(&self) -> JsonObject {
        let mut foreign_members = JsonObject::new();
        foreign_members.insert("glyph_name".to_string(), self.name.clone().into());
        foreign_members.insert(
            "codepoint".to_string(),
            self.unicode().map_or(serde_json::Value::Null, Into::into),
        );
        foreign_members.insert("advance_width".to_string(), self.metrics.advance_width.into());
        foreign_members.insert("path_count".to_string(), self.outline.paths.len().into());
        foreign_members
    }

    /// Export to typed GeoJSON with glyph identity and advance as collection metadata
    pub fn to_typed_geojson(&self) -> GlyphGeoJson {
        match self.outline.to_typed_geojson() {
            TypedGeoJson::FeatureCollection(mut fc) => {
                fc.foreign_members = Some(self.foreign_members());
                TypedGeoJson::FeatureCollection(fc)
            }
            other => other,
        }
    }

    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut collection = self.outline.to_geojson()?;
        collection.foreign_members = Some(self.foreign_members());
        Ok(collection)
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_geojson()?)?)
    }

    pub fn save_geojson<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    pub fn from_geojson_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let geojson_str = std::fs::read_to_string(path)?;
        Self::from_geojson_string(&geojson_str)
    }

    /// Load a glyph record from a GeoJSON string written by [`Self::to_geojson_string`]
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let collection: FeatureCollection = geojson_str.parse()?;

        let foreign_members = collection
            .foreign_members
            .as_ref()
            .ok_or_else(|| GlyphError::Decode("missing glyph metadata in GeoJSON".to_string()))?;

        let name = foreign_members
            .get("glyph_name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GlyphError::Decode("missing or invalid glyph_name".to_string()))?
            .to_string();

        let advance_width = foreign_members
            .get("advance_width")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| GlyphError::Decode("missing or invalid advance_width".to_string()))?;

        let codepoint = match foreign_members.get("codepoint") {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| GlyphError::Decode(format!("invalid codepoint {value}")))?,
            ),
        };

        Ok(GlyphRecord {
            codepoint,
            name,
            outline: GlyphOutline::from_feature_collection(&collection),
            metrics: GlyphMetrics { advance_width },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Orientation;

    fn square_record() -> GlyphRecord {
        let points = vec![
            Point::new(100, 700),
            Point::new(400, 700),
            Point::new(400, 400),
            Point::new(100, 400),
            Point::new(100, 700),
        ];
        GlyphRecord {
            codepoint: Some('O'),
            name: "O".to_string(),
            outline: GlyphOutline {
                paths: vec![OutlinePath::new(points, ContourRole::Outer)],
            },
            metrics: GlyphMetrics { advance_width: 540 },
        }
    }

    #[test]
    fn test_feature_per_path_with_metadata() {
        let collection = square_record().to_geojson().expect("export");
        assert_eq!(collection.features.len(), 1);

        let foreign = collection.foreign_members.expect("metadata");
        assert_eq!(foreign["glyph_name"], "O");
        assert_eq!(foreign["codepoint"], 79);
        assert_eq!(foreign["advance_width"], 540);

        let feature = &collection.features[0];
        assert_eq!(feature.property("role").and_then(|v| v.as_str()), Some("outer"));
        assert_eq!(feature.property("area").and_then(|v| v.as_f64()), Some(90_000.0));
    }

    #[test]
    fn test_string_round_trip() {
        let record = square_record();
        let text = record.to_geojson_string().expect("export");
        let parsed = GlyphRecord::from_geojson_string(&text).expect("import");
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_open_paths_are_closed_on_export() {
        let mut record = square_record();
        record.outline.paths[0].points.pop();
        let collection = record.to_geojson().expect("export");
        let Some(Value::Polygon(rings)) = collection.features[0].geometry.as_ref().map(|g| &g.value)
        else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn test_typed_helpers() {
        let typed = square_record().to_typed_geojson();
        assert_eq!(typed.glyph_name(), Some("O"));
        assert_eq!(typed.advance_width(), Some(540));
        assert_eq!(typed.path_count(), Some(1));
        assert!(typed.hole_features().is_empty());
        assert_eq!(typed.features_with_orientation(Orientation::Clockwise).len(), 1);
        let largest = typed.largest_feature().and_then(|f| f.properties()).expect("largest");
        assert_eq!(largest.point_count, 5);
    }

    #[test]
    fn test_notdef_has_null_codepoint() {
        let record = GlyphRecord {
            codepoint: None,
            name: ".notdef".to_string(),
            outline: GlyphOutline::empty(),
            metrics: GlyphMetrics { advance_width: 500 },
        };
        let parsed = GlyphRecord::from_geojson_string(&record.to_geojson_string().expect("export"))
            .expect("import");
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_missing_metadata_is_decode_error() {
        let text = r#"{ "type": "FeatureCollection", "features": [] }"#;
        let err = GlyphRecord::from_geojson_string(text).unwrap_err();
        assert!(matches!(err, GlyphError::Decode(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let record = square_record();
        let path = std::env::temp_dir().join(format!("glyph-geojson-{}.json", std::process::id()));
        record.save_geojson(&path).expect("save");
        let loaded = GlyphRecord::from_geojson_file(&path).expect("load");
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, record);
    }
}
