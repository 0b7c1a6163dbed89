use std::marker::PhantomData;

use geojson::{Geometry, JsonObject};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{ContourRole, Orientation};

/// Properties for glyph outline path features
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS, JsonSchema)]
#[ts(export)]
#[schemars(description = "Properties for glyph outline path features")]
pub struct GlyphPathProperties {
    #[schemars(description = "Index of the path within its glyph")]
    pub id: u32,
    #[schemars(description = "Whether the path bounds ink or an enclosed counter")]
    pub role: ContourRole,
    #[schemars(description = "Number of vertices, closing point included")]
    pub point_count: usize,
    #[schemars(description = "Winding direction in y-up font space")]
    pub orientation: Orientation,
    #[schemars(description = "Unsigned enclosed area in square font units")]
    pub area: f64,
}

/// Type alias for glyph outline GeoJSON
pub type GlyphGeoJson = TypedGeoJson<GlyphPathProperties>;

/// A typed GeoJSON Feature that is generic over its properties.
#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeature<P> {
    #[serde(flatten)]
    pub feature: geojson::Feature,
    #[serde(skip)]
    _properties: PhantomData<P>,
}

impl<P> TypedFeature<P>
where
    for<'de> P: Serialize + Deserialize<'de>,
{
    /// Creates a new TypedFeature.
    pub fn new(geometry: Option<Geometry>, properties: P) -> Self {
        let feature = geojson::Feature {
            bbox: None,
            geometry,
            id: None,
            properties: serde_json::to_value(properties)
                .ok()
                .and_then(|v| v.as_object().cloned()),
            foreign_members: None,
        };
        Self {
            feature,
            _properties: PhantomData,
        }
    }

    /// Tries to access the typed properties of the feature.
    pub fn properties(&self) -> Option<P> {
        self.feature
            .properties
            .as_ref()
            .and_then(|p| serde_json::from_value(serde_json::Value::Object(p.clone())).ok())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TypedFeatureCollection<P> {
    pub bbox: Option<Vec<f64>>,
    pub features: Vec<TypedFeature<P>>,
    pub foreign_members: Option<JsonObject>,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum TypedGeoJson<P> {
    Geometry(Geometry),
    Feature(TypedFeature<P>),
    FeatureCollection(TypedFeatureCollection<P>),
}

impl<P> TypedGeoJson<P> {
    /// Get the underlying FeatureCollection if this is a FeatureCollection variant
    pub fn as_feature_collection(&self) -> Option<&TypedFeatureCollection<P>> {
        match self {
            TypedGeoJson::FeatureCollection(fc) => Some(fc),
            _ => None,
        }
    }

    /// Convert to FeatureCollection, consuming self
    pub fn into_feature_collection(self) -> Option<TypedFeatureCollection<P>> {
        match self {
            TypedGeoJson::FeatureCollection(fc) => Some(fc),
            _ => None,
        }
    }
}

impl<P> TypedFeatureCollection<P> {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[TypedFeature<P>] {
        &self.features
    }
}

impl GlyphGeoJson {
    fn features_where(
        &self,
        keep: impl Fn(&GlyphPathProperties) -> bool,
    ) -> Vec<&TypedFeature<GlyphPathProperties>> {
        self.as_feature_collection()
            .map(|fc| {
                fc.features
                    .iter()
                    .filter(|feature| feature.properties().is_some_and(|props| keep(&props)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Paths that bound an enclosed counter
    pub fn hole_features(&self) -> Vec<&TypedFeature<GlyphPathProperties>> {
        self.features_where(|props| props.role == ContourRole::Hole)
    }

    pub fn features_with_orientation(
        &self,
        orientation: Orientation,
    ) -> Vec<&TypedFeature<GlyphPathProperties>> {
        self.features_where(|props| props.orientation == orientation)
    }

    /// Get the largest path by area
    pub fn largest_feature(&self) -> Option<&TypedFeature<GlyphPathProperties>> {
        let fc = self.as_feature_collection()?;
        fc.features.iter().max_by(|a, b| {
            let area_a = a.properties().map(|p| p.area).unwrap_or(0.0);
            let area_b = b.properties().map(|p| p.area).unwrap_or(0.0);
            area_a.total_cmp(&area_b)
        })
    }

    fn foreign_member(&self, key: &str) -> Option<&serde_json::Value> {
        self.as_feature_collection()?.foreign_members.as_ref()?.get(key)
    }

    pub fn glyph_name(&self) -> Option<&str> {
        self.foreign_member("glyph_name")?.as_str()
    }

    pub fn advance_width(&self) -> Option<u32> {
        self.foreign_member("advance_width")?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn path_count(&self) -> Option<usize> {
        self.foreign_member("path_count")?
            .as_u64()
            .map(|v| v as usize)
    }
}
