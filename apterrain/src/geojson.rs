//! GeoJSON elevation enrichment.
//!
//! This module adds terrain elevation to GeoJSON geometries.
//! Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use apterrain::TerrainRegistry;
//! use apterrain::geojson::add_elevations_to_geometry;
//! use geojson::Geometry;
//!
//! let registry = TerrainRegistry::from_dir("/path/to/dat/files")?;
//!
//! let geometry: Geometry = r#"{"type": "Point", "coordinates": [86.925, 27.9881]}"#
//!     .parse()
//!     .unwrap();
//!
//! let enriched = add_elevations_to_geometry(&registry, geometry)?;
//! // Result: {"type": "Point", "coordinates": [86.925, 27.9881, 8752.0]}
//! ```

use geojson::{Geometry, Value as GeoJsonValue};

use crate::error::{Result, TerrainError};
use crate::TerrainRegistry;

/// Add elevations to all coordinates in a GeoJSON geometry.
///
/// Every position gets its elevation as the Z coordinate. Input positions are
/// in GeoJSON order: `[longitude, latitude]` or `[longitude, latitude, altitude]`;
/// an existing altitude is replaced.
///
/// # Errors
///
/// Returns an error if:
/// - A position has fewer than 2 elements
/// - A position is outside the valid coordinate range
/// - No loaded tile has data for a position
pub fn add_elevations_to_geometry(
    registry: &TerrainRegistry,
    geometry: Geometry,
) -> Result<Geometry> {
    let new_value = match geometry.value {
        GeoJsonValue::Point(coord) => GeoJsonValue::Point(add_elevation_to_coord(registry, &coord)?),
        GeoJsonValue::MultiPoint(coords) => {
            GeoJsonValue::MultiPoint(add_elevation_to_coords(registry, &coords)?)
        }
        GeoJsonValue::LineString(coords) => {
            GeoJsonValue::LineString(add_elevation_to_coords(registry, &coords)?)
        }
        GeoJsonValue::MultiLineString(lines) => GeoJsonValue::MultiLineString(
            lines
                .iter()
                .map(|line| add_elevation_to_coords(registry, line))
                .collect::<Result<_>>()?,
        ),
        GeoJsonValue::Polygon(rings) => GeoJsonValue::Polygon(
            rings
                .iter()
                .map(|ring| add_elevation_to_coords(registry, ring))
                .collect::<Result<_>>()?,
        ),
        GeoJsonValue::MultiPolygon(polygons) => GeoJsonValue::MultiPolygon(
            polygons
                .iter()
                .map(|polygon| {
                    polygon
                        .iter()
                        .map(|ring| add_elevation_to_coords(registry, ring))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<_>>()?,
        ),
        GeoJsonValue::GeometryCollection(geometries) => GeoJsonValue::GeometryCollection(
            geometries
                .into_iter()
                .map(|g| add_elevations_to_geometry(registry, g))
                .collect::<Result<_>>()?,
        ),
    };

    Ok(Geometry::new(new_value))
}

/// Add elevation to a single GeoJSON position.
///
/// Takes `[lon, lat]` or `[lon, lat, alt]` and returns `[lon, lat, elevation]`.
pub fn add_elevation_to_coord(registry: &TerrainRegistry, coord: &[f64]) -> Result<Vec<f64>> {
    let (lon, lat) = match coord {
        [lon, lat, ..] => (*lon, *lat),
        _ => {
            return Err(TerrainError::InvalidCoordinate {
                message: "Coordinate must have at least 2 elements (lon, lat)".to_string(),
            })
        }
    };

    let elevation = registry
        .get_elevation(lat, lon)?
        .ok_or(TerrainError::NoData { lat, lon })?;

    Ok(vec![lon, lat, elevation as f64])
}

/// Add elevations to a list of GeoJSON positions.
pub fn add_elevation_to_coords(
    registry: &TerrainRegistry,
    coords: &[Vec<f64>],
) -> Result<Vec<Vec<f64>>> {
    coords
        .iter()
        .map(|coord| add_elevation_to_coord(registry, coord))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::tile::COARSE_SAMPLES;

    fn create_registry(elevation: i16) -> TerrainRegistry {
        let bytes: Vec<u8> = vec![elevation; COARSE_SAMPLES]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let mut registry = TerrainRegistry::new();
        registry
            .load_all(&MemorySource::new().with_file("N27E086.DAT", bytes))
            .unwrap();
        registry
    }

    #[test]
    fn test_add_elevation_to_coord() {
        let registry = create_registry(500);

        // GeoJSON order: [lon, lat]
        let result = add_elevation_to_coord(&registry, &[86.5, 27.5]).unwrap();
        assert_eq!(result, vec![86.5, 27.5, 500.0]);

        // Existing altitude is replaced
        let result = add_elevation_to_coord(&registry, &[86.5, 27.5, 12.0]).unwrap();
        assert_eq!(result, vec![86.5, 27.5, 500.0]);
    }

    #[test]
    fn test_add_elevation_to_coord_invalid() {
        let registry = create_registry(500);

        assert!(matches!(
            add_elevation_to_coord(&registry, &[86.5]),
            Err(TerrainError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            add_elevation_to_coord(&registry, &[0.0, 91.0]),
            Err(TerrainError::OutOfBounds { .. })
        ));
        assert!(matches!(
            add_elevation_to_coord(&registry, &[90.0, 20.0]),
            Err(TerrainError::NoData { .. })
        ));
    }

    #[test]
    fn test_add_elevations_to_point() {
        let registry = create_registry(500);

        let geometry = Geometry::new(GeoJsonValue::Point(vec![86.5, 27.5]));
        let result = add_elevations_to_geometry(&registry, geometry).unwrap();

        match result.value {
            GeoJsonValue::Point(coord) => assert_eq!(coord[2], 500.0),
            other => panic!("Expected Point geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_add_elevations_to_polygon() {
        let registry = create_registry(500);

        let geometry = Geometry::new(GeoJsonValue::Polygon(vec![vec![
            vec![86.5, 27.5],
            vec![86.6, 27.5],
            vec![86.55, 27.6],
            vec![86.5, 27.5],
        ]]));
        let result = add_elevations_to_geometry(&registry, geometry).unwrap();

        match result.value {
            GeoJsonValue::Polygon(rings) => {
                assert_eq!(rings[0].len(), 4);
                assert!(rings[0].iter().all(|c| c.len() == 3 && c[2] == 500.0));
            }
            other => panic!("Expected Polygon geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_add_elevations_to_geometry_collection() {
        let registry = create_registry(500);

        let geometry = Geometry::new(GeoJsonValue::GeometryCollection(vec![
            Geometry::new(GeoJsonValue::Point(vec![86.5, 27.5])),
            Geometry::new(GeoJsonValue::MultiLineString(vec![vec![
                vec![86.5, 27.5],
                vec![86.6, 27.6],
            ]])),
        ]));
        let result = add_elevations_to_geometry(&registry, geometry).unwrap();

        match result.value {
            GeoJsonValue::GeometryCollection(geometries) => assert_eq!(geometries.len(), 2),
            other => panic!("Expected GeometryCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_tile_fails_whole_geometry() {
        let registry = create_registry(500);

        let geometry = Geometry::new(GeoJsonValue::LineString(vec![
            vec![86.5, 27.5],
            vec![90.0, 20.0],
        ]));
        assert!(add_elevations_to_geometry(&registry, geometry).is_err());
    }
}
