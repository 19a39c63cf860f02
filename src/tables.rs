//! Static reference tables: tech-hub cities and simplified coastlines

use crate::geo::GeoPoint;
use serde::Serialize;

/// A reference city. Table order is activity rank (index 0 is the most active).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct City {
    pub name: &'static str,
    pub geo: GeoPoint,
    pub country: &'static str,
}

const fn city(name: &'static str, lat: f32, lng: f32, country: &'static str) -> City {
    City { name, geo: GeoPoint::new(lat, lng), country }
}

pub static CITIES: [City; 30] = [
    // USA
    city("San Francisco", 37.7749, -122.4194, "USA"),
    city("New York", 40.7128, -74.0060, "USA"),
    city("Seattle", 47.6062, -122.3321, "USA"),
    city("Los Angeles", 34.0522, -118.2437, "USA"),
    city("Austin", 30.2672, -97.7431, "USA"),
    // China
    city("Beijing", 39.9042, 116.4074, "China"),
    city("Shanghai", 31.2304, 121.4737, "China"),
    city("Shenzhen", 22.5431, 114.0579, "China"),
    city("Hangzhou", 30.2741, 120.1551, "China"),
    city("Chengdu", 30.5728, 104.0668, "China"),
    // Japan
    city("Tokyo", 35.6762, 139.6503, "Japan"),
    city("Osaka", 34.6937, 135.5023, "Japan"),
    city("Kyoto", 35.0116, 135.7681, "Japan"),
    // South Korea
    city("Seoul", 37.5665, 126.9780, "South Korea"),
    city("Busan", 35.1796, 129.0756, "South Korea"),
    // Europe
    city("London", 51.5074, -0.1278, "UK"),
    city("Berlin", 52.5200, 13.4050, "Germany"),
    city("Paris", 48.8566, 2.3522, "France"),
    city("Amsterdam", 52.3676, 4.9041, "Netherlands"),
    city("Stockholm", 59.3293, 18.0686, "Sweden"),
    // Rest of Asia
    city("Singapore", 1.3521, 103.8198, "Singapore"),
    city("Hong Kong", 22.3193, 114.1694, "Hong Kong"),
    city("Taipei", 25.0330, 121.5654, "Taiwan"),
    city("Bangalore", 12.9716, 77.5946, "India"),
    city("Mumbai", 19.0760, 72.8777, "India"),
    // Elsewhere
    city("Sydney", -33.8688, 151.2093, "Australia"),
    city("Toronto", 43.6532, -79.3832, "Canada"),
    city("Vancouver", 49.2827, -123.1207, "Canada"),
    city("Tel Aviv", 32.0853, 34.7818, "Israel"),
    city("Sao Paulo", -23.5505, -46.6333, "Brazil"),
];

/// Whether an outline is a continent or a smaller landmass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OutlineKind {
    Continent,
    Island,
}

/// Number of leading entries in [`OUTLINES`] that are continents
pub const CONTINENT_COUNT: usize = 7;

/// Coastline polygons as (lng, lat) pairs in degrees. Drawn as open polylines,
/// exactly as listed.
pub static OUTLINES: [&[(f32, f32)]; 11] = [
    // North America
    &[
        (-168.0, 66.0), (-160.0, 60.0), (-150.0, 61.0), (-140.0, 60.0), (-130.0, 55.0),
        (-125.0, 50.0), (-124.0, 42.0), (-117.0, 32.0), (-105.0, 25.0), (-97.0, 26.0),
        (-82.0, 25.0), (-80.0, 30.0), (-75.0, 35.0), (-70.0, 42.0), (-67.0, 45.0),
        (-60.0, 47.0), (-55.0, 50.0), (-60.0, 55.0), (-70.0, 65.0), (-85.0, 72.0),
        (-120.0, 70.0), (-160.0, 70.0), (-168.0, 66.0),
    ],
    // South America
    &[
        (-80.0, 10.0), (-75.0, 5.0), (-60.0, 5.0), (-50.0, 0.0), (-40.0, -10.0),
        (-38.0, -15.0), (-45.0, -25.0), (-55.0, -35.0), (-68.0, -55.0), (-75.0, -48.0),
        (-75.0, -35.0), (-70.0, -25.0), (-80.0, -5.0), (-80.0, 10.0),
    ],
    // Europe
    &[
        (-10.0, 36.0), (0.0, 38.0), (10.0, 45.0), (20.0, 40.0), (30.0, 45.0),
        (40.0, 42.0), (30.0, 55.0), (20.0, 62.0), (10.0, 62.0), (0.0, 55.0),
        (-10.0, 40.0), (-10.0, 36.0),
    ],
    // Africa
    &[
        (-18.0, 28.0), (-5.0, 35.0), (10.0, 35.0), (32.0, 32.0), (40.0, 20.0),
        (50.0, 12.0), (45.0, 0.0), (35.0, -20.0), (28.0, -33.0), (18.0, -32.0),
        (10.0, -10.0), (0.0, 5.0), (-10.0, 8.0), (-18.0, 20.0), (-18.0, 28.0),
    ],
    // Asia
    &[
        (30.0, 42.0), (50.0, 38.0), (70.0, 55.0), (90.0, 52.0), (110.0, 35.0),
        (120.0, 22.0), (105.0, 10.0), (90.0, 22.0), (75.0, 30.0), (60.0, 28.0),
        (45.0, 35.0), (30.0, 42.0),
    ],
    // Oceania
    &[
        (115.0, -22.0), (130.0, -12.0), (150.0, -22.0), (153.0, -28.0), (145.0, -38.0),
        (130.0, -32.0), (115.0, -22.0),
    ],
    // Antarctica (coast only, not closed)
    &[
        (-180.0, -70.0), (-120.0, -70.0), (-60.0, -72.0), (0.0, -70.0), (60.0, -68.0),
        (120.0, -68.0), (180.0, -70.0),
    ],
    // Greenland
    &[
        (-45.0, 60.0), (-25.0, 70.0), (-25.0, 78.0), (-45.0, 78.0), (-60.0, 70.0),
        (-45.0, 60.0),
    ],
    // Japan
    &[(130.0, 32.0), (140.0, 38.0), (145.0, 44.0), (140.0, 35.0), (130.0, 32.0)],
    // UK
    &[(-5.0, 50.0), (0.0, 52.0), (-3.0, 58.0), (-5.0, 50.0)],
    // New Zealand
    &[(166.0, -35.0), (175.0, -42.0), (178.0, -47.0), (170.0, -42.0), (166.0, -35.0)],
];

pub fn outline_kind(index: usize) -> OutlineKind {
    if index < CONTINENT_COUNT {
        OutlineKind::Continent
    } else {
        OutlineKind::Island
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_coordinates_are_in_range() {
        for c in CITIES.iter() {
            assert!((-90.0..=90.0).contains(&c.geo.lat), "{}", c.name);
            assert!((-180.0..=180.0).contains(&c.geo.lng), "{}", c.name);
        }
    }

    #[test]
    fn city_table_is_complete() {
        assert_eq!(CITIES.len(), 30);
        assert_eq!(CITIES[0].name, "San Francisco");
        let last = CITIES[29];
        assert_eq!(last.name, "Sao Paulo");
        assert_eq!(last.country, "Brazil");
        assert!((last.geo.lat + 23.5505).abs() < 1e-4);
        assert!((last.geo.lng + 46.6333).abs() < 1e-4);
    }

    #[test]
    fn outline_points_are_lng_lat() {
        for poly in OUTLINES.iter() {
            assert!(poly.len() >= 4);
            for &(lng, lat) in poly.iter() {
                assert!((-180.0..=180.0).contains(&lng));
                assert!((-90.0..=90.0).contains(&lat));
            }
        }
    }

    #[test]
    fn kinds_split_after_continents() {
        assert_eq!(outline_kind(0), OutlineKind::Continent);
        assert_eq!(outline_kind(6), OutlineKind::Continent);
        assert_eq!(outline_kind(7), OutlineKind::Island);
    }
}
