/// Region registry for the weather hazard monitoring service.
///
/// Defines the canonical list of monitored points: for every sub-national
/// region (ISO 3166-2 first-level subdivision) of a covered country, up to
/// two representative cities selected by population. This is the single
/// source of truth for region codes — all other modules should reference
/// regions from here rather than hardcoding codes.
///
/// Several points sharing one region code is intentional: the aggregation
/// stage merges their daily series into a single regional signal (hottest
/// city, coldest city, windiest city, total sampled precipitation).

use crate::model::RegionPoint;

// ---------------------------------------------------------------------------
// Point metadata
// ---------------------------------------------------------------------------

/// Metadata for a single monitored point.
pub struct MonitoredPoint {
    /// ISO 3166-1 alpha-2 country code.
    pub country: &'static str,
    /// ISO 3166-2 region suffix within the country, e.g. "IDF".
    pub region_id: &'static str,
    /// Representative city name.
    pub city: &'static str,
    /// WGS84 latitude.
    pub lat: f64,
    /// WGS84 longitude.
    pub lon: f64,
    /// City population, used to rank representative cities per region.
    pub population: u64,
}

impl MonitoredPoint {
    /// Full region code, `"{country}-{region_id}"`.
    pub fn region_code(&self) -> String {
        format!("{}-{}", self.country, self.region_id)
    }

    /// The serializable catalog form of this point.
    pub fn to_region_point(&self) -> RegionPoint {
        RegionPoint {
            country: self.country.to_string(),
            region_id: self.region_id.to_string(),
            region_code: self.region_code(),
            city: self.city.to_string(),
            lat: self.lat,
            lon: self.lon,
            population: self.population,
        }
    }
}

const fn pt(
    country: &'static str,
    region_id: &'static str,
    city: &'static str,
    lat: f64,
    lon: f64,
    population: u64,
) -> MonitoredPoint {
    MonitoredPoint { country, region_id, city, lat, lon, population }
}

/// Countries currently covered by the registry.
pub const COUNTRIES: &[&str] = &["FR", "ES", "DE"];

/// All monitored points, grouped by country and region; within a region,
/// cities appear in descending population order (the top-N selection order).
///
/// Sources:
///   - Region codes: ISO 3166-2 first-level subdivisions
///   - Coordinates and populations: GeoNames city gazetteer
pub static REGION_REGISTRY: &[MonitoredPoint] = &[
    // France — 13 metropolitan regions, two cities each.
    pt("FR", "ARA", "Lyon", 45.7485, 4.8467, 516_092),
    pt("FR", "ARA", "Saint-Étienne", 45.4339, 4.3900, 171_057),
    pt("FR", "BFC", "Dijon", 47.3167, 5.0167, 158_002),
    pt("FR", "BFC", "Besançon", 47.2480, 6.0181, 117_080),
    pt("FR", "BRE", "Rennes", 48.1173, -1.6778, 215_366),
    pt("FR", "BRE", "Brest", 48.3903, -4.4863, 139_163),
    pt("FR", "CVL", "Tours", 47.3936, 0.6892, 136_565),
    pt("FR", "CVL", "Orléans", 47.9029, 1.9093, 116_269),
    pt("FR", "COR", "Ajaccio", 41.9192, 8.7386, 71_361),
    pt("FR", "COR", "Bastia", 42.7028, 9.4503, 48_503),
    pt("FR", "GES", "Strasbourg", 48.5734, 7.7521, 277_270),
    pt("FR", "GES", "Reims", 49.2628, 4.0347, 184_076),
    pt("FR", "HDF", "Lille", 50.6330, 3.0586, 234_475),
    pt("FR", "HDF", "Amiens", 49.9000, 2.3000, 133_448),
    pt("FR", "IDF", "Paris", 48.8534, 2.3488, 2_138_551),
    pt("FR", "IDF", "Boulogne-Billancourt", 48.8397, 2.2399, 120_071),
    pt("FR", "NOR", "Le Havre", 49.4938, 0.1077, 170_147),
    pt("FR", "NOR", "Rouen", 49.4431, 1.0993, 110_145),
    pt("FR", "NAQ", "Bordeaux", 44.8378, -0.5792, 257_068),
    pt("FR", "NAQ", "Limoges", 45.8315, 1.2578, 132_175),
    pt("FR", "OCC", "Toulouse", 43.6045, 1.4440, 493_465),
    pt("FR", "OCC", "Montpellier", 43.6109, 3.8763, 290_053),
    pt("FR", "PDL", "Nantes", 47.2184, -1.5536, 318_808),
    pt("FR", "PDL", "Angers", 47.4736, -0.5542, 154_508),
    pt("FR", "PAC", "Marseille", 43.2965, 5.3698, 870_731),
    pt("FR", "PAC", "Nice", 43.7031, 7.2661, 342_669),
    // Spain — 17 autonomous communities.
    pt("ES", "AN", "Sevilla", 37.3891, -5.9845, 688_592),
    pt("ES", "AN", "Málaga", 36.7213, -4.4214, 578_460),
    pt("ES", "AR", "Zaragoza", 41.6488, -0.8891, 675_301),
    pt("ES", "AS", "Gijón", 43.5357, -5.6615, 271_843),
    pt("ES", "AS", "Oviedo", 43.3614, -5.8593, 220_020),
    pt("ES", "IB", "Palma", 39.5696, 2.6502, 416_065),
    pt("ES", "CN", "Las Palmas de Gran Canaria", 28.0997, -15.4134, 378_517),
    pt("ES", "CN", "Santa Cruz de Tenerife", 28.4636, -16.2518, 206_593),
    pt("ES", "CB", "Santander", 43.4623, -3.8099, 172_044),
    pt("ES", "CM", "Albacete", 38.9943, -1.8585, 172_816),
    pt("ES", "CL", "Valladolid", 41.6523, -4.7245, 298_866),
    pt("ES", "CL", "Burgos", 42.3439, -3.6969, 175_623),
    pt("ES", "CT", "Barcelona", 41.3888, 2.1590, 1_621_537),
    pt("ES", "CT", "L'Hospitalet de Llobregat", 41.3596, 2.0998, 257_038),
    pt("ES", "VC", "Valencia", 39.4699, -0.3763, 792_492),
    pt("ES", "VC", "Alicante", 38.3452, -0.4810, 334_757),
    pt("ES", "EX", "Badajoz", 38.8786, -6.9702, 150_702),
    pt("ES", "GA", "Vigo", 42.2406, -8.7207, 293_642),
    pt("ES", "GA", "A Coruña", 43.3713, -8.3960, 246_056),
    pt("ES", "MD", "Madrid", 40.4165, -3.7026, 3_255_944),
    pt("ES", "MD", "Móstoles", 40.3228, -3.8649, 206_478),
    pt("ES", "MC", "Murcia", 37.9922, -1.1307, 436_870),
    pt("ES", "NC", "Pamplona", 42.8125, -1.6458, 198_491),
    pt("ES", "PV", "Bilbao", 43.2627, -2.9253, 345_821),
    pt("ES", "PV", "Vitoria-Gasteiz", 42.8467, -2.6716, 249_176),
    pt("ES", "RI", "Logroño", 42.4650, -2.4456, 152_485),
    // Germany — 16 federal states.
    pt("DE", "BW", "Stuttgart", 48.7823, 9.1770, 634_830),
    pt("DE", "BW", "Mannheim", 49.4891, 8.4669, 309_370),
    pt("DE", "BY", "München", 48.1374, 11.5755, 1_260_391),
    pt("DE", "BY", "Nürnberg", 49.4542, 11.0775, 499_237),
    pt("DE", "BE", "Berlin", 52.5244, 13.4105, 3_426_354),
    pt("DE", "BB", "Potsdam", 52.3989, 13.0657, 159_456),
    pt("DE", "HB", "Bremen", 53.0758, 8.8072, 546_501),
    pt("DE", "HH", "Hamburg", 53.5753, 10.0153, 1_739_117),
    pt("DE", "HE", "Frankfurt am Main", 50.1155, 8.6842, 650_000),
    pt("DE", "HE", "Wiesbaden", 50.0826, 8.2400, 272_432),
    pt("DE", "MV", "Rostock", 54.0887, 12.1405, 198_293),
    pt("DE", "NI", "Hannover", 52.3705, 9.7332, 515_140),
    pt("DE", "NI", "Braunschweig", 52.2659, 10.5267, 244_715),
    pt("DE", "NW", "Köln", 50.9333, 6.9500, 963_395),
    pt("DE", "NW", "Düsseldorf", 51.2217, 6.7762, 573_057),
    pt("DE", "RP", "Mainz", 49.9842, 8.2791, 184_997),
    pt("DE", "RP", "Ludwigshafen am Rhein", 49.4812, 8.4464, 163_196),
    pt("DE", "SL", "Saarbrücken", 49.2354, 6.9816, 179_349),
    pt("DE", "SN", "Leipzig", 51.3397, 12.3731, 504_971),
    pt("DE", "SN", "Dresden", 51.0509, 13.7383, 486_854),
    pt("DE", "ST", "Halle (Saale)", 51.4828, 11.9705, 235_959),
    pt("DE", "ST", "Magdeburg", 52.1277, 11.6292, 229_826),
    pt("DE", "SH", "Kiel", 54.3213, 10.1349, 232_758),
    pt("DE", "SH", "Lübeck", 53.8655, 10.6866, 212_207),
    pt("DE", "TH", "Erfurt", 50.9787, 11.0328, 203_254),
];

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

/// Returns the full catalog in its serializable form, in registry order.
pub fn all_points() -> Vec<RegionPoint> {
    REGION_REGISTRY.iter().map(|p| p.to_region_point()).collect()
}

/// Returns the points monitored for one country.
pub fn points_for_country(country: &str) -> Vec<&'static MonitoredPoint> {
    REGION_REGISTRY.iter().filter(|p| p.country == country).collect()
}

/// Returns the distinct region codes, in registry order.
pub fn region_codes() -> Vec<String> {
    let mut codes = Vec::new();
    for point in REGION_REGISTRY {
        let code = point.region_code();
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

/// Looks up the points representing a region. Empty if the code is unknown.
pub fn points_for_region(region_code: &str) -> Vec<&'static MonitoredPoint> {
    REGION_REGISTRY
        .iter()
        .filter(|p| p.region_code() == region_code)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_region_ids_are_valid_iso_format() {
        // ISO 3166-2 suffixes for the covered countries are 2-3 uppercase
        // letters. A malformed id would produce a region code the website
        // readers cannot match against their boundary data.
        for point in REGION_REGISTRY {
            assert!(
                point.region_id.len() >= 2 && point.region_id.len() <= 3,
                "region id for '{}' should be 2-3 chars, got '{}'",
                point.city,
                point.region_id
            );
            assert!(
                point.region_id.chars().all(|c| c.is_ascii_uppercase()),
                "region id for '{}' should be uppercase letters, got '{}'",
                point.city,
                point.region_id
            );
            assert_eq!(point.country.len(), 2, "country code for '{}'", point.city);
        }
    }

    #[test]
    fn test_no_duplicate_cities_within_a_region() {
        let mut seen = std::collections::HashSet::new();
        for point in REGION_REGISTRY {
            assert!(
                seen.insert((point.region_code(), point.city)),
                "duplicate point '{}' in region '{}'",
                point.city,
                point.region_code()
            );
        }
    }

    #[test]
    fn test_coordinates_are_inside_the_covered_area() {
        // Covered countries span metropolitan France, Spain (including the
        // Canary Islands) and Germany.
        for point in REGION_REGISTRY {
            assert!(
                (27.0..=56.0).contains(&point.lat),
                "latitude out of range for '{}': {}",
                point.city,
                point.lat
            );
            assert!(
                (-17.0..=15.5).contains(&point.lon),
                "longitude out of range for '{}': {}",
                point.city,
                point.lon
            );
        }
    }

    #[test]
    fn test_cities_within_a_region_are_ranked_by_population() {
        // The registry keeps the top-N selection order; a region's first
        // point is its most populous city.
        let mut prev: Option<(String, u64)> = None;
        for point in REGION_REGISTRY {
            if let Some((code, pop)) = &prev {
                if *code == point.region_code() {
                    assert!(
                        *pop >= point.population,
                        "points for '{}' are not in descending population order",
                        code
                    );
                }
            }
            prev = Some((point.region_code(), point.population));
        }
    }

    #[test]
    fn test_every_covered_country_has_points() {
        for country in COUNTRIES {
            assert!(
                !points_for_country(country).is_empty(),
                "no monitored points for covered country '{}'",
                country
            );
        }
    }

    #[test]
    fn test_registry_covers_all_french_regions() {
        // Metropolitan France has 13 regions; losing one here would silently
        // drop it from every downstream store.
        let fr_codes: std::collections::HashSet<_> = points_for_country("FR")
            .iter()
            .map(|p| p.region_id)
            .collect();
        assert_eq!(fr_codes.len(), 13, "expected 13 French regions, got {:?}", fr_codes);
    }

    #[test]
    fn test_region_codes_are_distinct_and_composite() {
        let codes = region_codes();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "region_codes() must not repeat codes");
        for code in &codes {
            let (country, region_id) = code.split_once('-').expect("code must contain '-'");
            assert!(COUNTRIES.contains(&country), "unknown country in '{}'", code);
            assert!(!region_id.is_empty());
        }
    }

    #[test]
    fn test_points_for_region_finds_shared_codes() {
        let idf = points_for_region("FR-IDF");
        assert_eq!(idf.len(), 2, "Île-de-France should have two monitored cities");
        assert_eq!(idf[0].city, "Paris");
        assert!(points_for_region("XX-XX").is_empty());
    }

    #[test]
    fn test_catalog_form_carries_the_composite_code() {
        let catalog = all_points();
        assert_eq!(catalog.len(), REGION_REGISTRY.len());
        let paris = catalog.iter().find(|p| p.city == "Paris").unwrap();
        assert_eq!(paris.region_code, "FR-IDF");
        assert_eq!(paris.country, "FR");
        assert_eq!(paris.region_id, "IDF");
    }
}
