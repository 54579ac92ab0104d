use super::{Category, LocationRecord};

const CITY: Category = Category::CITY;
const STATE: Category = Category::STATE;
const COUNTRY: Category = Category::COUNTRY;
const REGION: Category = Category::REGION;
const LANDMARK: Category = Category::LANDMARK;
const AIRPORT: Category = Category::AIRPORT;

struct Seed {
    name: &'static str,
    longitude: f32,
    latitude: f32,
    heading: Option<f32>,
    population: u32,
    category: Category,
}

const fn place(
    name: &'static str,
    longitude: f32,
    latitude: f32,
    population: u32,
    category: Category,
) -> Seed {
    Seed {
        name,
        longitude,
        latitude,
        heading: None,
        population,
        category,
    }
}

const fn landmark(name: &'static str, longitude: f32, latitude: f32, heading: f32) -> Seed {
    Seed {
        name,
        longitude,
        latitude,
        heading: Some(heading),
        population: 0,
        category: LANDMARK,
    }
}

// Aliases repeat the coordinate of the place they name and carry no population, so they never
// crowd population rankings.
const SEEDS: &[Seed] = &[
    place("Tokyo", 139.6917, 35.6895, 13_960_000, CITY),
    place("Shanghai", 121.4737, 31.2304, 24_870_895, CITY),
    place("Beijing", 116.4074, 39.9042, 21_540_000, CITY),
    place("Sao Paulo", -46.6333, -23.5505, 12_330_000, CITY),
    place("Mumbai", 72.8777, 19.0760, 12_442_373, CITY),
    place("Moscow", 37.6173, 55.7558, 12_506_468, CITY),
    place("Delhi", 77.1025, 28.7041, 11_034_555, CITY),
    place("Cairo", 31.2357, 30.0444, 9_540_000, CITY),
    place("Mexico City", -99.1332, 19.4326, 9_209_944, CITY),
    place("London", -0.1276, 51.5072, 8_982_000, CITY),
    place("New York", -74.0060, 40.7128, 8_336_817, CITY),
    place("Rio de Janeiro", -43.1729, -22.9068, 6_748_000, CITY),
    place("Singapore", 103.8198, 1.3521, 5_686_000, CITY.union(COUNTRY)),
    place("Sydney", 151.2093, -33.8688, 5_312_163, CITY),
    place("Cape Town", 18.4241, -33.9249, 4_618_000, CITY),
    place("Los Angeles", -118.2437, 34.0522, 3_898_747, CITY),
    place("Berlin", 13.4050, 52.5200, 3_645_000, CITY),
    place("Dubai", 55.2708, 25.2048, 3_331_000, CITY),
    place("Madrid", -3.7038, 40.4168, 3_223_000, CITY),
    place("Rome", 12.4964, 41.9028, 2_873_000, CITY),
    place("Toronto", -79.3832, 43.6532, 2_794_356, CITY),
    place("Chicago", -87.6298, 41.8781, 2_746_388, CITY),
    place("Houston", -95.3698, 29.7604, 2_304_580, CITY),
    place("Paris", 2.3522, 48.8566, 2_161_000, CITY),
    place("San Francisco", -122.4194, 37.7749, 873_965, CITY),
    place("Seattle", -122.3321, 47.6062, 737_015, CITY),
    place("Washington, D.C.", -77.0369, 38.9072, 689_545, CITY),
    place("NYC", -74.0060, 40.7128, 0, CITY),
    place("New York City", -74.0060, 40.7128, 0, CITY),
    place("Big Apple", -74.0060, 40.7128, 0, CITY),
    place("LA", -118.2437, 34.0522, 0, CITY),
    place("SF", -122.4194, 37.7749, 0, CITY),
    place("DC", -77.0369, 38.9072, 0, CITY),
    place("United States", -95.7129, 37.0902, 0, COUNTRY),
    place("USA", -95.7129, 37.0902, 0, COUNTRY),
    place("France", 2.2137, 46.2276, 0, COUNTRY),
    place("Japan", 138.2529, 36.2048, 0, COUNTRY),
    place("Brazil", -51.9253, -14.2350, 0, COUNTRY),
    place("India", 78.9629, 20.5937, 0, COUNTRY),
    place("Australia", 133.7751, -25.2744, 0, COUNTRY),
    place("California", -119.4179, 36.7783, 0, STATE),
    place("Texas", -99.9018, 31.9686, 0, STATE),
    place("Florida", -81.5158, 27.6648, 0, STATE),
    place("Colorado", -105.7821, 39.5501, 0, STATE),
    place("Alps", 10.0000, 46.5000, 0, REGION),
    place("Sahara", 9.0000, 23.4162, 0, REGION),
    place("Amazon Rainforest", -62.2159, -3.4653, 0, REGION),
    landmark("Statue of Liberty", -74.0445, 40.6892, 225.0),
    landmark("Eiffel Tower", 2.2945, 48.8584, 320.0),
    landmark("Golden Gate Bridge", -122.4783, 37.8199, 0.0),
    landmark("Big Ben", -0.1246, 51.5007, 90.0),
    landmark("Colosseum", 12.4922, 41.8902, 60.0),
    landmark("St. Peter's Basilica", 12.4534, 41.9022, 270.0),
    landmark("Taj Mahal", 78.0421, 27.1751, 0.0),
    landmark("Sydney Opera House", 151.2153, -33.8568, 45.0),
    landmark("Great Wall of China", 116.5704, 40.4319, 0.0),
    landmark("Machu Picchu", -72.5450, -13.1631, 300.0),
    landmark("Christ the Redeemer", -43.2105, -22.9519, 180.0),
    landmark("Burj Khalifa", 55.2744, 25.1972, 0.0),
    landmark("Times Square", -73.9855, 40.7580, 200.0),
    landmark("Central Park", -73.9654, 40.7829, 30.0),
    landmark("Mount Everest", 86.9250, 27.9881, 0.0),
    Seed {
        name: "Grand Canyon",
        longitude: -112.1129,
        latitude: 36.1069,
        heading: Some(0.0),
        population: 0,
        category: LANDMARK.union(REGION),
    },
    place("JFK Airport", -73.7781, 40.6413, 0, AIRPORT),
    place("LAX", -118.4085, 33.9416, 0, AIRPORT),
    place("SFO", -122.3790, 37.6213, 0, AIRPORT),
    place("Heathrow Airport", -0.4543, 51.4700, 0, AIRPORT),
    place("CDG Airport", 2.5479, 49.0097, 0, AIRPORT),
];

/// The curated table embedded in every build, in declaration order and not yet normalized.
pub fn builtin_records() -> Vec<LocationRecord> {
    SEEDS
        .iter()
        .map(|seed| LocationRecord {
            name: seed.name.to_string(),
            longitude: seed.longitude,
            latitude: seed.latitude,
            heading: seed.heading,
            population: seed.population,
            category: seed.category,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::normalize;
    use std::collections::HashSet;

    #[test]
    fn builtin_names_are_unique_after_normalizing() {
        let records = builtin_records();
        let names: HashSet<String> = records.iter().map(|r| normalize(&r.name)).collect();
        assert_eq!(names.len(), records.len());
    }

    #[test]
    fn builtin_coordinates_are_in_range() {
        for record in builtin_records() {
            assert!((-180.0..=180.0).contains(&record.longitude), "{}", record.name);
            assert!((-90.0..=90.0).contains(&record.latitude), "{}", record.name);
            if let Some(heading) = record.heading {
                assert!((0.0..360.0).contains(&heading), "{}", record.name);
            }
        }
    }
}
