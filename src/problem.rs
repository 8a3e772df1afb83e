//! Problem definition: cities, deliveries, vehicles and the distance oracle.

use crate::error::{Result, RoutingError};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A 2D coordinate. Coordinates are unique per city and act as its surrogate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub fn new(x: i64, y: i64) -> Self {
        Coordinate { x, y }
    }
}

/// A named city with its coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub coordinate: Coordinate,
}

impl City {
    /// Create a new city.
    pub fn new(name: impl Into<String>, x: i64, y: i64) -> Self {
        City {
            name: name.into(),
            coordinate: Coordinate::new(x, y),
        }
    }
}

/// A delivery to a city. Priority 0 is the most urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: u32,
    pub city: String,
    pub priority: u8,
    pub weight: f64,
}

impl Delivery {
    /// Create a new delivery.
    pub fn new(id: u32, city: impl Into<String>, priority: u8, weight: f64) -> Self {
        Delivery {
            id,
            city: city.into(),
            priority,
            weight,
        }
    }
}

/// A vehicle available for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub max_weight: f64,
    pub max_distance: f64,
    pub cost_per_km: f64,
}

impl Vehicle {
    /// Create a new vehicle. The name defaults to the id.
    pub fn new(id: impl Into<String>, max_weight: f64, max_distance: f64, cost_per_km: f64) -> Self {
        let id = id.into();
        Vehicle {
            name: id.clone(),
            id,
            max_weight,
            max_distance,
            cost_per_km,
        }
    }

    /// Check whether this vehicle can cover a route of the given weight and distance.
    pub fn can_cover(&self, weight: f64, distance: f64) -> bool {
        weight <= self.max_weight && distance <= self.max_distance
    }
}

/// Symmetric distance lookup between two named cities.
///
/// Returning `None` means the pair is unknown; the problem treats that as
/// malformed input and never substitutes a default.
pub trait DistanceOracle {
    fn distance(&self, from: &str, to: &str) -> Option<f64>;
}

impl<F> DistanceOracle for F
where
    F: Fn(&str, &str) -> Option<f64>,
{
    fn distance(&self, from: &str, to: &str) -> Option<f64> {
        self(from, to)
    }
}

/// A distance oracle backed by a table of unordered city pairs.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    entries: HashMap<(String, String), f64>,
}

impl DistanceTable {
    pub fn new() -> Self {
        DistanceTable::default()
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Record the distance between two cities, in either direction.
    pub fn insert(&mut self, a: &str, b: &str, distance: f64) {
        self.entries.insert(Self::key(a, b), distance);
    }

    /// Chained variant of `insert`.
    pub fn with(mut self, a: &str, b: &str, distance: f64) -> Self {
        self.insert(a, b, distance);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DistanceOracle for DistanceTable {
    fn distance(&self, from: &str, to: &str) -> Option<f64> {
        self.entries.get(&Self::key(from, to)).copied()
    }
}

/// A validated, read-only routing problem.
///
/// Cities are addressed by their index in `cities()`. When the depot is not one
/// of the routed cities it occupies the extra node index `city_count()`.
#[derive(Debug, Clone)]
pub struct Problem {
    pub name: String,
    nodes: Vec<City>,
    city_count: usize,
    coordinate_index: HashMap<Coordinate, usize>,
    deliveries: Vec<Vec<Delivery>>,
    city_weights: Vec<f64>,
    city_priorities: Vec<Option<u8>>,
    vehicles: Vec<Vehicle>,
    depot: Option<usize>,
    distances: Vec<Option<f64>>,
}

impl Problem {
    /// Build a problem from loader output.
    ///
    /// Distances for every node pair are resolved through the oracle up front;
    /// pairs the oracle does not know are kept as gaps and reported as
    /// `MissingDistance` when the search first needs them.
    pub fn new(
        name: impl Into<String>,
        cities: Vec<City>,
        deliveries: Vec<Delivery>,
        vehicles: Vec<Vehicle>,
        oracle: &dyn DistanceOracle,
        depot: Option<City>,
    ) -> Result<Self> {
        if let Some(city) = cities.iter().map(|c| &c.name).duplicates().next() {
            return Err(RoutingError::DuplicateCity { city: city.clone() });
        }
        if let Some(vehicle_id) = vehicles.iter().map(|v| &v.id).duplicates().next() {
            return Err(RoutingError::DuplicateVehicle {
                vehicle_id: vehicle_id.clone(),
            });
        }

        let city_count = cities.len();
        let mut nodes = cities;
        let depot = match depot {
            Some(depot) => match nodes.iter().position(|c| c.name == depot.name) {
                Some(index) => Some(index),
                None => {
                    nodes.push(depot);
                    Some(city_count)
                }
            },
            None => None,
        };

        let mut coordinate_index = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            if coordinate_index.insert(node.coordinate, index).is_some() {
                return Err(RoutingError::DuplicateCoordinate {
                    x: node.coordinate.x,
                    y: node.coordinate.y,
                });
            }
        }

        let name_index: HashMap<&str, usize> = nodes[..city_count]
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.as_str(), i))
            .collect();

        let mut grouped = vec![Vec::new(); city_count];
        for delivery in deliveries {
            match name_index.get(delivery.city.as_str()) {
                Some(&index) => grouped[index].push(delivery),
                None => return Err(RoutingError::UnknownCity { city: delivery.city }),
            }
        }

        let city_weights = grouped
            .iter()
            .map(|ds| ds.iter().map(|d| d.weight).sum())
            .collect();
        let city_priorities = grouped
            .iter()
            .map(|ds| ds.iter().map(|d| d.priority).min())
            .collect();

        let distances = Self::compute_distance_matrix(&nodes, oracle);

        Ok(Problem {
            name: name.into(),
            nodes,
            city_count,
            coordinate_index,
            deliveries: grouped,
            city_weights,
            city_priorities,
            vehicles,
            depot,
            distances,
        })
    }

    /// Resolve the distance matrix over all nodes through the oracle.
    fn compute_distance_matrix(nodes: &[City], oracle: &dyn DistanceOracle) -> Vec<Option<f64>> {
        let n = nodes.len();
        let mut matrix = vec![None; n * n];

        for i in 0..n {
            for j in 0..n {
                matrix[i * n + j] = if nodes[i].name == nodes[j].name {
                    Some(0.0)
                } else {
                    oracle
                        .distance(&nodes[i].name, &nodes[j].name)
                        .or_else(|| oracle.distance(&nodes[j].name, &nodes[i].name))
                };
            }
        }

        matrix
    }

    /// Distance between two nodes. Fails loudly on a gap in the oracle.
    pub fn distance(&self, from: usize, to: usize) -> Result<f64> {
        let n = self.nodes.len();
        self.distances[from * n + to].ok_or_else(|| RoutingError::MissingDistance {
            from: self.nodes[from].name.clone(),
            to: self.nodes[to].name.clone(),
        })
    }

    /// Number of routed cities.
    pub fn city_count(&self) -> usize {
        self.city_count
    }

    /// The routed cities, in loader order.
    pub fn cities(&self) -> &[City] {
        &self.nodes[..self.city_count]
    }

    /// Any node, including a standalone depot.
    pub fn node(&self, index: usize) -> &City {
        &self.nodes[index]
    }

    /// Look a city up by its coordinate.
    pub fn city_at(&self, coordinate: Coordinate) -> Option<usize> {
        self.coordinate_index.get(&coordinate).copied()
    }

    pub fn city_index(&self, name: &str) -> Option<usize> {
        self.cities().iter().position(|c| c.name == name)
    }

    pub fn deliveries(&self, city: usize) -> &[Delivery] {
        &self.deliveries[city]
    }

    /// Total delivery weight of one city.
    pub fn city_weight(&self, city: usize) -> f64 {
        self.city_weights[city]
    }

    /// The most urgent priority among a city's deliveries, if it has any.
    pub fn city_priority(&self, city: usize) -> Option<u8> {
        self.city_priorities[city]
    }

    /// Total weight of all deliveries.
    pub fn total_weight(&self) -> f64 {
        self.city_weights.iter().sum()
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.iter().map(Vec::len).sum()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Vehicle indices sorted by descending capacity, ties in input order.
    pub fn vehicles_by_capacity(&self) -> Vec<usize> {
        (0..self.vehicles.len())
            .sorted_by(|&a, &b| {
                self.vehicles[b]
                    .max_weight
                    .partial_cmp(&self.vehicles[a].max_weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .collect()
    }

    /// The depot node, if the problem has one.
    pub fn depot(&self) -> Option<usize> {
        self.depot
    }
}

#[derive(Debug, Deserialize)]
struct CityEntry {
    name: String,
    x: i64,
    y: i64,
}

impl From<CityEntry> for City {
    fn from(entry: CityEntry) -> Self {
        City::new(entry.name, entry.x, entry.y)
    }
}

#[derive(Debug, Deserialize)]
struct DistanceEntry {
    from: String,
    to: String,
    distance: f64,
}

/// JSON layout of an instance file.
#[derive(Debug, Deserialize)]
struct InstanceFile {
    #[serde(default)]
    name: Option<String>,
    cities: Vec<CityEntry>,
    #[serde(default)]
    deliveries: Vec<Delivery>,
    vehicles: Vec<Vehicle>,
    distances: Vec<DistanceEntry>,
    #[serde(default)]
    depot: Option<CityEntry>,
}

impl Problem {
    /// Load a problem from a JSON instance file.
    ///
    /// The file lists `cities` (name, x, y), `deliveries`, `vehicles`,
    /// `distances` as `{from, to, distance}` entries and an optional `depot`.
    /// The problem name defaults to the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let instance: InstanceFile = serde_json::from_reader(reader)?;

        let name = instance.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let mut table = DistanceTable::new();
        for entry in &instance.distances {
            table.insert(&entry.from, &entry.to, entry.distance);
        }

        let vehicles = instance
            .vehicles
            .into_iter()
            .map(|mut v| {
                if v.name.is_empty() {
                    v.name = v.id.clone();
                }
                v
            })
            .collect();

        Problem::new(
            name,
            instance.cities.into_iter().map(City::from).collect(),
            instance.deliveries,
            vehicles,
            &table,
            instance.depot.map(City::from),
        )
    }
}
