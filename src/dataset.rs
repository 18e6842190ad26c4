use std::collections::HashMap;
use std::path::Path;

use crate::loader::{self, LoadError};
use crate::types::TemperatureRecord;

/// Loaded record set, passed explicitly to every computation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<TemperatureRecord>,
    /// City name -> row indices, in first-appearance order
    cities: Vec<(String, Vec<usize>)>,
}

/// All records of one city, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub city: String,
    pub records: Vec<TemperatureRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<TemperatureRecord>) -> Self {
        let cities = {
            let mut cities: Vec<(String, Vec<usize>)> = Vec::new();
            let mut position: HashMap<&str, usize> = HashMap::new();

            for (idx, record) in records.iter().enumerate() {
                match position.get(record.city.as_str()) {
                    Some(&slot) => cities[slot].1.push(idx),
                    None => {
                        position.insert(record.city.as_str(), cities.len());
                        cities.push((record.city.clone(), vec![idx]));
                    }
                }
            }
            cities
        };

        Self { records, cities }
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let dataset = Self::from_records(loader::load_csv(path)?);
        tracing::info!(
            path = %path.display(),
            records = dataset.len(),
            cities = dataset.cities.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TemperatureRecord] {
        &self.records
    }

    /// Distinct city names in order of first appearance
    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(|(city, _)| city.as_str())
    }

    pub fn contains_city(&self, city: &str) -> bool {
        self.cities.iter().any(|(c, _)| c == city)
    }

    /// Records whose city equals `city` exactly; empty for unknown cities.
    pub fn city_records(&self, city: &str) -> Vec<TemperatureRecord> {
        self.cities
            .iter()
            .find(|(c, _)| c == city)
            .map(|(_, rows)| rows.iter().map(|&i| self.records[i].clone()).collect())
            .unwrap_or_default()
    }

    /// One partition per distinct city
    pub fn partitions(&self) -> Vec<Partition> {
        self.cities
            .iter()
            .map(|(city, rows)| Partition {
                city: city.clone(),
                records: rows.iter().map(|&i| self.records[i].clone()).collect(),
            })
            .collect()
    }
}
