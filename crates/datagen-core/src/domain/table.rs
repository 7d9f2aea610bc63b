use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("no tabulated distribution at energy {energy}")]
pub struct MissingEnergyKey {
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEntry {
    energy: f64,
    values: Vec<f64>,
}

/// Energy-keyed table of per-energy sequences (angle cosines or pdf values).
///
/// Keys are unique and kept in ascending order. JSON form is a list of
/// `{ "energy": .., "values": [..] }` records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<EnergyEntry>", into = "Vec<EnergyEntry>")]
pub struct EnergyTable {
    entries: Vec<(f64, Vec<f64>)>,
}

impl EnergyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (f64, Vec<f64>)>) -> Self {
        let mut table = Self::new();
        for (energy, values) in entries {
            table.insert(energy, values);
        }
        table
    }

    fn position(&self, energy: f64) -> Result<usize, usize> {
        self.entries
            .binary_search_by(|(key, _)| key.total_cmp(&energy))
    }

    /// Insert or replace the sequence stored at `energy`.
    pub fn insert(&mut self, energy: f64, values: Vec<f64>) {
        match self.position(energy) {
            Ok(index) => self.entries[index].1 = values,
            Err(index) => self.entries.insert(index, (energy, values)),
        }
    }

    pub fn remove(&mut self, energy: f64) -> Option<Vec<f64>> {
        self.position(energy)
            .ok()
            .map(|index| self.entries.remove(index).1)
    }

    pub fn get(&self, energy: f64) -> Option<&[f64]> {
        self.position(energy)
            .ok()
            .map(|index| self.entries[index].1.as_slice())
    }

    pub fn at(&self, energy: f64) -> Result<&[f64], MissingEnergyKey> {
        self.get(energy).ok_or(MissingEnergyKey { energy })
    }

    pub fn contains_key(&self, energy: f64) -> bool {
        self.position(energy).is_ok()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(energy, _)| *energy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64])> + '_ {
        self.entries
            .iter()
            .map(|(energy, values)| (*energy, values.as_slice()))
    }

    pub fn entry(&self, index: usize) -> Option<(f64, &[f64])> {
        self.entries
            .get(index)
            .map(|(energy, values)| (*energy, values.as_slice()))
    }

    pub fn same_keys(&self, other: &Self) -> bool {
        self.len() == other.len() && self.keys().zip(other.keys()).all(|(a, b)| a == b)
    }
}

impl From<Vec<EnergyEntry>> for EnergyTable {
    fn from(entries: Vec<EnergyEntry>) -> Self {
        Self::from_entries(
            entries
                .into_iter()
                .map(|entry| (entry.energy, entry.values)),
        )
    }
}

impl From<EnergyTable> for Vec<EnergyEntry> {
    fn from(table: EnergyTable) -> Self {
        table
            .entries
            .into_iter()
            .map(|(energy, values)| EnergyEntry { energy, values })
            .collect()
    }
}
