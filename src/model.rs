use std::{collections::BTreeMap, path::PathBuf};

use crate::foundation::core::Coordinate;

/// Per-year coordinate sequences for one calendar day.
///
/// Years iterate in ascending order, which is also the order the fetch loop inserts them, so
/// the iteration index doubles as the insertion index used for color assignment. Years
/// without data are simply absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathCollection {
    by_year: BTreeMap<i32, Vec<Coordinate>>, // stable keys
}

impl PathCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a year's path. Empty paths are ignored.
    pub fn insert(&mut self, year: i32, coords: Vec<Coordinate>) {
        if coords.is_empty() {
            return;
        }
        self.by_year.insert(year, coords);
    }

    pub fn get(&self, year: i32) -> Option<&[Coordinate]> {
        self.by_year.get(&year).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Coordinate])> {
        self.by_year.iter().map(|(y, c)| (*y, c.as_slice()))
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    pub fn all_coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.by_year.values().flatten().copied()
    }

    /// Number of years with data.
    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.by_year.values().map(Vec::len).sum()
    }
}

impl FromIterator<(i32, Vec<Coordinate>)> for PathCollection {
    fn from_iter<T: IntoIterator<Item = (i32, Vec<Coordinate>)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (year, coords) in iter {
            out.insert(year, coords);
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screenshot {
    pub year: i32,
    pub path: PathBuf,
}

/// Successful captures in ascending-year order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenshotSet {
    shots: Vec<Screenshot>,
}

impl ScreenshotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, year: i32, path: PathBuf) {
        self.shots.push(Screenshot { year, path });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Screenshot> {
        self.shots.iter()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.shots.iter().map(|s| s.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn collection_iterates_in_ascending_year_order() {
        let mut paths = PathCollection::new();
        paths.insert(2023, vec![c(1.0, 1.0)]);
        paths.insert(2019, vec![c(2.0, 2.0), c(3.0, 3.0)]);
        paths.insert(2021, vec![c(4.0, 4.0)]);

        assert_eq!(paths.years().collect::<Vec<_>>(), vec![2019, 2021, 2023]);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths.total_points(), 4);
    }

    #[test]
    fn empty_paths_are_not_recorded() {
        let mut paths = PathCollection::new();
        paths.insert(2020, Vec::new());
        assert!(paths.is_empty());
        assert!(paths.get(2020).is_none());
    }

    #[test]
    fn screenshot_set_keeps_push_order() {
        let mut set = ScreenshotSet::new();
        set.push(2018, PathBuf::from("a.png"));
        set.push(2019, PathBuf::from("b.png"));
        assert_eq!(
            set.paths(),
            vec![PathBuf::from("a.png"), PathBuf::from("b.png")]
        );
        assert_eq!(set.iter().map(|s| s.year).collect::<Vec<_>>(), vec![2018, 2019]);
    }
}
