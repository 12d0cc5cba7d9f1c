//! Distance band partitioning.
//!
//! A single pass maps every observation with a distance to its `DistanceBand`.
//! The result always holds all four bands, empty ones included.

use serde::Serialize;

use crate::derive::Observation;
use crate::domain::DistanceBand;

/// Observations falling in one distance band, by index into the observation slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceGroup {
    pub band: DistanceBand,
    pub members: Vec<usize>,
}

impl DistanceGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn observations<'a>(&'a self, all: &'a [Observation]) -> impl Iterator<Item = &'a Observation> + 'a {
        self.members.iter().filter_map(move |&i| all.get(i))
    }
}

/// Partition observations into the four fixed distance bands.
///
/// Observations without a usable distance are left out of every group.
pub fn partition(observations: &[Observation]) -> Vec<DistanceGroup> {
    let mut groups: Vec<DistanceGroup> = DistanceBand::ALL
        .iter()
        .map(|&band| DistanceGroup {
            band,
            members: Vec::new(),
        })
        .collect();

    for (idx, obs) in observations.iter().enumerate() {
        let Some(band) = obs.record.distance.and_then(DistanceBand::of) else {
            continue;
        };
        if let Some(group) = groups.iter_mut().find(|g| g.band == band) {
            group.members.push(idx);
        }
    }

    groups
}
