// Copyright  (C) 2021, Hove and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Hove (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::models::Coord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehiclePlaces {
    pub bike_spaces: u32,
    pub car_spaces: u32,
}

/// The two links connecting a parking entrance to the rest of the graph.
/// Both are mandatory fields : a half-linked entrance cannot be built, so
/// no reader can ever observe one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntranceLink {
    pub edge_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingEntrance {
    pub id: String,
    pub street_link: EntranceLink,
    pub parking_link: EntranceLink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParking {
    pub id: String,
    pub coord: Coord,
    pub capacity: VehiclePlaces,
    pub availability: VehiclePlaces,
    pub entrances: Vec<ParkingEntrance>,
    /// stamped uniformly over a whole group when it is published
    pub generation: u64,
}

/// All parkings owned by one feed, published as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleParkingGroup {
    pub feed_id: String,
    pub generation: u64,
    pub parkings: Vec<VehicleParking>,
}

impl VehicleParkingGroup {
    /// Stamps every parking of the group with `generation`, so a reader can
    /// tell that what it sees was published together.
    pub fn new(feed_id: String, generation: u64, mut parkings: Vec<VehicleParking>) -> Self {
        for parking in &mut parkings {
            parking.generation = generation;
        }
        Self {
            feed_id,
            generation,
            parkings,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BikeStation {
    pub id: String,
    pub coord: Coord,
    pub bikes_available: u32,
    pub docks_available: u32,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BikeStationGroup {
    pub feed_id: String,
    pub generation: u64,
    pub stations: Vec<BikeStation>,
}

impl BikeStationGroup {
    pub fn new(feed_id: String, generation: u64, mut stations: Vec<BikeStation>) -> Self {
        for station in &mut stations {
            station.generation = generation;
        }
        Self {
            feed_id,
            generation,
            stations,
        }
    }
}

/// The mutable entity groups, keyed by owning feed. Each group is behind an
/// `Arc` : a mutation builds a complete new group beforehand and only swaps
/// the pointer here, so the map never holds a half-updated group.
#[derive(Default)]
pub struct GraphEntities {
    vehicle_parkings: HashMap<String, Arc<VehicleParkingGroup>>,
    bike_stations: HashMap<String, Arc<BikeStationGroup>>,
}

impl GraphEntities {
    /// Replaces the whole parking set of `group.feed_id`. An empty group
    /// removes the feed entirely : entities of a feed gone quiet must not
    /// linger.
    pub fn set_vehicle_parking_group(&mut self, group: Arc<VehicleParkingGroup>) {
        if group.parkings.is_empty() {
            self.vehicle_parkings.remove(&group.feed_id);
        } else {
            self.vehicle_parkings.insert(group.feed_id.clone(), group);
        }
    }

    pub fn set_bike_station_group(&mut self, group: Arc<BikeStationGroup>) {
        if group.stations.is_empty() {
            self.bike_stations.remove(&group.feed_id);
        } else {
            self.bike_stations.insert(group.feed_id.clone(), group);
        }
    }
}

/// The live routing graph shared between the single mutating task and any
/// number of concurrent readers.
///
/// Readers never wait on a mutation in progress : both sides hold the lock
/// only for a few pointer operations, all group building happens before.
pub struct RealTimeGraph {
    inner: RwLock<GraphEntities>,
}

impl Default for RealTimeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RealTimeGraph {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GraphEntities::default()),
        }
    }

    /// The graph as observed by one read operation. The snapshot stays
    /// internally consistent for as long as the reader holds it, however
    /// many mutations are applied meanwhile.
    pub fn snapshot(&self) -> GraphSnapshot {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        GraphSnapshot {
            vehicle_parkings: guard.vehicle_parkings.clone(),
            bike_stations: guard.bike_stations.clone(),
        }
    }

    /// Grants `mutation` exclusive access to the entities. Only the single
    /// writer task of the update engine calls this.
    pub(crate) fn apply<Mutation>(&self, mutation: Mutation)
    where
        Mutation: FnOnce(&mut GraphEntities),
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        mutation(&mut guard);
    }
}

/// An internally consistent view of the graph, cheap to take (it clones
/// `Arc`s, not entities).
#[derive(Clone)]
pub struct GraphSnapshot {
    vehicle_parkings: HashMap<String, Arc<VehicleParkingGroup>>,
    bike_stations: HashMap<String, Arc<BikeStationGroup>>,
}

impl GraphSnapshot {
    pub fn vehicle_parking_group(&self, feed_id: &str) -> Option<&VehicleParkingGroup> {
        self.vehicle_parkings.get(feed_id).map(Arc::as_ref)
    }

    pub fn bike_station_group(&self, feed_id: &str) -> Option<&BikeStationGroup> {
        self.bike_stations.get(feed_id).map(Arc::as_ref)
    }

    pub fn vehicle_parkings(&self) -> impl Iterator<Item = &VehicleParking> {
        self.vehicle_parkings
            .values()
            .flat_map(|group| group.parkings.iter())
    }

    pub fn bike_stations(&self) -> impl Iterator<Item = &BikeStation> {
        self.bike_stations
            .values()
            .flat_map(|group| group.stations.iter())
    }

    pub fn nb_of_vehicle_parkings(&self) -> usize {
        self.vehicle_parkings
            .values()
            .map(|group| group.parkings.len())
            .sum()
    }

    pub fn nb_of_bike_stations(&self) -> usize {
        self.bike_stations
            .values()
            .map(|group| group.stations.len())
            .sum()
    }
}
