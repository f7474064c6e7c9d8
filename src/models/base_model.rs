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

use std::ops::Deref;

use chrono::NaiveDate;

use super::{StopPointIdx, VehicleJourneyIdx};

pub type Collections = transit_model::model::Collections;

/// Facade over the static transit data.
///
/// Real-time feeds never touch this model : they only mutate the entity
/// groups of the real-time graph. So a `BaseModel` is immutable for the
/// whole lifetime of the process.
pub struct BaseModel {
    collections: Collections,
}

impl Deref for BaseModel {
    type Target = Collections;

    fn deref(&self) -> &Self::Target {
        &self.collections
    }
}

impl BaseModel {
    pub fn from_transit_model(model: transit_model::Model) -> Self {
        Self {
            collections: model.into_collections(),
        }
    }

    pub fn stop_point_idx(&self, stop_id: &str) -> Option<StopPointIdx> {
        self.collections.stop_points.get_idx(stop_id)
    }

    pub fn stop_point_id(&self, stop_idx: StopPointIdx) -> &str {
        &self.collections.stop_points[stop_idx].id
    }

    pub fn vehicle_journey_idx(&self, vehicle_journey_id: &str) -> Option<VehicleJourneyIdx> {
        self.collections
            .vehicle_journeys
            .get_idx(vehicle_journey_id)
    }

    pub fn vehicle_journey_id(&self, vj_idx: VehicleJourneyIdx) -> &str {
        &self.collections.vehicle_journeys[vj_idx].id
    }

    pub fn trip_exists(&self, vj_idx: VehicleJourneyIdx, date: &NaiveDate) -> bool {
        let vehicle_journey = &self.collections.vehicle_journeys[vj_idx];
        let has_calendar = self.collections.calendars.get(&vehicle_journey.service_id);
        if let Some(calendar) = has_calendar {
            calendar.dates.contains(date)
        } else {
            false
        }
    }
}
