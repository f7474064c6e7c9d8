// Copyright (C) 2021 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Provides an easy way to create a `transit_model::Model`
//!
//! ```
//! # use skadi::modelbuilder::ModelBuilder;
//!
//! # fn main() {
//!  let model = ModelBuilder::default()
//!      .vj("toto", |vj| {
//!          vj.st("A", "10:00:00")
//!            .st("B", "11:00:00");
//!      })
//!      .vj("tata", |vj| {
//!          vj.st("A", "10:00:00")
//!            .st("D", "11:00:00");
//!      })
//!      .build();
//! # }
//! ```

use transit_model::{
    model::Collections,
    objects::{Calendar, Date, Route, StopPoint, StopTime, Time, Transfer, ValidityPeriod, VehicleJourney},
    Model,
};
use typed_index_collection::Idx;

const DEFAULT_CALENDAR_ID: &str = "default_service";
const DEFAULT_ROUTE_ID: &str = "default_route";

/// Builder used to easily create a `Model`
/// Note: if not explicitly set all the vehicule journeys
/// will be attached to a default calendar starting 2021-01-01
pub struct ModelBuilder {
    collections: Collections,
    validity_period: ValidityPeriod,
}

/// Builder used to create and modify a new VehicleJourney
pub struct VehicleJourneyBuilder<'a> {
    model: &'a mut ModelBuilder,
    vj_idx: Idx<VehicleJourney>,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        let date = "2021-01-01";
        Self::new(date, date)
    }
}

impl ModelBuilder {
    pub fn new(start_validity_period: impl AsDate, end_validity_period: impl AsDate) -> Self {
        let start_date = start_validity_period.as_date();
        let end_date = end_validity_period.as_date();
        let model_builder = Self {
            validity_period: ValidityPeriod {
                start_date,
                end_date,
            },
            collections: Collections::default(),
        };

        assert!(start_date <= end_date);
        let dates: Vec<_> = start_date
            .iter_days()
            .take_while(|date| *date <= end_date)
            .collect();

        model_builder.default_calendar(&dates)
    }

    /// Add a new VehicleJourney to the model
    ///
    /// ```
    /// # use skadi::modelbuilder::ModelBuilder;
    ///
    /// # fn main() {
    /// let model = ModelBuilder::default()
    ///        .vj("toto", |vj_builder| {
    ///            vj_builder
    ///                .st("A", "10:00:00")
    ///                .st("B", "11:00:00");
    ///        })
    ///        .build();
    /// # }
    /// ```
    pub fn vj<F>(mut self, name: &str, mut vj_initer: F) -> Self
    where
        F: FnMut(VehicleJourneyBuilder),
    {
        let new_vj = VehicleJourney {
            id: name.into(),
            service_id: DEFAULT_CALENDAR_ID.to_string(),
            route_id: DEFAULT_ROUTE_ID.to_string(),
            ..Default::default()
        };
        let vj_idx = self
            .collections
            .vehicle_journeys
            .push(new_vj)
            .unwrap_or_else(|_| panic!("vj {} already exists", name));

        let vj = &self.collections.vehicle_journeys[vj_idx];

        {
            let mut dataset = self.collections.datasets.get_or_create(&vj.dataset_id);
            dataset.start_date = self.validity_period.start_date;
            dataset.end_date = self.validity_period.end_date;
        }

        let vj_builder = VehicleJourneyBuilder {
            model: &mut self,
            vj_idx,
        };

        vj_initer(vj_builder);
        self
    }

    /// Add a new Route to the model
    pub fn route<F>(mut self, id: &str, mut route_initer: F) -> Self
    where
        F: FnMut(&mut Route),
    {
        self.collections.routes.get_or_create_with(id, || {
            let mut r = Route::default();
            route_initer(&mut r);
            r
        });
        self
    }

    /// Add a new Calendar or change an existing one
    pub fn calendar(mut self, id: &str, dates: &[impl AsDate]) -> Self {
        {
            let mut c = self.collections.calendars.get_or_create(id);
            for d in dates {
                c.dates.insert(d.as_date());
            }
        }
        self
    }

    /// Change the default Calendar
    /// If not explicitly set, all vehicule journeys will be linked
    /// to this calendar
    pub fn default_calendar(self, dates: &[impl AsDate]) -> Self {
        self.calendar(DEFAULT_CALENDAR_ID, dates)
    }

    /// Add a new Calendar to the model
    pub fn calendar_mut<F>(mut self, id: &str, mut calendar_initer: F) -> Self
    where
        F: FnMut(&mut Calendar),
    {
        self.collections.calendars.get_or_create_with(id, || {
            let mut c = Calendar::default();
            calendar_initer(&mut c);
            c
        });
        self
    }

    pub fn validity_period(mut self, start_date: Date, end_date: Date) -> Self {
        self.validity_period = ValidityPeriod {
            start_date,
            end_date,
        };
        self
    }

    pub fn add_transfer(
        mut self,
        from_stop_id: &str,
        to_stop_id: &str,
        transfer_duration: impl IntoTime,
    ) -> Self {
        let duration = transfer_duration.into_time().total_seconds();
        self.collections.transfers.push(Transfer {
            from_stop_id: from_stop_id.to_string(),
            to_stop_id: to_stop_id.to_string(),
            min_transfer_time: Some(duration),
            real_min_transfer_time: Some(duration),
            equipment_id: None,
        });
        self
    }

    /// Consume the builder to create a navitia model
    pub fn build(self) -> Model {
        Model::new(self.collections).unwrap()
    }
}

pub trait IntoTime {
    fn into_time(&self) -> Time;
}

impl IntoTime for Time {
    fn into_time(&self) -> Time {
        *self
    }
}

impl IntoTime for &Time {
    fn into_time(&self) -> Time {
        **self
    }
}

impl IntoTime for &str {
    // Note: if the string is not in the right format, this conversion will fail
    fn into_time(&self) -> Time {
        self.parse().expect("invalid time format")
    }
}

pub trait AsDate {
    fn as_date(&self) -> Date;
}

impl AsDate for Date {
    fn as_date(&self) -> Date {
        *self
    }
}

impl AsDate for &Date {
    fn as_date(&self) -> Date {
        **self
    }
}

impl AsDate for &str {
    // Note: if the string is not in the right format, this conversion will fail
    fn as_date(&self) -> Date {
        self.parse().expect("invalid date format")
    }
}

impl<'a> VehicleJourneyBuilder<'a> {
    fn find_or_create_sp(&mut self, sp: &str) -> Idx<StopPoint> {
        self.model
            .collections
            .stop_points
            .get_idx(sp)
            .unwrap_or_else(|| {
                let sa_id = format!("sa:{}", sp);
                let new_sp = StopPoint {
                    id: sp.to_owned(),
                    name: sp.to_owned(),
                    stop_area_id: sa_id.clone(),
                    ..Default::default()
                };

                self.model.collections.stop_areas.get_or_create(&sa_id);

                self.model
                    .collections
                    .stop_points
                    .push(new_sp)
                    .unwrap_or_else(|_| panic!("stoppoint {} already exists", sp))
            })
    }

    /// add a StopTime to the vehicle journey
    ///
    /// Note: if the arrival/departure are given in string
    /// not in the right format, this conversion will fail
    pub fn st(self, name: &str, time: impl IntoTime) -> Self {
        let time = time.into_time();
        self.st_detailed(name, time, time)
    }

    pub fn st_detailed(
        mut self,
        name: &str,
        arrival: impl IntoTime,
        departure: impl IntoTime,
    ) -> Self {
        {
            let stop_point_idx = self.find_or_create_sp(name);
            let vj = &mut self
                .model
                .collections
                .vehicle_journeys
                .index_mut(self.vj_idx);
            let sequence = vj.stop_times.len() as u32;
            let stop_time = StopTime {
                stop_point_idx,
                sequence,
                arrival_time: arrival.into_time(),
                departure_time: departure.into_time(),
                boarding_duration: 0u16,
                alighting_duration: 0u16,
                pickup_type: 0u8,
                drop_off_type: 0u8,
                datetime_estimated: false,
                local_zone_id: None,
                precision: None,
            };

            vj.stop_times.push(stop_time);
        }

        self
    }

    /// Set the calendar of the vj
    pub fn calendar(self, calendar_id: &str) -> Self {
        {
            let vj = &mut self
                .model
                .collections
                .vehicle_journeys
                .index_mut(self.vj_idx);
            vj.service_id = calendar_id.to_owned();
        }
        self
    }

    /// Set the route of the vj
    pub fn route(self, route_id: &str) -> Self {
        {
            let vj = &mut self
                .model
                .collections
                .vehicle_journeys
                .index_mut(self.vj_idx);
            vj.route_id = route_id.to_owned();
        }
        self
    }
}
