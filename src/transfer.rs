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

pub mod candidates;
pub mod optimizer;
pub mod path;
pub mod resolver;

use crate::stop_index::RoutingStopIdx;

/// How much an operator wants a given transfer to be used.
///
/// The discriminant order is meaningful : a higher priority wins ties
/// between candidates of equal cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransferPriority {
    NotAllowed,
    Allowed,
    Recommended,
    Preferred,
}

/// An operator-defined rule attached to one transfer point.
///
/// `guaranteed` and `stay_seated` are absolute : a candidate carrying one of
/// them must be chosen over any candidate lacking it, whatever the costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConstraint {
    pub priority: TransferPriority,
    pub guaranteed: bool,
    pub stay_seated: bool,
}

impl TransferConstraint {
    pub fn with_priority(priority: TransferPriority) -> Self {
        Self {
            priority,
            guaranteed: false,
            stay_seated: false,
        }
    }

    pub fn guaranteed() -> Self {
        Self {
            priority: TransferPriority::Allowed,
            guaranteed: true,
            stay_seated: false,
        }
    }

    pub fn stay_seated() -> Self {
        Self {
            priority: TransferPriority::Allowed,
            guaranteed: false,
            stay_seated: true,
        }
    }
}

/// The winning transfer of a junction, as attached to the transit leg that
/// follows it. Downstream consumers read guaranteed/stay-seated semantics
/// here without going back to the constraint store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstrainedTransfer {
    pub from_stop: RoutingStopIdx,
    pub to_stop: RoutingStopIdx,
    pub constraint: TransferConstraint,
}
