// wxdat - Record weather observations from multiple providers
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Record weather observations from multiple providers.
//!
//! Each configured station is polled by its own [`recorder::Recorder`] which converts
//! provider responses into canonical [`model::Observation`] and [`model::HourlyForecast`]
//! records, saves them to a [`sink::Sink`], and updates Prometheus metrics.

pub mod client;
pub mod config;
pub mod http;
pub mod metrics;
pub mod model;
pub mod providers;
pub mod recorder;
pub mod sink;
pub mod units;
