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

use crate::units::{Quantity, Unit};

/// Kind shared by all velocity units. The base unit is meters per second.
#[derive(Debug)]
pub enum Velocity {}

linear_unit!(MetersPerSecond, Velocity, "m/s", 1.0);
linear_unit!(KilometersPerHour, Velocity, "km/h", 1.0 / 3.6);
linear_unit!(MilesPerHour, Velocity, "mph", 0.44704);
linear_unit!(Knots, Velocity, "kn", 1852.0 / 3600.0);
linear_unit!(FeetPerSecond, Velocity, "ft/s", 0.3048);

impl<U: Unit<Kind = Velocity>> Quantity<U> {
    pub fn meters_per_second(&self) -> Option<f64> {
        self.to::<MetersPerSecond>().value()
    }

    pub fn kilometers_per_hour(&self) -> Option<f64> {
        self.to::<KilometersPerHour>().value()
    }

    pub fn miles_per_hour(&self) -> Option<f64> {
        self.to::<MilesPerHour>().value()
    }

    pub fn knots(&self) -> Option<f64> {
        self.to::<Knots>().value()
    }

    pub fn feet_per_second(&self) -> Option<f64> {
        self.to::<FeetPerSecond>().value()
    }
}

#[cfg(test)]
mod tests {
    use super::{FeetPerSecond, KilometersPerHour, Knots, MetersPerSecond, MilesPerHour};
    use crate::units::testing::{assert_close, assert_round_trip};
    use crate::units::Quantity;

    #[test]
    fn test_meters_per_second() {
        let v = Quantity::<MetersPerSecond>::new(10.0);
        assert_close(36.0, v.kilometers_per_hour());
        assert_close(22.3693629, v.miles_per_hour());
        assert_close(19.4384449, v.knots());
        assert_close(32.8083990, v.feet_per_second());
    }

    #[test]
    fn test_miles_per_hour() {
        let v = Quantity::<MilesPerHour>::new(60.0);
        assert_close(96.56064, v.kilometers_per_hour());
        assert_close(88.0, v.feet_per_second());
    }

    #[test]
    fn test_kilometers_per_hour() {
        assert_close(1.0, Quantity::<KilometersPerHour>::new(3.6).meters_per_second());
        assert_close(1.0, Quantity::<KilometersPerHour>::new(1.852).knots());
    }

    #[test]
    fn test_unknown() {
        let v = Quantity::<Knots>::unknown();
        assert_eq!(None, v.miles_per_hour());
        assert_eq!(None, v.meters_per_second());
    }

    #[test]
    fn test_round_trip() {
        for v in [0.0, 0.5, 12.0, 99.9, 250.0] {
            assert_round_trip::<MetersPerSecond, KilometersPerHour>(v);
            assert_round_trip::<MetersPerSecond, MilesPerHour>(v);
            assert_round_trip::<MetersPerSecond, Knots>(v);
            assert_round_trip::<MetersPerSecond, FeetPerSecond>(v);
            assert_round_trip::<MilesPerHour, KilometersPerHour>(v);
            assert_round_trip::<Knots, MilesPerHour>(v);
        }
    }
}
