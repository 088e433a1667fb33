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

/// Kind shared by all pressure units. The base unit is the pascal.
#[derive(Debug)]
pub enum Pressure {}

linear_unit!(Pascal, Pressure, "Pa", 1.0);
linear_unit!(Hectopascal, Pressure, "hPa", 100.0);
linear_unit!(Kilopascal, Pressure, "kPa", 1000.0);
linear_unit!(Millibar, Pressure, "mbar", 100.0);
linear_unit!(InchesMercury, Pressure, "inHg", 3386.3886666667);
linear_unit!(MillimetersMercury, Pressure, "mmHg", 133.322387415);

impl<U: Unit<Kind = Pressure>> Quantity<U> {
    pub fn pascals(&self) -> Option<f64> {
        self.to::<Pascal>().value()
    }

    pub fn hectopascals(&self) -> Option<f64> {
        self.to::<Hectopascal>().value()
    }

    pub fn kilopascals(&self) -> Option<f64> {
        self.to::<Kilopascal>().value()
    }

    pub fn millibars(&self) -> Option<f64> {
        self.to::<Millibar>().value()
    }

    pub fn inches_mercury(&self) -> Option<f64> {
        self.to::<InchesMercury>().value()
    }

    pub fn millimeters_mercury(&self) -> Option<f64> {
        self.to::<MillimetersMercury>().value()
    }
}

#[cfg(test)]
mod tests {
    use super::{Hectopascal, InchesMercury, Kilopascal, Millibar, MillimetersMercury, Pascal};
    use crate::units::testing::{assert_close, assert_round_trip};
    use crate::units::Quantity;

    #[test]
    fn test_inches_mercury() {
        let p = Quantity::<InchesMercury>::new(29.92);
        assert_close(101320.749, p.pascals());
        assert_close(1013.20749, p.hectopascals());
        assert_close(760.0, Quantity::<InchesMercury>::new(29.9212598).millimeters_mercury());
    }

    #[test]
    fn test_standard_atmosphere() {
        let p = Quantity::<Pascal>::new(101325.0);
        assert_close(1013.25, p.hectopascals());
        assert_close(1013.25, p.millibars());
        assert_close(101.325, p.kilopascals());
        assert_close(29.9212524, p.inches_mercury());
        assert_close(760.0, p.millimeters_mercury());
    }

    #[test]
    fn test_unknown() {
        let p = Quantity::<Hectopascal>::new(None);
        assert_eq!(None, p.pascals());
        assert_eq!(None, p.inches_mercury());
    }

    #[test]
    fn test_round_trip() {
        for v in [0.0, 1.0, 29.92, 1013.25, 101325.0] {
            assert_round_trip::<Pascal, Hectopascal>(v);
            assert_round_trip::<Pascal, Kilopascal>(v);
            assert_round_trip::<Pascal, Millibar>(v);
            assert_round_trip::<Pascal, InchesMercury>(v);
            assert_round_trip::<Pascal, MillimetersMercury>(v);
            assert_round_trip::<Hectopascal, InchesMercury>(v);
            assert_round_trip::<InchesMercury, MillimetersMercury>(v);
        }
    }
}
