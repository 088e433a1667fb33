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

/// Kind shared by all temperature units. The base unit is Celsius.
#[derive(Debug)]
pub enum Temperature {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Celsius;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fahrenheit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kelvin;

const KELVIN_OFFSET: f64 = 273.15;

impl Unit for Celsius {
    type Kind = Temperature;
    const SYMBOL: &'static str = "°C";

    fn to_base(value: f64) -> f64 {
        value
    }

    fn from_base(value: f64) -> f64 {
        value
    }
}

impl Unit for Fahrenheit {
    type Kind = Temperature;
    const SYMBOL: &'static str = "°F";

    fn to_base(value: f64) -> f64 {
        (value - 32.0) / 1.8
    }

    fn from_base(value: f64) -> f64 {
        value * 1.8 + 32.0
    }
}

impl Unit for Kelvin {
    type Kind = Temperature;
    const SYMBOL: &'static str = "K";

    fn to_base(value: f64) -> f64 {
        value - KELVIN_OFFSET
    }

    fn from_base(value: f64) -> f64 {
        value + KELVIN_OFFSET
    }
}

impl<U: Unit<Kind = Temperature>> Quantity<U> {
    pub fn celsius(&self) -> Option<f64> {
        self.to::<Celsius>().value()
    }

    pub fn fahrenheit(&self) -> Option<f64> {
        self.to::<Fahrenheit>().value()
    }

    pub fn kelvin(&self) -> Option<f64> {
        self.to::<Kelvin>().value()
    }
}

#[cfg(test)]
mod tests {
    use super::{Celsius, Fahrenheit, Kelvin};
    use crate::units::testing::{assert_close, assert_round_trip};
    use crate::units::Quantity;

    #[test]
    fn test_fahrenheit() {
        let t = Quantity::<Fahrenheit>::new(32.0);
        assert_eq!(Some(0.0), t.celsius());
        assert_eq!(Some(273.15), t.kelvin());
        assert_eq!(Some(32.0), t.fahrenheit());

        assert_close(100.0, Quantity::<Fahrenheit>::new(212.0).celsius());
        assert_close(-40.0, Quantity::<Fahrenheit>::new(-40.0).celsius());
    }

    #[test]
    fn test_celsius() {
        let t = Quantity::<Celsius>::new(100.0);
        assert_close(212.0, t.fahrenheit());
        assert_close(373.15, t.kelvin());
    }

    #[test]
    fn test_kelvin() {
        let t = Quantity::<Kelvin>::new(0.0);
        assert_close(-273.15, t.celsius());
        assert_close(-459.67, t.fahrenheit());
    }

    #[test]
    fn test_unknown() {
        let t = Quantity::<Kelvin>::unknown();
        assert_eq!(None, t.celsius());
        assert_eq!(None, t.fahrenheit());
        assert_eq!(None, t.kelvin());
    }

    #[test]
    fn test_round_trip() {
        for v in [-40.0, 0.0, 21.5, 98.6, 451.0] {
            assert_round_trip::<Celsius, Fahrenheit>(v);
            assert_round_trip::<Celsius, Kelvin>(v);
            assert_round_trip::<Fahrenheit, Celsius>(v);
            assert_round_trip::<Fahrenheit, Kelvin>(v);
            assert_round_trip::<Kelvin, Celsius>(v);
            assert_round_trip::<Kelvin, Fahrenheit>(v);
        }
    }
}
