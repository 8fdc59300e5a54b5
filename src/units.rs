//! Unit-system tagged quantities.
//!
//! Halo catalogues store masses in comoving units (Msun/h) while the cooling
//! physics works in physical units (Msun, km/s). Each quantity carries its unit
//! system in its type so that the two can only be mixed through a
//! [`Cosmology`](crate::cosmology::Cosmology) conversion.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

macro_rules! quantity {
    ($(#[$meta:meta])* $name:ident, $unit:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Wraps a raw value.
            #[must_use]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $unit)
            }
        }
    };
}

quantity!(
    /// Mass (or mass rate) in comoving units, Msun/h.
    ComovingMass,
    "Msun/h"
);

quantity!(
    /// Mass (or mass rate) in physical units, Msun.
    PhysicalMass,
    "Msun"
);

quantity!(
    /// Velocity as stored in the halo catalogue, km/s.
    ComovingVelocity,
    "km/s (comoving)"
);

quantity!(
    /// Proper velocity, km/s.
    PhysicalVelocity,
    "km/s"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_add_within_unit_system() {
        let total = ComovingMass::new(1.0) + ComovingMass::new(2.5);
        assert_eq!(total.value(), 3.5);
    }

    #[test]
    fn display_names_unit() {
        assert_eq!(PhysicalMass::new(2.0).to_string(), "2 Msun");
        assert_eq!(ComovingMass::new(2.0).to_string(), "2 Msun/h");
    }

    #[test]
    fn serde_is_transparent() {
        let json = serde_json::to_string(&PhysicalVelocity::new(200.0)).unwrap();
        assert_eq!(json, "200.0");
        let back: PhysicalVelocity = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), 200.0);
    }
}
