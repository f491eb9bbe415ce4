// SPDX-License-Identifier: MIT OR Apache-2.0
//! Implicit conversions between value types.
//!
//! Every ordered pair of distinct value types has an entry in a fixed policy
//! table. Widening from a scalar broadcasts; widening from a vector pads the
//! coordinate components with `0.0` and the fourth component with `1.0`, so
//! a vec3 color widened to vec4 stays opaque. Narrowing keeps the leading
//! components.

use crate::port::ValueType;

/// Shape of a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// `vecN(e)`
    Broadcast,
    /// `vecN(e, pad...)`
    Pad(&'static str),
    /// `(e).swizzle`
    Select(&'static str),
}

/// Look up the policy entry for `from -> to`
fn conversion(from: ValueType, to: ValueType) -> Option<Conversion> {
    use ValueType::{Float, Vec2, Vec3, Vec4};

    let conversion = match (from, to) {
        (Float, Vec2 | Vec3 | Vec4) => Conversion::Broadcast,
        (Vec2, Vec3) => Conversion::Pad("0.0"),
        (Vec2, Vec4) => Conversion::Pad("0.0, 1.0"),
        (Vec3, Vec4) => Conversion::Pad("1.0"),
        (Vec2 | Vec3 | Vec4, Float) => Conversion::Select("x"),
        (Vec3 | Vec4, Vec2) => Conversion::Select("xy"),
        (Vec4, Vec3) => Conversion::Select("xyz"),
        _ => return None,
    };
    Some(conversion)
}

/// Whether a value of type `from` may flow into a slot of type `to`
pub fn compatible(from: ValueType, to: ValueType) -> bool {
    from == to || conversion(from, to).is_some()
}

/// Rewrite `expr` of type `from` into an expression of type `to`.
///
/// Returns `expr` unchanged when the types are equal or when no conversion
/// exists; callers are expected to have checked [`compatible`] first.
pub fn coerce(expr: &str, from: ValueType, to: ValueType) -> String {
    if from == to {
        return expr.to_string();
    }
    match conversion(from, to) {
        Some(Conversion::Broadcast) => format!("{to}({expr})"),
        Some(Conversion::Pad(padding)) => format!("{to}({expr}, {padding})"),
        Some(Conversion::Select(swizzle)) => format!("({expr}).{swizzle}"),
        None => expr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueType::{Float, Vec2, Vec3, Vec4};

    #[test]
    fn test_coerce_same_type_is_identity() {
        for ty in ValueType::ALL {
            assert_eq!(coerce("o_1_out", ty, ty), "o_1_out");
            assert!(compatible(ty, ty));
        }
    }

    #[test]
    fn test_every_ordered_pair_is_compatible() {
        for from in ValueType::ALL {
            for to in ValueType::ALL {
                assert!(compatible(from, to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_widening() {
        assert_eq!(coerce("a", Float, Vec2), "vec2(a)");
        assert_eq!(coerce("a", Float, Vec3), "vec3(a)");
        assert_eq!(coerce("a", Float, Vec4), "vec4(a)");
        assert_eq!(coerce("a", Vec2, Vec3), "vec3(a, 0.0)");
        assert_eq!(coerce("a", Vec2, Vec4), "vec4(a, 0.0, 1.0)");
        assert_eq!(coerce("a", Vec3, Vec4), "vec4(a, 1.0)");
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(coerce("a", Vec2, Float), "(a).x");
        assert_eq!(coerce("a", Vec3, Float), "(a).x");
        assert_eq!(coerce("a", Vec4, Float), "(a).x");
        assert_eq!(coerce("a", Vec3, Vec2), "(a).xy");
        assert_eq!(coerce("a", Vec4, Vec2), "(a).xy");
        assert_eq!(coerce("a", Vec4, Vec3), "(a).xyz");
    }

    #[test]
    fn test_directions_differ() {
        for from in ValueType::ALL {
            for to in ValueType::ALL {
                if from == to {
                    continue;
                }
                assert_ne!(coerce("e", from, to), coerce("e", to, from));
                assert_ne!(coerce("e", from, to), "e");
            }
        }
    }
}
