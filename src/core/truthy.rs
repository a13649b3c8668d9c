//! Truthiness of `assert` conditions

use serde_json::Value;

/// A condition that `Logger::assert` can test
///
/// Zero, NaN, `None`, JSON `null`, `false` and the empty string are falsy.
/// The literal string `"false"` is also falsy so that stringified booleans
/// from callers behave as expected.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

macro_rules! impl_truthy_int {
    ($($t:ty),*) => {
        $(impl Truthy for $t {
            fn is_truthy(&self) -> bool {
                *self != 0
            }
        })*
    };
}

impl_truthy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty() && self != "false"
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        self.as_str().is_truthy()
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

impl Truthy for Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f.is_truthy()),
            Value::String(s) => s.is_truthy(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert!(true.is_truthy());
        assert!(!false.is_truthy());
        assert!(1i32.is_truthy());
        assert!(!0u8.is_truthy());
        assert!(!f64::NAN.is_truthy());
        assert!(0.5f32.is_truthy());
    }

    #[test]
    fn test_strings() {
        assert!("yes".is_truthy());
        assert!(!"".is_truthy());
        assert!(!"false".is_truthy());
        assert!(String::from("0").is_truthy());
    }

    #[test]
    fn test_option_and_json() {
        assert!(!None::<bool>.is_truthy());
        assert!(Some(1).is_truthy());
        assert!(!json!(null).is_truthy());
        assert!(!json!(0).is_truthy());
        assert!(json!({}).is_truthy());
        assert!(!json!("false").is_truthy());
    }
}
