//! Valores tipados de propiedades de artifacts.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tipo declarado de una propiedad en un `ArtifactType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Int,
    Double,
    String,
    /// Blob estructurado (equivalente a un proto); se guarda como JSON.
    Proto,
}

/// Valor de una propiedad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Int(i64),
    Double(f64),
    String(String),
    Proto(serde_json::Value),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Proto(_) => PropertyType::Proto,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Orden total entre valores. Int y Double se comparan numéricamente y de
    /// forma exacta (`0.0 == -0.0`, NaN en los extremos según su signo);
    /// entre familias distintas: numérico < string < proto.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        use PropertyValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Int(a), Double(b)) => cmp_int_double(*a, *b),
            (Double(a), Int(b)) => cmp_int_double(*b, *a).reverse(),
            (Double(a), Double(b)) => a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)),
            (String(a), String(b)) => a.cmp(b),
            (Proto(a), Proto(b)) => {
                crate::hashing::to_canonical_json(a).cmp(&crate::hashing::to_canonical_json(b))
            }
            (a, b) => a.family_rank().cmp(&b.family_rank()),
        }
    }

    /// Ambos numéricos, ambos string o ambos proto.
    pub(crate) fn same_family(&self, other: &Self) -> bool {
        self.family_rank() == other.family_rank()
    }

    fn family_rank(&self) -> u8 {
        match self {
            PropertyValue::Int(_) | PropertyValue::Double(_) => 0,
            PropertyValue::String(_) => 1,
            PropertyValue::Proto(_) => 2,
        }
    }
}

/// 2^63, exacto en f64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Compara un entero con un double sin convertir el entero a f64, que pierde
/// precisión por encima de 2^53.
fn cmp_int_double(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        return if b.is_sign_negative() { Ordering::Greater } else { Ordering::Less };
    }
    if b >= I64_BOUND {
        return Ordering::Less;
    }
    if b < -I64_BOUND {
        return Ordering::Greater;
    }
    // floor(b) está en [-2^63, 2^63): la conversión es exacta.
    let floor = b.floor();
    match a.cmp(&(floor as i64)) {
        Ordering::Equal if b > floor => Ordering::Less,
        other => other,
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_numeric_values_compare_numerically() {
        assert_eq!(PropertyValue::Int(2).total_cmp(&PropertyValue::Double(1.5)), Ordering::Greater);
        assert_eq!(PropertyValue::Double(2.0).total_cmp(&PropertyValue::Int(2)), Ordering::Equal);
    }

    #[test]
    fn int_double_comparison_is_exact_above_two_pow_53() {
        let big = 1i64 << 53;
        let rounded = PropertyValue::Double(big as f64);
        assert_eq!(PropertyValue::Int(big + 1).total_cmp(&rounded), Ordering::Greater);
        assert_eq!(rounded.total_cmp(&PropertyValue::Int(big + 1)), Ordering::Less);
        assert_eq!(PropertyValue::Int(big).total_cmp(&rounded), Ordering::Equal);
        assert_eq!(PropertyValue::Int(i64::MAX).total_cmp(&PropertyValue::Double(I64_BOUND)), Ordering::Less);
        assert_eq!(PropertyValue::Int(i64::MIN).total_cmp(&PropertyValue::Double(-I64_BOUND)), Ordering::Equal);
        assert_eq!(PropertyValue::Int(-3).total_cmp(&PropertyValue::Double(-2.5)), Ordering::Less);
        assert_eq!(PropertyValue::Int(-2).total_cmp(&PropertyValue::Double(-2.5)), Ordering::Greater);
    }

    #[test]
    fn nan_and_infinities_sit_at_the_ends() {
        let int = PropertyValue::Int(i64::MAX);
        assert_eq!(int.total_cmp(&PropertyValue::Double(f64::NAN)), Ordering::Less);
        assert_eq!(int.total_cmp(&PropertyValue::Double(-f64::NAN)), Ordering::Greater);
        assert_eq!(int.total_cmp(&PropertyValue::Double(f64::INFINITY)), Ordering::Less);
        assert_eq!(PropertyValue::Int(i64::MIN).total_cmp(&PropertyValue::Double(f64::NEG_INFINITY)),
                   Ordering::Greater);
        let nan = PropertyValue::Double(f64::NAN);
        assert_eq!(nan.total_cmp(&nan), Ordering::Equal);
    }

    #[test]
    fn signed_zeros_are_equal_to_int_zero_and_each_other() {
        let zero = PropertyValue::Int(0);
        let pos = PropertyValue::Double(0.0);
        let neg = PropertyValue::Double(-0.0);
        assert_eq!(zero.total_cmp(&pos), Ordering::Equal);
        assert_eq!(zero.total_cmp(&neg), Ordering::Equal);
        assert_eq!(neg.total_cmp(&pos), Ordering::Equal);
    }

    #[test]
    fn numbers_sort_before_strings() {
        assert_eq!(PropertyValue::Int(100).total_cmp(&PropertyValue::from("1")), Ordering::Less);
    }

    #[test]
    fn serde_uses_snake_case_tags() {
        let v = serde_json::to_value(PropertyValue::Int(3)).unwrap();
        assert_eq!(v, serde_json::json!({"int": 3}));
    }
}
