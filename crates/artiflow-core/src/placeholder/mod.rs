//! Expresiones diferidas (futures/placeholders) sobre canales.
//!
//! `channel.future()` devuelve un placeholder con raíz en una copia del canal
//! tomada en ese momento; indexar, acceder a campos y comparar construyen
//! nodos hijos. Los árboles resultantes sirven como predicados de ramas
//! condicionales y como parámetros de runtime.
//!
//! La igualdad es estructural y explícita (`internal_equals`): no existe
//! `PartialEq` para `Placeholder`. Las raíces de canal se comparan por
//! identidad de canal (`ChannelId`), nunca por valor.

mod eval;

pub use eval::{ChannelValues, PlaceholderValue};

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use crate::channel::Channel;
use crate::errors::Result;
use crate::model::PropertyValue;

/// Campo accesible de un artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactField {
    /// Propiedad `value` (artifacts de valor: String, Integer, ...).
    Value,
    Uri,
    Property(String),
    CustomProperty(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Operando de una comparación: otro placeholder o un literal.
#[derive(Debug, Clone)]
pub enum Operand {
    Placeholder(Box<Placeholder>),
    Literal(PropertyValue),
}

impl Operand {
    pub fn internal_equals(&self, other: &Operand) -> bool {
        match (self, other) {
            (Operand::Placeholder(a), Operand::Placeholder(b)) => a.internal_equals(b),
            // Igualdad estructural: NaN es igual a sí mismo, 0.0 distinto de -0.0.
            (Operand::Literal(PropertyValue::Double(a)), Operand::Literal(PropertyValue::Double(b))) => {
                a.to_bits() == b.to_bits()
            }
            (Operand::Literal(a), Operand::Literal(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Placeholder> for Operand {
    fn from(p: Placeholder) -> Self {
        Operand::Placeholder(Box::new(p))
    }
}

impl From<&Placeholder> for Operand {
    fn from(p: &Placeholder) -> Self {
        Operand::Placeholder(Box::new(p.clone()))
    }
}

macro_rules! literal_operand {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Operand {
            fn from(v: $ty) -> Self {
                Operand::Literal(PropertyValue::from(v))
            }
        })+
    };
}

literal_operand!(i64, f64, &str, String);

impl From<PropertyValue> for Operand {
    fn from(v: PropertyValue) -> Self {
        Operand::Literal(v)
    }
}

#[derive(Debug, Clone)]
pub enum Placeholder {
    /// Raíz: snapshot del canal, con la key de input que lo consume si se
    /// conoce.
    Channel { channel: Arc<Channel>, key: Option<String> },
    Index { base: Box<Placeholder>, index: usize },
    Field { base: Box<Placeholder>, field: ArtifactField },
    Compare { op: CompareOp, left: Operand, right: Operand },
    And(Box<Placeholder>, Box<Placeholder>),
    Or(Box<Placeholder>, Box<Placeholder>),
    Not(Box<Placeholder>),
}

impl Channel {
    /// Placeholder con raíz en este canal. Mutaciones posteriores del canal
    /// (flags opcional/async) no afectan al placeholder devuelto.
    pub fn future(&self) -> Placeholder {
        Placeholder::Channel { channel: Arc::new(self.clone()),
                               key: None }
    }

    pub fn future_with_key(&self, key: impl Into<String>) -> Placeholder {
        Placeholder::Channel { channel: Arc::new(self.clone()),
                               key: Some(key.into()) }
    }
}

impl Placeholder {
    pub fn index(&self, index: usize) -> Placeholder {
        Placeholder::Index { base: Box::new(self.clone()),
                             index }
    }

    fn field(&self, field: ArtifactField) -> Placeholder {
        Placeholder::Field { base: Box::new(self.clone()),
                             field }
    }

    pub fn value(&self) -> Placeholder {
        self.field(ArtifactField::Value)
    }

    pub fn uri(&self) -> Placeholder {
        self.field(ArtifactField::Uri)
    }

    pub fn property(&self, name: impl Into<String>) -> Placeholder {
        self.field(ArtifactField::Property(name.into()))
    }

    pub fn custom_property(&self, name: impl Into<String>) -> Placeholder {
        self.field(ArtifactField::CustomProperty(name.into()))
    }

    pub fn compare(&self, op: CompareOp, other: impl Into<Operand>) -> Placeholder {
        Placeholder::Compare { op,
                               left: Operand::from(self),
                               right: other.into() }
    }

    pub fn eq_to(&self, other: impl Into<Operand>) -> Placeholder {
        self.compare(CompareOp::Eq, other)
    }

    pub fn ne_to(&self, other: impl Into<Operand>) -> Placeholder {
        self.compare(CompareOp::Ne, other)
    }

    pub fn lt(&self, other: impl Into<Operand>) -> Placeholder {
        self.compare(CompareOp::Lt, other)
    }

    pub fn le(&self, other: impl Into<Operand>) -> Placeholder {
        self.compare(CompareOp::Le, other)
    }

    pub fn gt(&self, other: impl Into<Operand>) -> Placeholder {
        self.compare(CompareOp::Gt, other)
    }

    pub fn ge(&self, other: impl Into<Operand>) -> Placeholder {
        self.compare(CompareOp::Ge, other)
    }

    /// Igualdad estructural profunda: misma operación en cada nodo y
    /// operandos recursivamente iguales.
    pub fn internal_equals(&self, other: &Placeholder) -> bool {
        match (self, other) {
            (Placeholder::Channel { channel: a, key: ka }, Placeholder::Channel { channel: b, key: kb }) => {
                a.same_channel(b) && ka == kb
            }
            (Placeholder::Index { base: a, index: ia }, Placeholder::Index { base: b, index: ib }) => {
                ia == ib && a.internal_equals(b)
            }
            (Placeholder::Field { base: a, field: fa }, Placeholder::Field { base: b, field: fb }) => {
                fa == fb && a.internal_equals(b)
            }
            (Placeholder::Compare { op: oa, left: la, right: ra },
             Placeholder::Compare { op: ob, left: lb, right: rb }) => {
                oa == ob && la.internal_equals(lb) && ra.internal_equals(rb)
            }
            (Placeholder::And(la, ra), Placeholder::And(lb, rb)) | (Placeholder::Or(la, ra), Placeholder::Or(lb, rb)) => {
                la.internal_equals(lb) && ra.internal_equals(rb)
            }
            (Placeholder::Not(a), Placeholder::Not(b)) => a.internal_equals(b),
            _ => false,
        }
    }

    /// Canales referenciados por el árbol, en orden de aparición.
    pub fn channels(&self) -> Vec<&Arc<Channel>> {
        let mut out = Vec::new();
        self.collect_channels(&mut out);
        out
    }

    fn collect_channels<'a>(&'a self, out: &mut Vec<&'a Arc<Channel>>) {
        match self {
            Placeholder::Channel { channel, .. } => out.push(channel),
            Placeholder::Index { base, .. } | Placeholder::Field { base, .. } | Placeholder::Not(base) => {
                base.collect_channels(out)
            }
            Placeholder::Compare { left, right, .. } => {
                for operand in [left, right] {
                    if let Operand::Placeholder(p) = operand {
                        p.collect_channels(out);
                    }
                }
            }
            Placeholder::And(a, b) | Placeholder::Or(a, b) => {
                a.collect_channels(out);
                b.collect_channels(out);
            }
        }
    }

    /// Nodos upstream de los que depende la expresión (para el scheduler).
    pub fn get_data_dependent_node_ids(&self) -> Result<BTreeSet<String>> {
        let mut out = BTreeSet::new();
        for ch in self.channels() {
            out.extend(ch.get_data_dependent_node_ids()?);
        }
        Ok(out)
    }
}

impl BitAnd for Placeholder {
    type Output = Placeholder;

    fn bitand(self, rhs: Placeholder) -> Placeholder {
        Placeholder::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Placeholder {
    type Output = Placeholder;

    fn bitor(self, rhs: Placeholder) -> Placeholder {
        Placeholder::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Placeholder {
    type Output = Placeholder;

    fn not(self) -> Placeholder {
        Placeholder::Not(Box::new(self))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Placeholder(p) => write!(f, "{p}"),
            Operand::Literal(PropertyValue::String(s)) => write!(f, "{s:?}"),
            Operand::Literal(PropertyValue::Int(v)) => write!(f, "{v}"),
            Operand::Literal(PropertyValue::Double(v)) => write!(f, "{v}"),
            Operand::Literal(PropertyValue::Proto(v)) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Channel { channel, key } => {
                let producer = channel.producer_id().unwrap_or("_");
                let output = channel.output_key().unwrap_or(channel.type_name());
                match key {
                    Some(k) => write!(f, "input({k}:{producer}.{output})"),
                    None => write!(f, "future({producer}.{output})"),
                }
            }
            Placeholder::Index { base, index } => write!(f, "{base}[{index}]"),
            Placeholder::Field { base, field } => match field {
                ArtifactField::Value => write!(f, "{base}.value"),
                ArtifactField::Uri => write!(f, "{base}.uri"),
                ArtifactField::Property(name) => write!(f, "{base}.property({name})"),
                ArtifactField::CustomProperty(name) => write!(f, "{base}.custom_property({name})"),
            },
            Placeholder::Compare { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Placeholder::And(a, b) => write!(f, "({a} && {b})"),
            Placeholder::Or(a, b) => write!(f, "({a} || {b})"),
            Placeholder::Not(a) => write!(f, "!{a}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactType;

    fn output(producer: &str, key: &str) -> Channel {
        Channel::output(ArtifactType::new("MyTypeName").into_shared(), producer, key)
    }

    #[test]
    fn future_wraps_the_channel() {
        let ch = output("producer", "foo");
        let future = ch.future();
        match &future {
            Placeholder::Channel { channel, key } => {
                assert!(channel.same_channel(&ch));
                assert!(key.is_none());
            }
            other => panic!("unexpected placeholder {other}"),
        }
        assert!(matches!(future.index(0), Placeholder::Index { index: 0, .. }));
        assert!(matches!(future.value(), Placeholder::Field { field: ArtifactField::Value, .. }));
    }

    #[test]
    fn display_renders_the_expression() {
        let pred = output("x1", "output1").future().index(0).value().ne_to("0");
        assert_eq!(pred.to_string(), r#"(future(x1.output1)[0].value != "0")"#);
    }

    #[test]
    fn boolean_operators_build_nodes() {
        let f = output("x1", "out").future();
        let p = f.value().eq_to(1i64) & !f.uri().eq_to("gs://a");
        assert!(matches!(p, Placeholder::And(_, ref rhs) if matches!(**rhs, Placeholder::Not(_))));
    }

    #[test]
    fn same_shape_different_operator_is_unequal() {
        let f = output("x1", "out").future();
        assert!(!f.value().eq_to("0").internal_equals(&f.value().ne_to("0")));
        assert!(!f.value().eq_to("0").internal_equals(&f.value().eq_to("1")));
        assert!(!f.value().internal_equals(&f.uri()));
        assert!(!f.index(0).internal_equals(&f.index(1)));
    }

    #[test]
    fn double_literals_compare_by_bits() {
        let ch = output("x1", "out");
        let pred = ch.future().value().ne_to(f64::NAN);
        assert!(pred.internal_equals(&pred));
        assert!(pred.internal_equals(&ch.future().value().ne_to(f64::NAN)));
        assert!(!ch.future().value().eq_to(0.0).internal_equals(&ch.future().value().eq_to(-0.0)));
        assert!(!ch.future().value().eq_to(1.0).internal_equals(&ch.future().value().eq_to(1i64)));
    }
}
