//! Evaluación de placeholders contra artifacts ya resueltos.
use std::cmp::Ordering;

use super::{ArtifactField, CompareOp, Operand, Placeholder};
use crate::channel::Channel;
use crate::errors::{LineageError, Result};
use crate::model::{Artifact, PropertyValue};

/// Fuente de artifacts para las raíces de canal (normalmente el
/// `InputResolver`).
pub trait ChannelValues {
    fn artifacts_of(&self, channel: &Channel) -> Result<Vec<Artifact>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderValue {
    Artifacts(Vec<Artifact>),
    Artifact(Artifact),
    Value(PropertyValue),
    Bool(bool),
    /// Campo ausente en el artifact.
    Null,
}

impl PlaceholderValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PlaceholderValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PlaceholderValue::Artifacts(_) => "artifact list",
            PlaceholderValue::Artifact(_) => "artifact",
            PlaceholderValue::Value(_) => "value",
            PlaceholderValue::Bool(_) => "bool",
            PlaceholderValue::Null => "null",
        }
    }
}

impl Placeholder {
    pub fn evaluate<C>(&self, ctx: &C) -> Result<PlaceholderValue>
        where C: ChannelValues + ?Sized
    {
        match self {
            Placeholder::Channel { channel, .. } => Ok(PlaceholderValue::Artifacts(ctx.artifacts_of(channel)?)),
            Placeholder::Index { base, index } => match base.evaluate(ctx)? {
                PlaceholderValue::Artifacts(mut list) => {
                    if *index >= list.len() {
                        return Err(LineageError::Usage(format!("index {index} out of range for {} artifacts",
                                                               list.len())));
                    }
                    Ok(PlaceholderValue::Artifact(list.swap_remove(*index)))
                }
                other => Err(LineageError::Usage(format!("cannot index a {}", other.kind()))),
            },
            Placeholder::Field { base, field } => match base.evaluate(ctx)? {
                PlaceholderValue::Artifact(a) => Ok(read_field(&a, field)),
                // Un campo sobre la lista se lee del primer artifact.
                PlaceholderValue::Artifacts(list) => match list.first() {
                    Some(a) => Ok(read_field(a, field)),
                    None => Err(LineageError::Usage("cannot read a field of an empty artifact list".into())),
                },
                other => Err(LineageError::Usage(format!("cannot read a field of a {}", other.kind()))),
            },
            Placeholder::Compare { op, left, right } => {
                let l = evaluate_operand(left, ctx)?;
                let r = evaluate_operand(right, ctx)?;
                compare(*op, &l, &r).map(PlaceholderValue::Bool)
            }
            Placeholder::And(a, b) => {
                Ok(PlaceholderValue::Bool(a.evaluate_predicate(ctx)? && b.evaluate_predicate(ctx)?))
            }
            Placeholder::Or(a, b) => {
                Ok(PlaceholderValue::Bool(a.evaluate_predicate(ctx)? || b.evaluate_predicate(ctx)?))
            }
            Placeholder::Not(a) => Ok(PlaceholderValue::Bool(!a.evaluate_predicate(ctx)?)),
        }
    }

    /// Evalúa y exige un booleano (predicados de ramas condicionales).
    pub fn evaluate_predicate<C>(&self, ctx: &C) -> Result<bool>
        where C: ChannelValues + ?Sized
    {
        let value = self.evaluate(ctx)?;
        value.as_bool()
             .ok_or_else(|| LineageError::Usage(format!("{self} evaluates to a {}, not a predicate", value.kind())))
    }
}

fn evaluate_operand<C>(operand: &Operand, ctx: &C) -> Result<PlaceholderValue>
    where C: ChannelValues + ?Sized
{
    match operand {
        Operand::Placeholder(p) => p.evaluate(ctx),
        Operand::Literal(v) => Ok(PlaceholderValue::Value(v.clone())),
    }
}

fn read_field(artifact: &Artifact, field: &ArtifactField) -> PlaceholderValue {
    let found = match field {
        ArtifactField::Uri => return PlaceholderValue::Value(PropertyValue::String(artifact.uri.clone())),
        ArtifactField::Value => artifact.property("value").or_else(|| artifact.custom_property("value")),
        ArtifactField::Property(name) => artifact.property(name),
        ArtifactField::CustomProperty(name) => artifact.custom_property(name),
    };
    found.cloned().map(PlaceholderValue::Value).unwrap_or(PlaceholderValue::Null)
}

fn compare(op: CompareOp, l: &PlaceholderValue, r: &PlaceholderValue) -> Result<bool> {
    let ordering = match (l, r) {
        (PlaceholderValue::Null, PlaceholderValue::Null) => Some(Ordering::Equal),
        (PlaceholderValue::Null, _) | (_, PlaceholderValue::Null) => None,
        (PlaceholderValue::Value(a), PlaceholderValue::Value(b)) => {
            if a.same_family(b) {
                Some(a.total_cmp(b))
            } else if matches!(op, CompareOp::Eq | CompareOp::Ne) {
                None
            } else {
                return Err(LineageError::Usage(format!("cannot order {a:?} against {b:?}")));
            }
        }
        (PlaceholderValue::Bool(a), PlaceholderValue::Bool(b)) if matches!(op, CompareOp::Eq | CompareOp::Ne) => {
            Some(a.cmp(b))
        }
        (a, b) => return Err(LineageError::Usage(format!("cannot compare a {} with a {}", a.kind(), b.kind()))),
    };
    // `None` = incomparables: sólo `!=` es cierto.
    Ok(match (op, ordering) {
        (CompareOp::Ne, None) => true,
        (_, None) => false,
        (CompareOp::Eq, Some(o)) => o == Ordering::Equal,
        (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
        (CompareOp::Lt, Some(o)) => o == Ordering::Less,
        (CompareOp::Le, Some(o)) => o != Ordering::Greater,
        (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
        (CompareOp::Ge, Some(o)) => o != Ordering::Less,
    })
}
