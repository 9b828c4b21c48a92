//! Declarative query specifications.
//!
//! A `Specification<T>` is a list of field criteria over an entity's JSON form,
//! plus an optional ordering. It is evaluated in memory by
//! [`Specification::is_satisfied_by`] and translated to SQL by the Postgres
//! repositories, so both backends filter identically.
//!
//! Soft-deleted entities never satisfy a specification unless
//! [`Specification::including_deleted`] is used.

use core::cmp::Ordering;
use core::marker::PhantomData;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;

use crate::entity::Entity;

/// Single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Eq { field: &'static str, value: Value },
    Gte { field: &'static str, value: Value },
    Lte { field: &'static str, value: Value },
    IsNull { field: &'static str },
}

impl Criterion {
    pub fn field(&self) -> &'static str {
        match self {
            Criterion::Eq { field, .. }
            | Criterion::Gte { field, .. }
            | Criterion::Lte { field, .. }
            | Criterion::IsNull { field } => field,
        }
    }

    fn matches(&self, doc: &Value) -> bool {
        let actual = doc.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Criterion::Eq { value, .. } => actual == value,
            Criterion::Gte { value, .. } => {
                matches!(compare_values(actual, value), Some(Ordering::Greater | Ordering::Equal))
            }
            Criterion::Lte { value, .. } => {
                matches!(compare_values(actual, value), Some(Ordering::Less | Ordering::Equal))
            }
            Criterion::IsNull { .. } => actual.is_null(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderClause {
    pub field: &'static str,
    pub descending: bool,
    /// Values are RFC 3339 timestamps; compare them as instants.
    pub instant: bool,
}

/// Composable filter over entities of type `T`.
#[derive(Debug)]
pub struct Specification<T> {
    criteria: Vec<Criterion>,
    include_deleted: bool,
    order: Option<OrderClause>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            include_deleted: self.include_deleted,
            order: self.order,
            _entity: PhantomData,
        }
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl<T> Specification<T> {
    /// Matches every non-deleted entity.
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
            include_deleted: false,
            order: None,
            _entity: PhantomData,
        }
    }

    pub fn eq(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.criteria.push(Criterion::Eq { field, value: to_json(value) });
        self
    }

    /// `eq` only when a value is present; handy for optional list filters.
    pub fn eq_opt<V: Serialize>(self, field: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn gte(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.criteria.push(Criterion::Gte { field, value: to_json(value) });
        self
    }

    pub fn lte(mut self, field: &'static str, value: impl Serialize) -> Self {
        self.criteria.push(Criterion::Lte { field, value: to_json(value) });
        self
    }

    pub fn is_null(mut self, field: &'static str) -> Self {
        self.criteria.push(Criterion::IsNull { field });
        self
    }

    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn order_by(mut self, field: &'static str, descending: bool) -> Self {
        self.order = Some(OrderClause { field, descending, instant: false });
        self
    }

    /// Order by a `DateTime` field.
    pub fn order_by_instant(mut self, field: &'static str, descending: bool) -> Self {
        self.order = Some(OrderClause { field, descending, instant: true });
        self
    }

    /// Conjunction of two specifications. The right-hand ordering wins if set.
    pub fn and(mut self, other: Specification<T>) -> Self {
        self.criteria.extend(other.criteria);
        self.include_deleted = self.include_deleted && other.include_deleted;
        if other.order.is_some() {
            self.order = other.order;
        }
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn includes_deleted(&self) -> bool {
        self.include_deleted
    }

    pub fn order(&self) -> Option<OrderClause> {
        self.order
    }
}

impl<T: Entity> Specification<T> {
    pub fn is_satisfied_by(&self, entity: &T) -> bool {
        if !self.include_deleted && entity.is_deleted() {
            return false;
        }
        if self.criteria.is_empty() {
            return true;
        }
        let doc = to_json(entity);
        self.criteria.iter().all(|c| c.matches(&doc))
    }

    /// Sort in place according to the specification's ordering (stable).
    pub fn sort(&self, items: &mut [T]) {
        let Some(order) = self.order else {
            return;
        };
        let mut keyed: Vec<(Value, usize)> = items
            .iter()
            .enumerate()
            .map(|(i, e)| (to_json(e).get(order.field).cloned().unwrap_or(Value::Null), i))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ord = compare_values(a, b).unwrap_or(Ordering::Equal);
            if order.descending { ord.reverse() } else { ord }
        });
        let snapshot: Vec<T> = items.to_vec();
        for (slot, (_, src)) in items.iter_mut().zip(keyed) {
            *slot = snapshot[src].clone();
        }
    }
}

/// Ordering over JSON scalars. Nulls sort first; RFC 3339 strings compare as
/// instants so sub-second precision differences do not break ordering.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Less),
        (_, Value::Null) => Some(Ordering::Greater),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(x),
                DateTime::<FixedOffset>::parse_from_rfc3339(y),
            ) {
                (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
                _ => Some(x.cmp(y)),
            }
        }
        _ => None,
    }
}
