//! Retrieve filter expressions
//!
//! Mirrors the vendor's `SimpleFilterPart` / `ComplexFilterPart` schema: a
//! simple part compares one property against string or date values, a complex
//! part joins two parts with AND / OR.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_vendor_enum_conversions;

/// Comparison operator of a simple filter part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimpleOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    IsNull,
    IsNotNull,
    Between,
    In,
    Like,
}

impl_vendor_enum_conversions!(SimpleOperator {
    Equals => "equals",
    NotEquals => "notEquals",
    GreaterThan => "greaterThan",
    GreaterThanOrEqual => "greaterThanOrEqual",
    LessThan => "lessThan",
    LessThanOrEqual => "lessThanOrEqual",
    IsNull => "isNull",
    IsNotNull => "isNotNull",
    Between => "between",
    In => "IN",
    Like => "like",
});

/// Logical operator joining two filter parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

impl_vendor_enum_conversions!(LogicalOperator {
    And => "AND",
    Or => "OR",
});

/// Right-hand side of a simple filter part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    Strings(Vec<String>),
    Dates(Vec<DateTime<Utc>>),
}

/// A filter expression, simple or compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterPart {
    Simple { property: String, operator: SimpleOperator, value: FilterValue },
    Complex { left: Box<FilterPart>, logical: LogicalOperator, right: Box<FilterPart> },
}

impl FilterPart {
    /// `property equals value`
    pub fn equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Simple {
            property: property.into(),
            operator: SimpleOperator::Equals,
            value: FilterValue::Strings(vec![value.into()]),
        }
    }

    /// `property between [start, end]` over dates
    pub fn date_between(
        property: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self::Simple {
            property: property.into(),
            operator: SimpleOperator::Between,
            value: FilterValue::Dates(vec![start, end]),
        }
    }

    pub fn and(self, right: FilterPart) -> Self {
        Self::Complex { left: Box::new(self), logical: LogicalOperator::And, right: Box::new(right) }
    }

    pub fn or(self, right: FilterPart) -> Self {
        Self::Complex { left: Box::new(self), logical: LogicalOperator::Or, right: Box::new(right) }
    }

    /// Properties referenced anywhere in the expression, left to right.
    pub fn properties(&self) -> Vec<&str> {
        match self {
            Self::Simple { property, .. } => vec![property.as_str()],
            Self::Complex { left, right, .. } => {
                let mut props = left.properties();
                props.extend(right.properties());
                props
            }
        }
    }
}
