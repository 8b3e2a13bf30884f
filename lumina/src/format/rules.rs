//! Conditional-format rules.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::StyleProps;
use crate::model::CellValue;
use crate::model::format_number;
use crate::model::parse_number;

/// Comparison operator of a rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operator {
    #[default]
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    Contains,
    In,
}

impl Operator {
    /// Parses an operator name, case-insensitively. `ne` is an alias of
    /// `neq`; anything unknown is treated as `eq`.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "eq" => Operator::Eq,
            "neq" | "ne" => Operator::Neq,
            "gt" => Operator::Gt,
            "gte" => Operator::Gte,
            "lt" => Operator::Lt,
            "lte" => Operator::Lte,
            "between" => Operator::Between,
            "contains" => Operator::Contains,
            "in" => Operator::In,
            other => {
                log::warn!("unknown conditional format operator '{}', using eq", other);
                Operator::Eq
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Between => "between",
            Operator::Contains => "contains",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element a matching rule styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleTarget {
    #[default]
    Cell,
    Row,
}

/// A conditional-format rule.
///
/// Decodes from the wire shape
/// `{column, op|operator|rule, value|range|values, style, target}`.
///
/// # Example
///
/// ```
/// use lumina::format::{ConditionalFormatRule, Operator, RuleTarget};
///
/// let rule: ConditionalFormatRule = serde_json::from_str(
///     r#"{"column": "val", "operator": "between", "range": [1, 5], "target": "row"}"#,
/// )
/// .unwrap();
///
/// assert_eq!(rule.operator, Operator::Between);
/// assert_eq!(rule.target, RuleTarget::Row);
/// assert!(rule.evaluate(&3.into()));
/// assert!(!rule.evaluate(&"abc".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleWire", into = "RuleWire")]
pub struct ConditionalFormatRule {
    pub column: String,
    pub operator: Operator,
    /// `value` for scalar operators, `range` for `between`, `values` for `in`.
    pub operand: Value,
    pub style: StyleProps,
    pub target: RuleTarget,
}

impl ConditionalFormatRule {
    pub fn new(column: impl Into<String>, operator: Operator, operand: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            operand: operand.into(),
            style: StyleProps::default(),
            target: RuleTarget::Cell,
        }
    }

    pub fn with_style(mut self, style: StyleProps) -> Self {
        self.style = style;
        self
    }

    pub fn with_target(mut self, target: RuleTarget) -> Self {
        self.target = target;
        self
    }

    /// Tests a cell against the rule.
    ///
    /// Numeric operators never match a non-numeric cell, and `between`/`in`
    /// never match a malformed operand.
    pub fn evaluate(&self, cell: &CellValue) -> bool {
        let text = cell.display();
        let number = cell.as_number();
        match self.operator {
            Operator::Gt => compare(number, &self.operand, |a, b| a > b),
            Operator::Gte => compare(number, &self.operand, |a, b| a >= b),
            Operator::Lt => compare(number, &self.operand, |a, b| a < b),
            Operator::Lte => compare(number, &self.operand, |a, b| a <= b),
            Operator::Eq => equals(number, &text, &self.operand),
            Operator::Neq => !equals(number, &text, &self.operand),
            Operator::Between => match (&self.operand, number) {
                (Value::Array(bounds), Some(n)) if bounds.len() == 2 => {
                    match (operand_number(&bounds[0]), operand_number(&bounds[1])) {
                        (Some(low), Some(high)) => n >= low && n <= high,
                        _ => false,
                    }
                }
                _ => false,
            },
            Operator::Contains => text
                .to_lowercase()
                .contains(&operand_string(&self.operand).to_lowercase()),
            Operator::In => match &self.operand {
                Value::Array(list) => list.iter().any(|v| operand_string(v) == text),
                _ => false,
            },
        }
    }
}

fn compare(number: Option<f64>, operand: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (number, operand_number(operand)) {
        (Some(n), Some(o)) => op(n, o),
        _ => false,
    }
}

fn equals(number: Option<f64>, text: &str, operand: &Value) -> bool {
    match (number, operand_number(operand)) {
        (Some(n), Some(o)) => n == o,
        _ => text == operand_string(operand),
    }
}

fn operand_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn operand_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RuleWire {
    #[serde(default)]
    column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    op: Option<String>,
    #[serde(default, skip_serializing)]
    operator: Option<String>,
    #[serde(default, skip_serializing)]
    rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Value>,
    #[serde(default)]
    style: StyleProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

impl From<RuleWire> for ConditionalFormatRule {
    fn from(wire: RuleWire) -> Self {
        let operator = wire
            .op
            .or(wire.operator)
            .or(wire.rule)
            .map(|name| Operator::parse(&name))
            .unwrap_or_default();
        let operand = match operator {
            Operator::Between => wire.range.or(wire.values).or(wire.value),
            Operator::In => wire.values.or(wire.value),
            _ => wire.value,
        }
        .unwrap_or(Value::Null);
        let target = match wire.target.as_deref() {
            Some("row") => RuleTarget::Row,
            _ => RuleTarget::Cell,
        };
        Self {
            column: wire.column,
            operator,
            operand,
            style: wire.style,
            target,
        }
    }
}

impl From<ConditionalFormatRule> for RuleWire {
    fn from(rule: ConditionalFormatRule) -> Self {
        let operand = (!rule.operand.is_null()).then_some(rule.operand);
        let (value, range, values) = match rule.operator {
            Operator::Between => (None, operand, None),
            Operator::In => (None, None, operand),
            _ => (operand, None, None),
        };
        RuleWire {
            column: rule.column,
            op: Some(rule.operator.as_str().to_string()),
            operator: None,
            rule: None,
            value,
            range,
            values,
            style: rule.style,
            target: Some(
                match rule.target {
                    RuleTarget::Cell => "cell",
                    RuleTarget::Row => "row",
                }
                .to_string(),
            ),
        }
    }
}

/// Replacement body for an existing rule. Column and target stay fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEdit {
    pub operator: Operator,
    pub operand: Value,
    pub style: StyleProps,
}

/// Active rules plus the pristine copy they can be reset to.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<ConditionalFormatRule>,
    pristine: Vec<ConditionalFormatRule>,
    editable: bool,
    dirty: bool,
}

impl RuleSet {
    pub fn new(rules: Vec<ConditionalFormatRule>, editable: bool) -> Self {
        Self {
            pristine: clone_rules(&rules),
            rules,
            editable,
            dirty: false,
        }
    }

    /// Decodes rules from raw JSON, skipping entries that are not rule objects.
    pub fn from_values(values: &[Value], editable: bool) -> Self {
        let rules = values
            .iter()
            .filter(|v| v.is_object())
            .filter_map(|v| match serde_json::from_value(v.clone()) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    log::warn!("skipping malformed conditional format rule: {}", e);
                    None
                }
            })
            .collect();
        Self::new(rules, editable)
    }

    pub fn rules(&self) -> &[ConditionalFormatRule] {
        &self.rules
    }

    /// Rules on a column, with their indices.
    pub fn for_column<'a>(
        &'a self,
        column: &'a str,
    ) -> impl Iterator<Item = (usize, &'a ConditionalFormatRule)> + 'a {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.column == column)
    }

    pub fn has_rules_for(&self, column: &str) -> bool {
        self.for_column(column).next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` once a rule has been edited since load or reset.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces a rule's body. Returns `false` if editing is disabled or the
    /// index is out of range.
    pub fn edit(&mut self, index: usize, edit: RuleEdit) -> bool {
        if !self.editable {
            return false;
        }
        let Some(rule) = self.rules.get_mut(index) else {
            return false;
        };
        rule.operator = edit.operator;
        rule.operand = edit.operand;
        rule.style = edit.style;
        self.dirty = true;
        log::debug!("conditional format rule {} on '{}' edited", index, rule.column);
        true
    }

    /// Restores the rules as loaded. Returns `true` if anything was edited.
    pub fn reset(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.rules = clone_rules(&self.pristine);
        self.dirty = false;
        was_dirty
    }
}

/// Deep-copies rules through their wire form; a failure yields no rules.
fn clone_rules(rules: &[ConditionalFormatRule]) -> Vec<ConditionalFormatRule> {
    serde_json::to_value(rules)
        .and_then(serde_json::from_value)
        .unwrap_or_else(|e| {
            log::warn!("could not copy conditional format rules: {}", e);
            Vec::new()
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rule(json: Value) -> ConditionalFormatRule {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_operator_keys_and_aliases() {
        assert_eq!(rule(json!({"column": "a", "op": "GT"})).operator, Operator::Gt);
        assert_eq!(rule(json!({"column": "a", "operator": "ne"})).operator, Operator::Neq);
        assert_eq!(rule(json!({"column": "a", "rule": "in"})).operator, Operator::In);
        assert_eq!(rule(json!({"column": "a", "op": "bogus"})).operator, Operator::Eq);
        assert_eq!(rule(json!({"column": "a"})).operator, Operator::Eq);
    }

    #[test]
    fn test_numeric_operators_require_numbers() {
        let gt = rule(json!({"column": "a", "op": "gt", "value": 1}));
        assert!(gt.evaluate(&2.into()));
        assert!(gt.evaluate(&"3".into()));
        assert!(!gt.evaluate(&1.into()));
        assert!(!gt.evaluate(&"abc".into()));
        assert!(!gt.evaluate(&CellValue::Null));
    }

    #[test]
    fn test_eq_falls_back_to_strings() {
        let eq = rule(json!({"column": "a", "op": "eq", "value": "2.0"}));
        assert!(eq.evaluate(&2.into()));
        let eq = rule(json!({"column": "a", "op": "eq", "value": "Paris"}));
        assert!(eq.evaluate(&"Paris".into()));
        assert!(!eq.evaluate(&"paris".into()));
        let neq = rule(json!({"column": "a", "op": "neq", "value": 2}));
        assert!(neq.evaluate(&3.into()));
        assert!(!neq.evaluate(&"2".into()));
    }

    #[test]
    fn test_between_and_in_with_bad_operands_never_match() {
        let between = rule(json!({"column": "a", "op": "between", "value": 3}));
        assert!(!between.evaluate(&3.into()));
        let between = rule(json!({"column": "a", "op": "between", "range": [1, "x"]}));
        assert!(!between.evaluate(&1.into()));
        let inside = rule(json!({"column": "a", "op": "in", "value": "a"}));
        assert!(!inside.evaluate(&"a".into()));
    }

    #[test]
    fn test_between_inclusive_and_in_list() {
        let between = rule(json!({"column": "a", "op": "between", "values": [1, 3]}));
        assert!(between.evaluate(&1.into()));
        assert!(between.evaluate(&3.into()));
        assert!(!between.evaluate(&3.5.into()));
        let inside = rule(json!({"column": "a", "op": "in", "values": ["x", 2]}));
        assert!(inside.evaluate(&"x".into()));
        assert!(inside.evaluate(&2.into()));
        assert!(!inside.evaluate(&"y".into()));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let contains = rule(json!({"column": "a", "op": "contains", "value": "AR"}));
        assert!(contains.evaluate(&"Paris".into()));
        assert!(!contains.evaluate(&"Rome".into()));
    }

    #[test]
    fn test_wire_round_trip_keeps_operand_key() {
        let r = rule(json!({"column": "a", "operator": "between", "value": [1, 2], "target": "row"}));
        let wire = serde_json::to_value(&r).unwrap();
        assert_eq!(wire["op"], "between");
        assert_eq!(wire["range"], json!([1, 2]));
        assert_eq!(wire["target"], "row");
    }

    #[test]
    fn test_rule_set_edit_and_reset() {
        let values = vec![json!({"column": "a", "op": "gt", "value": 1}), json!("junk")];
        let mut set = RuleSet::from_values(&values, true);
        assert_eq!(set.rules().len(), 1);

        let edit = RuleEdit { operator: Operator::Lt, operand: json!(0), style: StyleProps::default() };
        assert!(set.edit(0, edit.clone()));
        assert!(set.is_dirty());
        assert_eq!(set.rules()[0].operator, Operator::Lt);
        assert!(!set.edit(5, edit));

        assert!(set.reset());
        assert!(!set.is_dirty());
        assert_eq!(set.rules()[0].operator, Operator::Gt);
    }

    #[test]
    fn test_rule_set_edit_disabled() {
        let mut set = RuleSet::new(vec![ConditionalFormatRule::new("a", Operator::Eq, 1)], false);
        let edit = RuleEdit { operator: Operator::Lt, operand: json!(0), style: StyleProps::default() };
        assert!(!set.edit(0, edit));
        assert!(!set.is_dirty());
    }
}
