//! Parameter requirement extraction.
//!
//! Collects the distinct (normalized) parameter names referenced by the
//! comparison nodes of one expression or a whole rule list.

use std::collections::BTreeSet;

use crate::criteria::Rule;
use crate::expression::Expression;
use crate::parameter::normalize_parameter_name;

/// Parameters referenced anywhere in `expr`.
pub fn required_parameters(expr: &Expression) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect(expr, &mut names);
    names
}

/// Parameters referenced by any rule in `rules`.
pub fn required_parameters_for_rules(rules: &[Rule]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for rule in rules {
        collect(&rule.expression, &mut names);
    }
    names
}

fn collect(expr: &Expression, names: &mut BTreeSet<String>) {
    match expr {
        Expression::Comparison(cmp) => {
            names.insert(normalize_parameter_name(&cmp.parameter));
        }
        Expression::Logical(logical) => {
            for child in &logical.children {
                collect(child, names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Severity;
    use crate::expression::{ComparisonOperator, Operand};

    fn cmp(name: &str) -> Expression {
        Expression::comparison(name, ComparisonOperator::Gt, Operand::from(1))
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn collects_every_comparison_once() {
        let expr = Expression::or(vec![
            cmp("carbon"),
            Expression::and(vec![cmp("water"), cmp("CARBON")]),
            Expression::not(cmp("waste")),
        ]);
        assert_eq!(required_parameters(&expr), set(&["carbon", "waste", "water"]));
    }

    #[test]
    fn invariant_under_regrouping() {
        let flat = Expression::and(vec![cmp("a"), cmp("b"), cmp("c")]);
        let nested = Expression::and(vec![
            Expression::and(vec![cmp("a")]),
            Expression::and(vec![cmp("b"), Expression::and(vec![cmp("c")])]),
        ]);
        assert_eq!(required_parameters(&flat), required_parameters(&nested));
    }

    #[test]
    fn empty_logical_requires_nothing() {
        assert!(required_parameters(&Expression::and(vec![])).is_empty());
    }

    #[test]
    fn unions_across_rules() {
        let rule = |name: &str, expr: Expression| Rule {
            id: 0,
            name: name.to_string(),
            description: None,
            expression: expr,
            failure_message: None,
            severity: Severity::Exclude,
        };
        let rules = vec![
            rule("r1", cmp("carbon")),
            rule("r2", Expression::or(vec![cmp("water"), cmp("carbon")])),
        ];
        assert_eq!(required_parameters_for_rules(&rules), set(&["carbon", "water"]));
        assert!(required_parameters_for_rules(&[]).is_empty());
    }
}
