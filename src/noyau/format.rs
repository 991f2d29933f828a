// src/noyau/format.rs
//
// Affichage des arbres : [mul, [plus, 2, 3], 4]
// Noeud unaire : [uminus, 2]

use std::fmt;

use super::expr::{AstNode, Operand};
use super::variables::VariableTable;

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{n}"),
            Operand::Identifier(name) => f.write_str(name),
            Operand::Node(node) => write!(f, "{node}"),
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}", self.operator, self.left)?;
        if let Some(right) = &self.right {
            write!(f, ", {right}")?;
        }
        f.write_str("]")
    }
}

/// `x = 2, y = ?` (ordre de la table).
pub fn format_variables(variables: &VariableTable) -> String {
    variables
        .iter()
        .map(|(name, value)| match value {
            Some(v) => format!("{name} = {v}"),
            None => format!("{name} = ?"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
