// src/noyau/expr.rs
//
// Arbre syntaxique reconstruit depuis le programme postfixe.
// - Number     : littéral (ou valeur d’une variable liée)
// - Identifier : variable non liée, gardée telle quelle
// - Node       : opérateur + opérandes
//
// Uminus est strictement unaire : `right` vaut None.
// Pour Sqrt, `left` est le radicande et `right` le degré.

use super::jetons::OperatorKind;

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Number(f64),
    Identifier(String),
    Node(Box<AstNode>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AstNode {
    pub operator: OperatorKind,
    pub left: Operand,
    pub right: Option<Operand>,
}

impl AstNode {
    pub fn new(operator: OperatorKind, left: Operand, right: Option<Operand>) -> Self {
        Self {
            operator,
            left,
            right,
        }
    }
}

impl Operand {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&AstNode> {
        match self {
            Operand::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Hauteur de l’arbre (une feuille vaut 1).
    ///
    /// Itératif : un programme très long ne doit pas épuiser la pile d’appels.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut pile: Vec<(&Operand, usize)> = vec![(self, 1)];
        while let Some((op, d)) = pile.pop() {
            max = max.max(d);
            if let Operand::Node(node) = op {
                pile.push((&node.left, d + 1));
                if let Some(r) = &node.right {
                    pile.push((r, d + 1));
                }
            }
        }
        max
    }
}

impl From<AstNode> for Operand {
    fn from(node: AstNode) -> Self {
        Operand::Node(Box::new(node))
    }
}
