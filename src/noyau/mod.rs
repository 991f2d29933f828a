//! Noyau TeX -> postfixe -> valeur
//!
//! Organisation interne :
//! - jetons.rs     : tokenisation (Scanner) + opérateurs
//! - macros.rs     : désucrage \frac / \sqrt, groupes équilibrés
//! - rpn.rs        : shunting-yard -> PostfixProgram
//! - expr.rs       : arbre syntaxique (Operand / AstNode)
//! - eval.rs       : parcours unique : calcul numérique ou arbre
//! - format.rs     : affichage des arbres
//! - variables.rs  : table des variables
//! - expression.rs : façade (liaisons, empreinte, substitution textuelle)
//! - erreur.rs     : CalcError

pub mod erreur;
pub mod eval;
pub mod expr;
pub mod expression;
pub mod format;
pub mod jetons;
mod macros;
pub mod rpn;
pub mod variables;

#[cfg(test)]
mod tests_fuzz_safe;

#[cfg(test)]
mod tests_proprietes;

// API publique minimale
pub use erreur::{CalcError, CalcResult};
pub use expr::{AstNode, Operand};
pub use expression::{Expression, ExpressionOptions};
pub use jetons::{OperatorKind, ScanOptions, Token};
pub use rpn::{parse, Instruction, PostfixProgram};
