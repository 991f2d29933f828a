// src/noyau/rpn.rs
//
// Shunting-yard -> programme postfixe (RPN)
//
// Règles:
// - Open : marqueur empilé
// - Close : dépile les opérateurs jusqu’au marqueur (jeté). Sans marqueur, on
//   continue quand même : les \left( \right) visuellement déséquilibrés du TeX
//   ne servent qu’à l’affichage.
// - Moins unaire : un '-' devient Uminus sauf s’il suit un opérande ou un Close.
// - Opérateur binaire : dépile tant que précédence(sommet) >= précédence(courant)
//   (associativité à gauche pour tous, '^' compris), puis empile.
// - Uminus (préfixe) : empilé sans rien dépiler, donc `--1` = [1, uminus, uminus].
// - Arbre reconstruit borné par ScanOptions::max_tree_depth.
// - Fin : dépile tout ; un marqueur restant = parenthèse non fermée.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::erreur::{CalcError, CalcResult};
use super::jetons::{OperatorKind, ScanOptions, Scanner, Token};

/// Une instruction de la machine à pile.
///
/// Sérialisée sans étiquette : nombre, étiquette d’opérateur ou nom.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Number(f64),
    Operator(OperatorKind),
    Identifier(String),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Number(n) => write!(f, "{n}"),
            Instruction::Operator(op) => write!(f, "{op}"),
            Instruction::Identifier(name) => f.write_str(name),
        }
    }
}

/// Programme postfixe : sans parenthèses, exécutable de gauche à droite.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostfixProgram(Vec<Instruction>);

impl PostfixProgram {
    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.0.iter()
    }

    pub fn is_equation(&self) -> bool {
        self.0
            .iter()
            .any(|i| matches!(i, Instruction::Operator(OperatorKind::Eql)))
    }

    /// Identifiants distincts, dans l’ordre de première apparition.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut vus: Vec<&str> = Vec::new();
        for ins in &self.0 {
            if let Instruction::Identifier(name) = ins {
                if !vus.contains(&name.as_str()) {
                    vus.push(name);
                }
            }
        }
        vus
    }
}

impl From<Vec<Instruction>> for PostfixProgram {
    fn from(v: Vec<Instruction>) -> Self {
        Self(v)
    }
}

impl<'a> IntoIterator for &'a PostfixProgram {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PostfixProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, ins) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ins}")?;
        }
        f.write_str("]")
    }
}

/// Pile d’opérateurs : un opérateur ou un marqueur de parenthèse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pile {
    Open,
    Op(OperatorKind),
}

pub fn parse(source: &str) -> CalcResult<PostfixProgram> {
    parse_with(source, &ScanOptions::default())
}

pub fn parse_with(source: &str, options: &ScanOptions) -> CalcResult<PostfixProgram> {
    let mut scanner = Scanner::with_options(source, *options);
    let mut out: Vec<Instruction> = Vec::new();
    let mut ops: Vec<Pile> = Vec::new();

    // “valeur” = opérande ou parenthèse fermante : un '-' après est binaire.
    let mut prev_was_value = false;

    while let Some(tok) = scanner.next_token()? {
        match tok {
            Token::Number(n) => {
                out.push(Instruction::Number(n));
                prev_was_value = true;
            }
            Token::Identifier(name) => {
                out.push(Instruction::Identifier(name));
                prev_was_value = true;
            }
            Token::Open => {
                ops.push(Pile::Open);
                prev_was_value = false;
            }
            Token::Close => {
                while let Some(Pile::Op(op)) = ops.last().copied() {
                    out.push(Instruction::Operator(op));
                    ops.pop();
                }
                if ops.last() == Some(&Pile::Open) {
                    ops.pop();
                }
                prev_was_value = true;
            }
            Token::Operator(op) => {
                let op = if op == OperatorKind::Minus && !prev_was_value {
                    OperatorKind::Uminus
                } else {
                    op
                };

                // préfixe : associatif à droite, n’a encore rien à dépiler
                while let Some(Pile::Op(top)) = ops.last().copied() {
                    if op.is_unary() || top.precedence() < op.precedence() {
                        break;
                    }
                    out.push(Instruction::Operator(top));
                    ops.pop();
                }

                ops.push(Pile::Op(op));
                prev_was_value = false;
            }
        }
    }

    // vide la pile ops
    while let Some(Pile::Op(op)) = ops.last().copied() {
        out.push(Instruction::Operator(op));
        ops.pop();
    }
    if !ops.is_empty() {
        return Err(CalcError::Syntax(format!(
            "parenthèses non fermées : {}",
            ops.len()
        )));
    }

    let program = PostfixProgram(out);
    verifie(&program, options.max_tree_depth)?;
    log::debug!("{source:?} => {program}");
    Ok(program)
}

/// Une seule égalité, chaque opérateur trouve ses opérandes, et l’arbre
/// reconstruit ne dépasse pas `max_tree_depth` niveaux.
fn verifie(program: &PostfixProgram, max_tree_depth: usize) -> CalcResult<()> {
    let egalites = program
        .iter()
        .filter(|i| matches!(i, Instruction::Operator(OperatorKind::Eql)))
        .count();
    if egalites > 1 {
        return Err(CalcError::Syntax(format!(
            "une équation n’a qu’un signe '=' (trouvés : {egalites})"
        )));
    }

    // hauteur de chaque sous-arbre en attente sur la pile
    let mut hauteurs: Vec<usize> = Vec::new();
    for ins in program {
        match ins {
            Instruction::Number(_) | Instruction::Identifier(_) => hauteurs.push(1),
            Instruction::Operator(op) => {
                let arite = if op.is_unary() { 1 } else { 2 };
                if hauteurs.len() < arite {
                    return Err(CalcError::Syntax(format!("opérande manquant pour {op}")));
                }
                let reste = hauteurs.len() - arite;
                let h = hauteurs.drain(reste..).max().unwrap_or(0) + 1;
                if h > max_tree_depth {
                    return Err(CalcError::NestingTooDeep {
                        limit: max_tree_depth,
                    });
                }
                hauteurs.push(h);
            }
        }
    }

    if !program.is_empty() && hauteurs.len() != 1 {
        return Err(CalcError::Syntax(format!(
            "opérateur manquant : {} valeurs isolées",
            hauteurs.len()
        )));
    }
    Ok(())
}
