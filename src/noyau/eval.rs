//! Noyau — évaluation
//!
//! Un seul parcours du programme postfixe (machine à pile), paramétré par une
//! fonction `combine` :
//!
//!   calculate            : combine = arithmétique f64
//!   abstract_syntax_tree : combine = construction d’un noeud
//!
//! Identifiant lié => sa valeur ; non lié => l’identifiant lui-même
//! (évaluation partielle possible côté arbre).

use super::erreur::{CalcError, CalcResult};
use super::expr::{AstNode, Operand};
use super::jetons::OperatorKind;
use super::rpn::{Instruction, PostfixProgram};
use super::variables::VariableTable;

/// Exécute `program` ; `combine(op, gauche, droite, pile)` produit la valeur empilée.
///
/// `droite` vaut `None` pour un opérateur unaire. La pile ne doit contenir
/// qu’une valeur à la fin.
pub fn traverse<F>(
    program: &PostfixProgram,
    variables: &VariableTable,
    mut combine: F,
) -> CalcResult<Operand>
where
    F: FnMut(OperatorKind, Operand, Option<Operand>, &[Operand]) -> CalcResult<Operand>,
{
    let mut pile: Vec<Operand> = Vec::with_capacity(program.len());

    for ins in program {
        match ins {
            Instruction::Number(n) => pile.push(Operand::Number(*n)),
            Instruction::Identifier(name) => pile.push(match variables.value(name) {
                Some(v) => Operand::Number(v),
                None => Operand::Identifier(name.clone()),
            }),
            Instruction::Operator(op) => {
                let (gauche, droite) = if op.is_unary() {
                    (depile(&mut pile, *op)?, None)
                } else {
                    let droite = depile(&mut pile, *op)?;
                    (depile(&mut pile, *op)?, Some(droite))
                };
                let v = combine(*op, gauche, droite, &pile)?;
                pile.push(v);
            }
        }
    }

    if pile.len() != 1 {
        return Err(CalcError::Syntax(format!(
            "programme invalide : {} valeurs en fin de parcours",
            pile.len()
        )));
    }
    pile.pop()
        .ok_or_else(|| CalcError::Syntax("programme vide".into()))
}

fn depile(pile: &mut Vec<Operand>, op: OperatorKind) -> CalcResult<Operand> {
    pile.pop()
        .ok_or_else(|| CalcError::Syntax(format!("opérande manquant pour {op}")))
}

/// Valeur numérique du programme.
///
/// Refuse les équations et les variables non liées (toutes nommées).
pub fn calculate(program: &PostfixProgram, variables: &VariableTable) -> CalcResult<f64> {
    if program.is_equation() {
        return Err(CalcError::UnsupportedOperation(
            "équation détectée : la résolution n’est pas prise en charge".into(),
        ));
    }

    let libres = variables.unbound();
    if !libres.is_empty() {
        return Err(CalcError::UnboundVariables(
            libres.into_iter().map(str::to_owned).collect(),
        ));
    }

    let res = traverse(program, variables, |op, gauche, droite, _pile| {
        let a = nombre(gauche)?;
        let b = droite.map(nombre).transpose()?;
        applique(op, a, b).map(Operand::Number)
    })?;

    let v = nombre(res)?;
    log::trace!("{program} = {v}");
    Ok(v)
}

/// Arbre syntaxique ; ne calcule rien, donc accepte les variables non liées.
pub fn abstract_syntax_tree(
    program: &PostfixProgram,
    variables: &VariableTable,
) -> CalcResult<Operand> {
    traverse(program, variables, |op, gauche, droite, _pile| {
        Ok(AstNode::new(op, gauche, droite).into())
    })
}

fn nombre(o: Operand) -> CalcResult<f64> {
    match o {
        Operand::Number(n) => Ok(n),
        Operand::Identifier(name) => Err(CalcError::UnboundVariables(vec![name])),
        Operand::Node(node) => Err(CalcError::Syntax(format!(
            "noeud {} inattendu en calcul numérique",
            node.operator
        ))),
    }
}

/// Arrondis flottants ordinaires (pas d’arrondi exact pour racines/puissances).
fn applique(op: OperatorKind, a: f64, b: Option<f64>) -> CalcResult<f64> {
    let droite =
        || b.ok_or_else(|| CalcError::Syntax(format!("opérande manquant pour {op}")));
    match op {
        OperatorKind::Uminus => Ok(-a),
        OperatorKind::Sqrt => Ok(a.powf(1.0 / droite()?)),
        OperatorKind::Exp => Ok(a.powf(droite()?)),
        OperatorKind::Div => Ok(a / droite()?),
        OperatorKind::Mul => Ok(a * droite()?),
        OperatorKind::Plus => Ok(a + droite()?),
        OperatorKind::Minus => Ok(a - droite()?),
        OperatorKind::Eql => Err(CalcError::UnsupportedOperation(
            "égalité en calcul numérique".into(),
        )),
    }
}
