// src/noyau/expression.rs
//
// Façade : source + programme postfixe + table des variables + empreinte.
//
// Contrats :
// - source et programme ne changent plus après construction
// - la table n’est accessible que via get/set/unset
// - chaque mutation recalcule l’empreinte (SHA-256 du programme + liaisons)

use std::fmt;

use sha2::{Digest, Sha256};

use super::erreur::CalcResult;
use super::eval;
use super::expr::Operand;
use super::format::format_variables;
use super::jetons::ScanOptions;
use super::rpn::{parse_with, Instruction, PostfixProgram};
use super::variables::VariableTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpressionOptions {
    /// `false` : on garde le texte sans l’analyser (TeX d’affichage seulement).
    pub parse: bool,
    pub scan: ScanOptions,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        Self {
            parse: true,
            scan: ScanOptions::default(),
        }
    }
}

#[derive(Clone)]
pub struct Expression {
    source: String,
    program: PostfixProgram,
    variables: VariableTable,
    parsed: bool,
    fingerprint: String,
}

impl Expression {
    pub fn new(source: &str) -> CalcResult<Self> {
        Self::with_options(source, ExpressionOptions::default())
    }

    pub fn with_options(source: &str, options: ExpressionOptions) -> CalcResult<Self> {
        if !options.parse {
            return Ok(Self::unparsed(source));
        }

        let program = parse_with(source, &options.scan)?;
        let variables = VariableTable::from_program(&program);
        Ok(Self::assemble(source, program, variables, true))
    }

    /// Expression non analysée : programme vide, aucune variable.
    pub fn unparsed(source: &str) -> Self {
        Self::assemble(
            source,
            PostfixProgram::default(),
            VariableTable::default(),
            false,
        )
    }

    fn assemble(
        source: &str,
        program: PostfixProgram,
        variables: VariableTable,
        parsed: bool,
    ) -> Self {
        let fingerprint = empreinte(&program, &variables);
        Self {
            source: source.to_owned(),
            program,
            variables,
            parsed,
            fingerprint,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn postfix_notation(&self) -> &PostfixProgram {
        &self.program
    }

    pub fn rpn(&self) -> &PostfixProgram {
        self.postfix_notation()
    }

    pub fn is_equation(&self) -> bool {
        self.program.is_equation()
    }

    pub fn variables(&self) -> Vec<&str> {
        self.variables.names()
    }

    pub fn unbound_variables(&self) -> Vec<&str> {
        self.variables.unbound()
    }

    pub fn get(&self, name: &str) -> CalcResult<Option<f64>> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: &str, value: f64) -> CalcResult<()> {
        self.variables.set(name, Some(value))?;
        log::debug!("{name} := {value}");
        self.refresh_fingerprint();
        Ok(())
    }

    /// Retire la valeur liée à `name`.
    pub fn unset(&mut self, name: &str) -> CalcResult<()> {
        self.variables.set(name, None)?;
        log::debug!("{name} délié");
        self.refresh_fingerprint();
        Ok(())
    }

    pub fn calculate(&self) -> CalcResult<f64> {
        eval::calculate(&self.program, &self.variables)
    }

    /// Reconstruit l’arbre à chaque appel (pas de cache).
    pub fn abstract_syntax_tree(&self) -> CalcResult<Operand> {
        eval::abstract_syntax_tree(&self.program, &self.variables)
    }

    pub fn ast(&self) -> CalcResult<Operand> {
        self.abstract_syntax_tree()
    }

    /// Empreinte hexadécimale, clé de cache pour un rendu externe.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn refresh_fingerprint(&mut self) {
        self.fingerprint = empreinte(&self.program, &self.variables);
    }
}

/// SHA-256 du programme puis des liaisons.
fn empreinte(program: &PostfixProgram, variables: &VariableTable) -> String {
    let mut h = Sha256::new();

    for ins in program {
        match ins {
            Instruction::Number(n) => {
                h.update([b'n']);
                h.update(n.to_bits().to_le_bytes());
            }
            Instruction::Operator(op) => {
                h.update([b'o']);
                h.update(op.tag().as_bytes());
                h.update([0]);
            }
            Instruction::Identifier(name) => {
                h.update([b'i']);
                h.update(name.as_bytes());
                h.update([0]);
            }
        }
    }

    h.update([b'|']);
    for (name, value) in variables.iter() {
        h.update(name.as_bytes());
        h.update([0]);
        match value {
            Some(v) => {
                h.update([1]);
                h.update(v.to_bits().to_le_bytes());
            }
            None => h.update([0]),
        }
    }

    h.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

fn est_car_identifiant(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Remplace chaque variable liée par sa valeur, sur des mots entiers.
///
/// Un mot = suite maximale de `[A-Za-z0-9_]` : `x` ne touche pas `x_2`.
/// Un mot précédé de `\` est une commande TeX (\frac, \cdot…), jamais remplacée.
fn substitue(source: &str, variables: &VariableTable) -> String {
    let liees: Vec<(&str, f64)> = variables.bound().collect();
    if liees.is_empty() {
        return source.to_owned();
    }

    let mut out = String::with_capacity(source.len());
    let mut precedent: Option<char> = None;
    let mut chars = source.char_indices().peekable();

    while let Some((debut, c)) = chars.next() {
        if !est_car_identifiant(c) {
            out.push(c);
            precedent = Some(c);
            continue;
        }

        let mut fin = debut + c.len_utf8();
        while let Some(&(i, d)) = chars.peek() {
            if !est_car_identifiant(d) {
                break;
            }
            fin = i + d.len_utf8();
            chars.next();
        }

        let mot = &source[debut..fin];
        let valeur = liees.iter().find(|(n, _)| *n == mot).map(|(_, v)| *v);
        match valeur {
            Some(v) if precedent != Some('\\') => out.push_str(&v.to_string()),
            _ => out.push_str(mot),
        }
        precedent = mot.chars().last();
    }

    out
}

/// `to_s` : la source avec les valeurs liées substituées.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&substitue(&self.source, &self.variables))
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("fingerprint", &self.fingerprint)
            .field("postfix_notation", &format_args!("{}", self.program))
            .field("variables", &format_args!("{{{}}}", format_variables(&self.variables)))
            .finish()
    }
}
