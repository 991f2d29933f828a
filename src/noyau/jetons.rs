// src/noyau/jetons.rs
//
// Tokenisation (avec désucrage des macros TeX dans la même boucle).
//
// Ordre des essais à la position courante (le premier qui réussit gagne) :
//   =  |  * \times \cdot  |  \frac{..}{..}  |  /  |  +  |  ^  |  -
//   sqrt  |  \sqrt[..]{..}  |  ( \left(  |  ) \right)  |  nombre  |  identifiant
//
// Le '-' sort toujours en Minus : c’est le parseur qui décide du moins unaire.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::erreur::{CalcError, CalcResult};
use super::macros::{expand_frac, expand_sqrt, saute_espaces, Expansion};

/// Largeur du contexte rapporté par une erreur lexicale.
const CONTEXTE_ERREUR: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Uminus,
    Sqrt,
    Exp,
    Div,
    Mul,
    Plus,
    Minus,
    Eql,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 8] = [
        OperatorKind::Uminus,
        OperatorKind::Sqrt,
        OperatorKind::Exp,
        OperatorKind::Div,
        OperatorKind::Mul,
        OperatorKind::Plus,
        OperatorKind::Minus,
        OperatorKind::Eql,
    ];

    /// Plus grand = lie plus fort.
    pub const fn precedence(self) -> u8 {
        match self {
            OperatorKind::Uminus => 4,
            OperatorKind::Sqrt | OperatorKind::Exp => 3,
            OperatorKind::Div | OperatorKind::Mul => 2,
            OperatorKind::Plus | OperatorKind::Minus => 1,
            OperatorKind::Eql => 0,
        }
    }

    pub const fn is_unary(self) -> bool {
        matches!(self, OperatorKind::Uminus)
    }

    pub const fn tag(self) -> &'static str {
        match self {
            OperatorKind::Uminus => "uminus",
            OperatorKind::Sqrt => "sqrt",
            OperatorKind::Exp => "exp",
            OperatorKind::Div => "div",
            OperatorKind::Mul => "mul",
            OperatorKind::Plus => "plus",
            OperatorKind::Minus => "minus",
            OperatorKind::Eql => "eql",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),
    Operator(OperatorKind),
    Open,
    Close,
}

impl Token {
    /// Nombre ou identifiant.
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Identifier(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Identifier(name) => f.write_str(name),
            Token::Operator(op) => write!(f, "{op}"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

/// Garde-fous du balayage (entrées adverses).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Profondeur max d’un groupe {..} ou [..] d’une macro.
    pub max_depth: usize,
    /// Nombre max de macros désucrées pour une même source.
    pub max_expansions: usize,
    /// Hauteur max de l’arbre du programme produit (parenthèses, chaînes
    /// d’opérateurs, moins unaires empilés).
    pub max_tree_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_expansions: 4096,
            max_tree_depth: 256,
        }
    }
}

/// Curseur sur un tampon modifiable.
///
/// Une macro reconnue est remplacée, dans le tampon, par son expansion ;
/// le curseur ne bouge pas et l’appel suivant relit le texte produit.
#[derive(Clone, Debug)]
pub struct Scanner {
    buf: String,
    pos: usize,
    expansions: usize,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self::with_options(source, ScanOptions::default())
    }

    pub fn with_options(source: &str, options: ScanOptions) -> Self {
        Self {
            buf: source.to_owned(),
            pos: 0,
            expansions: 0,
            options,
        }
    }

    /// Position courante (octets) dans le tampon, expansions comprises.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Jeton suivant, `None` en fin d’entrée.
    pub fn next_token(&mut self) -> CalcResult<Option<Token>> {
        loop {
            self.saute_espaces();
            if self.pos >= self.buf.len() {
                return Ok(None);
            }

            if self.accepte("=") {
                return Ok(self.emet(Token::Operator(OperatorKind::Eql)));
            }
            if self.accepte("*") || self.accepte("\\times") || self.accepte("\\cdot") {
                return Ok(self.emet(Token::Operator(OperatorKind::Mul)));
            }
            if let Some(exp) = expand_frac(&self.buf, self.pos, self.options.max_depth)? {
                self.injecte(exp)?;
                continue;
            }
            if self.accepte("/") {
                return Ok(self.emet(Token::Operator(OperatorKind::Div)));
            }
            if self.accepte("+") {
                return Ok(self.emet(Token::Operator(OperatorKind::Plus)));
            }
            if self.accepte("^") {
                return Ok(self.emet(Token::Operator(OperatorKind::Exp)));
            }
            if self.accepte("-") {
                return Ok(self.emet(Token::Operator(OperatorKind::Minus)));
            }
            if self.accepte("sqrt") {
                return Ok(self.emet(Token::Operator(OperatorKind::Sqrt)));
            }
            if let Some(exp) = expand_sqrt(&self.buf, self.pos, self.options.max_depth)? {
                self.injecte(exp)?;
                continue;
            }
            if self.accepte("(") || self.accepte("\\left(") {
                return Ok(self.emet(Token::Open));
            }
            if self.accepte(")") || self.accepte("\\right)") {
                return Ok(self.emet(Token::Close));
            }
            if let Some(n) = self.scan_nombre()? {
                return Ok(self.emet(Token::Number(n)));
            }
            if let Some(nom) = self.scan_identifiant() {
                return Ok(self.emet(Token::Identifier(nom)));
            }

            return Err(self.erreur_lexicale());
        }
    }

    fn emet(&self, tok: Token) -> Option<Token> {
        log::trace!("jeton {tok:?} (fin à {})", self.pos);
        Some(tok)
    }

    fn saute_espaces(&mut self) {
        self.pos = saute_espaces(&self.buf, self.pos);
    }

    fn accepte(&mut self, motif: &str) -> bool {
        if self.buf[self.pos..].starts_with(motif) {
            self.pos += motif.len();
            true
        } else {
            false
        }
    }

    /// Remplace le texte de la macro par son expansion, curseur inchangé.
    fn injecte(&mut self, exp: Expansion) -> CalcResult<()> {
        self.expansions += 1;
        if self.expansions > self.options.max_expansions {
            return Err(CalcError::NestingTooDeep {
                limit: self.options.max_expansions,
            });
        }
        log::debug!(
            "macro {:?} => {:?}",
            &self.buf[self.pos..exp.fin],
            exp.texte
        );
        self.buf.replace_range(self.pos..exp.fin, &exp.texte);
        Ok(())
    }

    /// `[0-9]+` puis, au choix, `e[+-]?[0-9]+` ou `\.[0-9]+(e[+-]?[0-9]+)?`.
    fn scan_nombre(&mut self) -> CalcResult<Option<f64>> {
        let octets = self.buf.as_bytes();
        let debut = self.pos;
        let mut i = fin_chiffres(octets, debut);
        if i == debut {
            return Ok(None);
        }

        if let Some(j) = fin_exposant(octets, i) {
            i = j;
        } else if octets.get(i) == Some(&b'.') {
            let j = fin_chiffres(octets, i + 1);
            if j > i + 1 {
                i = fin_exposant(octets, j).unwrap_or(j);
            }
        }

        let valeur = self.buf[debut..i]
            .parse::<f64>()
            .map_err(|_| self.erreur_lexicale())?;
        self.pos = i;
        Ok(Some(valeur))
    }

    /// `[a-z0-9]+(_[a-z0-9]+)?`, insensible à la casse (la casse est conservée).
    fn scan_identifiant(&mut self) -> Option<String> {
        let octets = self.buf.as_bytes();
        let debut = self.pos;
        let mut i = fin_alnum(octets, debut);
        if i == debut {
            return None;
        }

        if octets.get(i) == Some(&b'_') {
            let j = fin_alnum(octets, i + 1);
            if j > i + 1 {
                i = j;
            }
        }

        self.pos = i;
        Some(self.buf[debut..i].to_owned())
    }

    fn erreur_lexicale(&self) -> CalcError {
        CalcError::Lexical {
            position: self.pos,
            context: self.buf[self.pos..].chars().take(CONTEXTE_ERREUR).collect(),
        }
    }
}

impl Iterator for Scanner {
    type Item = CalcResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn fin_chiffres(octets: &[u8], mut i: usize) -> usize {
    while i < octets.len() && octets[i].is_ascii_digit() {
        i += 1;
    }
    i
}

fn fin_alnum(octets: &[u8], mut i: usize) -> usize {
    while i < octets.len() && octets[i].is_ascii_alphanumeric() {
        i += 1;
    }
    i
}

fn fin_exposant(octets: &[u8], i: usize) -> Option<usize> {
    if octets.get(i) != Some(&b'e') {
        return None;
    }
    let mut j = i + 1;
    if matches!(octets.get(j), Some(b'+' | b'-')) {
        j += 1;
    }
    let k = fin_chiffres(octets, j);
    (k > j).then_some(k)
}

/// Tokenise toute la source (macros désucrées).
pub fn tokenize(source: &str) -> CalcResult<Vec<Token>> {
    Scanner::new(source).collect()
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
