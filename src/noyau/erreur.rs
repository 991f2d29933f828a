//! Erreurs du noyau.
//!
//! Une seule énumération fermée : l’appelant filtre sur la variante,
//! jamais sur un message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    /// Séquence de caractères non reconnue pendant le balayage.
    #[error("caractère invalide à la position {position} près de '{context}'")]
    Lexical { position: usize, context: String },

    /// Parenthèses déséquilibrées, plusieurs `=`, programme mal formé.
    #[error("erreur de syntaxe : {0}")]
    Syntax(String),

    /// Variable absente du programme.
    #[error("variable inconnue : {0}")]
    Lookup(String),

    /// Calcul numérique demandé avec des variables sans valeur.
    #[error("calcul impossible, variables non liées : {}", .0.join(", "))]
    UnboundVariables(Vec<String>),

    /// Opération non prise en charge (résolution d’équation).
    #[error("opération non prise en charge : {0}")]
    UnsupportedOperation(String),

    /// Garde-fou contre les entrées imbriquées de façon pathologique.
    #[error("imbrication trop profonde (limite : {limit})")]
    NestingTooDeep { limit: usize },

    /// Outils externes du rendu introuvables.
    #[error("commandes requises absentes du PATH : {}", .commands.join(", "))]
    CommandUnavailable { commands: Vec<String> },

    /// Un outil du rendu a échoué.
    #[error("échec du rendu : {0}")]
    Render(String),

    #[error("erreur d’E/S : {0}")]
    Io(#[from] std::io::Error),
}

pub type CalcResult<T> = Result<T, CalcError>;
