//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, expression analysée,
//! valeurs saisies pour les variables, sorties, erreur) et les actions
//! (analyser, lier, calculer, C/CLR/AC) sans logique d’affichage.
//!
//! Contrats :
//! - Aucun dessin ici (pas d’egui).
//! - L’expression reste la seule propriétaire des liaisons : on passe par set/unset.
//! - Défense en profondeur : entrée bornée, imbrication bornée (ScanOptions).

use calculatrice_tex::noyau::{Expression, ExpressionOptions, ScanOptions};

/// Garde-fou : taille max de l’entrée (anti-abus / anti-gel).
const ENTREE_MAX: usize = 4096;

/// Limites du balayage côté UI (plus serrées que les défauts du noyau).
const SCAN_UI: ScanOptions = ScanOptions {
    max_depth: 32,
    max_expansions: 512,
    max_tree_depth: 128,
};

#[derive(Clone, Default, Debug)]
pub struct Sorties {
    pub rpn: String,
    pub arbre: String,
    pub texte: String,
    pub empreinte: String,
    pub resultat: String,
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- expression analysée + valeurs saisies (nom, texte) ---
    pub expression: Option<Expression>,
    pub valeurs: Vec<(String, String)>,

    // --- sorties ---
    pub sorties: Sorties,
    pub erreur: String,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            entree: String::new(),
            expression: None,
            valeurs: Vec::new(),
            sorties: Sorties::default(),
            erreur: String::new(),
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale.
    pub fn reset_total(&mut self) {
        self.entree.clear();
        self.clear_resultats();
    }

    /// C : effacer seulement l’entrée (sans toucher aux résultats).
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// CLR : oublie l’expression analysée, ses valeurs et les sorties.
    pub fn clear_resultats(&mut self) {
        self.expression = None;
        self.valeurs.clear();
        self.sorties = Sorties::default();
        self.erreur.clear();
        self.focus_entree = true;
    }

    /// Utilitaire : placer une erreur (on conserve l’expression déjà analysée).
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.sorties.resultat.clear();
        self.focus_entree = true;
    }

    /* ------------------------ Pipeline ------------------------ */

    /// Analyse l’entrée : nouvelle expression, valeurs remises à vide.
    pub fn analyse(&mut self) {
        let s = self.entree.trim();
        if s.is_empty() {
            self.set_erreur("Entrée vide");
            return;
        }
        if s.len() > ENTREE_MAX {
            self.set_erreur(format!("Entrée trop longue (max {ENTREE_MAX} octets)"));
            return;
        }

        let options = ExpressionOptions {
            scan: SCAN_UI,
            ..ExpressionOptions::default()
        };
        match Expression::with_options(s, options) {
            Ok(e) => {
                log::info!("analysé : {s:?} ({} variables)", e.variables().len());
                self.valeurs = e
                    .variables()
                    .into_iter()
                    .map(|n| (n.to_string(), String::new()))
                    .collect();
                self.expression = Some(e);
                self.erreur.clear();
                self.rafraichit();
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }

    /// Reporte les valeurs saisies dans l’expression ; champ vide = non liée.
    pub fn applique_valeurs(&mut self) -> bool {
        let Some(expr) = self.expression.as_mut() else {
            return false;
        };

        let mut erreur = None;
        for (nom, texte) in &self.valeurs {
            let t = texte.trim();
            let res = if t.is_empty() {
                expr.unset(nom)
            } else {
                match t.parse::<f64>() {
                    Ok(v) => expr.set(nom, v),
                    Err(_) => {
                        erreur = Some(format!("Valeur invalide pour {nom} : {t:?}"));
                        break;
                    }
                }
            };
            if let Err(e) = res {
                erreur = Some(e.to_string());
                break;
            }
        }

        self.rafraichit();
        match erreur {
            Some(msg) => {
                self.set_erreur(msg);
                false
            }
            None => {
                self.erreur.clear();
                true
            }
        }
    }

    /// Calcul numérique (après report des valeurs).
    pub fn calcule(&mut self) {
        // entrée modifiée depuis la dernière analyse => on repart de l’entrée
        let a_jour = matches!(&self.expression, Some(e) if e.source() == self.entree.trim());
        if !a_jour {
            self.analyse();
            if !self.erreur.is_empty() {
                return;
            }
        }
        if !self.applique_valeurs() {
            return;
        }

        let res = match &self.expression {
            Some(e) => e.calculate(),
            None => return,
        };
        match res {
            Ok(v) => {
                self.sorties.resultat = v.to_string();
                self.erreur.clear();
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
        self.focus_entree = true;
    }

    /// Recalcule RPN / arbre / texte / empreinte depuis l’expression courante.
    fn rafraichit(&mut self) {
        let Some(e) = &self.expression else {
            self.sorties = Sorties::default();
            return;
        };

        self.sorties.rpn = e.postfix_notation().to_string();
        self.sorties.arbre = match e.abstract_syntax_tree() {
            Ok(a) => a.to_string(),
            Err(err) => err.to_string(),
        };
        self.sorties.texte = e.to_string();
        self.sorties.empreinte = e.fingerprint().to_string();
        self.sorties.resultat.clear();
    }
}
