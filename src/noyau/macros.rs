// src/noyau/macros.rs
//
// Désucrage des macros TeX, appelé depuis la boucle du Scanner.
//
//   \frac{A}{B}    => "(A) / (B) "
//   \sqrt[d]{A}    => "(A) sqrt (d) "     (d = 2 par défaut)
//
// Le texte produit est réinjecté devant le curseur : le même Scanner le relit,
// donc les macros imbriquées se résolvent sans récursion.
//
// Groupes équilibrés : compteur de profondeur, borné par `max_depth`.
// Seul le délimiteur du groupe compte ({} pour les arguments, [] pour le degré).

use super::erreur::{CalcError, CalcResult};

pub(crate) const FRAC: &str = "\\frac";
pub(crate) const SQRT: &str = "\\sqrt";

/// Degré implicite de `\sqrt{..}`.
const DEGRE_DEFAUT: &str = "2";

/// Résultat d’un désucrage : le texte `[pos, fin)` est remplacé par `texte`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Expansion {
    pub fin: usize,
    pub texte: String,
}

/// Groupe `ouvrant ... fermant` commençant exactement à `start`.
///
/// Renvoie l’indice juste après le délimiteur fermant, ou `None` si le groupe
/// est absent ou jamais refermé.
pub(crate) fn groupe_equilibre(
    src: &str,
    start: usize,
    ouvrant: u8,
    fermant: u8,
    max_depth: usize,
) -> CalcResult<Option<usize>> {
    let octets = src.as_bytes();
    if octets.get(start) != Some(&ouvrant) {
        return Ok(None);
    }

    let mut profondeur = 0usize;
    for (i, &b) in octets.iter().enumerate().skip(start) {
        if b == ouvrant {
            profondeur += 1;
            if profondeur > max_depth {
                return Err(CalcError::NestingTooDeep { limit: max_depth });
            }
        } else if b == fermant {
            profondeur -= 1;
            if profondeur == 0 {
                return Ok(Some(i + 1));
            }
        }
    }

    Ok(None)
}

/// Premier indice >= `i` qui n’est pas un espace (Unicode, comme le Scanner).
pub(crate) fn saute_espaces(src: &str, i: usize) -> usize {
    src[i..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(src.len(), |(j, _)| i + j)
}

/// Contenu d’un groupe `[debut, fin)` sans ses délimiteurs.
fn interieur(src: &str, debut: usize, fin: usize) -> &str {
    &src[debut + 1..fin - 1]
}

/// `\frac{A}{B}` à la position `pos`.
pub(crate) fn expand_frac(src: &str, pos: usize, max_depth: usize) -> CalcResult<Option<Expansion>> {
    if !src[pos..].starts_with(FRAC) {
        return Ok(None);
    }

    let debut_num = saute_espaces(src, pos + FRAC.len());
    let Some(fin_num) = groupe_equilibre(src, debut_num, b'{', b'}', max_depth)? else {
        return Ok(None);
    };

    let debut_den = saute_espaces(src, fin_num);
    let Some(fin_den) = groupe_equilibre(src, debut_den, b'{', b'}', max_depth)? else {
        return Ok(None);
    };

    let num = interieur(src, debut_num, fin_num);
    let den = interieur(src, debut_den, fin_den);

    Ok(Some(Expansion {
        fin: fin_den,
        texte: format!("({num}) / ({den}) "),
    }))
}

/// `\sqrt[d]{A}` ou `\sqrt{A}` à la position `pos`.
pub(crate) fn expand_sqrt(src: &str, pos: usize, max_depth: usize) -> CalcResult<Option<Expansion>> {
    if !src[pos..].starts_with(SQRT) {
        return Ok(None);
    }

    let mut i = saute_espaces(src, pos + SQRT.len());

    // degré optionnel ; un '[' jamais refermé invalide toute la macro
    let mut degre = DEGRE_DEFAUT;
    if src.as_bytes().get(i) == Some(&b'[') {
        let Some(fin_deg) = groupe_equilibre(src, i, b'[', b']', max_depth)? else {
            return Ok(None);
        };
        degre = interieur(src, i, fin_deg);
        i = saute_espaces(src, fin_deg);
    }

    let Some(fin_rad) = groupe_equilibre(src, i, b'{', b'}', max_depth)? else {
        return Ok(None);
    };
    let radicande = interieur(src, i, fin_rad);

    Ok(Some(Expansion {
        fin: fin_rad,
        texte: format!("({radicande}) sqrt ({degre}) "),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFONDEUR: usize = 64;

    #[test]
    fn groupe_simple_et_imbrique() {
        assert_eq!(groupe_equilibre("{a}", 0, b'{', b'}', PROFONDEUR).unwrap(), Some(3));
        assert_eq!(
            groupe_equilibre("{a{b{c}}d} reste", 0, b'{', b'}', PROFONDEUR).unwrap(),
            Some(10)
        );
    }

    #[test]
    fn groupe_absent_ou_ouvert() {
        assert_eq!(groupe_equilibre("a}", 0, b'{', b'}', PROFONDEUR).unwrap(), None);
        assert_eq!(groupe_equilibre("{a{b}", 0, b'{', b'}', PROFONDEUR).unwrap(), None);
    }

    #[test]
    fn groupe_ignore_les_autres_delimiteurs() {
        // seul [] compte pour le degré
        assert_eq!(
            groupe_equilibre("[\\frac{8}{3}]", 0, b'[', b']', PROFONDEUR).unwrap(),
            Some(13)
        );
    }

    #[test]
    fn groupe_trop_profond() {
        let src = format!("{}{}", "{".repeat(5), "}".repeat(5));
        let err = groupe_equilibre(&src, 0, b'{', b'}', 4).unwrap_err();
        assert!(matches!(err, CalcError::NestingTooDeep { limit: 4 }));
    }

    #[test]
    fn frac_avec_espaces() {
        let exp = expand_frac("\\frac {  5 } { 4  } + 1", 0, PROFONDEUR)
            .unwrap()
            .unwrap();
        assert_eq!(exp.texte, "(  5 ) / ( 4  ) ");
        assert_eq!(exp.fin, 19);
    }

    #[test]
    fn frac_incomplete() {
        assert_eq!(expand_frac("\\frac{1}", 0, PROFONDEUR).unwrap(), None);
        assert_eq!(expand_frac("\\fracx{1}{2}", 0, PROFONDEUR).unwrap(), None);
    }

    #[test]
    fn espaces_unicode_entre_macro_et_groupes() {
        let exp = expand_frac("\\frac\u{a0}{1}\u{2003}{2}", 0, PROFONDEUR)
            .unwrap()
            .unwrap();
        assert_eq!(exp.texte, "(1) / (2) ");

        let exp = expand_sqrt("\\sqrt\u{a0}[3]\t{8}", 0, PROFONDEUR)
            .unwrap()
            .unwrap();
        assert_eq!(exp.texte, "(8) sqrt (3) ");
    }

    #[test]
    fn sqrt_degre_par_defaut() {
        let exp = expand_sqrt("\\sqrt{4}", 0, PROFONDEUR).unwrap().unwrap();
        assert_eq!(exp.texte, "(4) sqrt (2) ");
    }

    #[test]
    fn sqrt_degre_explicite() {
        let exp = expand_sqrt("2 * \\sqrt[3+2]{8}", 4, PROFONDEUR)
            .unwrap()
            .unwrap();
        assert_eq!(exp.texte, "(8) sqrt (3+2) ");
        assert_eq!(exp.fin, 17);
    }

    #[test]
    fn sqrt_degre_non_referme() {
        assert_eq!(expand_sqrt("\\sqrt[3{8}", 0, PROFONDEUR).unwrap(), None);
    }
}
