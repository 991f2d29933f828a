//! Propriétés (proptest) du parseur et de la façade.

use proptest::prelude::*;

use super::expression::Expression;
use super::rpn::parse;

fn petit_entier() -> impl Strategy<Value = i32> {
    0i32..1000
}

fn operateur() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("+"),
        Just("-"),
        Just("*"),
        Just("\\cdot"),
        Just("/"),
        Just("^"),
    ]
}

fn atome() -> impl Strategy<Value = String> {
    prop_oneof![
        petit_entier().prop_map(|n| n.to_string()),
        "[a-w](_[0-9])?",
    ]
}

proptest! {
    #[test]
    fn parse_deterministe(src in "[0-9a-z+*/^() =.-]{0,40}") {
        let a = parse(&src);
        let b = parse(&src);
        prop_assert_eq!(a.is_ok(), b.is_ok());
        if let (Ok(a), Ok(b)) = (a, b) {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn parentheses_autour_d_un_atome(a in atome(), op in operateur(), b in atome()) {
        let nu = parse(&format!("{a} {op} {b}")).unwrap();
        let groupe = parse(&format!("({a}) {op} {b}")).unwrap();
        prop_assert_eq!(nu, groupe);
    }

    #[test]
    fn frac_equivaut_a_la_division(a in atome(), b in atome()) {
        let tex = parse(&format!("\\frac{{{a}}}{{{b}}}")).unwrap();
        let plat = parse(&format!("({a}) / ({b})")).unwrap();
        prop_assert_eq!(tex, plat);
    }

    #[test]
    fn somme_et_produit(a in petit_entier(), b in petit_entier(), c in petit_entier()) {
        let e = Expression::new(&format!("{a} + {b} * {c}")).unwrap();
        prop_assert_eq!(e.calculate().unwrap(), f64::from(a) + f64::from(b) * f64::from(c));
    }

    #[test]
    fn double_moins_unaire(a in petit_entier(), b in petit_entier()) {
        let e = Expression::new(&format!("-{a} * -{b}")).unwrap();
        prop_assert_eq!(e.calculate().unwrap(), f64::from(a) * f64::from(b));
    }

    #[test]
    fn empreinte_change_avec_la_valeur(v in -1000i32..1000, w in -1000i32..1000) {
        prop_assume!(v != w);
        let mut e = Expression::new("2 \\cdot x + y").unwrap();
        let programme = e.postfix_notation().clone();

        e.set("x", f64::from(v)).unwrap();
        let avant = e.fingerprint().to_owned();
        e.set("x", f64::from(w)).unwrap();

        prop_assert_ne!(e.fingerprint(), avant.as_str());
        prop_assert_eq!(e.postfix_notation(), &programme);
    }

    #[test]
    fn substitution_respecte_les_indices(v in 0i32..1000) {
        let mut e = Expression::new("x + x_2 \\cdot x").unwrap();
        e.set("x", f64::from(v)).unwrap();
        prop_assert_eq!(e.to_string(), format!("{v} + x_2 \\cdot {v}"));
    }
}
