//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - grammaire valide => parse doit réussir ; variables toutes liées => calcul sans erreur

use std::time::{Duration, Instant};

use super::erreur::CalcError;
use super::expression::Expression;
use super::jetons::ScanOptions;
use super::rpn::parse;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const VARIABLES: [&str; 3] = ["x", "y_1", "z2"];

fn gen_atom(rng: &mut Rng) -> String {
    match rng.pick(5) {
        0 => "3".to_string(),
        1 => "0.5".to_string(),
        2 => "1e2".to_string(),
        _ => VARIABLES[rng.pick(VARIABLES.len() as u32) as usize].to_string(),
    }
}

fn gen_op(rng: &mut Rng) -> &'static str {
    match rng.pick(7) {
        0 => "+",
        1 => "-",
        2 => "*",
        3 => "\\cdot",
        4 => "\\times",
        5 => "/",
        _ => "^",
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    let d = depth - 1;
    match rng.pick(8) {
        0 => gen_atom(rng),
        1 => format!("{} {} {}", gen_expr(rng, d), gen_op(rng), gen_expr(rng, d)),
        2 => format!("\\frac{{{}}}{{{}}}", gen_expr(rng, d), gen_expr(rng, d)),
        3 => format!("\\sqrt{{{}}}", gen_expr(rng, d)),
        4 => format!("\\sqrt[{}]{{{}}}", gen_expr(rng, d), gen_expr(rng, d)),
        5 => format!("({})", gen_expr(rng, d)),
        6 => format!("\\left({}\\right)", gen_expr(rng, d)),
        _ => format!("-{}", gen_expr(rng, d)),
    }
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_grammaire_valide() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let mut rng = Rng::new(0xC0FFEE_u64);

    for _ in 0..200 {
        budget(t0, max);

        let src = gen_expr(&mut rng, 4);

        // déterminisme
        let p1 = parse(&src).unwrap_or_else(|e| panic!("src={src:?} err={e}"));
        let p2 = parse(&src).unwrap_or_else(|e| panic!("src={src:?} err={e}"));
        assert_eq!(p1, p2, "src={src:?}");

        let mut e = Expression::new(&src).unwrap_or_else(|err| panic!("src={src:?} err={err}"));
        assert_eq!(e.postfix_notation(), &p1);

        // l’arbre ne dépend pas des liaisons
        assert!(e.abstract_syntax_tree().is_ok(), "src={src:?}");

        let noms: Vec<String> = e.variables().iter().map(|s| s.to_string()).collect();
        for (i, n) in noms.iter().enumerate() {
            e.set(n, 1.5 + i as f64).unwrap();
        }
        assert!(e.unbound_variables().is_empty());
        assert!(e.calculate().is_ok(), "src={src:?}");
    }
}

#[test]
fn fuzz_safe_variables_non_liees() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..120 {
        budget(t0, max);

        let src = gen_expr(&mut rng, 3);
        let e = Expression::new(&src).unwrap_or_else(|err| panic!("src={src:?} err={err}"));

        match e.calculate() {
            Ok(_) => assert!(e.variables().is_empty(), "src={src:?}"),
            Err(CalcError::UnboundVariables(noms)) => {
                assert_eq!(noms, e.variables(), "src={src:?}");
            }
            Err(autre) => panic!("erreur non attendue: src={src:?} err={autre}"),
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let src = somme_balancee("\\frac{1}{2}", 800);
    let e = Expression::new(&src).unwrap_or_else(|err| panic!("err: {err}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(e.calculate().unwrap(), 400.0);
}

#[test]
fn fuzz_safe_frac_pathologique_bornee() {
    // imbrication adverse : erreur propre, pas de débordement de pile
    let src = format!("{}1{}", "\\frac{".repeat(500), "}{2}".repeat(500));
    assert!(matches!(
        parse(&src),
        Err(CalcError::NestingTooDeep { .. })
    ));
}

#[test]
fn fuzz_safe_arbre_profond_refuse() {
    // parenthèses, peigne d’opérateurs, moins unaires : erreur typée, jamais de
    // débordement de pile à l’affichage ou à la destruction de l’arbre
    let sources = [
        format!("{}1{}", "1+(".repeat(5000), ")".repeat(5000)),
        vec!["1"; 5000].join("+"),
        format!("{}1", "-".repeat(5000)),
        format!("{}x", "2^".repeat(5000)),
    ];
    for src in &sources {
        match Expression::new(src) {
            Err(CalcError::NestingTooDeep { limit }) => {
                assert_eq!(limit, ScanOptions::default().max_tree_depth)
            }
            Err(autre) => panic!("erreur inattendue: {autre}"),
            Ok(e) => panic!("accepté: {} instructions", e.postfix_notation().len()),
        }
    }

    // parenthèses seules : pas de noeud, donc pas de limite
    let e = Expression::new(&format!("{}x{}", "(".repeat(1000), ")".repeat(1000)));
    assert!(e.is_ok());
}

#[test]
fn fuzz_safe_arbre_a_la_limite() {
    let limite = ScanOptions::default().max_tree_depth;
    let src = vec!["1"; limite].join("+");
    let e = Expression::new(&src).unwrap_or_else(|err| panic!("err: {err}"));

    let arbre = e.ast().unwrap();
    assert_eq!(arbre.depth(), limite);
    assert!(arbre.to_string().starts_with("[plus, [plus, "));
    assert_eq!(e.calculate().unwrap(), limite as f64);
}

#[test]
fn fuzz_safe_moins_unaires_empiles() {
    let mut e = Expression::new("---\\sqrt[3]{3}").unwrap();
    assert!(e.calculate().unwrap() < 0.0);

    e = Expression::new("\\frac{--z2}{(\\sqrt[3]{y_1})}").unwrap();
    e.set("z2", 2.0).unwrap();
    e.set("y_1", 8.0).unwrap();
    assert!((e.calculate().unwrap() - 1.0).abs() < 1e-12);

    for k in 1..=6 {
        let src = format!("2 + {}3", "- ".repeat(k));
        let attendu = if k % 2 == 0 { 5.0 } else { -1.0 };
        let v = Expression::new(&src).unwrap().calculate().unwrap();
        assert_eq!(v, attendu, "src={src:?}");
    }
}

#[test]
fn fuzz_safe_entrees_brutes_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_millis(300);

    const ALPHABET: &[&str] = &[
        "1", "x", "_", "+", "-", "*", "/", "^", "=", "(", ")", "{", "}", "[", "]", "\\frac",
        "\\sqrt", "\\left(", "\\right)", " ", ".", "e",
    ];

    let mut rng = Rng::new(0x5EED_u64);
    for _ in 0..400 {
        budget(t0, max);

        let n = 1 + rng.pick(16) as usize;
        let src: String = (0..n)
            .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize])
            .collect();

        // Ok ou erreur typée : jamais de panique
        if let Ok(e) = Expression::new(&src) {
            let _ = e.calculate();
            let _ = e.abstract_syntax_tree();
            let _ = e.to_string();
        }
    }
}
