//! Calculatrice TeX : expression (arithmétique ou TeX) -> programme postfixe
//! -> valeur ou arbre, avec variables liables.
//!
//! ```
//! use calculatrice_tex::noyau::Expression;
//!
//! let mut e = Expression::new("2 + \\frac{x}{2}").unwrap();
//! e.set("x", 8.0).unwrap();
//! assert_eq!(e.calculate().unwrap(), 6.0);
//! assert_eq!(e.to_string(), "2 + \\frac{8}{2}");
//! ```

pub mod noyau;

#[cfg(not(target_arch = "wasm32"))]
pub mod rendu;
