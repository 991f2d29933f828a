//! Table des variables d’une expression.
//!
//! Les noms sont fixés à la création (identifiants du programme, ordre de
//! première apparition) ; seules les valeurs changent.

use super::erreur::{CalcError, CalcResult};
use super::rpn::PostfixProgram;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariableTable {
    entries: Vec<(String, Option<f64>)>,
}

impl VariableTable {
    pub fn from_program(program: &PostfixProgram) -> Self {
        Self {
            entries: program
                .identifiers()
                .into_iter()
                .map(|name| (name.to_owned(), None))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn unbound(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn bound(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries
            .iter()
            .filter_map(|(n, v)| v.map(|v| (n.as_str(), v)))
    }

    /// Valeur liée, `None` si non liée ou inconnue.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.position(name).and_then(|i| self.entries[i].1)
    }

    pub fn get(&self, name: &str) -> CalcResult<Option<f64>> {
        let i = self.position_ou_erreur(name)?;
        Ok(self.entries[i].1)
    }

    pub fn set(&mut self, name: &str, value: Option<f64>) -> CalcResult<()> {
        let i = self.position_ou_erreur(name)?;
        self.entries[i].1 = value;
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn position_ou_erreur(&self, name: &str) -> CalcResult<usize> {
        self.position(name)
            .ok_or_else(|| CalcError::Lookup(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::rpn::parse;

    fn table(src: &str) -> VariableTable {
        VariableTable::from_program(&parse(src).unwrap())
    }

    #[test]
    fn noms_uniques_dans_l_ordre() {
        let t = table("b + a * b - c_1");
        assert_eq!(t.names(), vec!["b", "a", "c_1"]);
        assert_eq!(t.unbound(), vec!["b", "a", "c_1"]);
    }

    #[test]
    fn liaison_et_lecture() {
        let mut t = table("x + y");
        t.set("y", Some(2.5)).unwrap();
        assert_eq!(t.get("y").unwrap(), Some(2.5));
        assert_eq!(t.get("x").unwrap(), None);
        assert_eq!(t.unbound(), vec!["x"]);
        assert_eq!(t.bound().collect::<Vec<_>>(), vec![("y", 2.5)]);

        t.set("y", None).unwrap();
        assert_eq!(t.value("y"), None);
    }

    #[test]
    fn nom_inconnu() {
        let mut t = table("x");
        assert!(matches!(t.get("z"), Err(CalcError::Lookup(n)) if n == "z"));
        assert!(matches!(t.set("z", Some(1.0)), Err(CalcError::Lookup(_))));
        assert_eq!(t.len(), 1);
    }
}
