//! Building symbolic CNFs

use std::collections::BTreeSet;

/// Disjunction of literals
pub type Clause = Vec<String>;

/// Conjunction of clauses
pub type Cnf = Vec<Clause>;

/// Negate a single literal
pub fn neg(element: &str) -> String {
    match element.strip_prefix('~') {
        Some(positive) => positive.to_string(),
        None => format!("~{}", element),
    }
}

/// All `k`-element combinations of `items`, in lexicographic index order
fn combinations(items: &[String], k: usize) -> Cnf {
    if k > items.len() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        out.push(indices.iter().map(|&i| items[i].clone()).collect());
        // Rightmost index that can still move
        let Some(pos) = (0..k).rev().find(|&i| indices[i] != i + items.len() - k) else {
            return out;
        };
        indices[pos] += 1;
        for j in pos + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

/// Convert from or-of-ands to and-of-ors.
///
/// Tautological clauses (containing `x` and `~x`) are dropped, and after each
/// group any clause that is a strict superset of the smallest clause is
/// removed. Output order is deterministic.
pub fn from_dnf<G, S>(groups: impl IntoIterator<Item = G>) -> Cnf
where
    G: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cnf: BTreeSet<BTreeSet<String>> = BTreeSet::from([BTreeSet::new()]);

    for group in groups {
        let literals: Vec<(String, String)> = group
            .into_iter()
            .map(|lit| (lit.as_ref().to_string(), neg(lit.as_ref())))
            .collect();

        let mut next = BTreeSet::new();
        for (literal, negated) in &literals {
            for clause in &cnf {
                if clause.contains(negated) {
                    continue;
                }
                let mut extended = clause.clone();
                extended.insert(literal.clone());
                next.insert(extended);
            }
        }

        let Some(smallest) = next.iter().min_by_key(|c| c.len()).cloned() else {
            cnf = next;
            continue;
        };
        next.retain(|clause| !(clause.len() > smallest.len() && clause.is_superset(&smallest)));
        cnf = next;
    }

    cnf.into_iter().map(|clause| clause.into_iter().collect()).collect()
}

/// Quantifier over how many of a set of elements are true
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantifier {
    elements: Vec<String>,
}

impl Quantifier {
    pub fn new<S: Into<String>>(elements: impl IntoIterator<Item = S>) -> Self {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Fewer than `n` are true
    pub fn lt(&self, n: usize) -> Cnf {
        let negated: Vec<String> = self.elements.iter().map(|e| neg(e)).collect();
        combinations(&negated, n)
    }

    /// At most `n` are true
    pub fn le(&self, n: usize) -> Cnf {
        self.lt(n + 1)
    }

    /// More than `n` are true
    pub fn gt(&self, n: usize) -> Cnf {
        match self.elements.len().checked_sub(n) {
            Some(r) => combinations(&self.elements, r),
            // Unsatisfiable
            None => vec![Vec::new()],
        }
    }

    /// At least `n` are true
    pub fn ge(&self, n: usize) -> Cnf {
        match n.checked_sub(1) {
            Some(m) => self.gt(m),
            None => Vec::new(),
        }
    }

    /// Exactly `n` are true
    pub fn eq(&self, n: usize) -> Cnf {
        let mut cnf = self.le(n);
        cnf.extend(self.ge(n));
        cnf
    }
}

/// Every element is true
pub fn all_of<S: Into<String>>(elements: impl IntoIterator<Item = S>) -> Cnf {
    let q = Quantifier::new(elements);
    let n = q.elements().len();
    q.eq(n)
}

/// At least one element is true
pub fn some_of<S: Into<String>>(elements: impl IntoIterator<Item = S>) -> Cnf {
    Quantifier::new(elements).ge(1)
}

/// Exactly one element is true
pub fn one_of<S: Into<String>>(elements: impl IntoIterator<Item = S>) -> Cnf {
    Quantifier::new(elements).eq(1)
}

/// This element is true
pub fn basic_fact(element: impl Into<String>) -> Cnf {
    Quantifier::new([element.into()]).eq(1)
}

/// No element is true
pub fn none_of<S: Into<String>>(elements: impl IntoIterator<Item = S>) -> Cnf {
    Quantifier::new(elements).eq(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clauses(raw: &[&[&str]]) -> Cnf {
        raw.iter()
            .map(|c| c.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_neg() {
        assert_eq!(neg("tushar 5"), "~tushar 5");
        assert_eq!(neg("~chai 2"), "chai 2");
    }

    #[test]
    fn test_combinations() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            combinations(&items, 2),
            clauses(&[&["a", "b"], &["a", "c"], &["b", "c"]])
        );
        assert_eq!(combinations(&items, 0), vec![Vec::<String>::new()]);
        assert!(combinations(&items, 4).is_empty());
    }

    #[test]
    fn test_at_most_one() {
        let cnf = Quantifier::new(["A", "B", "C"]).le(1);
        assert_eq!(
            cnf,
            clauses(&[&["~A", "~B"], &["~A", "~C"], &["~B", "~C"]])
        );
    }

    #[test]
    fn test_some_of() {
        assert_eq!(some_of(["A", "B", "C"]), clauses(&[&["A", "B", "C"]]));
    }

    #[test]
    fn test_one_of() {
        assert_eq!(
            one_of(["A", "B", "C"]),
            clauses(&[&["~A", "~B"], &["~A", "~C"], &["~B", "~C"], &["A", "B", "C"]])
        );
    }

    #[test]
    fn test_basic_fact_and_none_of() {
        assert_eq!(basic_fact("A"), clauses(&[&["A"]]));
        assert_eq!(none_of(["A", "B"]), clauses(&[&["~A"], &["~B"]]));
        assert_eq!(all_of(["A", "B"]), clauses(&[&["A"], &["B"]]));
    }

    #[test]
    fn test_from_dnf() {
        let cnf = from_dnf([vec!["~P"], vec!["Q", "R"]]);
        assert_eq!(cnf, clauses(&[&["Q", "~P"], &["R", "~P"]]));
    }

    #[test]
    fn test_from_dnf_drops_tautologies_and_supersets() {
        // (x) or (~x and y) == x or y
        let cnf = from_dnf([vec!["x"], vec!["~x", "y"]]);
        assert_eq!(cnf, clauses(&[&["x", "y"]]));
    }
}
