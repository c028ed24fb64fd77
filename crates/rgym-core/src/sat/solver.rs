//! DPLL solver over numbered clauses

use std::collections::HashMap;

use super::cnf::Cnf;

/// Number a symbolic CNF.
///
/// Variables are numbered from 1 in order of first appearance; `~x` maps to
/// the negative of `x`'s number. Returns the numbered clauses and a reverse
/// lookup holding both polarities.
pub fn translate(cnf: &Cnf) -> (Vec<Vec<i32>>, HashMap<i32, String>) {
    let mut lit2num: HashMap<String, i32> = HashMap::new();
    let mut next_var = 1;
    for clause in cnf {
        for literal in clause {
            if lit2num.contains_key(literal) {
                continue;
            }
            let var = literal.strip_prefix('~').unwrap_or(literal);
            lit2num.insert(var.to_string(), next_var);
            lit2num.insert(format!("~{}", var), -next_var);
            next_var += 1;
        }
    }

    let numbered = cnf
        .iter()
        .map(|clause| clause.iter().map(|lit| lit2num[lit]).collect())
        .collect();
    let num2var = lit2num.into_iter().map(|(lit, num)| (num, lit)).collect();
    (numbered, num2var)
}

fn literal_value(lit: i32, assignment: &[Option<bool>]) -> Option<bool> {
    let value = assignment[lit.unsigned_abs() as usize]?;
    Some(if lit > 0 { value } else { !value })
}

fn assign(lit: i32, assignment: &mut [Option<bool>]) {
    assignment[lit.unsigned_abs() as usize] = Some(lit > 0);
}

/// Unit propagation followed by branching. On success `assignment` holds a
/// model; on failure every variable assigned by this call is reset.
fn dpll(clauses: &[Vec<i32>], assignment: &mut Vec<Option<bool>>) -> bool {
    let mut trail: Vec<usize> = Vec::new();

    loop {
        let mut changed = false;
        for clause in clauses {
            let mut satisfied = false;
            let mut open = 0;
            let mut unit = 0;
            for &lit in clause {
                match literal_value(lit, assignment) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        open += 1;
                        unit = lit;
                    }
                }
            }
            if satisfied {
                continue;
            }
            if open == 0 {
                for var in trail {
                    assignment[var] = None;
                }
                return false;
            }
            if open == 1 {
                assign(unit, assignment);
                trail.push(unit.unsigned_abs() as usize);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let Some(var) = (1..assignment.len()).find(|&v| assignment[v].is_none()) else {
        return true;
    };

    for value in [true, false] {
        assignment[var] = Some(value);
        if dpll(clauses, assignment) {
            return true;
        }
    }
    assignment[var] = None;
    for var in trail {
        assignment[var] = None;
    }
    false
}

/// Lazy enumeration of every model of a CNF
pub struct SolutionIter {
    clauses: Vec<Vec<i32>>,
    num_vars: usize,
    num2var: HashMap<i32, String>,
    include_neg: bool,
    exhausted: bool,
}

impl Iterator for SolutionIter {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        if self.exhausted {
            return None;
        }
        let mut assignment = vec![None; self.num_vars + 1];
        if !dpll(&self.clauses, &mut assignment) {
            self.exhausted = true;
            return None;
        }

        let model: Vec<i32> = (1..=self.num_vars)
            .map(|v| {
                let v = v as i32;
                if assignment[v as usize] == Some(true) { v } else { -v }
            })
            .collect();

        // Block this model so the next call finds a different one
        self.clauses.push(model.iter().map(|lit| -lit).collect());

        Some(
            model
                .into_iter()
                .filter(|&n| self.include_neg || n > 0)
                .map(|n| self.num2var[&n].clone())
                .collect(),
        )
    }
}

/// Iterate over all models, listing true literals (and false ones as `~x`
/// when `include_neg` is set) in variable order
pub fn itersolve(cnf: &Cnf, include_neg: bool) -> SolutionIter {
    let (clauses, num2var) = translate(cnf);
    let num_vars = num2var.len() / 2;
    SolutionIter {
        clauses,
        num_vars,
        num2var,
        include_neg,
        exhausted: false,
    }
}

pub fn solve_all(cnf: &Cnf, include_neg: bool) -> Vec<Vec<String>> {
    itersolve(cnf, include_neg).collect()
}

pub fn solve_one(cnf: &Cnf, include_neg: bool) -> Option<Vec<String>> {
    itersolve(cnf, include_neg).next()
}
