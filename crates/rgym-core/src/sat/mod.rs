//! Symbolic SAT helpers for logic puzzle generators
//!
//! Clauses are written over string literals; a leading `~` negates a
//! literal. A CNF is a conjunction of clauses, each clause a disjunction of
//! literals:
//!
//! ```
//! use rgym_core::sat::{one_of, solve_all};
//!
//! let cnf = one_of(["red", "green", "blue"]);
//! assert_eq!(solve_all(&cnf, false).len(), 3);
//! ```

mod cnf;
mod solver;

pub use cnf::{
    Clause, Cnf, Quantifier, all_of, basic_fact, from_dnf, neg, none_of, one_of, some_of,
};
pub use solver::{SolutionIter, itersolve, solve_all, solve_one, translate};
