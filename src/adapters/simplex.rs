//! Exact Simplex - Two-Phase Tableau Solver over Rationals
//!
//! Reference implementation of the `LpSolver` port. Every pivot is carried
//! out in exact rational arithmetic, so statuses and optima are exact.
//!
//! Standard form:
//! - Each free variable `x_j` is split into `x_j⁺ - x_j⁻`
//! - Each inequality row `b + a·x >= 0` gets a surplus `s >= 0`: `a·x - s = -b`
//! - Rows are sign-flipped so the right-hand side is nonnegative, then every
//!   row receives an artificial variable for phase 1
//!
//! Bland's rule (smallest entering index, ties in the ratio test broken by
//! smallest basic index) rules out cycling.

use num_traits::{One, Zero};
use tracing::{debug, instrument, warn};

use crate::config::SolverConfig;
use crate::domain::rational::Rational;
use crate::ports::lp::{LinearProgram, LpSolution, LpSolver, LpStatus, Sense};

/// Two-phase Bland simplex in exact arithmetic.
#[derive(Debug, Clone)]
pub struct ExactSimplex {
    /// Pivot budget across both phases; exceeding it yields `Undecided`.
    max_pivots: usize,
}

impl ExactSimplex {
    pub const DEFAULT_MAX_PIVOTS: usize = 100_000;

    pub const fn new(max_pivots: usize) -> Self {
        Self { max_pivots }
    }

    pub const fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.max_pivots)
    }

    pub const fn max_pivots(&self) -> usize {
        self.max_pivots
    }

    fn run(&self, program: &LinearProgram) -> LpSolution {
        let variables = program.variables();
        let mut tableau = Tableau::standard_form(program, variables);
        let mut budget = self.max_pivots;

        // ── Phase 1: minimize the sum of artificials ──
        let phase_one: Vec<Rational> = (0..tableau.cols)
            .map(|j| {
                if j >= tableau.artificial_start {
                    -Rational::one()
                } else {
                    Rational::zero()
                }
            })
            .collect();
        match tableau.optimize(&phase_one, tableau.cols, &mut budget) {
            Outcome::Optimal => {}
            Outcome::Exhausted => return LpSolution::failed(LpStatus::Undecided),
            // The phase-1 objective is bounded by zero
            Outcome::Unbounded => return LpSolution::failed(LpStatus::Undecided),
        }
        if tableau.artificial_mass() > Rational::zero() {
            return LpSolution::failed(LpStatus::Inconsistent);
        }
        tableau.drive_out_artificials();
        debug!(pivots = self.max_pivots - budget, "phase 1 feasible");

        let Some(objective) = &program.objective else {
            return LpSolution {
                status: LpStatus::Optimal,
                value: None,
                primal: tableau.primal(variables),
            };
        };

        // ── Phase 2: optimize the objective over the feasible basis ──
        let sign = match objective.sense {
            Sense::Maximize => Rational::one(),
            Sense::Minimize => -Rational::one(),
        };
        let mut costs = vec![Rational::zero(); tableau.cols];
        for (j, coefficient) in objective.coefficients.iter().skip(1).enumerate() {
            costs[j] = &sign * coefficient;
            costs[variables + j] = -&costs[j];
        }
        match tableau.optimize(&costs, tableau.artificial_start, &mut budget) {
            Outcome::Optimal => {}
            Outcome::Unbounded => return LpSolution::failed(LpStatus::Unbounded),
            Outcome::Exhausted => return LpSolution::failed(LpStatus::Undecided),
        }

        let primal = tableau.primal(variables);
        let value = objective
            .coefficients
            .iter()
            .skip(1)
            .zip(&primal)
            .fold(objective.coefficients[0].clone(), |acc, (c, x)| acc + c * x);
        LpSolution {
            status: LpStatus::Optimal,
            value: Some(value),
            primal,
        }
    }
}

impl Default for ExactSimplex {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_PIVOTS)
    }
}

impl LpSolver for ExactSimplex {
    #[instrument(skip(self, program), fields(rows = program.rows.len(), variables = program.variables()))]
    fn solve(&self, program: &LinearProgram) -> LpSolution {
        if let Err(error) = program.validate() {
            warn!(%error, "rejecting malformed linear program");
            return LpSolution::failed(LpStatus::Undecided);
        }
        let solution = self.run(program);
        debug!(status = %solution.status, "simplex finished");
        solution
    }
}

// ────────────────────────────────────────────
// Tableau
// ────────────────────────────────────────────

enum Outcome {
    Optimal,
    Unbounded,
    Exhausted,
}

/// Rows hold `B⁻¹A | B⁻¹b`; `basis[i]` is the column basic in row `i`.
struct Tableau {
    rows: Vec<Vec<Rational>>,
    basis: Vec<usize>,
    cols: usize,
    artificial_start: usize,
}

impl Tableau {
    fn standard_form(program: &LinearProgram, variables: usize) -> Self {
        let m = program.rows.len();
        let surpluses = m - program.equalities.len();
        let artificial_start = 2 * variables + surpluses;
        let cols = artificial_start + m;

        let mut surplus = 2 * variables;
        let mut rows = Vec::with_capacity(m);
        for (i, row) in program.rows.iter().enumerate() {
            let mut line = vec![Rational::zero(); cols + 1];
            for (j, coefficient) in row.iter().skip(1).enumerate() {
                line[j] = coefficient.clone();
                line[variables + j] = -coefficient;
            }
            if !program.equalities.contains(&i) {
                line[surplus] = -Rational::one();
                surplus += 1;
            }
            line[cols] = -&row[0];
            if line[cols] < Rational::zero() {
                for value in &mut line {
                    *value = -&*value;
                }
            }
            line[artificial_start + i] = Rational::one();
            rows.push(line);
        }

        Self {
            rows,
            basis: (artificial_start..cols).collect(),
            cols,
            artificial_start,
        }
    }

    fn rhs(&self, row: usize) -> &Rational {
        &self.rows[row][self.cols]
    }

    /// `c_j - c_B · B⁻¹A_j` for every column.
    fn reduced_costs(&self, costs: &[Rational]) -> Vec<Rational> {
        (0..self.cols)
            .map(|j| {
                self.rows
                    .iter()
                    .zip(&self.basis)
                    .fold(costs[j].clone(), |acc, (row, &basic)| acc - &costs[basic] * &row[j])
            })
            .collect()
    }

    fn pivot(&mut self, r: usize, j: usize) {
        let pivot = self.rows[r][j].clone();
        for value in &mut self.rows[r] {
            *value /= &pivot;
        }
        let pivot_row = self.rows[r].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r || row[j].is_zero() {
                continue;
            }
            let factor = row[j].clone();
            for (value, p) in row.iter_mut().zip(&pivot_row) {
                *value -= &factor * p;
            }
        }
        self.basis[r] = j;
    }

    /// Maximizes `costs` using entering columns below `allowed`.
    fn optimize(&mut self, costs: &[Rational], allowed: usize, budget: &mut usize) -> Outcome {
        let zero = Rational::zero();
        let mut reduced = self.reduced_costs(costs);
        loop {
            let Some(entering) = (0..allowed).find(|&j| reduced[j] > zero) else {
                return Outcome::Optimal;
            };
            let leaving = self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row[entering] > zero)
                .map(|(i, row)| (i, &row[self.cols] / &row[entering]))
                .min_by(|(i, a), (k, b)| a.cmp(b).then(self.basis[*i].cmp(&self.basis[*k])));
            let Some((r, _)) = leaving else {
                return Outcome::Unbounded;
            };
            if *budget == 0 {
                return Outcome::Exhausted;
            }
            *budget -= 1;

            self.pivot(r, entering);
            let factor = reduced[entering].clone();
            for (d, p) in reduced.iter_mut().zip(&self.rows[r]) {
                *d -= &factor * p;
            }
        }
    }

    /// Total value of the basic artificials.
    fn artificial_mass(&self) -> Rational {
        self.basis
            .iter()
            .enumerate()
            .filter(|&(_, &basic)| basic >= self.artificial_start)
            .fold(Rational::zero(), |acc, (i, _)| acc + self.rhs(i))
    }

    /// Replaces zero-valued basic artificials by structural columns; rows
    /// with no structural entry are linearly dependent and are dropped.
    fn drive_out_artificials(&mut self) {
        let mut i = 0;
        while i < self.rows.len() {
            if self.basis[i] >= self.artificial_start {
                match (0..self.artificial_start).find(|&j| !self.rows[i][j].is_zero()) {
                    Some(j) => self.pivot(i, j),
                    None => {
                        self.rows.remove(i);
                        self.basis.remove(i);
                        continue;
                    }
                }
            }
            i += 1;
        }
    }

    /// Values of the original free variables at the current basis.
    fn primal(&self, variables: usize) -> Vec<Rational> {
        let mut values = vec![Rational::zero(); self.cols];
        for (i, &basic) in self.basis.iter().enumerate() {
            values[basic] = self.rhs(i).clone();
        }
        (0..variables)
            .map(|j| &values[j] - &values[variables + j])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rational::{integer, ratio};

    fn solve(program: &LinearProgram) -> LpSolution {
        ExactSimplex::default().solve(program)
    }

    /// max x + y  s.t.  x, y >= 0,  x + 2y <= 4,  3x + y <= 6
    fn textbook() -> LinearProgram {
        LinearProgram::builder(2)
            .at_least_zero(integer(0), &[(0, integer(1))])
            .at_least_zero(integer(0), &[(1, integer(1))])
            .at_least_zero(integer(4), &[(0, integer(-1)), (1, integer(-2))])
            .at_least_zero(integer(6), &[(0, integer(-3)), (1, integer(-1))])
            .objective(Sense::Maximize, &[(0, integer(1)), (1, integer(1))])
            .build()
    }

    #[test]
    fn test_textbook_optimum_is_exact() {
        let solution = solve(&textbook());
        assert_eq!(solution.status, LpStatus::Optimal);
        assert_eq!(solution.value, Some(ratio(14, 5)));
        assert_eq!(solution.primal, vec![ratio(8, 5), ratio(6, 5)]);
    }

    #[test]
    fn test_inconsistent() {
        let program = LinearProgram::builder(1)
            .at_least_zero(integer(-1), &[(0, integer(1))])
            .at_least_zero(integer(0), &[(0, integer(-1))])
            .build();
        assert_eq!(solve(&program).status, LpStatus::Inconsistent);
    }

    #[test]
    fn test_unbounded() {
        let program = LinearProgram::builder(1)
            .at_least_zero(integer(0), &[(0, integer(1))])
            .objective(Sense::Maximize, &[(0, integer(1))])
            .build();
        assert_eq!(solve(&program).status, LpStatus::Unbounded);
    }

    #[test]
    fn test_equality_and_minimize() {
        // min x + y  s.t.  x - y = 1,  x, y >= 0
        let program = LinearProgram::builder(2)
            .equal_zero(integer(-1), &[(0, integer(1)), (1, integer(-1))])
            .at_least_zero(integer(0), &[(0, integer(1))])
            .at_least_zero(integer(0), &[(1, integer(1))])
            .objective(Sense::Minimize, &[(0, integer(1)), (1, integer(1))])
            .build();
        let solution = solve(&program);
        assert_eq!(solution.status, LpStatus::Optimal);
        assert_eq!(solution.value, Some(integer(1)));
        assert_eq!(solution.primal, vec![integer(1), integer(0)]);
    }

    #[test]
    fn test_free_variable_goes_negative() {
        let program = LinearProgram::builder(1)
            .at_least_zero(integer(3), &[(0, integer(1))])
            .objective(Sense::Minimize, &[(0, integer(1))])
            .build();
        let solution = solve(&program);
        assert_eq!(solution.value, Some(integer(-3)));
    }

    #[test]
    fn test_feasibility_without_objective() {
        let program = LinearProgram::builder(2)
            .at_least_zero(integer(-1), &[(0, integer(1)), (1, integer(1))])
            .at_least_zero(integer(0), &[(0, integer(1))])
            .at_least_zero(integer(0), &[(1, integer(1))])
            .build();
        let solution = solve(&program);
        assert_eq!(solution.status, LpStatus::Optimal);
        assert!(solution.value.is_none());
        let sum = &solution.primal[0] + &solution.primal[1];
        assert!(sum >= integer(1));
    }

    #[test]
    fn test_redundant_equalities() {
        // x = 1 stated twice
        let program = LinearProgram::builder(1)
            .equal_zero(integer(-1), &[(0, integer(1))])
            .equal_zero(integer(-2), &[(0, integer(2))])
            .objective(Sense::Maximize, &[(0, integer(1))])
            .build();
        let solution = solve(&program);
        assert_eq!(solution.status, LpStatus::Optimal);
        assert_eq!(solution.value, Some(integer(1)));
    }

    #[test]
    fn test_pivot_budget() {
        let solution = ExactSimplex::new(0).solve(&textbook());
        assert_eq!(solution.status, LpStatus::Undecided);
    }

    #[test]
    fn test_malformed_program_is_undecided() {
        let mut program = textbook();
        program.rows[1].pop();
        assert_eq!(solve(&program).status, LpStatus::Undecided);
    }
}
