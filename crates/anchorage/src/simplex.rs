//! Two-phase simplex solver over a dense tableau.
//!
//! The solver knows nothing about anchors: variables are any `Ord + Copy` handle and every
//! variable is implicitly non-negative. Constraints are stored once with
//! [`Simplex::set_constraints`] (which also runs phase 1); [`Simplex::solve_min`] and
//! [`Simplex::solve_max`] can then be called repeatedly with different objectives.
//!
//! Tableau layout: row 0 is the objective row, rows `1..=m` hold the constraints. Columns are
//! the structural variables, then one slack or surplus column per inequality, then one
//! artificial column per `=`/`>=` constraint, then the right-hand side.

use std::collections::BTreeMap;

use tracing::trace;

const EPSILON: f64 = 1e-7;
const FEASIBILITY_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ratio {
    LessOrEqual,
    Equal,
    MoreOrEqual,
}

/// `sum(coefficient * variable) <ratio> constant`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint<V: Ord> {
    pub variables: BTreeMap<V, f64>,
    pub ratio: Ratio,
    pub constant: f64,
}

impl<V: Ord + Copy> Constraint<V> {
    pub fn new(ratio: Ratio, constant: f64) -> Self {
        Self {
            variables: BTreeMap::new(),
            ratio,
            constant,
        }
    }

    pub fn with(mut self, variable: V, coefficient: f64) -> Self {
        self.add(variable, coefficient);
        self
    }

    /// Adds to the coefficient of `variable`, dropping it when the sum cancels out.
    pub fn add(&mut self, variable: V, coefficient: f64) {
        let entry = self.variables.entry(variable).or_insert(0.0);
        *entry += coefficient;
        if *entry == 0.0 {
            self.variables.remove(&variable);
        }
    }

    /// Multiplies both sides by -1.
    pub fn invert(&mut self) {
        for c in self.variables.values_mut() {
            *c = -*c;
        }
        self.constant = -self.constant;
        self.ratio = match self.ratio {
            Ratio::LessOrEqual => Ratio::MoreOrEqual,
            Ratio::MoreOrEqual => Ratio::LessOrEqual,
            Ratio::Equal => Ratio::Equal,
        };
    }

    fn holds_for_zero(&self) -> bool {
        match self.ratio {
            Ratio::LessOrEqual => self.constant >= -EPSILON,
            Ratio::MoreOrEqual => self.constant <= EPSILON,
            Ratio::Equal => self.constant.abs() <= EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimplexError {
    #[error("constraints have no feasible solution")]
    Infeasible,
    #[error("objective is unbounded")]
    Unbounded,
    #[error("pivot budget exhausted")]
    IterationLimit,
}

#[derive(Debug, Clone)]
pub struct Simplex<V: Ord> {
    variables: Vec<V>,
    columns_of: BTreeMap<V, usize>,
    /// Values pinned by single-variable equalities before the tableau was built.
    pinned: BTreeMap<V, f64>,
    rows: usize,
    columns: usize,
    artificial_start: usize,
    matrix: Vec<f64>,
    basis: Vec<usize>,
    objective: BTreeMap<V, f64>,
    results: BTreeMap<V, f64>,
    max_iterations: Option<usize>,
}

impl<V: Ord + Copy> Default for Simplex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Ord + Copy> Simplex<V> {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            columns_of: BTreeMap::new(),
            pinned: BTreeMap::new(),
            rows: 0,
            columns: 1,
            artificial_start: 0,
            matrix: vec![0.0],
            basis: vec![0],
            objective: BTreeMap::new(),
            results: BTreeMap::new(),
            max_iterations: None,
        }
    }

    pub fn with_max_iterations(mut self, limit: Option<usize>) -> Self {
        self.max_iterations = limit;
        self
    }

    /// Stores `constraints` and drives the tableau to a feasible basis.
    pub fn set_constraints(&mut self, constraints: &[Constraint<V>]) -> Result<(), SimplexError> {
        let mut constraints = constraints.to_vec();
        self.pinned = pin_fixed_variables(&mut constraints)?;

        let mut columns_of: BTreeMap<V, usize> = BTreeMap::new();
        for c in &constraints {
            for &v in c.variables.keys() {
                columns_of.insert(v, 0);
            }
        }
        self.variables = columns_of.keys().copied().collect();
        for (i, column) in columns_of.values_mut().enumerate() {
            *column = i;
        }
        self.columns_of = columns_of;

        for c in &mut constraints {
            if c.constant < 0.0 {
                c.invert();
            }
        }

        let n = self.variables.len();
        let slacks = constraints
            .iter()
            .filter(|c| c.ratio != Ratio::Equal)
            .count();
        let artificials = constraints
            .iter()
            .filter(|c| c.ratio != Ratio::LessOrEqual)
            .count();

        self.rows = constraints.len();
        self.artificial_start = n + slacks;
        self.columns = n + slacks + artificials + 1;
        self.matrix = vec![0.0; (self.rows + 1) * self.columns];
        self.basis = vec![0; self.rows + 1];

        let rhs = self.columns - 1;
        let mut next_slack = n;
        let mut next_artificial = self.artificial_start;
        for (i, c) in constraints.iter().enumerate() {
            let row = i + 1;
            for (v, &coefficient) in &c.variables {
                let column = self.columns_of[v];
                self.set(row, column, coefficient);
            }
            self.set(row, rhs, c.constant);
            match c.ratio {
                Ratio::LessOrEqual => {
                    self.set(row, next_slack, 1.0);
                    self.basis[row] = next_slack;
                    next_slack += 1;
                }
                Ratio::MoreOrEqual => {
                    self.set(row, next_slack, -1.0);
                    next_slack += 1;
                    self.set(row, next_artificial, 1.0);
                    self.basis[row] = next_artificial;
                    next_artificial += 1;
                }
                Ratio::Equal => {
                    self.set(row, next_artificial, 1.0);
                    self.basis[row] = next_artificial;
                    next_artificial += 1;
                }
            }
        }

        if artificials > 0 {
            self.phase_one()?;
        }
        Ok(())
    }

    pub fn set_objective<I>(&mut self, objective: I)
    where
        I: IntoIterator<Item = (V, f64)>,
    {
        self.objective.clear();
        for (v, c) in objective {
            *self.objective.entry(v).or_insert(0.0) += c;
        }
    }

    pub fn solve_min(&mut self) -> Result<f64, SimplexError> {
        self.solve(false)
    }

    pub fn solve_max(&mut self) -> Result<f64, SimplexError> {
        self.solve(true)
    }

    /// Value of `variable` in the last solution; zero when it took no part in the problem.
    pub fn value(&self, variable: V) -> f64 {
        self.results.get(&variable).copied().unwrap_or(0.0)
    }

    pub fn results(&self) -> &BTreeMap<V, f64> {
        &self.results
    }

    fn at(&self, row: usize, column: usize) -> f64 {
        self.matrix[row * self.columns + column]
    }

    fn set(&mut self, row: usize, column: usize, value: f64) {
        self.matrix[row * self.columns + column] = value;
    }

    fn rhs(&self, row: usize) -> f64 {
        self.at(row, self.columns - 1)
    }

    fn iteration_limit(&self) -> usize {
        self.max_iterations
            .unwrap_or_else(|| ((self.rows + 1) * self.columns).max(16) * 4)
    }

    /// Maximizes `-sum(artificials)`; a feasible system reaches zero.
    fn phase_one(&mut self) -> Result<(), SimplexError> {
        self.matrix[..self.columns].fill(0.0);
        for column in self.artificial_start..self.columns - 1 {
            self.set(0, column, 1.0);
        }
        for row in 1..=self.rows {
            if self.basis[row] >= self.artificial_start {
                self.subtract_row(0, row, 1.0);
            }
        }

        match self.iterate(self.columns - 1) {
            Ok(()) => {}
            Err(SimplexError::Unbounded) => return Err(SimplexError::Infeasible),
            Err(e) => return Err(e),
        }

        if self.rhs(0).abs() > FEASIBILITY_TOLERANCE {
            return Err(SimplexError::Infeasible);
        }

        // Artificials still in the basis sit at zero: pivot them out, or blank the row when
        // it is a linear combination of the others.
        for row in 1..=self.rows {
            if self.basis[row] < self.artificial_start {
                continue;
            }
            let column = (0..self.artificial_start).find(|&c| self.at(row, c).abs() > EPSILON);
            match column {
                Some(column) => self.pivot(row, column),
                None => {
                    let start = row * self.columns;
                    self.matrix[start..start + self.columns].fill(0.0);
                }
            }
        }
        Ok(())
    }

    fn solve(&mut self, maximize: bool) -> Result<f64, SimplexError> {
        let mut constant = 0.0;
        self.matrix[..self.columns].fill(0.0);
        for (v, &c) in &self.objective {
            if let Some(&value) = self.pinned.get(v) {
                constant += c * value;
                continue;
            }
            match self.columns_of.get(v) {
                Some(&column) => {
                    // Row 0 starts the matrix; indexing the field keeps the objective borrow.
                    self.matrix[column] = if maximize { -c } else { c };
                }
                // Free of constraints: zero is optimal unless the objective rewards growth.
                None if (maximize && c > EPSILON) || (!maximize && c < -EPSILON) => {
                    return Err(SimplexError::Unbounded);
                }
                None => {}
            }
        }

        for row in 1..=self.rows {
            let basic = self.basis[row];
            let factor = self.at(0, basic);
            if basic < self.artificial_start && factor != 0.0 {
                self.subtract_row(0, row, factor);
            }
        }

        self.iterate(self.artificial_start)?;

        self.results.clear();
        for &v in &self.variables {
            self.results.insert(v, 0.0);
        }
        for row in 1..=self.rows {
            let basic = self.basis[row];
            if basic < self.variables.len() {
                self.results.insert(self.variables[basic], self.rhs(row));
            }
        }
        for (&v, &value) in &self.pinned {
            self.results.insert(v, value);
        }

        let z = self.rhs(0);
        Ok(if maximize { z + constant } else { -z + constant })
    }

    /// Pivots until no column below `column_limit` has a negative reduced cost.
    fn iterate(&mut self, column_limit: usize) -> Result<(), SimplexError> {
        let limit = self.iteration_limit();
        let bland_after = limit / 2;
        for iteration in 0..limit {
            let bland = iteration >= bland_after;
            let Some(column) = self.entering_column(column_limit, bland) else {
                trace!(target: "anchorage::simplex", iterations = iteration, "optimal");
                return Ok(());
            };
            let Some(row) = self.leaving_row(column, bland) else {
                return Err(SimplexError::Unbounded);
            };
            self.pivot(row, column);
        }
        Err(SimplexError::IterationLimit)
    }

    /// Most negative reduced cost, lowest column on ties. Under Bland's rule, the first
    /// negative one.
    fn entering_column(&self, column_limit: usize, bland: bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for column in 0..column_limit {
            let cost = self.at(0, column);
            if cost >= -EPSILON {
                continue;
            }
            if bland {
                return Some(column);
            }
            if best.is_none_or(|(_, b)| cost < b) {
                best = Some((column, cost));
            }
        }
        best.map(|(column, _)| column)
    }

    /// Minimum ratio test, lowest row on ties (lowest basic column under Bland's rule).
    fn leaving_row(&self, column: usize, bland: bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for row in 1..=self.rows {
            let a = self.at(row, column);
            if a <= EPSILON {
                continue;
            }
            let ratio = self.rhs(row) / a;
            let better = match best {
                None => true,
                Some((current, b)) => {
                    ratio < b - EPSILON
                        || (bland && ratio <= b + EPSILON && self.basis[row] < self.basis[current])
                }
            };
            if better {
                best = Some((row, ratio));
            }
        }
        best.map(|(row, _)| row)
    }

    fn pivot(&mut self, row: usize, column: usize) {
        let p = self.at(row, column);
        let start = row * self.columns;
        for value in &mut self.matrix[start..start + self.columns] {
            *value /= p;
        }
        for other in 0..=self.rows {
            if other == row {
                continue;
            }
            let factor = self.at(other, column);
            if factor != 0.0 {
                self.subtract_row(other, row, factor);
            }
        }
        self.basis[row] = column;
    }

    /// `target -= factor * source`.
    fn subtract_row(&mut self, target: usize, source: usize, factor: f64) {
        let columns = self.columns;
        for column in 0..columns {
            let s = self.matrix[source * columns + column];
            if s != 0.0 {
                self.matrix[target * columns + column] -= factor * s;
            }
        }
    }
}

/// Substitutes `var == K` constraints into the rest of the system.
fn pin_fixed_variables<V: Ord + Copy>(
    constraints: &mut Vec<Constraint<V>>,
) -> Result<BTreeMap<V, f64>, SimplexError> {
    let mut pinned: BTreeMap<V, f64> = BTreeMap::new();
    loop {
        let found = constraints.iter().position(|c| {
            c.ratio == Ratio::Equal
                && c.variables.len() == 1
                && c.variables.values().all(|k| k.abs() > EPSILON)
        });
        let Some(index) = found else {
            break;
        };
        let c = constraints.remove(index);
        let Some((&v, &coefficient)) = c.variables.iter().next() else {
            continue;
        };
        let value = c.constant / coefficient;
        if value < -EPSILON {
            return Err(SimplexError::Infeasible);
        }
        let value = value.max(0.0);
        if let Some(&previous) = pinned.get(&v) {
            if (previous - value).abs() > FEASIBILITY_TOLERANCE {
                return Err(SimplexError::Infeasible);
            }
            continue;
        }
        pinned.insert(v, value);
        for other in constraints.iter_mut() {
            if let Some(k) = other.variables.remove(&v) {
                other.constant -= k * value;
            }
        }
    }

    let mut kept = Vec::with_capacity(constraints.len());
    for c in constraints.drain(..) {
        if !c.variables.is_empty() {
            kept.push(c);
        } else if !c.holds_for_zero() {
            return Err(SimplexError::Infeasible);
        }
    }
    *constraints = kept;
    Ok(pinned)
}
