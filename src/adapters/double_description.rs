//! Double Description - Exact Motzkin Enumerator
//!
//! Reference implementation of the `PolyhedronEnumerator` port. Both
//! conversions reduce to one primitive: the generators (extreme rays plus a
//! lineality basis) of a homogeneous cone `{y : c_i·y >= 0, c_j·y = 0}`,
//! built by adding the constraints one at a time.
//!
//! Per constraint `h`:
//! - if some lineality vector `l` has `h·l != 0`, it is oriented so that
//!   `h·l > 0`, every other generator is made tight on `h` by subtracting a
//!   multiple of `l`, and `l` becomes a ray (dropped for an equality)
//! - otherwise the rays are split by the sign of `h·r`; negative rays are
//!   removed and each adjacent (positive, negative) pair contributes
//!   `(h·p) n - (h·n) p`
//!
//! Adjacency uses the combinatorial test on zero sets.

use std::collections::BTreeSet;

use num_traits::{One, Signed, Zero};
use tracing::{debug, instrument, trace};

use crate::config::EnumerationConfig;
use crate::domain::rational::Rational;
use crate::error::{ModelError, Result};
use crate::ports::polyhedron::{PolyMatrix, PolyhedronEnumerator, Representation};

/// Exact double-description enumerator.
#[derive(Debug, Clone)]
pub struct DoubleDescription {
    /// Upper bound on the number of rays alive at any step.
    max_rays: usize,
}

/// A ray with the indices of the processed constraints it saturates.
#[derive(Debug, Clone)]
struct RayRecord {
    vector: Vec<Rational>,
    zeros: BTreeSet<usize>,
}

/// Generators of a homogeneous cone.
#[derive(Debug, Clone, Default)]
struct ConeGenerators {
    rays: Vec<Vec<Rational>>,
    lineality: Vec<Vec<Rational>>,
}

impl DoubleDescription {
    pub const DEFAULT_MAX_RAYS: usize = 1_000_000;

    pub const fn new(max_rays: usize) -> Self {
        Self { max_rays }
    }

    pub const fn from_config(config: &EnumerationConfig) -> Self {
        Self::new(config.max_rays)
    }

    pub const fn max_rays(&self) -> usize {
        self.max_rays
    }

    /// Generators of `{y ∈ R^dimension : c·y >= 0 (= 0 for equalities)}`.
    fn enumerate(
        &self,
        constraints: &[Vec<Rational>],
        equalities: &BTreeSet<usize>,
        dimension: usize,
    ) -> Result<ConeGenerators> {
        let zero = Rational::zero();
        let mut lineality: Vec<Vec<Rational>> =
            (0..dimension).map(|axis| unit_vector(dimension, axis)).collect();
        let mut rays: Vec<RayRecord> = Vec::new();

        for (k, constraint) in constraints.iter().enumerate() {
            let equality = equalities.contains(&k);

            if let Some(position) = lineality.iter().position(|line| !dot(constraint, line).is_zero()) {
                let mut lead = lineality.remove(position);
                let mut lead_value = dot(constraint, &lead);
                if lead_value < zero {
                    lead = lead.iter().map(|value| -value).collect();
                    lead_value = -lead_value;
                }
                for line in &mut lineality {
                    make_tight(line, constraint, &lead, &lead_value);
                }
                for ray in &mut rays {
                    make_tight(&mut ray.vector, constraint, &lead, &lead_value);
                    ray.vector = scaled_to_unit(std::mem::take(&mut ray.vector));
                    ray.zeros.insert(k);
                }
                if !equality {
                    rays.push(RayRecord {
                        vector: scaled_to_unit(lead),
                        zeros: (0..k).collect(),
                    });
                }
            } else {
                let values: Vec<Rational> =
                    rays.iter().map(|ray| dot(constraint, &ray.vector)).collect();
                let positive: Vec<usize> = (0..rays.len()).filter(|&i| values[i] > zero).collect();
                let negative: Vec<usize> = (0..rays.len()).filter(|&i| values[i] < zero).collect();
                let required = dimension.saturating_sub(lineality.len() + 2);

                let mut created: Vec<RayRecord> = Vec::new();
                for &p in &positive {
                    for &n in &negative {
                        if !adjacent(&rays, p, n, required) {
                            continue;
                        }
                        let vector: Vec<Rational> = rays[n]
                            .vector
                            .iter()
                            .zip(&rays[p].vector)
                            .map(|(vn, vp)| &values[p] * vn - &values[n] * vp)
                            .collect();
                        let vector = scaled_to_unit(vector);
                        let zeros = (0..=k)
                            .filter(|&i| dot(&constraints[i], &vector).is_zero())
                            .collect();
                        created.push(RayRecord { vector, zeros });
                    }
                }

                let mut next: Vec<RayRecord> = Vec::with_capacity(rays.len() + created.len());
                for (index, mut ray) in rays.into_iter().enumerate() {
                    if values[index].is_zero() {
                        ray.zeros.insert(k);
                        next.push(ray);
                    } else if values[index] > zero && !equality {
                        next.push(ray);
                    }
                }
                for ray in created {
                    if !next.iter().any(|kept| kept.vector == ray.vector) {
                        next.push(ray);
                    }
                }
                rays = next;
            }

            if rays.len() > self.max_rays {
                return Err(ModelError::EnumerationLimit(self.max_rays));
            }
            trace!(
                constraint = k,
                rays = rays.len(),
                lineality = lineality.len(),
                "constraint added"
            );
        }

        Ok(ConeGenerators {
            rays: rays.into_iter().map(|ray| ray.vector).collect(),
            lineality: lineality.into_iter().map(scaled_to_unit).collect(),
        })
    }

    /// H to V: homogenize with `t >= 0` and dehomogenize the generators.
    fn to_generators(&self, matrix: &PolyMatrix, width: usize) -> Result<PolyMatrix> {
        let mut constraints = matrix.rows.clone();
        constraints.push(unit_vector(width, 0));
        let cone = self.enumerate(&constraints, &matrix.linear, width)?;

        let mut rows: Vec<Vec<Rational>> = Vec::with_capacity(cone.rays.len() + cone.lineality.len());
        let mut has_vertex = false;
        for ray in cone.rays {
            if ray[0].is_zero() {
                rows.push(ray);
            } else {
                has_vertex = true;
                let scale = ray[0].clone();
                rows.push(ray.iter().map(|value| value / &scale).collect());
            }
        }
        if !has_vertex {
            debug!("inequality system is infeasible");
            return Ok(PolyMatrix::new(Representation::Generator, Vec::new()));
        }

        let mut generators = PolyMatrix::new(Representation::Generator, rows);
        for line in cone.lineality {
            generators.linear.insert(generators.rows.len());
            generators.rows.push(line);
        }
        Ok(generators)
    }

    /// V to H: the inequalities are the generators of the dual cone.
    fn to_inequalities(&self, matrix: &PolyMatrix, width: usize) -> Result<PolyMatrix> {
        let cone = self.enumerate(&matrix.rows, &matrix.linear, width)?;
        let mut inequalities = PolyMatrix::new(Representation::Inequality, cone.rays);
        for line in cone.lineality {
            inequalities.linear.insert(inequalities.rows.len());
            inequalities.rows.push(line);
        }
        Ok(inequalities)
    }

    /// Among the first `reported` constraints, those that are not facets of
    /// the cone they describe. Of several constraints defining the same
    /// facet, the first is kept.
    fn redundant_constraints(
        &self,
        constraints: &[Vec<Rational>],
        equalities: &BTreeSet<usize>,
        dimension: usize,
        reported: usize,
    ) -> Result<BTreeSet<usize>> {
        let cone = self.enumerate(constraints, equalities, dimension)?;
        let cone_dimension = rank(cone.rays.iter().chain(&cone.lineality));

        let mut facets: BTreeSet<Vec<usize>> = BTreeSet::new();
        let mut redundant = BTreeSet::new();
        for (index, constraint) in constraints.iter().enumerate().take(reported) {
            if equalities.contains(&index) {
                continue;
            }
            let tight: Vec<usize> = cone
                .rays
                .iter()
                .enumerate()
                .filter(|(_, ray)| dot(constraint, ray).is_zero())
                .map(|(i, _)| i)
                .collect();
            let tight_rank = rank(tight.iter().map(|&i| &cone.rays[i]).chain(&cone.lineality));
            let is_facet = cone_dimension > 0 && tight_rank + 1 == cone_dimension && facets.insert(tight);
            if !is_facet {
                redundant.insert(index);
            }
        }
        Ok(redundant)
    }
}

impl Default for DoubleDescription {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RAYS)
    }
}

impl PolyhedronEnumerator for DoubleDescription {
    #[instrument(skip(self, matrix), fields(kind = %matrix.kind, rows = matrix.rows.len()))]
    fn convert(&self, matrix: &PolyMatrix) -> Result<PolyMatrix> {
        let width = validate(matrix)?;
        let converted = match matrix.kind {
            Representation::Inequality => self.to_generators(matrix, width)?,
            Representation::Generator => self.to_inequalities(matrix, width)?,
        };
        debug!(
            rows = converted.rows.len(),
            linear = converted.linear.len(),
            "double description converted"
        );
        Ok(converted)
    }

    #[instrument(skip(self, matrix), fields(kind = %matrix.kind, rows = matrix.rows.len()))]
    fn redundant_rows(&self, matrix: &PolyMatrix) -> Result<BTreeSet<usize>> {
        let width = validate(matrix)?;
        let redundant = match matrix.kind {
            Representation::Inequality => {
                let mut constraints = matrix.rows.clone();
                constraints.push(unit_vector(width, 0));
                self.redundant_constraints(&constraints, &matrix.linear, width, matrix.rows.len())?
            }
            Representation::Generator => {
                self.redundant_constraints(&matrix.rows, &matrix.linear, width, matrix.rows.len())?
            }
        };
        debug!(redundant = redundant.len(), "redundancy check finished");
        Ok(redundant)
    }
}

// ────────────────────────────────────────────
// Exact linear algebra helpers
// ────────────────────────────────────────────

fn validate(matrix: &PolyMatrix) -> Result<usize> {
    let width = matrix.width();
    if width == 0 {
        return Err(ModelError::MalformedMatrix("matrix has no columns".to_string()));
    }
    if let Some(index) = matrix.rows.iter().position(|row| row.len() != width) {
        return Err(ModelError::MalformedMatrix(format!(
            "row {index} has {} entries, expected {width}",
            matrix.rows[index].len()
        )));
    }
    if let Some(index) = matrix.linear.iter().find(|&&i| i >= matrix.rows.len()) {
        return Err(ModelError::MalformedMatrix(format!(
            "linear index {index} is out of range"
        )));
    }
    Ok(width)
}

fn unit_vector(dimension: usize, axis: usize) -> Vec<Rational> {
    let mut vector = vec![Rational::zero(); dimension];
    vector[axis] = Rational::one();
    vector
}

fn dot(left: &[Rational], right: &[Rational]) -> Rational {
    left.iter()
        .zip(right)
        .fold(Rational::zero(), |acc, (a, b)| acc + a * b)
}

/// `vector -= (h·vector / h·lead) lead`, leaving `h·vector = 0`.
fn make_tight(vector: &mut [Rational], constraint: &[Rational], lead: &[Rational], lead_value: &Rational) {
    let value = dot(constraint, vector);
    if value.is_zero() {
        return;
    }
    let factor = value / lead_value;
    for (entry, l) in vector.iter_mut().zip(lead) {
        *entry -= &factor * l;
    }
}

/// Positive rescaling to max-abs one; the zero vector is returned as is.
fn scaled_to_unit(vector: Vec<Rational>) -> Vec<Rational> {
    let scale = vector.iter().map(Signed::abs).max().unwrap_or_else(Rational::zero);
    if scale.is_zero() || scale.is_one() {
        return vector;
    }
    vector.into_iter().map(|value| value / &scale).collect()
}

/// Combinatorial adjacency: no third ray saturates every constraint both
/// `a` and `b` saturate.
fn adjacent(rays: &[RayRecord], a: usize, b: usize, required: usize) -> bool {
    let common: BTreeSet<usize> = rays[a].zeros.intersection(&rays[b].zeros).copied().collect();
    if common.len() < required {
        return false;
    }
    !rays
        .iter()
        .enumerate()
        .any(|(i, ray)| i != a && i != b && common.is_subset(&ray.zeros))
}

/// Rank by Gaussian elimination.
fn rank<'a>(vectors: impl IntoIterator<Item = &'a Vec<Rational>>) -> usize {
    let mut rows: Vec<Vec<Rational>> = vectors.into_iter().cloned().collect();
    let width = rows.first().map_or(0, Vec::len);
    let mut rank = 0;
    for column in 0..width {
        let Some(pivot) = (rank..rows.len()).find(|&i| !rows[i][column].is_zero()) else {
            continue;
        };
        rows.swap(rank, pivot);
        let pivot_row = rows[rank].clone();
        for row in rows.iter_mut().skip(rank + 1) {
            if row[column].is_zero() {
                continue;
            }
            let factor = &row[column] / &pivot_row[column];
            for (entry, p) in row.iter_mut().zip(&pivot_row) {
                *entry -= &factor * p;
            }
        }
        rank += 1;
    }
    rank
}
