//! Linear maps between gamble spaces.
//!
//! A `LinearMap<S, T>` assigns an image gamble over `T` to every state of
//! `S` and extends linearly: `M f = Σ_x f[x] · M(x)`. Rays, cones and whole
//! desirability sets are mapped generator by generator.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::State;
use super::desirability::DesirabilitySet;
use super::gamble::Gamble;
use super::ray::{Cone, Ray};
use crate::error::{ModelError, Result};

/// Linear transformation given by the images of the unit gambles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinearMap<S, T> {
    images: BTreeMap<S, Gamble<T>>,
}

impl<S: State, T: State> LinearMap<S, T> {
    pub const fn new() -> Self {
        Self {
            images: BTreeMap::new(),
        }
    }

    pub fn from_images<I: IntoIterator<Item = (S, Gamble<T>)>>(images: I) -> Self {
        Self {
            images: images.into_iter().collect(),
        }
    }

    /// Sets the image of `state`, returning the previous one.
    pub fn insert(&mut self, state: S, image: Gamble<T>) -> Option<Gamble<T>> {
        self.images.insert(state, image)
    }

    pub fn remove(&mut self, state: &S) -> Option<Gamble<T>> {
        self.images.remove(state)
    }

    pub fn image(&self, state: &S) -> Option<&Gamble<T>> {
        self.images.get(state)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// States with an image.
    pub fn domain(&self) -> BTreeSet<S> {
        self.images.keys().cloned().collect()
    }

    /// `Σ_x gamble[x] · M(x)`; the empty gamble maps to the empty gamble.
    ///
    /// # Errors
    /// Returns `KeyMissing` when a state of `gamble` has no image.
    pub fn apply(&self, gamble: &Gamble<S>) -> Result<Gamble<T>> {
        gamble
            .iter()
            .try_fold(Gamble::default(), |acc, (state, value)| {
                let image = self
                    .images
                    .get(state)
                    .ok_or_else(|| ModelError::KeyMissing(format!("{state:?}")))?;
                Ok(&acc + &image.scale(value))
            })
    }

    /// # Errors
    /// Returns `KeyMissing` as for [`Self::apply`] and `DegenerateRay` when
    /// the image of `ray` is identically zero.
    pub fn apply_ray(&self, ray: &Ray<S>) -> Result<Ray<T>> {
        Ray::new(&self.apply(ray.as_gamble())?)
    }

    /// # Errors
    /// As for [`Self::apply_ray`], for any generator.
    pub fn apply_cone(&self, cone: &Cone<S>) -> Result<Cone<T>> {
        cone.iter()
            .map(|ray| self.apply_ray(ray))
            .collect::<Result<Vec<_>>>()
            .map(Cone::from_rays)
    }

    /// # Errors
    /// As for [`Self::apply_ray`], for any generator of any cone.
    pub fn apply_set(&self, set: &DesirabilitySet<S>) -> Result<DesirabilitySet<T>> {
        set.iter()
            .map(|cone| self.apply_cone(cone))
            .collect::<Result<Vec<_>>>()
            .map(DesirabilitySet::from_cones)
    }
}

impl<S: State, U: State> LinearMap<S, (S, U)> {
    /// Cylindrical extension onto `states × other`: each state goes to the
    /// indicator of its fiber. Agrees with [`Gamble::extend`].
    pub fn cylindrical<I: IntoIterator<Item = S>>(states: I, other: &BTreeSet<U>) -> Self {
        Self::from_images(states.into_iter().map(|state| {
            let fiber = other.iter().map(|coordinate| (state.clone(), coordinate.clone()));
            let image = Gamble::indicator(fiber);
            (state, image)
        }))
    }
}

impl<S: State, T: State> Default for LinearMap<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, T: State> FromIterator<(S, Gamble<T>)> for LinearMap<S, T> {
    fn from_iter<I: IntoIterator<Item = (S, Gamble<T>)>>(iter: I) -> Self {
        Self::from_images(iter)
    }
}
