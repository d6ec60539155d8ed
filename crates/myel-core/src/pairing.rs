//! Reconstruct fibers from independently selected boundaries.
//!
//! Axon, inner-myelin and outer-myelin contours are committed one at a
//! time and in any order, so nothing in the store says which three
//! belong together. [`pair`] walks the axons in selection order and, for
//! each one, claims the first unclaimed inner and the first unclaimed
//! outer contour that surround it. "Surround" means the axon's centroid
//! is strictly inside the candidate, or its first vertex is inside or on
//! the candidate's border.
//!
//! The search takes the first hit in store order rather than the best
//! overlap. An axon touching two unclaimed sheaths binds to the one
//! selected earlier.

use crate::annotation::{Category, ContourStore};
use crate::geometry::{Contour, Position};

/// One complete fiber: outer, inner and axon boundary.
///
/// The three contours are ordered by area, largest first. For a well
/// formed fiber that is outer, inner, axon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple([Contour; 3]);

impl Triple {
    /// Build a triple, ordering the members by descending area.
    #[must_use]
    pub fn new(mut members: [Contour; 3]) -> Self {
        members.sort_by(|a, b| b.area().total_cmp(&a.area()));
        Self(members)
    }

    /// Largest member.
    #[must_use]
    pub const fn outer(&self) -> &Contour {
        &self.0[0]
    }

    /// Middle member.
    #[must_use]
    pub const fn inner(&self) -> &Contour {
        &self.0[1]
    }

    /// Smallest member.
    #[must_use]
    pub const fn axon(&self) -> &Contour {
        &self.0[2]
    }

    /// Members in outer, inner, axon order.
    #[must_use]
    pub const fn members(&self) -> &[Contour; 3] {
        &self.0
    }
}

/// Fiber contours that did not complete a triple, by category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrphanGroups {
    /// Unpaired axons.
    pub axon: Vec<Contour>,
    /// Unpaired inner myelin boundaries.
    pub inner: Vec<Contour>,
    /// Unpaired outer myelin boundaries.
    pub outer: Vec<Contour>,
}

impl OrphanGroups {
    /// Orphans of one fiber category. `Misc` has none.
    #[must_use]
    pub fn get(&self, category: Category) -> &[Contour] {
        match category {
            Category::Axon => &self.axon,
            Category::InnerMyelin => &self.inner,
            Category::OuterMyelin => &self.outer,
            Category::Misc => &[],
        }
    }

    /// Total orphan count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axon.len() + self.inner.len() + self.outer.len()
    }

    /// Returns `true` if every fiber contour was paired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(category, contour)` in axon, inner, outer order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Contour)> {
        Category::FIBER
            .into_iter()
            .flat_map(move |cat| self.get(cat).iter().map(move |c| (cat, c)))
    }
}

/// Result of one pairing pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pairing {
    /// Complete fibers, in axon selection order.
    pub triples: Vec<Triple>,
    /// Everything else from the three fiber categories.
    pub orphans: OrphanGroups,
}

impl Pairing {
    /// Whether `contour` is a member of any complete triple.
    #[must_use]
    pub fn is_paired(&self, contour: &Contour) -> bool {
        self.triples
            .iter()
            .any(|t| t.members().iter().any(|m| m == contour))
    }
}

/// Whether `candidate` surrounds `axon` for pairing purposes.
fn surrounds(candidate: &Contour, axon: &Contour) -> bool {
    let by_centroid = axon
        .centroid()
        .is_some_and(|c| candidate.position(c) == Position::Inside);
    let by_vertex = axon
        .first()
        .is_some_and(|p| candidate.position(p) != Position::Outside);
    by_centroid || by_vertex
}

/// Index of the first unclaimed candidate surrounding `axon`, marking it
/// claimed.
fn claim(candidates: &[Contour], claimed: &mut [bool], axon: &Contour) -> Option<usize> {
    let hit = candidates
        .iter()
        .enumerate()
        .find(|(i, c)| !claimed[*i] && surrounds(c, axon))
        .map(|(i, _)| i)?;
    claimed[hit] = true;
    Some(hit)
}

/// Group the fiber categories of `store` into triples and orphans.
///
/// Pure: the same store always yields the same pairing, in the same
/// order.
#[must_use]
pub fn pair(store: &ContourStore) -> Pairing {
    let inner = store.get(Category::InnerMyelin);
    let outer = store.get(Category::OuterMyelin);
    let mut inner_claimed = vec![false; inner.len()];
    let mut outer_claimed = vec![false; outer.len()];
    let mut pairing = Pairing::default();

    for axon in store.get(Category::Axon) {
        let i = claim(inner, &mut inner_claimed, axon);
        let o = claim(outer, &mut outer_claimed, axon);
        match (i, o) {
            (Some(i), Some(o)) => {
                pairing
                    .triples
                    .push(Triple::new([outer[o].clone(), inner[i].clone(), axon.clone()]));
            }
            (i, o) => {
                pairing.orphans.axon.push(axon.clone());
                if let Some(i) = i {
                    pairing.orphans.inner.push(inner[i].clone());
                }
                if let Some(o) = o {
                    pairing.orphans.outer.push(outer[o].clone());
                }
            }
        }
    }

    for (contour, _) in inner.iter().zip(&inner_claimed).filter(|(_, seen)| !**seen) {
        pairing.orphans.inner.push(contour.clone());
    }
    for (contour, _) in outer.iter().zip(&outer_claimed).filter(|(_, seen)| !**seen) {
        pairing.orphans.outer.push(contour.clone());
    }

    log::debug!(
        "paired {} fibers, {} orphans",
        pairing.triples.len(),
        pairing.orphans.len()
    );
    pairing
}
