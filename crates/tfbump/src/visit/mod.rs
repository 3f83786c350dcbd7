//! visitor pattern helpers
mod visit_candidates;
pub use visit_candidates::{CandidateMut, VisitCandidatesMut};

/// Visitor that visits its subjects mutably
pub trait VisitMut<T> {
    fn visit_mut(&mut self, value: &mut T);
}
