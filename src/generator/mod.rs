use crate::*;
pub use random::*;

mod random;

/// Generation strategy turning a validated [`LevelSpec`] into a concrete
/// board. Implementations hold no state across calls; the same strategy
/// value applied to the same spec must yield the same layout.
pub trait BoardGenerator {
    fn generate(self, spec: &LevelSpec) -> Result<BoardLayout>;
}
