use crate::nest::Nest;
use ndarray::Array1;

/// Read-only view of a run at the end of one generation.
#[derive(Debug)]
pub struct GenerationSnapshot<'a> {
    pub generation: usize,
    /// Ranked up to `abandon_cutoff`; the tail holds fresh random nests.
    pub nests: &'a [Nest],
    pub champion: &'a Nest,
    /// Lambda assigned to each rank at the start of the generation.
    pub lambdas: &'a [f64],
    pub alpha: &'a Array1<f64>,
    pub replaced: usize,
    pub abandon_cutoff: usize,
    pub abandoned: usize,
}

/// Per-generation notification hook. Called once per generation from the
/// solver's own thread, never from inside the parallel fan-out.
pub trait GenerationObserver: Send + Sync {
    fn on_generation(&self, snapshot: &GenerationSnapshot<'_>);
}

impl<F> GenerationObserver for F
where
    F: Fn(&GenerationSnapshot<'_>) + Send + Sync,
{
    fn on_generation(&self, snapshot: &GenerationSnapshot<'_>) {
        self(snapshot)
    }
}
