use terrain::SurfaceError;
use thiserror::Error;

/// Error type for a single module's apply call.
///
/// These are local failures: the orchestrator logs them and continues with
/// the remaining modules of the batch, so one module can never block its
/// siblings or abort the gesture.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("surface access failed: {0}")]
    Surface(#[from] SurfaceError),
    #[error("module `{0}` has no overlay layer selected")]
    LayerNotSelected(String),
    #[error("unknown overlay layer `{0}`")]
    UnknownLayer(String),
}
