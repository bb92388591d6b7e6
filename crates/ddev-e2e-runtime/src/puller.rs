//! Container image pulls through the container runtime CLI.

use ddev_e2e_common::constants::CONTAINER_RUNTIME;
use ddev_e2e_common::error::Result;
use ddev_e2e_common::types::ImageRef;

use crate::exec::{CommandExecutor, Invocation};

/// Pulls container images with fail-fast semantics.
pub trait ContainerPuller {
    /// Pulls one image by exact reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull exits non-zero or cannot be run.
    fn pull(&self, image: &ImageRef) -> Result<()>;
}

/// Puller that runs `docker pull` through a [`CommandExecutor`].
pub struct DockerPuller<'a> {
    executor: &'a dyn CommandExecutor,
    base: Invocation,
}

impl<'a> DockerPuller<'a> {
    /// Creates a puller whose invocations inherit the directory, environment,
    /// and deadline of `base`. The program name is replaced with `docker`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, base: &Invocation) -> Self {
        let base = Invocation::new(CONTAINER_RUNTIME, base.dir.clone())
            .env(base.env.clone())
            .timeout(base.timeout);
        Self { executor, base }
    }

    /// Returns the invocation used to pull `image`.
    #[must_use]
    pub fn invocation(&self, image: &ImageRef) -> Invocation {
        self.base.clone().args(["pull", image.as_str()])
    }
}

impl ContainerPuller for DockerPuller<'_> {
    fn pull(&self, image: &ImageRef) -> Result<()> {
        tracing::info!(image = %image, "pulling image");
        let _ = self.executor.run(&self.invocation(image))?;
        Ok(())
    }
}
