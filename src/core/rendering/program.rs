use std::collections::HashMap;

use thiserror::Error;

use super::handle::ProgramHandle;
use super::render_api::{RenderBackendPtr, RenderContext};
use super::shader::ShaderObject;
use super::uniform::UniformBinding;

#[derive(Debug, Error)]
pub enum ProgramError {
    /// The driver refused to link the attached stages
    #[error("could not link program: {0}")]
    Link(String),
    /// The driver could not create a program object
    #[error("could not create program object: {0}")]
    Allocation(String),
    /// Linking needs at least one shader stage
    #[error("trying to link a program without shaders")]
    NoShaders,
    /// Programs are linked once; create a new one to link other stages
    #[error("program {0} is already linked")]
    AlreadyLinked(ProgramHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    /// Created, nothing linked yet
    Empty,
    /// Ready to be activated and queried
    Linked,
    /// Last link attempt failed, can be linked again
    LinkFailed,
}

/// Owner of a driver program object.
///
/// Lookups by name are memoized per program: the driver is queried once per
/// name and the answer is kept until the program is dropped, including the
/// answer "this program doesn't have that name".
pub struct ProgramResource {
    handle: ProgramHandle,
    state: ProgramState,
    // caching requested uniforms
    uniforms: HashMap<String, UniformBinding>,
    // caching requested attributes
    attributes: HashMap<String, Option<u32>>,
    backend: RenderBackendPtr,
}

impl ProgramResource {
    /// Allocate an empty program. Running out of program objects means the
    /// context is unusable, so this panics; use [ProgramResource::try_new]
    /// to get the error instead.
    pub fn new(context: &RenderContext) -> Self {
        Self::try_new(context).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_new(context: &RenderContext) -> Result<Self, ProgramError> {
        let backend = context.backend().clone();
        let handle = backend
            .create_program()
            .map_err(ProgramError::Allocation)?;
        log::debug!("Created program {}", handle);

        Ok(ProgramResource {
            handle,
            state: ProgramState::Empty,
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
            backend,
        })
    }

    /// Link the given stages into this program.
    ///
    /// Shaders are attached in order, linked, and detached again whatever the
    /// outcome, so the caller is free to drop them right after.
    pub fn link(&mut self, shaders: &[&ShaderObject]) -> Result<(), ProgramError> {
        if shaders.is_empty() {
            return Err(ProgramError::NoShaders);
        }
        if self.state == ProgramState::Linked {
            return Err(ProgramError::AlreadyLinked(self.handle));
        }

        for shader in shaders {
            self.backend.attach_shader(self.handle, shader.handle());
        }

        let result = self.backend.link_program(self.handle);

        for shader in shaders {
            self.backend.detach_shader(self.handle, shader.handle());
        }

        match result {
            Ok(()) => {
                log::debug!("Linked program {} from {} stages", self.handle, shaders.len());
                self.state = ProgramState::Linked;
                Ok(())
            }
            Err(info_log) => {
                log::error!("Error linking program {}: {}", self.handle, info_log);
                self.state = ProgramState::LinkFailed;
                Err(ProgramError::Link(info_log))
            }
        }
    }

    /// Make this program the current one. Replaces whatever program was
    /// current before.
    pub fn activate(&self) {
        debug_assert!(
            self.is_linked(),
            "Trying to activate program {} that is not linked",
            self.handle
        );
        if !self.is_linked() {
            log::warn!("Ignoring activation of program {} in state {:?}", self.handle, self.state);
            return;
        }
        self.backend.use_program(Some(self.handle));
    }

    #[inline(always)]
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    #[inline(always)]
    pub fn state(&self) -> ProgramState {
        self.state
    }

    #[inline(always)]
    pub fn is_linked(&self) -> bool {
        self.state == ProgramState::Linked
    }

    /// Whether this program is the current one of its context
    pub fn is_active(&self) -> bool {
        self.backend.current_program() == Some(self.handle)
    }

    /// Resolve a uniform by name. Names the program doesn't have produce an
    /// absent binding, not an error: shared interfaces often declare more
    /// uniforms than a particular program uses.
    pub fn get_uniform(&mut self, name: &str) -> UniformBinding {
        if let Some(binding) = self.uniforms.get(name) {
            return *binding;
        }
        if !self.is_linked() {
            log::warn!("Uniform '{}' requested from unlinked program {}", name, self.handle);
            return UniformBinding::absent(self.handle);
        }

        let location = self.backend.get_uniform_location(self.handle, name);
        if location.is_none() {
            log::debug!("Program {} has no active uniform '{}'", self.handle, name);
        }
        let binding = UniformBinding::new(self.handle, location);
        self.uniforms.insert(name.to_string(), binding);
        binding
    }

    /// Resolve a vertex attribute location by name, `None` when the program
    /// has no such attribute
    pub fn get_attribute(&mut self, name: &str) -> Option<u32> {
        if let Some(location) = self.attributes.get(name) {
            return *location;
        }
        if !self.is_linked() {
            log::warn!("Attribute '{}' requested from unlinked program {}", name, self.handle);
            return None;
        }

        let location = self.backend.get_attribute_location(self.handle, name);
        if location.is_none() {
            log::debug!("Program {} has no active attribute '{}'", self.handle, name);
        }
        self.attributes.insert(name.to_string(), location);
        location
    }
}

impl std::fmt::Debug for ProgramResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramResource")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("cached_uniforms", &self.uniforms.len())
            .field("cached_attributes", &self.attributes.len())
            .finish()
    }
}

impl Drop for ProgramResource {
    fn drop(&mut self) {
        log::debug!("Deleting program {}", self.handle);
        self.backend.delete_program(self.handle);
    }
}
