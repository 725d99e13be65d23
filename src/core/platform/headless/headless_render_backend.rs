use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use proto_gfx::core::platform::headless::interface::ShaderInterface;
use proto_gfx::core::rendering::handle::{ProgramHandle, ShaderHandle};
use proto_gfx::core::rendering::render_api::{RenderBackend, API};
use proto_gfx::core::rendering::shader::{ShaderDataType, ShaderError, ShaderStage};
use proto_gfx::core::rendering::uniform::{UniformBinding, UniformValue};

/// Counters of the driver calls a [HeadlessRenderBackend] received
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackendStats {
    pub programs_created: u32,
    pub programs_deleted: u32,
    pub shaders_compiled: u32,
    pub shaders_deleted: u32,
    pub link_calls: u32,
    pub uniform_queries: u32,
    pub attribute_queries: u32,
    pub uniform_uploads: u32,
    /// Calls a real driver would answer with an error (unknown handles,
    /// mismatched uniform types)
    pub invalid_calls: u32,
}

/// Render backend that keeps every object in memory.
///
/// It behaves like a strict GL driver for the program and shader calls:
/// it checks stage interfaces when linking, assigns locations
/// deterministically and counts every call, which makes it the backend
/// used by tests and tools that don't have a GPU.
pub struct HeadlessRenderBackend {
    state: Mutex<HeadlessState>,
}

#[derive(Default)]
struct HeadlessState {
    next_name: u32,
    fail_allocations: bool,
    shaders: HashMap<ShaderHandle, HeadlessShader>,
    programs: HashMap<ProgramHandle, HeadlessProgram>,
    current_program: Option<ProgramHandle>,
    stats: BackendStats,
}

struct HeadlessShader {
    stage: ShaderStage,
    interface: ShaderInterface,
    /// Deleted while attached: freed once detached from every program
    pending_delete: bool,
}

#[derive(Default)]
struct HeadlessProgram {
    attached: Vec<ShaderHandle>,
    linked: Option<LinkedProgram>,
}

#[derive(Default)]
struct LinkedProgram {
    uniforms: HashMap<String, LinkedUniform>,
    attributes: HashMap<String, u32>,
    values: HashMap<u32, UniformValue>,
}

struct LinkedUniform {
    location: u32,
    data_type: Option<ShaderDataType>,
}

impl Default for HeadlessRenderBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRenderBackend {
    pub fn new() -> Self {
        HeadlessRenderBackend {
            state: Mutex::new(HeadlessState {
                next_name: 1,
                ..Default::default()
            }),
        }
    }

    pub fn stats(&self) -> BackendStats {
        self.state.lock().stats
    }

    /// Make every following object creation fail, like a lost context would
    pub fn set_fail_allocations(&self, fail: bool) {
        self.state.lock().fail_allocations = fail;
    }

    pub fn live_programs(&self) -> usize {
        self.state.lock().programs.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.lock().shaders.len()
    }

    pub fn is_program_live(&self, program: ProgramHandle) -> bool {
        self.state.lock().programs.contains_key(&program)
    }

    pub fn attached_shaders(&self, program: ProgramHandle) -> Vec<ShaderHandle> {
        self.state
            .lock()
            .programs
            .get(&program)
            .map(|program| program.attached.clone())
            .unwrap_or_default()
    }

    /// Last value uploaded to a uniform location of a linked program
    pub fn uniform_value(&self, program: ProgramHandle, location: u32) -> Option<UniformValue> {
        let state = self.state.lock();
        let linked = state.programs.get(&program)?.linked.as_ref()?;
        linked.values.get(&location).copied()
    }
}

impl HeadlessState {
    fn next_name(&mut self) -> Result<u32, String> {
        if self.fail_allocations {
            return Err("out of memory".to_string());
        }
        let name = self.next_name;
        self.next_name += 1;
        Ok(name)
    }

    fn invalid_call(&mut self, message: std::fmt::Arguments) {
        log::warn!("Headless backend: {}", message);
        self.stats.invalid_calls += 1;
    }

    fn is_attached_anywhere(&self, shader: ShaderHandle) -> bool {
        self.programs
            .values()
            .any(|program| program.attached.contains(&shader))
    }

    fn link(&self, program: ProgramHandle) -> Result<LinkedProgram, String> {
        let Some(headless_program) = self.programs.get(&program) else {
            return Err(format!("{} is not a program", program));
        };

        let mut stages = headless_program
            .attached
            .iter()
            .filter_map(|shader| self.shaders.get(shader))
            .collect::<Vec<_>>();
        if stages.is_empty() {
            return Err("no shaders attached".to_string());
        }
        stages.sort_by_key(|shader| shader.stage.pipeline_order());

        for pair in stages.windows(2) {
            if pair[0].stage == pair[1].stage {
                return Err(format!("more than one {:?} shader attached", pair[0].stage));
            }
        }

        let has_compute = stages.iter().any(|s| s.stage == ShaderStage::Compute);
        if has_compute && stages.len() > 1 {
            return Err("compute shaders can't be linked with graphics stages".to_string());
        }
        if !has_compute && stages[0].stage != ShaderStage::Vertex {
            return Err("missing vertex shader".to_string());
        }

        // Every stage input has to be produced by the previous stage
        for pair in stages.windows(2) {
            let (producer, consumer) = (&pair[0].interface, &pair[1].interface);
            for input in consumer.inputs.iter() {
                match producer.output(&input.name) {
                    None => {
                        return Err(format!(
                            "{:?} input '{}' is not written by the {:?} shader",
                            pair[1].stage, input.name, pair[0].stage
                        ))
                    }
                    Some(output) if output.type_name != input.type_name => {
                        return Err(format!(
                            "type mismatch for '{}': {} in {:?} shader, {} in {:?} shader",
                            input.name,
                            output.type_name,
                            pair[0].stage,
                            input.type_name,
                            pair[1].stage
                        ))
                    }
                    _ => {}
                }
            }
        }

        let mut uniform_types = BTreeMap::<&str, &str>::new();
        for declaration in stages.iter().flat_map(|s| s.interface.uniforms.iter()) {
            match uniform_types.insert(&declaration.name, &declaration.type_name) {
                Some(previous) if previous != declaration.type_name => {
                    return Err(format!(
                        "uniform '{}' declared as both {} and {}",
                        declaration.name, previous, declaration.type_name
                    ));
                }
                _ => {}
            }
        }
        let uniforms = uniform_types
            .into_iter()
            .enumerate()
            .map(|(location, (name, type_name))| {
                let uniform = LinkedUniform {
                    location: location as u32,
                    data_type: ShaderDataType::from_glsl(type_name),
                };
                (name.to_string(), uniform)
            })
            .collect();

        let mut attributes = HashMap::new();
        if stages[0].stage == ShaderStage::Vertex {
            let inputs = &stages[0].interface.inputs;
            let mut used: Vec<u32> = Vec::new();
            for input in inputs.iter() {
                if let Some(location) = input.location {
                    let slots = location..location + attribute_slots(&input.type_name);
                    if slots.clone().any(|slot| used.contains(&slot)) {
                        return Err(format!(
                            "attribute '{}' overlaps another attribute at location {}",
                            input.name, location
                        ));
                    }
                    used.extend(slots);
                    attributes.insert(input.name.clone(), location);
                }
            }
            for input in inputs.iter().filter(|input| input.location.is_none()) {
                let slot_count = attribute_slots(&input.type_name);
                let mut location = 0;
                while (location..location + slot_count).any(|slot| used.contains(&slot)) {
                    location += 1;
                }
                used.extend(location..location + slot_count);
                attributes.insert(input.name.clone(), location);
            }
        }

        Ok(LinkedProgram {
            uniforms,
            attributes,
            values: HashMap::new(),
        })
    }
}

/// Consecutive attribute locations a vertex input of this type takes: one
/// per matrix column, two for each `dvec3`/`dvec4` sized column
fn attribute_slots(type_name: &str) -> u32 {
    let (double, base) = match type_name.strip_prefix('d') {
        Some(base) if base.starts_with("vec") || base.starts_with("mat") => (true, base),
        _ => (false, type_name),
    };
    let slots_per_column = |rows: u32| if double && rows > 2 { 2 } else { 1 };

    if let Some(dimensions) = base.strip_prefix("mat") {
        let (columns, rows): (u32, u32) = match dimensions.split_once('x') {
            Some((columns, rows)) => (columns.parse().unwrap_or(1), rows.parse().unwrap_or(1)),
            None => {
                let size = dimensions.parse().unwrap_or(1);
                (size, size)
            }
        };
        return columns * slots_per_column(rows);
    }
    match base.strip_prefix("vec") {
        Some(size) => slots_per_column(size.parse().unwrap_or(1)),
        None => 1,
    }
}

fn accepts(declared: ShaderDataType, value: &UniformValue) -> bool {
    match (declared, value.data_type()) {
        (ShaderDataType::Bool, ShaderDataType::Int) => true,
        (declared, given) => declared == given,
    }
}

impl RenderBackend for HeadlessRenderBackend {
    fn get_api(&self) -> API {
        API::Headless
    }

    fn create_program(&self) -> Result<ProgramHandle, String> {
        let mut state = self.state.lock();
        let program = ProgramHandle::from_raw(state.next_name()?);
        state.programs.insert(program, HeadlessProgram::default());
        state.stats.programs_created += 1;
        Ok(program)
    }

    fn delete_program(&self, program: ProgramHandle) {
        let mut state = self.state.lock();
        let Some(deleted) = state.programs.remove(&program) else {
            state.invalid_call(format_args!("deleting unknown program {}", program));
            return;
        };
        state.stats.programs_deleted += 1;

        // Shaders flagged for deletion go away with their last program
        for shader in deleted.attached {
            let pending = state.shaders.get(&shader).is_some_and(|s| s.pending_delete);
            if pending && !state.is_attached_anywhere(shader) {
                state.shaders.remove(&shader);
            }
        }
    }

    fn compile_shader(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, ShaderError> {
        let mut state = self.state.lock();
        let shader = ShaderHandle::from_raw(state.next_name().map_err(ShaderError::Allocation)?);

        let interface = ShaderInterface::parse(stage, source);
        if !interface.has_main {
            let info_log = format!("0:0: {:?} shader has no 'main' function", stage);
            log::error!("Error compiling {:?} shader: {}", stage, info_log);
            return Err(ShaderError::CompilationError(info_log));
        }

        state.shaders.insert(
            shader,
            HeadlessShader {
                stage,
                interface,
                pending_delete: false,
            },
        );
        state.stats.shaders_compiled += 1;
        Ok(shader)
    }

    fn delete_shader(&self, shader: ShaderHandle) {
        let mut state = self.state.lock();
        if !state.shaders.contains_key(&shader) {
            state.invalid_call(format_args!("deleting unknown shader {}", shader));
            return;
        }
        state.stats.shaders_deleted += 1;

        if state.is_attached_anywhere(shader) {
            if let Some(headless_shader) = state.shaders.get_mut(&shader) {
                headless_shader.pending_delete = true;
            }
        } else {
            state.shaders.remove(&shader);
        }
    }

    fn attach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        let mut state = self.state.lock();
        if !state.shaders.contains_key(&shader) {
            state.invalid_call(format_args!("attaching unknown shader {}", shader));
            return;
        }
        let Some(headless_program) = state.programs.get_mut(&program) else {
            state.invalid_call(format_args!("attaching to unknown program {}", program));
            return;
        };
        if headless_program.attached.contains(&shader) {
            state.invalid_call(format_args!("{} already attached to {}", shader, program));
            return;
        }
        headless_program.attached.push(shader);
    }

    fn detach_shader(&self, program: ProgramHandle, shader: ShaderHandle) {
        let mut state = self.state.lock();
        let detached = match state.programs.get_mut(&program) {
            Some(headless_program) => {
                let before = headless_program.attached.len();
                headless_program.attached.retain(|attached| *attached != shader);
                before != headless_program.attached.len()
            }
            None => false,
        };
        if !detached {
            state.invalid_call(format_args!("{} is not attached to {}", shader, program));
            return;
        }

        let pending = state.shaders.get(&shader).is_some_and(|s| s.pending_delete);
        if pending && !state.is_attached_anywhere(shader) {
            state.shaders.remove(&shader);
        }
    }

    fn link_program(&self, program: ProgramHandle) -> Result<(), String> {
        let mut state = self.state.lock();
        state.stats.link_calls += 1;

        let result = state.link(program);
        let Some(headless_program) = state.programs.get_mut(&program) else {
            return result.map(|_| ());
        };
        match result {
            Ok(linked) => {
                headless_program.linked = Some(linked);
                Ok(())
            }
            Err(info_log) => {
                // A failed link leaves the program without executable
                headless_program.linked = None;
                Err(info_log)
            }
        }
    }

    fn use_program(&self, program: Option<ProgramHandle>) {
        let mut state = self.state.lock();
        if let Some(program) = program {
            let linked = state
                .programs
                .get(&program)
                .is_some_and(|p| p.linked.is_some());
            if !linked {
                state.invalid_call(format_args!("using {} that is not linked", program));
                return;
            }
        }
        state.current_program = program;
    }

    fn current_program(&self) -> Option<ProgramHandle> {
        self.state.lock().current_program
    }

    fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let mut state = self.state.lock();
        state.stats.uniform_queries += 1;
        let linked = state.programs.get(&program)?.linked.as_ref()?;
        linked.uniforms.get(name).map(|uniform| uniform.location)
    }

    fn get_attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        let mut state = self.state.lock();
        state.stats.attribute_queries += 1;
        let linked = state.programs.get(&program)?.linked.as_ref()?;
        linked.attributes.get(name).copied()
    }

    fn set_uniform(&self, binding: &UniformBinding, value: &UniformValue) {
        let Some(location) = binding.location() else {
            return;
        };
        let mut state = self.state.lock();
        state.stats.uniform_uploads += 1;

        let Some(linked) = state
            .programs
            .get_mut(&binding.program())
            .and_then(|program| program.linked.as_mut())
        else {
            state.invalid_call(format_args!("uploading to {} that is not linked", binding.program()));
            return;
        };

        let declared = linked
            .uniforms
            .values()
            .find(|uniform| uniform.location == location)
            .map(|uniform| uniform.data_type);
        match declared {
            Some(Some(declared)) if !accepts(declared, value) => {
                state.invalid_call(format_args!(
                    "uploading {:?} to uniform of type {:?}",
                    value.data_type(),
                    declared
                ));
            }
            Some(_) => {
                linked.values.insert(location, *value);
            }
            None => state.invalid_call(format_args!(
                "location {} does not exist in {}",
                location,
                binding.program()
            )),
        }
    }
}
