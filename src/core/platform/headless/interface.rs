use proto_gfx::core::rendering::shader::ShaderStage;

/// One `uniform`, `in` or `out` declaration found in a shader source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub type_name: String,
    /// Explicit `layout(location = N)`
    pub location: Option<u32>,
}

/// Interface of a shader stage as seen by the linker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderInterface {
    pub uniforms: Vec<Declaration>,
    pub inputs: Vec<Declaration>,
    pub outputs: Vec<Declaration>,
    pub has_main: bool,
}

enum Storage {
    Uniform,
    Input,
    Output,
}

const SKIPPED_QUALIFIERS: &[&str] = &[
    "flat",
    "smooth",
    "noperspective",
    "centroid",
    "sample",
    "invariant",
    "highp",
    "mediump",
    "lowp",
    "const",
];

impl ShaderInterface {
    /// Scan a GLSL-like source for global declarations.
    ///
    /// This is not a GLSL parser: it only understands one declaration per
    /// statement at global scope, which is what our test and tool shaders use.
    pub fn parse(stage: ShaderStage, source: &str) -> ShaderInterface {
        let mut interface = ShaderInterface::default();

        let code: String = strip_block_comments(source)
            .lines()
            .map(|line| line.split("//").next().unwrap_or_default())
            .filter(|line| !line.trim_start().starts_with('#'))
            .collect::<Vec<_>>()
            .join("\n");

        interface.has_main = code.contains("void main");

        for statement in code.split(';') {
            // Only the tail after the last brace can be a global declaration
            let statement = statement
                .rsplit(|c: char| c == '{' || c == '}')
                .next()
                .unwrap_or_default()
                .trim();

            if let Some((storage, declaration)) = parse_declaration(stage, statement) {
                match storage {
                    Storage::Uniform => interface.uniforms.push(declaration),
                    Storage::Input => interface.inputs.push(declaration),
                    Storage::Output => interface.outputs.push(declaration),
                }
            }
        }

        interface
    }

    pub fn output(&self, name: &str) -> Option<&Declaration> {
        self.outputs.iter().find(|output| output.name == name)
    }
}

fn parse_declaration(stage: ShaderStage, statement: &str) -> Option<(Storage, Declaration)> {
    let mut rest = statement;
    let mut location = None;

    if let Some(layout) = rest.strip_prefix("layout") {
        let open = layout.find('(')?;
        let close = layout.find(')')?;
        location = parse_layout_location(&layout[open + 1..close]);
        rest = &layout[close + 1..];
    }

    // Initializers: `uniform float gamma = 2.2`
    let rest = rest.split('=').next().unwrap_or_default();

    let mut tokens = rest
        .split_whitespace()
        .filter(|token| !SKIPPED_QUALIFIERS.contains(token));

    let storage = match (tokens.next()?, stage) {
        ("uniform", _) => Storage::Uniform,
        ("in", _) | ("attribute", ShaderStage::Vertex) => Storage::Input,
        ("out", _) => Storage::Output,
        ("varying", ShaderStage::Vertex) => Storage::Output,
        ("varying", _) => Storage::Input,
        _ => return None,
    };
    let type_name = tokens.next()?.to_string();
    let name = tokens.next()?;
    // Arrays: `in vec3 normal[]`
    let name = name.split('[').next().unwrap_or_default().to_string();
    if name.is_empty() || tokens.next().is_some() {
        return None;
    }

    Some((
        storage,
        Declaration {
            name,
            type_name,
            location,
        },
    ))
}

/// Replace every `/* ... */` with a space, keeping its line breaks. An
/// unterminated comment runs to the end of the source
fn strip_block_comments(source: &str) -> String {
    let mut code = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        code.push_str(&rest[..start]);
        code.push(' ');
        let comment = &rest[start + 2..];
        let end = comment.find("*/").unwrap_or(comment.len());
        code.extend(comment[..end].chars().filter(|c| *c == '\n'));
        if end == comment.len() {
            return code;
        }
        rest = &comment[end + 2..];
    }
    code.push_str(rest);
    code
}

fn parse_layout_location(qualifiers: &str) -> Option<u32> {
    qualifiers.split(',').find_map(|qualifier| {
        let (key, value) = qualifier.split_once('=')?;
        if key.trim() != "location" {
            return None;
        }
        value.trim().parse().ok()
    })
}
