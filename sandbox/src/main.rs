use glam::{Mat4, Vec3, Vec4};
use proto_gfx::prelude::*;

const VERTEX_SOURCE: &str = "
    #version 330 core
    in vec3 position;
    in vec3 normal;
    out vec3 world_normal;
    uniform mat4 model;
    uniform mat4 view_projection;

    void main() {
        world_normal = mat3(model) * normal;
        gl_Position = view_projection * model * vec4(position, 1.0);
    }
";

const FRAGMENT_SOURCE: &str = "
    #version 330 core
    in vec3 world_normal;
    out vec4 frag_color;
    uniform vec4 color;

    void main() {
        frag_color = color * max(dot(normalize(world_normal), vec3(0.0, 1.0, 0.0)), 0.1);
    }
";

fn build_program(context: &RenderContext) -> Result<ProgramResource, Box<dyn std::error::Error>> {
    let vertex = ShaderObject::compile(context, ShaderStage::Vertex, VERTEX_SOURCE)?;
    let fragment = ShaderObject::compile(context, ShaderStage::Fragment, FRAGMENT_SOURCE)?;

    let mut program = ProgramResource::new(context);
    program.link(&[&vertex, &fragment])?;
    Ok(program)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .parse_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let context = RenderContext::headless();
    let mut program = build_program(&context)?;

    let position = program.get_attribute("position");
    let normal = program.get_attribute("normal");
    log::info!("Attributes: position = {:?}, normal = {:?}", position, normal);

    let model = program.get_uniform("model");
    let view_projection = program.get_uniform("view_projection");
    let color = program.get_uniform("color");
    // Declared by other shader permutations only
    let fog_density = program.get_uniform("fog_density");

    for frame in 0..3 {
        let angle = frame as f32 * 0.5;
        program.activate();
        context.set_uniform(&model, Mat4::from_rotation_y(angle));
        context.set_uniform(
            &view_projection,
            Mat4::perspective_rh_gl(1.0, 16.0 / 9.0, 0.1, 100.0)
                * Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y),
        );
        context.set_uniform(&color, Vec4::new(0.8, 0.3, 0.2, 1.0));
        context.set_uniform(&fog_density, 0.05f32);
        log::info!("Frame {} drawn with {}", frame, program.handle());
        context.deactivate_program();
    }

    log::info!("Current program after the loop: {:?}", context.current_program());
    Ok(())
}
