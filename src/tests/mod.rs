mod shared_shaders;
mod test_program;
mod test_shader;
