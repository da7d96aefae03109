pub mod audio;
pub mod mesh;
pub mod renderer;
