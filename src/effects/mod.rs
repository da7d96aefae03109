pub mod particles;

pub use particles::ParticleEmitterPool;
