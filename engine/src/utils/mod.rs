pub mod stencil;

pub use stencil::centered_nonuniform;
