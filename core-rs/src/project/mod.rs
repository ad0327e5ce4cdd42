/**
 * project module
 * Buildable projects derived from descriptors, and the fan-out rules
 */

pub mod files;
pub mod model;
pub mod set;

pub use model::{Compiler, ConfigurationType, ProjectModel};
pub use set::ProjectSet;
