/**
 * config module
 * Module descriptors and the resolved set of them
 */

pub mod descriptor;
pub mod set;

pub use descriptor::{ConfigDescriptor, ProjectKind};
pub use set::ConfigSet;
