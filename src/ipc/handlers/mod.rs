pub mod blocks;
pub mod core;
pub mod placements;
pub mod project;
pub mod rooms;
pub mod school;
pub mod subjects;
pub mod teachers;
